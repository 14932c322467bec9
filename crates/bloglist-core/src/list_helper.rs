//! Aggregate statistics over a list of blogs.
//!
//! Every function makes a single left-to-right pass. Ties are broken in
//! favour of whatever was seen first: the favorite blog is the earliest
//! blog with the highest like count, and per-author winners are the
//! earliest author (by first appearance) among those sharing the maximum.
//!
//! Like totals saturate at `u64::MAX` instead of overflowing.

use serde::{Deserialize, Serialize};

use crate::format::{BlogView, format_blog};
use crate::model::BlogRecord;

/// Author with the most blogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorBlogs {
    pub author: String,
    pub blogs: u64,
}

/// Author with the most likes across all of their blogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorLikes {
    pub author: String,
    pub likes: u64,
}

/// All aggregates for one list of blogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogStats {
    pub total_likes: u64,
    pub favorite_blog: Option<BlogView>,
    pub most_blogs: Option<AuthorBlogs>,
    pub most_likes: Option<AuthorLikes>,
}

/// Sum of likes over all blogs.
pub fn total_likes(blogs: &[BlogRecord]) -> u64 {
    blogs.iter().fold(0, |sum: u64, blog| sum.saturating_add(blog.likes))
}

/// The blog with the most likes, formatted for output.
pub fn favorite_blog(blogs: &[BlogRecord]) -> Option<BlogView> {
    blogs
        .iter()
        .reduce(|fav, blog| if blog.likes > fav.likes { blog } else { fav })
        .map(format_blog)
}

/// The author who wrote the most blogs.
pub fn most_blogs(blogs: &[BlogRecord]) -> Option<AuthorBlogs> {
    max_by_author(blogs, |_| 1).map(|(author, blogs)| AuthorBlogs { author, blogs })
}

/// The author whose blogs have the most likes in total.
pub fn most_likes(blogs: &[BlogRecord]) -> Option<AuthorLikes> {
    max_by_author(blogs, |blog| blog.likes).map(|(author, likes)| AuthorLikes { author, likes })
}

/// Compute every aggregate at once.
pub fn summarize(blogs: &[BlogRecord]) -> BlogStats {
    BlogStats {
        total_likes: total_likes(blogs),
        favorite_blog: favorite_blog(blogs),
        most_blogs: most_blogs(blogs),
        most_likes: most_likes(blogs),
    }
}

/// Group blogs by author, accumulating `weight` per blog, and return the
/// group with the largest total.
///
/// Accumulators stay in first-appearance order and only a strictly
/// greater total replaces the running winner.
fn max_by_author(
    blogs: &[BlogRecord],
    weight: impl Fn(&BlogRecord) -> u64,
) -> Option<(String, u64)> {
    let mut totals: Vec<(&str, u64)> = Vec::new();

    for blog in blogs {
        match totals.iter_mut().find(|(author, _)| *author == blog.author) {
            Some((_, total)) => *total = total.saturating_add(weight(blog)),
            None => totals.push((blog.author.as_str(), weight(blog))),
        }
    }

    totals
        .into_iter()
        .reduce(|most, entry| if entry.1 > most.1 { entry } else { most })
        .map(|(author, total)| (author.to_string(), total))
}
