//! Conversion of records into their wire representation.
//!
//! Blogs and users reference each other, so formatting one may format the
//! other. Only one level of expansion is ever rendered: the nested record
//! is formatted with [`Expansion::Suppressed`], which drops its
//! back-reference field entirely.

use serde::{Deserialize, Serialize};

use crate::model::{BlogRecord, Ref, UserRecord};

/// Whether back-references may be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// Render related records, expanded or as ids.
    Full,
    /// Omit the back-reference field.
    Suppressed,
}

/// Wire form of a reference: a bare id string or a nested object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefView<T> {
    Id(String),
    Expanded(Box<T>),
}

/// External representation of a blog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<RefView<UserView>>,
}

/// External representation of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub name: String,
    pub adult: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blogs: Option<Vec<RefView<BlogView>>>,
}

/// Format a blog, expanding its owner one level deep.
pub fn format_blog(blog: &BlogRecord) -> BlogView {
    format_blog_with(blog, Expansion::Full)
}

/// Format a user, expanding their blogs one level deep.
pub fn format_user(user: &UserRecord) -> UserView {
    format_user_with(user, Expansion::Full)
}

/// Format a blog. With [`Expansion::Suppressed`] the owner is left out.
pub fn format_blog_with(blog: &BlogRecord, expansion: Expansion) -> BlogView {
    let user = match expansion {
        Expansion::Full => blog.owner.as_ref().map(|owner| match owner {
            Ref::Id(id) => RefView::Id(id.to_string()),
            Ref::Expanded(user) => {
                RefView::Expanded(Box::new(format_user_with(user, Expansion::Suppressed)))
            }
        }),
        Expansion::Suppressed => None,
    };

    BlogView {
        id: blog.id.to_string(),
        title: blog.title.clone(),
        author: blog.author.clone(),
        url: blog.url.clone(),
        likes: blog.likes,
        comments: blog.comments.clone(),
        user,
    }
}

/// Format a user. With [`Expansion::Suppressed`] the blogs are left out.
pub fn format_user_with(user: &UserRecord, expansion: Expansion) -> UserView {
    let blogs = match expansion {
        Expansion::Full => user.blogs.as_ref().map(|blogs| {
            blogs
                .iter()
                .map(|blog| match blog {
                    Ref::Id(id) => RefView::Id(id.to_string()),
                    Ref::Expanded(blog) => {
                        RefView::Expanded(Box::new(format_blog_with(blog, Expansion::Suppressed)))
                    }
                })
                .collect()
        }),
        Expansion::Suppressed => None,
    };

    UserView {
        id: user.id.to_string(),
        username: user.username.clone(),
        name: user.name.clone(),
        adult: user.adult,
        blogs,
    }
}
