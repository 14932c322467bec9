//! Core records, formatting and statistics for the bloglist service.
//!
//! This crate provides:
//! - Blog and user records with bare-or-expanded references between them
//! - Formatting of records into their wire representation
//! - Aggregate statistics over blog lists
//! - Validation helpers that collect every problem before failing
//!
//! Everything here is pure and synchronous; storage, HTTP and auth live in
//! `bloglist-serve`.

mod error;
pub mod format;
mod id;
pub mod list_helper;
pub mod model;
pub mod validate;

pub use error::{Error, Result};
pub use format::{
    BlogView, Expansion, RefView, UserView, format_blog, format_blog_with, format_user,
    format_user_with,
};
pub use id::ObjectId;
pub use list_helper::{
    AuthorBlogs, AuthorLikes, BlogStats, favorite_blog, most_blogs, most_likes, summarize,
    total_likes,
};
pub use model::{BlogRecord, Ref, Referent, UserRecord};
pub use validate::{MIN_PASSWORD_LEN, Problems};
