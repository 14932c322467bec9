//! Bloglist Serve - HTTP API for a shared blog list
//!
//! This crate provides a REST API where registered users share links to blog
//! posts, like and comment on them, and query aggregate statistics over the
//! whole collection. Data lives in a local SQLite database.
//!
//! # Authentication
//!
//! Users log in with a username and password and receive a signed token.
//! Creating and deleting blogs requires that token as a Bearer credential;
//! everything else is public.
//!
//! # Architecture
//!
//! - **AppState**: Shared application state (store, token keys, configuration)
//! - **Auth**: Token issuing, Bearer middleware and password hashing
//! - **Store**: SQLite persistence for users and blogs
//! - **Routes**: Endpoint handlers grouped by resource

mod auth;
pub mod cache;
mod error;
mod extract;
mod routes;
mod state;
pub mod store;

pub use self::auth::{Claims, TokenKeys, require_auth};
pub use self::cache::{ResponseCache, get_or_compute, new_cache};
pub use self::error::ApiError;
pub use self::routes::router;
pub use self::state::{AppState, Config};
pub use self::store::{Store, StoreError};
