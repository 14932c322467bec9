//! API route definitions.

mod blogs;
mod health;
mod login;
mod stats;
mod users;

use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post};

use crate::auth::require_auth;
use crate::state::AppState;

/// Build the complete API router.
///
/// # Route Structure
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /api/blogs` - All blogs
/// - `GET /api/blogs/{id}` - One blog
/// - `PUT /api/blogs/{id}` - Replace a blog's content
/// - `POST /api/blogs/{id}/comments` - Append a comment
/// - `GET /api/users` - All users
/// - `GET /api/users/{id}` - One user
/// - `POST /api/users` - Register
/// - `POST /api/login` - Exchange credentials for a token
/// - `GET /api/stats` - All aggregates
/// - `GET /api/stats/total-likes`, `/favorite-blog`, `/most-blogs`, `/most-likes`
///
/// ## Protected (Bearer token)
/// - `GET /api/ping` - Token check
/// - `POST /api/blogs` - Create a blog owned by the caller
/// - `DELETE /api/blogs/{id}` - Delete one of the caller's blogs
pub fn router(state: AppState) -> Router {
    let auth = middleware::from_fn_with_state(state.clone(), require_auth);

    let public = Router::new().route("/health", get(health::health_check));

    let api = Router::new()
        .route(
            "/ping",
            get(health::authenticated_ping).route_layer(auth.clone()),
        )
        // Blogs
        .route(
            "/blogs",
            get(blogs::list).merge(post(blogs::create).route_layer(auth.clone())),
        )
        .route(
            "/blogs/{id}",
            get(blogs::get)
                .put(blogs::update)
                .merge(delete(blogs::remove).route_layer(auth)),
        )
        .route("/blogs/{id}/comments", post(blogs::comment))
        // Users
        .route("/users", get(users::list).post(users::create))
        .route("/users/{id}", get(users::get))
        .route("/login", post(login::login))
        // Aggregates
        .route("/stats", get(stats::summary))
        .route("/stats/total-likes", get(stats::total_likes))
        .route("/stats/favorite-blog", get(stats::favorite_blog))
        .route("/stats/most-blogs", get(stats::most_blogs))
        .route("/stats/most-likes", get(stats::most_likes));

    Router::new()
        .merge(public)
        .nest("/api", api)
        .with_state(state)
}
