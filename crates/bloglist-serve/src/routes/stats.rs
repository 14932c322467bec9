//! Aggregate statistics endpoints.
//!
//! Each endpoint returns the aggregate verbatim; aggregates over an empty
//! blog list come back as `null` (total likes as `0`). Results are cached
//! until the next blog write.

use axum::Json;
use axum::extract::State;
use bloglist_core::list_helper;
use bloglist_core::{AuthorBlogs, AuthorLikes, BlogStats, BlogView};

use crate::cache::get_or_compute;
use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/stats`
///
/// All aggregates in one object.
pub async fn summary(State(state): State<AppState>) -> Result<Json<BlogStats>, ApiError> {
    let result = get_or_compute(&state.cache, "stats:summary", || async {
        Ok(list_helper::summarize(&state.store.list_blogs()?))
    })
    .await?;

    Ok(Json(result))
}

/// `GET /api/stats/total-likes`
pub async fn total_likes(State(state): State<AppState>) -> Result<Json<u64>, ApiError> {
    let result = get_or_compute(&state.cache, "stats:total_likes", || async {
        Ok(list_helper::total_likes(&state.store.list_blogs()?))
    })
    .await?;

    Ok(Json(result))
}

/// `GET /api/stats/favorite-blog`
pub async fn favorite_blog(
    State(state): State<AppState>,
) -> Result<Json<Option<BlogView>>, ApiError> {
    let result = get_or_compute(&state.cache, "stats:favorite_blog", || async {
        Ok(list_helper::favorite_blog(&state.store.list_blogs()?))
    })
    .await?;

    Ok(Json(result))
}

/// `GET /api/stats/most-blogs`
pub async fn most_blogs(
    State(state): State<AppState>,
) -> Result<Json<Option<AuthorBlogs>>, ApiError> {
    let result = get_or_compute(&state.cache, "stats:most_blogs", || async {
        Ok(list_helper::most_blogs(&state.store.list_blogs()?))
    })
    .await?;

    Ok(Json(result))
}

/// `GET /api/stats/most-likes`
pub async fn most_likes(
    State(state): State<AppState>,
) -> Result<Json<Option<AuthorLikes>>, ApiError> {
    let result = get_or_compute(&state.cache, "stats:most_likes", || async {
        Ok(list_helper::most_likes(&state.store.list_blogs()?))
    })
    .await?;

    Ok(Json(result))
}
