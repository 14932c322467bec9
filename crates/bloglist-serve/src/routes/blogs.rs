//! Blog endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use bloglist_core::validate::is_blank;
use bloglist_core::{BlogView, ObjectId, Problems, Ref, format_blog};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::Claims;
use crate::cache;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;
use crate::store::{BlogUpdate, NewBlog};

/// Request body for creating or replacing a blog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    /// Kept untyped so a wrong type is reported with the other problems.
    pub likes: Option<Value>,
}

/// Request body for adding a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub comment: Option<String>,
}

/// Largest like count the store can hold.
const MAX_LIKES: u64 = i64::MAX as u64;

/// Like count from the request, or the problem with it.
fn parse_likes(likes: Option<&Value>) -> Result<Option<u64>, &'static str> {
    match likes {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(likes) if likes > MAX_LIKES => Err("likes is too large"),
            Some(likes) => Ok(Some(likes)),
            None if n.as_f64().is_some_and(|f| f < 0.0) => Err("likes must be non-negative"),
            None => Err("likes must be a whole number"),
        },
        Some(_) => Err("likes must be a number"),
    }
}

/// `GET /api/blogs`
///
/// All blogs with their owners expanded.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<BlogView>>, ApiError> {
    let blogs = state.store.list_blogs()?;
    Ok(Json(blogs.iter().map(format_blog).collect()))
}

/// `GET /api/blogs/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogView>, ApiError> {
    let id: ObjectId = id.parse()?;
    let blog = state
        .store
        .get_blog(id)?
        .ok_or_else(|| ApiError::NotFound(format!("blog {id} not found")))?;
    Ok(Json(format_blog(&blog)))
}

/// `POST /api/blogs`
///
/// Creates a blog owned by the authenticated caller. Likes default to 0.
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(input): JsonBody<BlogInput>,
) -> Result<(StatusCode, Json<BlogView>), ApiError> {
    let likes = parse_likes(input.likes.as_ref());

    let mut problems = Problems::new();
    problems
        .check(is_blank(input.title.as_deref()), "title missing")
        .check(is_blank(input.url.as_deref()), "url missing");
    if let Err(problem) = likes {
        problems.push(problem);
    }
    problems.into_result()?;

    if !state.store.user_exists(claims.id)? {
        return Err(ApiError::Unauthorized("invalid token (unknown user)".to_string()));
    }

    let blog = state.store.insert_blog(NewBlog {
        title: input.title.unwrap_or_default(),
        author: input.author.unwrap_or_default(),
        url: input.url.unwrap_or_default(),
        likes: likes.ok().flatten().unwrap_or(0),
        owner: Some(claims.id),
    })?;
    cache::invalidate(&state.cache);

    tracing::info!(blog_id = %blog.id, user = %claims.username, "blog created");
    Ok((StatusCode::CREATED, Json(format_blog(&blog))))
}

/// `PUT /api/blogs/{id}`
///
/// Replaces title, author, url and likes. All but author are required.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<BlogInput>,
) -> Result<Json<BlogView>, ApiError> {
    let id: ObjectId = id.parse()?;
    let likes = parse_likes(input.likes.as_ref());

    let mut problems = Problems::new();
    problems
        .check(is_blank(input.title.as_deref()), "title missing")
        .check(is_blank(input.url.as_deref()), "url missing")
        .check(matches!(likes, Ok(None)), "likes missing");
    if let Err(problem) = likes {
        problems.push(problem);
    }
    problems.into_result()?;

    let title = input.title.unwrap_or_default();
    let update = BlogUpdate {
        title: title.clone(),
        author: input.author.unwrap_or_default(),
        url: input.url.unwrap_or_default(),
        likes: likes.ok().flatten().unwrap_or(0),
    };

    let blog = state
        .store
        .replace_blog(id, update)?
        .ok_or_else(|| ApiError::NotFound(format!("\"{title}\" was deleted")))?;
    cache::invalidate(&state.cache);

    tracing::info!(blog_id = %blog.id, likes = blog.likes, "blog updated");
    Ok(Json(format_blog(&blog)))
}

/// `POST /api/blogs/{id}/comments`
///
/// Appends a comment and returns the blog's full comment list.
pub async fn comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<CommentInput>,
) -> Result<(StatusCode, Json<Vec<String>>), ApiError> {
    let id: ObjectId = id.parse()?;

    let mut problems = Problems::new();
    problems.check(is_blank(input.comment.as_deref()), "comment missing");
    problems.into_result()?;

    let comments = state
        .store
        .add_comment(id, input.comment.as_deref().unwrap_or_default())?
        .ok_or_else(|| ApiError::NotFound("that blog was removed".to_string()))?;
    cache::invalidate(&state.cache);

    tracing::info!(blog_id = %id, comments = comments.len(), "comment added");
    Ok((StatusCode::CREATED, Json(comments)))
}

/// `DELETE /api/blogs/{id}`
///
/// Only the owner may delete a blog; blogs without an owner may be deleted
/// by any authenticated caller.
pub async fn remove(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: ObjectId = id.parse()?;

    let blog = state
        .store
        .get_blog(id)?
        .ok_or_else(|| ApiError::NotFound(format!("blog {id} not found")))?;

    if blog.owner.as_ref().map(Ref::id).is_some_and(|owner| owner != claims.id) {
        tracing::debug!(blog_id = %id, user = %claims.username, "delete refused, not the owner");
        return Err(ApiError::Unauthorized("invalid token (unauthorized user)".to_string()));
    }

    if !state.store.delete_blog(id)? {
        return Err(ApiError::NotFound(format!("blog {id} not found")));
    }
    cache::invalidate(&state.cache);

    tracing::info!(blog_id = %id, user = %claims.username, "blog deleted");
    Ok(StatusCode::NO_CONTENT)
}
