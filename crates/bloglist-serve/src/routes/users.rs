//! User endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use bloglist_core::validate::{is_blank, password_too_short};
use bloglist_core::{ObjectId, Problems, UserView, format_user};
use serde::Deserialize;

use crate::auth::hash_password;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;
use crate::store::NewUser;

const USERNAME_TAKEN: &str = "username must be unique";

/// Request body for registering a user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInput {
    pub username: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub adult: Option<bool>,
}

/// `GET /api/users`
///
/// All users with their blogs expanded.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = state.store.list_users()?;
    Ok(Json(users.iter().map(format_user).collect()))
}

/// `GET /api/users/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    let id: ObjectId = id.parse()?;
    let user = state
        .store
        .get_user(id)?
        .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
    Ok(Json(format_user(&user)))
}

/// `POST /api/users`
///
/// Registers a user. Every problem with the request is reported in one
/// message; a taken username turns the response into a conflict.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UserInput>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    let mut problems = Problems::new();
    match input.username.as_deref() {
        username if is_blank(username) => problems.push("username is required"),
        Some(username) if state.store.username_taken(username)? => {
            problems.push(USERNAME_TAKEN)
        }
        _ => {}
    }
    problems.check(
        password_too_short(input.password.as_deref()),
        format!(
            "password must be at least {} characters long",
            bloglist_core::MIN_PASSWORD_LEN
        ),
    );

    if let Some(message) = problems.message() {
        return Err(if problems.contains(USERNAME_TAKEN) {
            ApiError::Conflict(message)
        } else {
            ApiError::BadRequest(message)
        });
    }

    let password_hash = hash_password(input.password.unwrap_or_default()).await?;
    let user = state.store.insert_user(NewUser {
        username: input.username.unwrap_or_default(),
        name: input.name.unwrap_or_default(),
        password_hash,
        adult: input.adult.unwrap_or(true),
    })?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(format_user(&user))))
}
