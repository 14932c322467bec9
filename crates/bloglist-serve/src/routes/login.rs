//! Login endpoint.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::verify_password;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

/// Request body for logging in.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub id: String,
    pub username: String,
    pub name: String,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("invalid username or password".to_string())
}

/// `POST /api/login`
///
/// Exchanges a username and password for an access token.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginInput>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (Some(username), Some(password)) = (input.username, input.password) else {
        return Err(invalid_credentials());
    };

    let Some(credentials) = state.store.find_credentials(&username)? else {
        tracing::debug!(username = %username, "login for unknown user");
        return Err(invalid_credentials());
    };

    if !verify_password(password, credentials.password_hash).await? {
        tracing::debug!(username = %username, "login with wrong password");
        return Err(invalid_credentials());
    }

    let user = credentials.user;
    let token = state.tokens.issue(user.id, &user.username)?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        id: user.id.to_string(),
        username: user.username,
        name: user.name,
    }))
}
