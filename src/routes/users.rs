//! User route handlers

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::db;
use crate::error::Result;
use crate::users::{register_user, RegistrationRequest, User};
use crate::AppState;

/// POST /users/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = register_user(request, Utc::now()).await?;
    db::create_user(&state.db, &user).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}
