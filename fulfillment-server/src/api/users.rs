//! Account handlers
//!
//! POST /register creates a user with an argon2 password hash
//! POST /login verifies credentials

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use shared::MessageResponse;
use shared::error::{AppError, ErrorCode};
use shared::request::{LoginRequest, RegisterRequest};

use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::utils::password::hash_password;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ServiceResult<(StatusCode, Json<MessageResponse>)> {
    let username = req.username.trim();
    let email = req.email.trim().to_lowercase();
    if username.is_empty() {
        return Err(AppError::required_field("username").into());
    }
    if email.is_empty() {
        return Err(AppError::required_field("email").into());
    }
    if req.password.is_empty() {
        return Err(AppError::required_field("password").into());
    }

    let hashed = hash_password(&req.password)?;
    match db::users::create(&state.db, username, &email, &hashed).await {
        Ok(id) => {
            tracing::info!(user_id = id, "User registered");
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse::new("User registered successfully")),
            ))
        }
        Err(e) if db::users::is_unique_violation(&e) => {
            Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ServiceResult<Json<MessageResponse>> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::invalid_credentials().into());
    }

    let Some(user) = db::users::authenticate(&state.db, &email, &req.password).await? else {
        tracing::info!("Login rejected");
        return Err(AppError::invalid_credentials().into());
    };

    tracing::info!(user_id = user.id, "Login succeeded");
    Ok(Json(
        MessageResponse::new("Login successful").with_username(user.username),
    ))
}
