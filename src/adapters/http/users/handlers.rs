//! HTTP handlers for account endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::user::{LoginCommand, RegisterUserCommand, UpdateUserCommand};
use crate::domain::foundation::UserId;

use super::super::error::ApiError;
use super::super::middleware::Session;
use super::super::state::AppState;
use super::dto::{RegisterUserRequest, TokenRequest, TokenResponse, UpdateUserRequest, UserResponse};

/// POST /api/users - Register a new account
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .register_user_handler()
        .handle(RegisterUserCommand {
            username: request.username,
            email: request.email,
            phone_number: request.phone_number,
            password: request.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// PATCH /api/users/:user_id - Edit an account (the account itself or a superuser)
pub async fn update_user(
    State(state): State<AppState>,
    Session(session): Session,
    Path(user_id): Path<UserId>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = state.principal(Some(&session)).await?;

    let user = state
        .update_user_handler()
        .handle(UpdateUserCommand {
            principal,
            user_id,
            changes: request.changes(),
            new_password: request.password,
        })
        .await?;

    Ok(Json(UserResponse::from(&user)))
}

/// POST /api/token - Log in with phone number and password
pub async fn issue_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state
        .login_handler()
        .handle(LoginCommand {
            phone_number: request.phone_number,
            password: request.password,
        })
        .await?;

    Ok(Json(TokenResponse::from(token)))
}
