use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::extract::{ApiJson, AuthUser};
use super::validation::{validate_email, validate_optional_text, validate_password};
use super::{ApiError, ApiResponse, AppState, MessageResponse, UserDto};
use crate::services::{AuthError, TokenPair};

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::invalid_credentials(),
            AuthError::TokenInvalid => Self::token_invalid(),
            AuthError::DuplicateEmail => Self::Conflict {
                kind: "duplicate_email",
                message: "Email already registered".to_string(),
            },
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <access_token>`.
///
/// The token is checked statelessly, then the user is loaded so deleted or
/// deactivated accounts are refused even while their token is unexpired.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let user = state.auth_service().authorize(token).await?;

    tracing::Span::current().record("user_id", tracing::field::display(user.id));
    request.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
    });

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    let full_name = validate_optional_text("Full name", payload.full_name, 100)?;

    let user = state
        .auth_service()
        .register(&email, &payload.password, full_name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(user))),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }
    let email = payload.email.trim().to_lowercase();

    let pair = state
        .auth_service()
        .authenticate(&email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(pair)))
}

/// POST /auth/refresh
/// Single use: the presented refresh token is revoked.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let pair = state
        .auth_service()
        .refresh(payload.refresh_token.trim())
        .await?;

    Ok(Json(ApiResponse::success(pair)))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service()
        .revoke(user.id, payload.refresh_token.trim())
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Logged out",
    ))))
}

/// POST /auth/logout-all
pub async fn logout_all(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let revoked = state.auth_service().revoke_all(user.id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Revoked {revoked} session(s)"
    )))))
}
