use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::extract::{ApiJson, AuthUser};
use super::types::double_option;
use super::validation::{validate_email, validate_optional_text, validate_password};
use super::{ApiError, ApiResponse, AppState, MessageResponse, UserDto};
use crate::services::{ProfileUpdate, UserError};

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => Self::not_found("User"),
            UserError::DuplicateEmail => Self::Conflict {
                kind: "duplicate_email",
                message: "Email already registered".to_string(),
            },
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub full_name: Option<Option<String>>,
    pub password: Option<String>,
}

/// GET /users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let profile = state.user_service().get_profile(user.id).await?;
    Ok(Json(ApiResponse::success(profile.into())))
}

/// PUT /users/me
/// Changing the password signs the user out everywhere.
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let email = payload.email.as_deref().map(validate_email).transpose()?;
    if let Some(password) = &payload.password {
        validate_password(password)?;
    }
    let full_name = match payload.full_name {
        Some(name) => Some(validate_optional_text("Full name", name, 100)?),
        None => None,
    };

    let profile = state
        .user_service()
        .update_profile(
            user.id,
            ProfileUpdate {
                email,
                full_name,
                password: payload.password,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(profile.into())))
}

/// DELETE /users/me
/// Permanently removes the account with all its data.
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.user_service().delete_account(user.id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Account deleted",
    ))))
}

/// POST /users/me/deactivate
pub async fn deactivate_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.user_service().deactivate(user.id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Account deactivated",
    ))))
}
