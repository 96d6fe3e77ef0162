use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use super::types::double_option;
use super::validation::{
    DEFAULT_CATEGORY_COLOR, validate_color, validate_name, validate_optional_text, validate_page,
};
use super::{ApiError, ApiResponse, AppState, CategoryDto, MessageResponse, PageQuery};
use crate::db::CategoryChanges;
use crate::domain::CategoryKind;
use crate::services::{CategoryError, CategoryInput};

impl From<CategoryError> for ApiError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound => Self::not_found("Category"),
            CategoryError::Conflict(msg) => Self::conflict(msg),
            CategoryError::InUse => Self::Conflict {
                kind: "category_in_use",
                message: "Category is used by transactions or budgets".to_string(),
            },
            CategoryError::Database(msg) => Self::DatabaseError(msg),
            CategoryError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub kind: CategoryKind,
}

#[derive(Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub color: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub icon: Option<Option<String>>,
    pub kind: Option<CategoryKind>,
}

/// POST /categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = CategoryInput {
        name: validate_name("Category name", &payload.name, 100)?,
        description: validate_optional_text("Description", payload.description, 500)?,
        color: validate_color(payload.color.as_deref().unwrap_or(DEFAULT_CATEGORY_COLOR))?,
        icon: validate_optional_text("Icon", payload.icon, 50)?,
        kind: payload.kind,
    };

    let category = state.category_service().create(user.id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CategoryDto::from(category))),
    ))
}

/// GET /categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryDto>>>, ApiError> {
    let page = validate_page(query)?;
    let categories = state.category_service().list(user.id, page).await?;

    Ok(Json(ApiResponse::success(
        categories.into_iter().map(CategoryDto::from).collect(),
    )))
}

/// GET /categories/{id}
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<CategoryDto>>, ApiError> {
    let category = state.category_service().get(user.id, id).await?;
    Ok(Json(ApiResponse::success(category.into())))
}

/// PUT /categories/{id}
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<CategoryDto>>, ApiError> {
    let changes = CategoryChanges {
        name: payload
            .name
            .as_deref()
            .map(|name| validate_name("Category name", name, 100))
            .transpose()?,
        description: payload
            .description
            .map(|d| validate_optional_text("Description", d, 500))
            .transpose()?,
        color: payload.color.as_deref().map(validate_color).transpose()?,
        icon: payload
            .icon
            .map(|i| validate_optional_text("Icon", i, 50))
            .transpose()?,
        kind: payload.kind,
    };

    let category = state
        .category_service()
        .update(user.id, id, changes)
        .await?;

    Ok(Json(ApiResponse::success(category.into())))
}

/// DELETE /categories/{id}
/// Refused with 409 while transactions or budgets reference the category.
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.category_service().delete(user.id, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Category deleted",
    ))))
}
