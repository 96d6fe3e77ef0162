use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use super::types::double_option;
use super::validation::{validate_name, validate_page};
use super::{ApiError, ApiResponse, AppState, BudgetDto, MessageResponse, PageQuery};
use crate::db::BudgetFilter;
use crate::domain::{BudgetPeriod, Page};
use crate::services::{BudgetError, BudgetInput, BudgetProgress, BudgetUpdate};

impl From<BudgetError> for ApiError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::NotFound => Self::not_found("Budget"),
            BudgetError::CategoryNotFound => Self::not_found("Category"),
            BudgetError::Conflict(msg) => Self::conflict(msg),
            BudgetError::Validation(msg) => Self::validation(msg),
            BudgetError::Database(msg) => Self::DatabaseError(msg),
            BudgetError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Deserialize)]
pub struct CreateBudgetRequest {
    pub category_id: Uuid,
    pub name: String,
    pub limit: Decimal,
    #[serde(default = "default_period")]
    pub period: BudgetPeriod,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

const fn default_period() -> BudgetPeriod {
    BudgetPeriod::Monthly
}

#[derive(Deserialize)]
pub struct UpdateBudgetRequest {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub limit: Option<Decimal>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Deserialize)]
pub struct BudgetListQuery {
    pub category_id: Option<Uuid>,
    pub period: Option<BudgetPeriod>,
    /// Only budgets whose range contains the current time
    #[serde(default)]
    pub active_only: bool,
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    Page::DEFAULT_LIMIT
}

#[derive(Deserialize)]
pub struct ProgressQuery {
    pub at: Option<DateTime<Utc>>,
}

/// POST /budgets
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateBudgetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = BudgetInput {
        category_id: payload.category_id,
        name: validate_name("Budget name", &payload.name, 100)?,
        limit: payload.limit,
        period: payload.period,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };

    let budget = state.budget_service().create(user.id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(BudgetDto::from(budget))),
    ))
}

/// GET /budgets
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<BudgetListQuery>,
) -> Result<Json<ApiResponse<Vec<BudgetDto>>>, ApiError> {
    let page = validate_page(PageQuery {
        skip: query.skip,
        limit: query.limit,
    })?;
    let filter = BudgetFilter {
        category_id: query.category_id,
        period: query.period,
        active_at: query.active_only.then(Utc::now),
    };

    let budgets = state.budget_service().list(user.id, filter, page).await?;

    Ok(Json(ApiResponse::success(
        budgets.into_iter().map(BudgetDto::from).collect(),
    )))
}

/// GET /budgets/{id}
pub async fn get_budget(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<BudgetDto>>, ApiError> {
    let budget = state.budget_service().get(user.id, id).await?;
    Ok(Json(ApiResponse::success(budget.into())))
}

/// PUT /budgets/{id}
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateBudgetRequest>,
) -> Result<Json<ApiResponse<BudgetDto>>, ApiError> {
    let update = BudgetUpdate {
        category_id: payload.category_id,
        name: payload
            .name
            .as_deref()
            .map(|name| validate_name("Budget name", name, 100))
            .transpose()?,
        limit: payload.limit,
        period: payload.period,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };

    let budget = state.budget_service().update(user.id, id, update).await?;

    Ok(Json(ApiResponse::success(budget.into())))
}

/// DELETE /budgets/{id}
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.budget_service().delete(user.id, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Budget deleted",
    ))))
}

/// GET /budgets/{id}/progress
///
/// Spending in the period window containing `?at=` (default: now).
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ProgressQuery>,
) -> Result<Json<ApiResponse<BudgetProgress>>, ApiError> {
    let progress = state
        .budget_service()
        .progress(user.id, id, query.at)
        .await?;
    Ok(Json(ApiResponse::success(progress)))
}
