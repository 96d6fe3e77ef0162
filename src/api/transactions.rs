use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use super::types::double_option;
use super::validation::{validate_optional_text, validate_page};
use super::{ApiError, ApiResponse, AppState, MessageResponse, PageQuery, TransactionDto};
use crate::db::TransactionFilter;
use crate::domain::{Page, TransactionKind};
use crate::services::{TransactionError, TransactionInput, TransactionUpdate};

const MAX_NOTE_LEN: usize = 500;

impl From<TransactionError> for ApiError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::NotFound => Self::not_found("Transaction"),
            TransactionError::CategoryNotFound => Self::not_found("Category"),
            TransactionError::Validation(msg) => Self::validation(msg),
            TransactionError::Database(msg) => Self::DatabaseError(msg),
            TransactionError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Deserialize)]
pub struct CreateTransactionRequest {
    pub category_id: Uuid,
    pub amount: Decimal,
    pub kind: TransactionKind,
    /// Defaults to the time of the request
    pub occurred_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTransactionRequest {
    pub category_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub kind: Option<TransactionKind>,
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub note: Option<Option<String>>,
}

#[derive(Deserialize)]
pub struct TransactionListQuery {
    pub category_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    Page::DEFAULT_LIMIT
}

/// POST /transactions
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = TransactionInput {
        category_id: payload.category_id,
        amount: payload.amount,
        kind: payload.kind,
        occurred_at: payload.occurred_at.unwrap_or_else(Utc::now),
        note: validate_optional_text("Note", payload.note, MAX_NOTE_LEN)?,
    };

    let tx = state.transaction_service().create(user.id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(TransactionDto::from(tx))),
    ))
}

/// GET /transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<TransactionListQuery>,
) -> Result<Json<ApiResponse<Vec<TransactionDto>>>, ApiError> {
    if let (Some(from), Some(to)) = (query.from, query.to)
        && from > to
    {
        return Err(ApiError::validation("'from' must not be after 'to'"));
    }

    let page = validate_page(PageQuery {
        skip: query.skip,
        limit: query.limit,
    })?;
    let filter = TransactionFilter {
        category_id: query.category_id,
        kind: query.kind,
        from: query.from,
        to: query.to,
    };

    let transactions = state
        .transaction_service()
        .list(user.id, filter, page)
        .await?;

    Ok(Json(ApiResponse::success(
        transactions.into_iter().map(TransactionDto::from).collect(),
    )))
}

/// GET /transactions/{id}
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<TransactionDto>>, ApiError> {
    let tx = state.transaction_service().get(user.id, id).await?;
    Ok(Json(ApiResponse::success(tx.into())))
}

/// PUT /transactions/{id}
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateTransactionRequest>,
) -> Result<Json<ApiResponse<TransactionDto>>, ApiError> {
    let update = TransactionUpdate {
        category_id: payload.category_id,
        amount: payload.amount,
        kind: payload.kind,
        occurred_at: payload.occurred_at,
        note: payload
            .note
            .map(|note| validate_optional_text("Note", note, MAX_NOTE_LEN))
            .transpose()?,
    };

    let tx = state
        .transaction_service()
        .update(user.id, id, update)
        .await?;

    Ok(Json(ApiResponse::success(tx.into())))
}

/// DELETE /transactions/{id}
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.transaction_service().delete(user.id, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Transaction deleted",
    ))))
}
