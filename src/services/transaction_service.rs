//! Domain service for income, expense and transfer records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{Transaction, TransactionFilter};
use crate::domain::{MoneyError, Page, TransactionKind};

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Transaction not found")]
    NotFound,

    /// Referenced category is missing or owned by someone else.
    #[error("Category not found")]
    CategoryNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for TransactionError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for TransactionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<MoneyError> for TransactionError {
    fn from(err: MoneyError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct TransactionInput {
    pub category_id: Uuid,
    /// Signed, non-zero
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub category_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub kind: Option<TransactionKind>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub note: Option<Option<String>>,
}

#[async_trait::async_trait]
pub trait TransactionService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`TransactionError::CategoryNotFound`] if the category is not
    /// the caller's, and [`TransactionError::Validation`] for a zero or
    /// over-precise amount.
    async fn create(
        &self,
        user_id: Uuid,
        input: TransactionInput,
    ) -> Result<Transaction, TransactionError>;

    /// Newest first.
    async fn list(
        &self,
        user_id: Uuid,
        filter: TransactionFilter,
        page: Page,
    ) -> Result<Vec<Transaction>, TransactionError>;

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Transaction, TransactionError>;

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: TransactionUpdate,
    ) -> Result<Transaction, TransactionError>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), TransactionError>;
}
