//! Domain service for budgets and their spending progress.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{Budget, BudgetFilter};
use crate::domain::{BudgetPeriod, MoneyError, Page};

#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("Budget not found")]
    NotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for BudgetError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for BudgetError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<MoneyError> for BudgetError {
    fn from(err: MoneyError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct BudgetInput {
    pub category_id: Uuid,
    pub name: String,
    pub limit: Decimal,
    pub period: BudgetPeriod,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct BudgetUpdate {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub limit: Option<Decimal>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<DateTime<Utc>>,
    /// `Some(None)` makes the budget open-ended
    pub end_date: Option<Option<DateTime<Utc>>>,
}

/// Spending measured against a budget for one period window.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetProgress {
    pub budget_id: Uuid,
    pub budget_name: String,
    pub category_id: Uuid,
    pub period: BudgetPeriod,
    pub limit: Decimal,
    pub spent: Decimal,
    /// Negative when over budget
    pub remaining: Decimal,
    /// `None` for a zero limit
    pub percent_used: Option<Decimal>,
    pub is_over_budget: bool,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait BudgetService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`BudgetError::Conflict`] when another budget for the same
    /// category overlaps the requested date range.
    async fn create(&self, user_id: Uuid, input: BudgetInput) -> Result<Budget, BudgetError>;

    async fn list(
        &self,
        user_id: Uuid,
        filter: BudgetFilter,
        page: Page,
    ) -> Result<Vec<Budget>, BudgetError>;

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Budget, BudgetError>;

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: BudgetUpdate,
    ) -> Result<Budget, BudgetError>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), BudgetError>;

    /// Progress for the period window containing `at` (default: now).
    async fn progress(
        &self,
        user_id: Uuid,
        id: Uuid,
        at: Option<DateTime<Utc>>,
    ) -> Result<BudgetProgress, BudgetError>;
}
