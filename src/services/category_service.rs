//! Domain service for per-user spending and income categories.

use thiserror::Error;
use uuid::Uuid;

use crate::db::{Category, CategoryChanges};
use crate::domain::{CategoryKind, Page};

#[derive(Debug, Error)]
pub enum CategoryError {
    /// Missing or owned by someone else.
    #[error("Category not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Category is referenced by transactions or budgets")]
    InUse,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CategoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CategoryError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::is_unique_violation(&err) {
            Self::Conflict("Category with this name already exists".to_string())
        } else {
            Self::Internal(format!("{err:#}"))
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
    pub kind: CategoryKind,
}

#[async_trait::async_trait]
pub trait CategoryService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`CategoryError::Conflict`] if the user already has a
    /// category with this name.
    async fn create(&self, user_id: Uuid, input: CategoryInput) -> Result<Category, CategoryError>;

    async fn list(&self, user_id: Uuid, page: Page) -> Result<Vec<Category>, CategoryError>;

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Category, CategoryError>;

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: CategoryChanges,
    ) -> Result<Category, CategoryError>;

    /// # Errors
    ///
    /// Returns [`CategoryError::InUse`] while transactions or budgets still
    /// reference the category.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), CategoryError>;
}
