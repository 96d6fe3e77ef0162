//! Domain service for the caller's own account.

use thiserror::Error;
use uuid::Uuid;

use crate::db::User;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::is_unique_violation(&err) {
            Self::DuplicateEmail
        } else {
            Self::Internal(format!("{err:#}"))
        }
    }
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub full_name: Option<Option<String>>,
    pub password: Option<String>,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<User, UserError>;

    /// Applies a profile update. A password change revokes every refresh
    /// token of the user.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::DuplicateEmail`] if the new email is taken.
    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<User, UserError>;

    /// Hard delete of the account and everything it owns.
    async fn delete_account(&self, user_id: Uuid) -> Result<(), UserError>;

    /// Disables login and revokes all refresh tokens; data is kept.
    async fn deactivate(&self, user_id: Uuid) -> Result<(), UserError>;
}
