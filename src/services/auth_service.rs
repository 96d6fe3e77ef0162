//! Domain service for registration, login and the token lifecycle.
//!
//! Access tokens are stateless; refresh tokens are persisted and rotated on
//! every use, so each one can be exchanged at most once.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, wrong password or inactive account. Deliberately the
    /// same error for all three.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Refresh or access token is unknown, expired, revoked or malformed.
    #[error("Token invalid")]
    TokenInvalid,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::is_unique_violation(&err) {
            Self::DuplicateEmail
        } else {
            Self::Internal(format!("{err:#}"))
        }
    }
}

/// Credentials handed to the client after login or refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account. `email` is expected normalised (trimmed,
    /// lower-case) and the password already checked for strength.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateEmail`] if the email is taken.
    async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<String>,
    ) -> Result<User, AuthError>;

    /// Verifies credentials and issues a fresh token pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn authenticate(&self, email: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Exchanges a refresh token for a new pair, revoking the old token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenInvalid`] if the token cannot be used.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Revokes one of the user's refresh tokens. Unknown tokens succeed.
    async fn revoke(&self, user_id: Uuid, refresh_token: &str) -> Result<(), AuthError>;

    /// Revokes every refresh token of the user and returns how many were live.
    async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AuthError>;

    /// Resolves a bearer access token to an active user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenInvalid`] for bad tokens and for missing or
    /// inactive users.
    async fn authorize(&self, access_token: &str) -> Result<User, AuthError>;
}
