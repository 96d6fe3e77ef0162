//! `SeaORM` implementation of the `AuthService` trait.

use anyhow::Context;
use async_trait::async_trait;
use tokio::task;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::db::repositories::user::{hash_password, verify_password};
use crate::db::{NewUser, Store, User};
use crate::services::auth_service::{AuthError, AuthService, TokenPair};
use crate::services::tokens::{TokenIssuer, hash_refresh_token};

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenIssuer,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenIssuer, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    /// Issues an access token and persists a new refresh token.
    async fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let access_token = self
            .tokens
            .issue_access_token(user_id)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let refresh = self.tokens.generate_refresh_token();

        self.store
            .refresh_tokens()
            .insert(user_id, refresh.hash, refresh.expires_at)
            .await?;

        Ok(self.pair(access_token, refresh.token))
    }

    fn pair(&self, access_token: String, refresh_token: String) -> TokenPair {
        TokenPair {
            access_token,
            refresh_token,
            token_type: "bearer",
            expires_in: self.tokens.access_ttl_seconds(),
        }
    }
}

fn record_auth_event(event: &'static str, outcome: &'static str) {
    metrics::counter!("auth_events_total", "event" => event, "outcome" => outcome).increment(1);
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<String>,
    ) -> Result<User, AuthError> {
        let users = self.store.users();
        if users.email_taken(email, None).await? {
            record_auth_event("register", "duplicate");
            return Err(AuthError::DuplicateEmail);
        }

        let password = password.to_string();
        let config = self.security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        let user = users
            .create(NewUser {
                email: email.to_string(),
                full_name,
                password_hash,
            })
            .await?;

        record_auth_event("register", "success");
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let Some((user, password_hash)) =
            self.store.users().get_by_email_with_password(email).await?
        else {
            record_auth_event("login", "failure");
            return Err(AuthError::InvalidCredentials);
        };

        // Run CPU-intensive password verification in a blocking task
        let password = password.to_string();
        let is_valid = task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .context("Password verification task panicked")??;

        if !is_valid || !user.is_active {
            record_auth_event("login", "failure");
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.issue_pair(user.id).await?;
        record_auth_event("login", "success");
        info!(user_id = %user.id, "User logged in");
        Ok(pair)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let replacement = self.tokens.generate_refresh_token();

        let Some(user_id) = self
            .store
            .refresh_tokens()
            .rotate(
                &hash_refresh_token(refresh_token),
                replacement.hash,
                replacement.expires_at,
            )
            .await?
        else {
            record_auth_event("refresh", "failure");
            warn!("Rejected refresh token");
            return Err(AuthError::TokenInvalid);
        };

        let access_token = self
            .tokens
            .issue_access_token(user_id)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        record_auth_event("refresh", "success");
        Ok(self.pair(access_token, replacement.token))
    }

    async fn revoke(&self, user_id: Uuid, refresh_token: &str) -> Result<(), AuthError> {
        self.store
            .refresh_tokens()
            .revoke(user_id, &hash_refresh_token(refresh_token))
            .await?;

        record_auth_event("logout", "success");
        Ok(())
    }

    async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let revoked = self.store.refresh_tokens().revoke_all(user_id).await?;

        record_auth_event("logout_all", "success");
        info!(user_id = %user_id, revoked, "Revoked all refresh tokens");
        Ok(revoked)
    }

    async fn authorize(&self, access_token: &str) -> Result<User, AuthError> {
        let claims = self
            .tokens
            .verify_access_token(access_token)
            .map_err(|_| AuthError::TokenInvalid)?;
        let user_id = claims.user_id().map_err(|_| AuthError::TokenInvalid)?;

        match self.store.users().get_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AuthError::TokenInvalid),
        }
    }
}
