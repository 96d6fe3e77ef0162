use anyhow::Context;
use async_trait::async_trait;
use tokio::task;
use tracing::info;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::db::repositories::user::hash_password;
use crate::db::{Store, User, UserChanges};
use crate::services::user_service::{ProfileUpdate, UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn get_profile(&self, user_id: Uuid) -> Result<User, UserError> {
        self.store
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<User, UserError> {
        let users = self.store.users();

        if let Some(email) = &update.email
            && users.email_taken(email, Some(user_id)).await?
        {
            return Err(UserError::DuplicateEmail);
        }

        let password_hash = match update.password {
            Some(password) => {
                let config = self.security.clone();
                let hash = task::spawn_blocking(move || hash_password(&password, &config))
                    .await
                    .context("Password hashing task panicked")??;
                Some(hash)
            }
            None => None,
        };
        let password_changed = password_hash.is_some();

        let user = users
            .update(
                user_id,
                UserChanges {
                    email: update.email,
                    full_name: update.full_name,
                    password_hash,
                },
            )
            .await?
            .ok_or(UserError::NotFound)?;

        if password_changed {
            let revoked = self.store.refresh_tokens().revoke_all(user_id).await?;
            info!(user_id = %user_id, revoked, "Password changed, refresh tokens revoked");
        }

        Ok(user)
    }

    async fn delete_account(&self, user_id: Uuid) -> Result<(), UserError> {
        if !self.store.users().delete_cascade(user_id).await? {
            return Err(UserError::NotFound);
        }

        info!(user_id = %user_id, "Account deleted");
        Ok(())
    }

    async fn deactivate(&self, user_id: Uuid) -> Result<(), UserError> {
        if !self.store.users().set_active(user_id, false).await? {
            return Err(UserError::NotFound);
        }
        self.store.refresh_tokens().revoke_all(user_id).await?;

        info!(user_id = %user_id, "Account deactivated");
        Ok(())
    }
}
