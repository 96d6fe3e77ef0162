use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::entities::{prelude::*, refresh_tokens, users};

/// Persisted refresh tokens. Only SHA-256 digests ever reach this layer.
pub struct RefreshTokenRepository {
    conn: DatabaseConnection,
}

impl RefreshTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(
        &self,
        user_id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        refresh_tokens::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token_hash: Set(token_hash),
            expires_at: Set(expires_at),
            revoked: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert refresh token")?;

        Ok(())
    }

    /// Swaps a live token for a new one.
    ///
    /// Returns the owner on success and `None` when the presented token is
    /// unknown, revoked, expired, owned by an inactive user, or was consumed
    /// by a concurrent rotation. Nothing is written unless the swap succeeds.
    pub async fn rotate(
        &self,
        presented_hash: &str,
        replacement_hash: String,
        replacement_expires_at: DateTime<Utc>,
    ) -> Result<Option<Uuid>> {
        let now = Utc::now();
        let txn = self.conn.begin().await?;

        let Some(token) = RefreshTokens::find()
            .filter(refresh_tokens::Column::TokenHash.eq(presented_hash))
            .filter(refresh_tokens::Column::Revoked.eq(false))
            .filter(refresh_tokens::Column::ExpiresAt.gt(now))
            .one(&txn)
            .await
            .context("Failed to query refresh token")?
        else {
            return Ok(None);
        };

        let owner_active = Users::find_by_id(token.user_id)
            .filter(users::Column::IsActive.eq(true))
            .count(&txn)
            .await
            .context("Failed to query refresh token owner")?
            > 0;
        if !owner_active {
            return Ok(None);
        }

        // Conditional update: a concurrent rotation of the same token sees
        // zero affected rows here and loses.
        let revoked = RefreshTokens::update_many()
            .col_expr(refresh_tokens::Column::Revoked, Expr::value(true))
            .filter(refresh_tokens::Column::Id.eq(token.id))
            .filter(refresh_tokens::Column::Revoked.eq(false))
            .exec(&txn)
            .await
            .context("Failed to revoke refresh token")?;
        if revoked.rows_affected == 0 {
            return Ok(None);
        }

        refresh_tokens::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(token.user_id),
            token_hash: Set(replacement_hash),
            expires_at: Set(replacement_expires_at),
            revoked: Set(false),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .context("Failed to insert replacement refresh token")?;

        txn.commit().await?;
        Ok(Some(token.user_id))
    }

    /// Revokes one of the user's tokens. Unknown or already revoked tokens
    /// affect zero rows.
    pub async fn revoke(&self, user_id: Uuid, token_hash: &str) -> Result<u64> {
        let result = RefreshTokens::update_many()
            .col_expr(refresh_tokens::Column::Revoked, Expr::value(true))
            .filter(refresh_tokens::Column::UserId.eq(user_id))
            .filter(refresh_tokens::Column::TokenHash.eq(token_hash))
            .filter(refresh_tokens::Column::Revoked.eq(false))
            .exec(&self.conn)
            .await
            .context("Failed to revoke refresh token")?;

        Ok(result.rows_affected)
    }

    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64> {
        let result = RefreshTokens::update_many()
            .col_expr(refresh_tokens::Column::Revoked, Expr::value(true))
            .filter(refresh_tokens::Column::UserId.eq(user_id))
            .filter(refresh_tokens::Column::Revoked.eq(false))
            .exec(&self.conn)
            .await
            .context("Failed to revoke refresh tokens")?;

        Ok(result.rows_affected)
    }

    pub async fn count_active(&self, user_id: Uuid) -> Result<u64> {
        RefreshTokens::find()
            .filter(refresh_tokens::Column::UserId.eq(user_id))
            .filter(refresh_tokens::Column::Revoked.eq(false))
            .filter(refresh_tokens::Column::ExpiresAt.gt(Utc::now()))
            .count(&self.conn)
            .await
            .context("Failed to count refresh tokens")
    }
}
