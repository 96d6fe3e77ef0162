use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::{BudgetWindow, Page, TransactionKind, cents_to_decimal};
use crate::entities::{prelude::*, transactions};

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<transactions::Model> for Transaction {
    type Error = anyhow::Error;

    fn try_from(model: transactions::Model) -> Result<Self> {
        Ok(Self {
            kind: model.kind.parse()?,
            amount: cents_to_decimal(model.amount_cents),
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            occurred_at: model.occurred_at,
            note: model.note,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

pub struct NewTransaction {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount_cents: i64,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
}

#[derive(Default)]
pub struct TransactionChanges {
    pub category_id: Option<Uuid>,
    pub amount_cents: Option<i64>,
    pub kind: Option<TransactionKind>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub note: Option<Option<String>>,
}

/// List filters; every field is optional and they combine with AND.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub category_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub struct TransactionRepository {
    conn: DatabaseConnection,
}

impl TransactionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new: NewTransaction) -> Result<Transaction> {
        let now = Utc::now();
        let model = transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            category_id: Set(new.category_id),
            amount_cents: Set(new.amount_cents),
            kind: Set(new.kind.as_str().to_string()),
            occurred_at: Set(new.occurred_at),
            note: Set(new.note),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert transaction")?;

        Transaction::try_from(model)
    }

    /// Newest first.
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
        page: Page,
    ) -> Result<Vec<Transaction>> {
        let mut query = Transactions::find().filter(transactions::Column::UserId.eq(user_id));

        if let Some(category_id) = filter.category_id {
            query = query.filter(transactions::Column::CategoryId.eq(category_id));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::OccurredAt.lte(to));
        }

        let rows = query
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::CreatedAt)
            .offset(page.skip)
            .limit(page.limit)
            .all(&self.conn)
            .await
            .context("Failed to list transactions")?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Transaction>> {
        let row = self.find_owned(user_id, id).await?;
        row.map(Transaction::try_from).transpose()
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: TransactionChanges,
    ) -> Result<Option<Transaction>> {
        let Some(row) = self.find_owned(user_id, id).await? else {
            return Ok(None);
        };

        let mut active: transactions::ActiveModel = row.into();
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(amount_cents) = changes.amount_cents {
            active.amount_cents = Set(amount_cents);
        }
        if let Some(kind) = changes.kind {
            active.kind = Set(kind.as_str().to_string());
        }
        if let Some(occurred_at) = changes.occurred_at {
            active.occurred_at = Set(occurred_at);
        }
        if let Some(note) = changes.note {
            active.note = Set(note);
        }
        active.updated_at = Set(Utc::now());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update transaction")?;

        Transaction::try_from(model).map(Some)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = Transactions::delete_many()
            .filter(transactions::Column::Id.eq(id))
            .filter(transactions::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete transaction")?;

        Ok(result.rows_affected > 0)
    }

    /// Sum of absolute expense amounts (cents) for one category inside
    /// `window`. Expenses may be recorded with either sign.
    pub async fn expense_total_cents(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        window: &BudgetWindow,
    ) -> Result<i64> {
        let amounts: Vec<i64> = Transactions::find()
            .select_only()
            .column(transactions::Column::AmountCents)
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::CategoryId.eq(category_id))
            .filter(transactions::Column::Kind.eq(TransactionKind::Expense.as_str()))
            .filter(transactions::Column::OccurredAt.gte(window.start))
            .filter(transactions::Column::OccurredAt.lt(window.end))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to sum expenses")?;

        amounts
            .into_iter()
            .try_fold(0_i64, |acc, cents| acc.checked_add(cents.abs()))
            .ok_or_else(|| anyhow::anyhow!("Expense total overflowed"))
    }

    async fn find_owned(&self, user_id: Uuid, id: Uuid) -> Result<Option<transactions::Model>> {
        Transactions::find_by_id(id)
            .filter(transactions::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query transaction")
    }
}
