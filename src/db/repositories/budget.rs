use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::{BudgetPeriod, Page, cents_to_decimal};
use crate::entities::{budgets, prelude::*};

#[derive(Debug, Clone)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub limit: Decimal,
    pub period: BudgetPeriod,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<budgets::Model> for Budget {
    type Error = anyhow::Error;

    fn try_from(model: budgets::Model) -> Result<Self> {
        Ok(Self {
            period: model.period.parse()?,
            limit: cents_to_decimal(model.limit_cents),
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            name: model.name,
            start_date: model.start_date,
            end_date: model.end_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

pub struct NewBudget {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub limit_cents: i64,
    pub period: BudgetPeriod,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct BudgetChanges {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub limit_cents: Option<i64>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default)]
pub struct BudgetFilter {
    pub category_id: Option<Uuid>,
    pub period: Option<BudgetPeriod>,
    /// Only budgets whose `[start, end)` range contains this instant.
    pub active_at: Option<DateTime<Utc>>,
}

pub struct BudgetRepository {
    conn: DatabaseConnection,
}

impl BudgetRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new: NewBudget) -> Result<Budget> {
        let now = Utc::now();
        let model = budgets::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            category_id: Set(new.category_id),
            name: Set(new.name),
            limit_cents: Set(new.limit_cents),
            period: Set(new.period.as_str().to_string()),
            start_date: Set(new.start_date),
            end_date: Set(new.end_date),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert budget")?;

        Budget::try_from(model)
    }

    pub async fn list(&self, user_id: Uuid, filter: &BudgetFilter, page: Page) -> Result<Vec<Budget>> {
        let mut query = Budgets::find().filter(budgets::Column::UserId.eq(user_id));

        if let Some(category_id) = filter.category_id {
            query = query.filter(budgets::Column::CategoryId.eq(category_id));
        }
        if let Some(period) = filter.period {
            query = query.filter(budgets::Column::Period.eq(period.as_str()));
        }
        if let Some(at) = filter.active_at {
            query = query.filter(budgets::Column::StartDate.lte(at)).filter(
                Condition::any()
                    .add(budgets::Column::EndDate.is_null())
                    .add(budgets::Column::EndDate.gt(at)),
            );
        }

        let rows = query
            .order_by_desc(budgets::Column::StartDate)
            .offset(page.skip)
            .limit(page.limit)
            .all(&self.conn)
            .await
            .context("Failed to list budgets")?;

        rows.into_iter().map(Budget::try_from).collect()
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Budget>> {
        let row = self.find_owned(user_id, id).await?;
        row.map(Budget::try_from).transpose()
    }

    /// Whether another budget of the same category intersects
    /// `[start, end)`. A missing end date is unbounded.
    pub async fn overlaps(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        except: Option<Uuid>,
    ) -> Result<bool> {
        let mut query = Budgets::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::CategoryId.eq(category_id))
            .filter(
                Condition::any()
                    .add(budgets::Column::EndDate.is_null())
                    .add(budgets::Column::EndDate.gt(start)),
            );
        if let Some(end) = end {
            query = query.filter(budgets::Column::StartDate.lt(end));
        }
        if let Some(id) = except {
            query = query.filter(budgets::Column::Id.ne(id));
        }

        let count = query
            .count(&self.conn)
            .await
            .context("Failed to check overlapping budgets")?;

        Ok(count > 0)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: BudgetChanges,
    ) -> Result<Option<Budget>> {
        let Some(row) = self.find_owned(user_id, id).await? else {
            return Ok(None);
        };

        let mut active: budgets::ActiveModel = row.into();
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(limit_cents) = changes.limit_cents {
            active.limit_cents = Set(limit_cents);
        }
        if let Some(period) = changes.period {
            active.period = Set(period.as_str().to_string());
        }
        if let Some(start_date) = changes.start_date {
            active.start_date = Set(start_date);
        }
        if let Some(end_date) = changes.end_date {
            active.end_date = Set(end_date);
        }
        active.updated_at = Set(Utc::now());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update budget")?;

        Budget::try_from(model).map(Some)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = Budgets::delete_many()
            .filter(budgets::Column::Id.eq(id))
            .filter(budgets::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete budget")?;

        Ok(result.rows_affected > 0)
    }

    async fn find_owned(&self, user_id: Uuid, id: Uuid) -> Result<Option<budgets::Model>> {
        Budgets::find_by_id(id)
            .filter(budgets::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query budget")
    }
}
