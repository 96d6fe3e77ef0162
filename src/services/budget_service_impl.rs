use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::{Budget, BudgetChanges, BudgetFilter, NewBudget, Store};
use crate::domain::{Page, cents_to_decimal, current_window, decimal_to_cents};
use crate::services::budget_service::{
    BudgetError, BudgetInput, BudgetProgress, BudgetService, BudgetUpdate,
};

const OVERLAP: &str = "A budget already exists for this category in the specified time period";

pub struct SeaOrmBudgetService {
    store: Store,
}

impl SeaOrmBudgetService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_category(&self, user_id: Uuid, category_id: Uuid) -> Result<(), BudgetError> {
        if self.store.categories().exists(user_id, category_id).await? {
            Ok(())
        } else {
            Err(BudgetError::CategoryNotFound)
        }
    }

    async fn ensure_no_overlap(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        except: Option<Uuid>,
    ) -> Result<(), BudgetError> {
        if self
            .store
            .budgets()
            .overlaps(user_id, category_id, start, end, except)
            .await?
        {
            Err(BudgetError::Conflict(OVERLAP.to_string()))
        } else {
            Ok(())
        }
    }
}

fn limit_to_cents(limit: Decimal) -> Result<i64, BudgetError> {
    let cents = decimal_to_cents(limit)?;
    if cents < 0 {
        return Err(BudgetError::Validation(
            "Budget limit cannot be negative".to_string(),
        ));
    }
    Ok(cents)
}

fn check_range(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<(), BudgetError> {
    match end {
        Some(end) if end <= start => Err(BudgetError::Validation(
            "End date must be after start date".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Derives the progress figures from a budget and its spent total.
pub(crate) fn build_progress(
    budget: &Budget,
    spent: Decimal,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> BudgetProgress {
    let percent_used = if budget.limit.is_zero() {
        None
    } else {
        spent
            .checked_div(budget.limit)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|pct| pct.round_dp(2))
    };

    BudgetProgress {
        budget_id: budget.id,
        budget_name: budget.name.clone(),
        category_id: budget.category_id,
        period: budget.period,
        limit: budget.limit,
        spent,
        remaining: budget.limit - spent,
        percent_used,
        is_over_budget: spent > budget.limit,
        window_start,
        window_end,
    }
}

#[async_trait]
impl BudgetService for SeaOrmBudgetService {
    async fn create(&self, user_id: Uuid, input: BudgetInput) -> Result<Budget, BudgetError> {
        let limit_cents = limit_to_cents(input.limit)?;
        check_range(input.start_date, input.end_date)?;
        self.ensure_category(user_id, input.category_id).await?;
        self.ensure_no_overlap(
            user_id,
            input.category_id,
            input.start_date,
            input.end_date,
            None,
        )
        .await?;

        let budget = self
            .store
            .budgets()
            .create(NewBudget {
                user_id,
                category_id: input.category_id,
                name: input.name,
                limit_cents,
                period: input.period,
                start_date: input.start_date,
                end_date: input.end_date,
            })
            .await?;

        Ok(budget)
    }

    async fn list(
        &self,
        user_id: Uuid,
        filter: BudgetFilter,
        page: Page,
    ) -> Result<Vec<Budget>, BudgetError> {
        Ok(self.store.budgets().list(user_id, &filter, page).await?)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Budget, BudgetError> {
        self.store
            .budgets()
            .get(user_id, id)
            .await?
            .ok_or(BudgetError::NotFound)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: BudgetUpdate,
    ) -> Result<Budget, BudgetError> {
        let limit_cents = update.limit.map(limit_to_cents).transpose()?;
        let current = self.get(user_id, id).await?;

        let category_id = update.category_id.unwrap_or(current.category_id);
        let start = update.start_date.unwrap_or(current.start_date);
        let end = update.end_date.unwrap_or(current.end_date);
        check_range(start, end)?;

        if update.category_id.is_some() {
            self.ensure_category(user_id, category_id).await?;
        }
        if update.category_id.is_some() || update.start_date.is_some() || update.end_date.is_some()
        {
            self.ensure_no_overlap(user_id, category_id, start, end, Some(id))
                .await?;
        }

        self.store
            .budgets()
            .update(
                user_id,
                id,
                BudgetChanges {
                    category_id: update.category_id,
                    name: update.name,
                    limit_cents,
                    period: update.period,
                    start_date: update.start_date,
                    end_date: update.end_date,
                },
            )
            .await?
            .ok_or(BudgetError::NotFound)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), BudgetError> {
        if self.store.budgets().delete(user_id, id).await? {
            Ok(())
        } else {
            Err(BudgetError::NotFound)
        }
    }

    async fn progress(
        &self,
        user_id: Uuid,
        id: Uuid,
        at: Option<DateTime<Utc>>,
    ) -> Result<BudgetProgress, BudgetError> {
        let budget = self.get(user_id, id).await?;
        let window = current_window(
            budget.period,
            budget.start_date,
            budget.end_date,
            at.unwrap_or_else(Utc::now),
        );

        let spent_cents = self
            .store
            .transactions()
            .expense_total_cents(user_id, budget.category_id, &window)
            .await?;

        Ok(build_progress(
            &budget,
            cents_to_decimal(spent_cents),
            window.start,
            window.end,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BudgetPeriod;

    fn budget(limit_cents: i64) -> Budget {
        let now = Utc::now();
        Budget {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            name: "Groceries".to_string(),
            limit: cents_to_decimal(limit_cents),
            period: BudgetPeriod::Monthly,
            start_date: now,
            end_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_progress_over_budget() {
        let now = Utc::now();
        let progress = build_progress(&budget(10_000), cents_to_decimal(15_000), now, now);

        assert_eq!(progress.spent, Decimal::new(150, 0));
        assert_eq!(progress.remaining, Decimal::new(-50, 0));
        assert_eq!(progress.percent_used, Some(Decimal::new(150, 0)));
        assert!(progress.is_over_budget);
    }

    #[test]
    fn test_progress_zero_limit() {
        let now = Utc::now();
        let progress = build_progress(&budget(0), cents_to_decimal(1_250), now, now);

        assert_eq!(progress.percent_used, None);
        assert_eq!(progress.remaining, Decimal::new(-1250, 2));
        assert!(progress.is_over_budget);
    }

    #[test]
    fn test_progress_rounds_percent() {
        let now = Utc::now();
        let progress = build_progress(&budget(30_000), cents_to_decimal(10_000), now, now);

        assert_eq!(progress.percent_used, Some(Decimal::new(3333, 2)));
        assert!(!progress.is_over_budget);
    }

    #[test]
    fn test_check_range() {
        let now = Utc::now();
        assert!(check_range(now, None).is_ok());
        assert!(check_range(now, Some(now + chrono::Duration::days(1))).is_ok());
        assert!(check_range(now, Some(now)).is_err());
    }
}
