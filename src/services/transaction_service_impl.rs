use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::{NewTransaction, Store, Transaction, TransactionChanges, TransactionFilter};
use crate::domain::{Page, decimal_to_cents};
use crate::services::transaction_service::{
    TransactionError, TransactionInput, TransactionService, TransactionUpdate,
};

pub struct SeaOrmTransactionService {
    store: Store,
}

impl SeaOrmTransactionService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_category(&self, user_id: Uuid, category_id: Uuid) -> Result<(), TransactionError> {
        if self.store.categories().exists(user_id, category_id).await? {
            Ok(())
        } else {
            Err(TransactionError::CategoryNotFound)
        }
    }
}

fn amount_to_cents(amount: Decimal) -> Result<i64, TransactionError> {
    let cents = decimal_to_cents(amount)?;
    if cents == 0 {
        return Err(TransactionError::Validation(
            "Transaction amount cannot be zero".to_string(),
        ));
    }
    Ok(cents)
}

#[async_trait]
impl TransactionService for SeaOrmTransactionService {
    async fn create(
        &self,
        user_id: Uuid,
        input: TransactionInput,
    ) -> Result<Transaction, TransactionError> {
        let amount_cents = amount_to_cents(input.amount)?;
        self.ensure_category(user_id, input.category_id).await?;

        let transaction = self
            .store
            .transactions()
            .create(NewTransaction {
                user_id,
                category_id: input.category_id,
                amount_cents,
                kind: input.kind,
                occurred_at: input.occurred_at,
                note: input.note,
            })
            .await?;

        Ok(transaction)
    }

    async fn list(
        &self,
        user_id: Uuid,
        filter: TransactionFilter,
        page: Page,
    ) -> Result<Vec<Transaction>, TransactionError> {
        Ok(self
            .store
            .transactions()
            .list(user_id, &filter, page)
            .await?)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Transaction, TransactionError> {
        self.store
            .transactions()
            .get(user_id, id)
            .await?
            .ok_or(TransactionError::NotFound)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: TransactionUpdate,
    ) -> Result<Transaction, TransactionError> {
        let amount_cents = update.amount.map(amount_to_cents).transpose()?;

        let repo = self.store.transactions();
        if repo.get(user_id, id).await?.is_none() {
            return Err(TransactionError::NotFound);
        }
        if let Some(category_id) = update.category_id {
            self.ensure_category(user_id, category_id).await?;
        }

        repo.update(
            user_id,
            id,
            TransactionChanges {
                category_id: update.category_id,
                amount_cents,
                kind: update.kind,
                occurred_at: update.occurred_at,
                note: update.note,
            },
        )
        .await?
        .ok_or(TransactionError::NotFound)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), TransactionError> {
        if self.store.transactions().delete(user_id, id).await? {
            Ok(())
        } else {
            Err(TransactionError::NotFound)
        }
    }
}
