use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, BudgetService, CategoryService, SeaOrmAuthService, SeaOrmBudgetService,
    SeaOrmCategoryService, SeaOrmTransactionService, SeaOrmUserService, TokenIssuer,
    TransactionService, UserService,
};

/// Long-lived services shared by every request. Built once at startup; the
/// configuration is immutable afterwards.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub category_service: Arc<dyn CategoryService>,

    pub transaction_service: Arc<dyn TransactionService>,

    pub budget_service: Arc<dyn BudgetService>,
}

impl SharedState {
    /// Connects to the database (running migrations) and wires the services.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let tokens = TokenIssuer::new(&config.auth);

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens,
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn UserService>;

        let category_service =
            Arc::new(SeaOrmCategoryService::new(store.clone())) as Arc<dyn CategoryService>;

        let transaction_service =
            Arc::new(SeaOrmTransactionService::new(store.clone())) as Arc<dyn TransactionService>;

        let budget_service =
            Arc::new(SeaOrmBudgetService::new(store.clone())) as Arc<dyn BudgetService>;

        Self {
            config: Arc::new(config),
            store,
            auth_service,
            user_service,
            category_service,
            transaction_service,
            budget_service,
        }
    }
}
