pub mod tokens;
pub use tokens::{Claims, TokenError, TokenIssuer};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, TokenPair};
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{ProfileUpdate, UserError, UserService};
pub use user_service_impl::SeaOrmUserService;

pub mod category_service;
pub mod category_service_impl;
pub use category_service::{CategoryError, CategoryInput, CategoryService};
pub use category_service_impl::SeaOrmCategoryService;

pub mod transaction_service;
pub mod transaction_service_impl;
pub use transaction_service::{
    TransactionError, TransactionInput, TransactionService, TransactionUpdate,
};
pub use transaction_service_impl::SeaOrmTransactionService;

pub mod budget_service;
pub mod budget_service_impl;
pub use budget_service::{BudgetError, BudgetInput, BudgetProgress, BudgetService, BudgetUpdate};
pub use budget_service_impl::SeaOrmBudgetService;
