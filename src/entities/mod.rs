pub mod prelude;

pub mod budgets;
pub mod categories;
pub mod refresh_tokens;
pub mod transactions;
pub mod users;
