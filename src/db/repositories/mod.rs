pub mod budget;
pub mod category;
pub mod refresh_token;
pub mod transaction;
pub mod user;
