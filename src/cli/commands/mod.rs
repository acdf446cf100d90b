pub mod export;
pub mod schema;
pub mod user;
