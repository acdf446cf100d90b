pub mod manager;
pub mod models;
pub mod payload;
pub mod repository;
pub mod schema;
pub mod value;

pub use manager::DatabaseError;
pub use repository::Repository;
pub use value::{ColumnSet, SqlValue};
