pub mod schema;
pub mod connection;
pub mod error;
pub mod memory;
pub mod operations;
pub mod repositories;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::{Database, DbPool};
pub use error::{DbError, DbResult};
pub use memory::InMemoryDatabase;
pub use operations::DatabaseOperations;
