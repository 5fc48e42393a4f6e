//! A library responsible for persisting the rollup settlement ledger and the artifacts it
//! publishes.

mod connection;
pub use connection::DatabaseConnectionProvider;

mod db;
pub use db::Database;

mod error;
pub use error::DatabaseError;

mod models;

mod operations;
pub use operations::DatabaseOperations;

mod transaction;
pub use transaction::DatabaseTransaction;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use sea_orm::DbErr;
