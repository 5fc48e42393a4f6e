//! Test utilities for the database crate.

use crate::{Database, DatabaseConnectionProvider};
use settlement_migration::{Migrator, MigratorTrait};

/// Returns an in-memory sqlite [`Database`] with every migration applied.
///
/// The in-memory database lives as long as its single connection, so every call returns an
/// isolated store.
pub async fn setup_test_db() -> Database {
    let db = Database::new("sqlite::memory:").await.expect("in-memory sqlite");
    Migrator::up(db.get_connection(), None).await.expect("migrations apply");
    db
}
