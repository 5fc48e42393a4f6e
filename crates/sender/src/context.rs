use crate::{SenderConfig, SenderMetrics};

use settlement_db::Database;
use std::sync::Arc;

/// The dependencies shared by the sender components, built once at start up.
#[derive(Debug)]
pub struct SenderContext<C> {
    /// The database.
    pub database: Arc<Database>,
    /// The L1 chain client.
    pub client: C,
    /// The sender configuration.
    pub config: SenderConfig,
    /// The pipeline metrics.
    pub metrics: SenderMetrics,
}

impl<C> SenderContext<C> {
    /// Returns a new [`SenderContext`].
    pub fn new(database: Arc<Database>, client: C, config: SenderConfig) -> Self {
        Self { database, client, config, metrics: SenderMetrics::default() }
    }
}
