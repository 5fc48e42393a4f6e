use crate::TreeStorageError;

/// The state tree storage engine, from the point of view of a rollback.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait TreeStorage: Send + Sync + std::fmt::Debug {
    /// Rolls the tree back to the state at `height`. Must be idempotent.
    async fn rollback_to(&self, height: u64) -> Result<(), TreeStorageError>;
}
