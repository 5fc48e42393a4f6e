use alloy_primitives::TxHash;
use settlement_db::DatabaseError;
use settlement_l1::{ChainClientError, PayloadError};
use std::time::Duration;

/// An error aborting a rollback. The completed steps are kept and the rollback can be run again.
#[derive(Debug, thiserror::Error)]
pub enum RollbackError {
    /// The genesis block can not be rolled back.
    #[error("rollback height must be greater than zero")]
    ZeroHeight,
    /// A block at or above the target height is verified and executed on L1, which can not be
    /// reverted.
    #[error("block {height} is verified and executed and can not be rolled back")]
    VerifiedBlock {
        /// The lowest verified block at or above the target height.
        height: u64,
    },
    /// The rollback encountered an error when interacting with the database.
    #[error("Encountered an error interacting with the database: {0}")]
    Database(#[from] DatabaseError),
    /// The rollback encountered an error when interacting with the L1 chain.
    #[error("Encountered an error interacting with the L1 chain: {0}")]
    ChainClient(#[from] ChainClientError),
    /// The revert call could not be built.
    #[error("Encountered an error building the revert call: {0}")]
    Payload(#[from] PayloadError),
    /// The revert transaction was mined but failed.
    #[error("revert transaction {0} failed on L1")]
    RevertFailed(TxHash),
    /// The revert transaction was not confirmed in time.
    #[error("revert transaction {tx_hash} not confirmed within {waited:?}")]
    RevertTimeout {
        /// The revert transaction hash.
        tx_hash: TxHash,
        /// The time waited.
        waited: Duration,
    },
    /// The tree storage could not be rolled back.
    #[error("tree storage rollback failed: {0}")]
    TreeStorage(#[from] TreeStorageError),
}

/// An error returned by a [`crate::TreeStorage`].
#[derive(Debug, thiserror::Error)]
pub enum TreeStorageError {
    /// The storage engine could not be reached.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The storage engine refused the rollback.
    #[error("rollback to {height} failed: {reason}")]
    Failed {
        /// The requested height.
        height: u64,
        /// The reason reported by the engine.
        reason: String,
    },
}
