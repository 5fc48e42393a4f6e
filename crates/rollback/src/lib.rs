//! Operator driven rollback of committed rollup blocks.

mod error;
pub use error::{RollbackError, TreeStorageError};

mod orchestrator;
pub use orchestrator::{RollbackOrchestrator, RollbackReport, DEFAULT_RECEIPT_POLL_INTERVAL};

mod tree;
pub use tree::TreeStorage;
