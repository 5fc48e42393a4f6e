//! Submission of rollup blocks to L1 and tracking of their confirmation.

mod balance;
pub use balance::BalanceMonitor;

mod commit;
pub use commit::CommitSubmitter;

mod config;
pub use config::{
    SenderConfig, ServiceConfig, DEFAULT_CONFIRM_BLOCKS_COUNT, DEFAULT_GAS_LIMIT,
    DEFAULT_MAX_BLOCK_COUNT, DEFAULT_MAX_GAS_PRICE_INCREASE_PERCENTAGE,
    DEFAULT_MAX_REPLACEMENT_ATTEMPTS, DEFAULT_MAX_WAITING_TIME,
};

mod context;
pub use context::SenderContext;

mod error;
pub use error::{FatalIntegrityError, SenderError};

pub mod gas;

mod metrics;
pub use metrics::{SenderMetrics, Task};

mod service;
pub use service::SenderService;

mod submit;

mod tracker;
pub use tracker::{ConfirmationTracker, TrackerReport};

mod verify;
pub use verify::VerifySubmitter;

use settlement_primitives::L1RollupTx;

/// The outcome of a submission cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A transaction of the channel is still pending.
    PendingTx,
    /// No blocks are ready for submission.
    NothingToSubmit,
    /// The price required to be accepted is above the ceiling, nothing was broadcast.
    GasCeilingExceeded {
        /// The required price.
        candidate: u128,
        /// The ceiling.
        ceiling: u128,
    },
    /// A transaction was broadcast and recorded as pending.
    Submitted(L1RollupTx),
}
