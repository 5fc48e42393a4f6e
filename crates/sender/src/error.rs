use alloy_primitives::TxHash;
use settlement_db::DatabaseError;
use settlement_l1::{ChainClientError, PayloadError};
use settlement_primitives::L1RollupTxType;

/// A [`Result`] that uses [`SenderError`] as the error type.
pub(crate) type SenderResult<T> = Result<T, SenderError>;

/// An error type for the sender.
#[derive(Debug, thiserror::Error)]
pub enum SenderError {
    /// The sender encountered an error when interacting with the database.
    #[error("Encountered an error interacting with the database: {0}")]
    Database(#[from] DatabaseError),
    /// The sender encountered an error when interacting with the L1 chain.
    #[error("Encountered an error interacting with the L1 chain: {0}")]
    ChainClient(#[from] ChainClientError),
    /// The sender could not build a contract call.
    #[error("Encountered an error building the contract call: {0}")]
    Payload(#[from] PayloadError),
    /// The block a stored header is built from is missing.
    #[error("block {0} not found in database")]
    MissingBlock(u64),
    /// Not every block of the range has a proof yet.
    #[error("proofs not ready for blocks [{start}, {end}]: {proofs} proofs for {blocks} blocks")]
    ProofsNotReady {
        /// The first height of the range.
        start: u64,
        /// The last height of the range.
        end: u64,
        /// The number of blocks.
        blocks: usize,
        /// The number of proofs.
        proofs: usize,
    },
    /// The pending nonce moved while replacing an underpriced transaction.
    #[error("nonce changed during replacement: expected {expected}, got {got}")]
    NonceChanged {
        /// The nonce used by the replaced transaction.
        expected: u64,
        /// The current pending nonce.
        got: u64,
    },
    /// The node kept reporting the transaction as underpriced.
    #[error("gas escalation exhausted after {0} broadcasts")]
    GasEscalationExhausted(u32),
    /// A fatal integrity violation.
    #[error(transparent)]
    Fatal(#[from] FatalIntegrityError),
}

impl SenderError {
    /// Returns true if the error must stop the process.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// An integrity violation after which the pipeline can not safely make progress.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FatalIntegrityError {
    /// A rollup transaction was mined but reverted.
    #[error("{tx_type} transaction {tx_hash} for height {height} reverted on L1")]
    ReceiptReverted {
        /// The transaction hash.
        tx_hash: TxHash,
        /// The logical channel.
        tx_type: L1RollupTxType,
        /// The height carried by the transaction.
        height: u64,
    },
    /// A proof does not belong to the block at the same position.
    #[error("proof at position {index} is for block {proof_height}, expected {block_height}")]
    ProofMismatch {
        /// The position in the batch.
        index: usize,
        /// The height of the block.
        block_height: u64,
        /// The height of the proof.
        proof_height: u64,
    },
}
