//! Primitive types for the rollup settlement pipeline.

pub use block::{Block, BlockStatus, CompressedBlock, EMPTY_STRING_KECCAK};
mod block;

pub use error::PrimitiveError;
mod error;

pub use proof::{FormattedProof, Proof, ProofStatus, PROOF_ELEMENTS};
mod proof;

pub use pubdata::PubdataTxType;
mod pubdata;

pub use transaction::{L1RollupTx, L1RollupTxStatus, L1RollupTxType};
mod transaction;

pub use witness::BlockWitness;
mod witness;

/// Returns the current unix timestamp in seconds.
pub fn unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
