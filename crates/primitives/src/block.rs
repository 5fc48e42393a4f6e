use crate::PrimitiveError;

use alloy_primitives::{b256, Bytes, B256};
use std::{collections::BTreeMap, vec::Vec};

/// The keccak256 hash of the empty string, used as the pending on-chain operations hash of a
/// block without pending operations.
pub const EMPTY_STRING_KECCAK: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");

/// The status of an L2 block.
///
/// Moves forward as the block is committed and verified on L1 and only moves backwards
/// during a rollback.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum BlockStatus {
    /// The block is being proposed and may still change.
    #[default]
    Proposing,
    /// The block is sealed and waiting to be committed.
    Pending,
    /// The block commitment has been confirmed on L1.
    Committed,
    /// The block proof has been verified and its operations executed on L1.
    VerifiedAndExecuted,
}

impl BlockStatus {
    /// Returns the database representation of the status.
    pub const fn as_i32(&self) -> i32 {
        match self {
            Self::Proposing => 0,
            Self::Pending => 1,
            Self::Committed => 2,
            Self::VerifiedAndExecuted => 3,
        }
    }
}

impl TryFrom<i32> for BlockStatus {
    type Error = PrimitiveError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Proposing,
            1 => Self::Pending,
            2 => Self::Committed,
            3 => Self::VerifiedAndExecuted,
            value => return Err(PrimitiveError::UnknownStatus { entity: "block", value }),
        })
    }
}

/// The canonical record of an L2 block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Block {
    /// The block height.
    pub height: u64,
    /// The block status.
    pub status: BlockStatus,
    /// The block commitment.
    pub commitment: B256,
    /// The state root after applying the block.
    pub state_root: B256,
    /// The number of priority operations processed by the block.
    pub priority_operations: u64,
    /// The rolling hash of the pending on-chain operations.
    pub pending_onchain_operations_hash: B256,
    /// The public data of every pending on-chain operation, executed on verification.
    pub pending_onchain_operations_pubdata: Vec<Bytes>,
    /// The number of transactions slots in the block.
    pub block_size: u16,
    /// The creation time of the block in unix milliseconds.
    pub created_at: u64,
    /// The hash of the L1 transaction that committed the block.
    pub committed_tx_hash: Option<B256>,
    /// The unix timestamp at which the commitment was confirmed.
    pub committed_at: Option<u64>,
    /// The hash of the L1 transaction that verified the block.
    pub verified_tx_hash: Option<B256>,
    /// The unix timestamp at which the verification was confirmed.
    pub verified_at: Option<u64>,
}

/// The commit payload for a single L2 block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompressedBlock {
    /// The block height.
    pub height: u64,
    /// The state root after applying the block.
    pub state_root: B256,
    /// The serialized public data of the block.
    pub public_data: Bytes,
    /// The byte offset of every on-chain operation in the public data.
    pub public_data_offsets: Vec<u32>,
    /// The L1 signatures authorizing operations that need an eth witness, keyed by public data
    /// offset.
    pub witness_signatures: BTreeMap<u32, Bytes>,
    /// The block timestamp.
    pub timestamp: u64,
    /// The number of transactions slots in the block.
    pub block_size: u16,
}
