use crate::PrimitiveError;

use alloy_primitives::B256;

/// The logical channel of a rollup transaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum L1RollupTxType {
    /// A `commitBlocks` transaction.
    Commit,
    /// A `verifyAndExecuteBlocks` transaction.
    VerifyAndExecute,
}

impl L1RollupTxType {
    /// Returns the database representation of the type.
    pub const fn as_i32(&self) -> i32 {
        match self {
            Self::Commit => 1,
            Self::VerifyAndExecute => 2,
        }
    }

    /// Returns a static label for the type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::VerifyAndExecute => "verify_and_execute",
        }
    }
}

impl TryFrom<i32> for L1RollupTxType {
    type Error = PrimitiveError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Commit),
            2 => Ok(Self::VerifyAndExecute),
            value => Err(PrimitiveError::UnknownTxType(value)),
        }
    }
}

/// The status of a rollup transaction.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum L1RollupTxStatus {
    /// The transaction was broadcast and is awaiting confirmation.
    #[default]
    Pending,
    /// The transaction is final on L1.
    Handled,
}

impl L1RollupTxStatus {
    /// Returns the database representation of the status.
    pub const fn as_i32(&self) -> i32 {
        match self {
            Self::Pending => 1,
            Self::Handled => 2,
        }
    }
}

impl TryFrom<i32> for L1RollupTxStatus {
    type Error = PrimitiveError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Pending),
            2 => Ok(Self::Handled),
            value => Err(PrimitiveError::UnknownStatus { entity: "rollup tx", value }),
        }
    }
}

/// A transaction broadcast to L1 by the settlement pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L1RollupTx {
    /// The ledger identifier, `None` until persisted.
    pub id: Option<i64>,
    /// The transaction hash.
    pub tx_hash: B256,
    /// The logical channel.
    pub tx_type: L1RollupTxType,
    /// The transaction status.
    pub status: L1RollupTxStatus,
    /// The highest L2 block height covered by the transaction.
    pub l2_block_height: u64,
    /// The L1 account nonce used.
    pub nonce: u64,
    /// The gas price paid.
    pub gas_price: u128,
    /// The unix timestamp at which the transaction was recorded.
    pub created_at: u64,
}

impl L1RollupTx {
    /// Returns a new pending [`L1RollupTx`] created now.
    pub fn pending(
        tx_hash: B256,
        tx_type: L1RollupTxType,
        l2_block_height: u64,
        nonce: u64,
        gas_price: u128,
    ) -> Self {
        Self {
            id: None,
            tx_hash,
            tx_type,
            status: L1RollupTxStatus::Pending,
            l2_block_height,
            nonce,
            gas_price,
            created_at: crate::unix_timestamp(),
        }
    }
}
