use crate::DatabaseError;
use alloy_primitives::B256;

/// This module contains the block database model.
pub(crate) mod block;

/// This module contains the block witness database model.
pub(crate) mod block_witness;

/// This module contains the compressed block database model.
pub(crate) mod compressed_block;

/// This module contains the rollup transaction ledger model.
pub(crate) mod l1_rollup_tx;

/// This module contains the proof database model.
pub(crate) mod proof;

/// This module contains the system configuration model.
pub(crate) mod sys_config;

/// Decodes a stored 32 byte hash.
pub(crate) fn decode_b256(bytes: &[u8]) -> Result<B256, DatabaseError> {
    B256::try_from(bytes).map_err(|_| DatabaseError::InvalidHashLength(bytes.len()))
}
