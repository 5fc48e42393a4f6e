//! Translation of stored blocks and proofs into rollup contract calls.

use crate::abi::{
    commitBlocksCall, revertBlocksCall, verifyAndExecuteBlocksCall, CommitBlockInfo,
    OnchainOperationData, StoredBlockInfo, VerifyAndExecuteBlockInfo,
};

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolCall;
use settlement_primitives::{Block, CompressedBlock, PrimitiveError, Proof, PubdataTxType};

/// The eth witness type tag for a witness carrying a raw ECDSA signature.
pub const ETH_WITNESS_ECRECOVER_TAG: u8 = 0x00;

/// An error that occurred while building a rollup contract call.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// A public data offset points outside the block public data.
    #[error("block {height}: public data offset {offset} out of bounds ({len} bytes)")]
    OffsetOutOfBounds {
        /// The block height.
        height: u64,
        /// The offending offset.
        offset: u32,
        /// The public data length.
        len: usize,
    },
    /// The public data at an offset starts with an unknown transaction type.
    #[error("block {height}: unknown tx type {tx_type} at offset {offset}")]
    UnknownTxType {
        /// The block height.
        height: u64,
        /// The offset of the operation.
        offset: u32,
        /// The type byte.
        tx_type: u8,
    },
    /// An operation requiring an eth witness has no stored signature.
    #[error("block {height}: missing witness signature for offset {offset}")]
    MissingWitnessSignature {
        /// The block height.
        height: u64,
        /// The offset of the operation.
        offset: u32,
    },
    /// The block height does not fit the contract representation.
    #[error("block height {0} exceeds u32")]
    HeightOverflow(u64),
    /// A proof could not be decoded.
    #[error("proof for block {height}: {source}")]
    Proof {
        /// The block height.
        height: u64,
        /// The decoding error.
        source: PrimitiveError,
    },
}

fn block_number(height: u64) -> Result<u32, PayloadError> {
    u32::try_from(height).map_err(|_| PayloadError::HeightOverflow(height))
}

/// Returns the header the rollup contract stores for the provided block.
pub fn stored_block_info(block: &Block) -> Result<StoredBlockInfo, PayloadError> {
    Ok(StoredBlockInfo {
        blockSize: block.block_size,
        blockNumber: block_number(block.height)?,
        priorityOperations: block.priority_operations,
        pendingOnchainOperationsHash: block.pending_onchain_operations_hash,
        timestamp: U256::from(block.created_at),
        stateRoot: block.state_root,
        commitment: block.commitment,
    })
}

/// Returns the commit payload of the provided block.
///
/// Every public data offset yields one on-chain operation. Operations that must be authorized on
/// L1 carry the stored signature behind [`ETH_WITNESS_ECRECOVER_TAG`], all others an empty
/// witness.
pub fn commit_block_info(block: &CompressedBlock) -> Result<CommitBlockInfo, PayloadError> {
    let mut onchain_operations = Vec::with_capacity(block.public_data_offsets.len());
    for &offset in &block.public_data_offsets {
        let tx_type_byte = *block.public_data.get(offset as usize).ok_or(
            PayloadError::OffsetOutOfBounds {
                height: block.height,
                offset,
                len: block.public_data.len(),
            },
        )?;
        let tx_type = PubdataTxType::from_u8(tx_type_byte).ok_or(PayloadError::UnknownTxType {
            height: block.height,
            offset,
            tx_type: tx_type_byte,
        })?;

        let eth_witness = if tx_type.requires_eth_witness() {
            let signature = block
                .witness_signatures
                .get(&offset)
                .ok_or(PayloadError::MissingWitnessSignature { height: block.height, offset })?;
            let mut witness = Vec::with_capacity(signature.len() + 1);
            witness.push(ETH_WITNESS_ECRECOVER_TAG);
            witness.extend_from_slice(signature);
            witness.into()
        } else {
            Bytes::new()
        };

        onchain_operations.push(OnchainOperationData { ethWitness: eth_witness, publicDataOffset: offset });
    }

    Ok(CommitBlockInfo {
        newStateRoot: block.state_root,
        publicData: block.public_data.clone(),
        timestamp: U256::from(block.timestamp),
        onchainOperations: onchain_operations,
        blockNumber: block_number(block.height)?,
        blockSize: block.block_size,
    })
}

/// Returns the verify and execute payload of the provided block.
pub fn verify_and_execute_block_info(
    block: &Block,
) -> Result<VerifyAndExecuteBlockInfo, PayloadError> {
    Ok(VerifyAndExecuteBlockInfo {
        blockHeader: stored_block_info(block)?,
        pendingOnchainOpsPubData: block.pending_onchain_operations_pubdata.clone(),
    })
}

/// Concatenates the curve points of the provided proofs, in order.
pub fn flatten_proofs(proofs: &[Proof]) -> Result<Vec<U256>, PayloadError> {
    let mut flat = Vec::with_capacity(proofs.len() * settlement_primitives::PROOF_ELEMENTS);
    for proof in proofs {
        let formatted = proof
            .formatted()
            .map_err(|source| PayloadError::Proof { height: proof.height, source })?;
        flat.extend(formatted.flatten());
    }
    Ok(flat)
}

/// Returns the calldata of a `commitBlocks` call.
pub fn commit_blocks_calldata(last: StoredBlockInfo, blocks: Vec<CommitBlockInfo>) -> Bytes {
    commitBlocksCall { _lastCommittedBlockData: last, _newBlocksData: blocks }.abi_encode().into()
}

/// Returns the calldata of a `verifyAndExecuteBlocks` call.
pub fn verify_and_execute_blocks_calldata(
    blocks: Vec<VerifyAndExecuteBlockInfo>,
    proofs: Vec<U256>,
) -> Bytes {
    verifyAndExecuteBlocksCall { _blocks: blocks, _proofs: proofs }.abi_encode().into()
}

/// Returns the calldata of a `revertBlocks` call.
pub fn revert_blocks_calldata(headers: Vec<StoredBlockInfo>) -> Bytes {
    revertBlocksCall { _blocksToRevert: headers }.abi_encode().into()
}
