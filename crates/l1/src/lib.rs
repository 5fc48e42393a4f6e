//! A library containing the logic required to settle rollup blocks on L1.

mod abi;
pub use abi::{
    commitBlocksCall, revertBlocksCall, try_decode_log, verifyAndExecuteBlocksCall, BlockCommit,
    BlockVerification, BlocksRevert, CommitBlockInfo, OnchainOperationData, StoredBlockInfo,
    VerifyAndExecuteBlockInfo,
};

mod client;
pub use client::{ChainClient, ChainClientError, ChainClientResult, L1Receipt, L1Transaction};

mod event;
pub use event::RollupEvent;

mod payload;
pub use payload::{
    commit_block_info, commit_blocks_calldata, flatten_proofs, revert_blocks_calldata,
    stored_block_info, verify_and_execute_block_info, verify_and_execute_blocks_calldata,
    PayloadError, ETH_WITNESS_ECRECOVER_TAG,
};

mod provider;
pub use provider::AlloyChainClient;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
