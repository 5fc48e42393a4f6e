use alloy_primitives::{Log, B256, U256};
use alloy_sol_types::{sol, SolEvent};
use settlement_primitives::EMPTY_STRING_KECCAK;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct StoredBlockInfo {
        uint16 blockSize;
        uint32 blockNumber;
        uint64 priorityOperations;
        bytes32 pendingOnchainOperationsHash;
        uint256 timestamp;
        bytes32 stateRoot;
        bytes32 commitment;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct OnchainOperationData {
        bytes ethWitness;
        uint32 publicDataOffset;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct CommitBlockInfo {
        bytes32 newStateRoot;
        bytes publicData;
        uint256 timestamp;
        OnchainOperationData[] onchainOperations;
        uint32 blockNumber;
        uint16 blockSize;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct VerifyAndExecuteBlockInfo {
        StoredBlockInfo blockHeader;
        bytes[] pendingOnchainOpsPubData;
    }

    #[derive(Debug)]
    function commitBlocks(
        StoredBlockInfo memory _lastCommittedBlockData,
        CommitBlockInfo[] memory _newBlocksData
    ) external;

    #[derive(Debug)]
    function verifyAndExecuteBlocks(
        VerifyAndExecuteBlockInfo[] memory _blocks,
        uint256[] memory _proofs
    ) external;

    #[derive(Debug)]
    function revertBlocks(StoredBlockInfo[] memory _blocksToRevert) external;

    #[derive(Debug)]
    event BlockCommit(uint32 blockNumber);

    #[derive(Debug)]
    event BlockVerification(uint32 blockNumber);

    #[derive(Debug)]
    event BlocksRevert(uint32 totalBlocksVerified, uint32 totalBlocksCommitted);
}

impl StoredBlockInfo {
    /// Returns the header of the genesis block, the parent of the first committed block.
    ///
    /// The `state_root` is the root of the empty state tree.
    pub fn genesis(state_root: B256) -> Self {
        Self {
            blockSize: 0,
            blockNumber: 0,
            priorityOperations: 0,
            pendingOnchainOperationsHash: EMPTY_STRING_KECCAK,
            timestamp: U256::ZERO,
            stateRoot: state_root,
            commitment: B256::ZERO,
        }
    }
}

/// Tries to decode the provided log into the type T.
pub fn try_decode_log<T: SolEvent>(log: &Log) -> Option<Log<T>> {
    T::decode_log(log).ok()
}
