use crate::abi::{try_decode_log, BlockCommit, BlockVerification, BlocksRevert};

use alloy_primitives::{Address, Log};

/// An event emitted by the rollup contract that the pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollupEvent {
    /// A block was committed.
    BlockCommit(u64),
    /// A block was verified and executed.
    BlockVerification(u64),
    /// Committed blocks were reverted, leaving the given totals.
    BlocksRevert {
        /// The number of verified blocks.
        total_verified: u64,
        /// The number of committed blocks.
        total_committed: u64,
    },
}

impl RollupEvent {
    /// Tries to decode a rollup event from the provided log.
    pub fn try_decode(log: &Log) -> Option<Self> {
        if let Some(event) = try_decode_log::<BlockCommit>(log) {
            return Some(Self::BlockCommit(event.data.blockNumber as u64));
        }
        if let Some(event) = try_decode_log::<BlockVerification>(log) {
            return Some(Self::BlockVerification(event.data.blockNumber as u64));
        }
        try_decode_log::<BlocksRevert>(log).map(|event| Self::BlocksRevert {
            total_verified: event.data.totalBlocksVerified as u64,
            total_committed: event.data.totalBlocksCommitted as u64,
        })
    }

    /// Decodes every rollup event emitted by `contract` in the provided logs.
    pub fn decode_all(logs: &[Log], contract: Address) -> Vec<Self> {
        logs.iter().filter(|log| log.address == contract).filter_map(Self::try_decode).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use alloy_sol_types::SolEvent;

    const CONTRACT: Address = address!("00000000000000000000000000000000000000aa");

    #[test]
    fn test_decode_rollup_events() {
        let commit = Log { address: CONTRACT, data: BlockCommit { blockNumber: 5 }.encode_log_data() };
        let verify =
            Log { address: CONTRACT, data: BlockVerification { blockNumber: 3 }.encode_log_data() };
        let revert = Log {
            address: CONTRACT,
            data: BlocksRevert { totalBlocksVerified: 2, totalBlocksCommitted: 2 }
                .encode_log_data(),
        };
        let foreign = Log {
            address: address!("00000000000000000000000000000000000000bb"),
            data: BlockCommit { blockNumber: 9 }.encode_log_data(),
        };

        let events = RollupEvent::decode_all(&[commit, verify, revert, foreign], CONTRACT);
        assert_eq!(
            events,
            vec![
                RollupEvent::BlockCommit(5),
                RollupEvent::BlockVerification(3),
                RollupEvent::BlocksRevert { total_verified: 2, total_committed: 2 },
            ]
        );
    }
}
