use alloy_primitives::{Address, B256};
use settlement_primitives::L1RollupTxType;
use std::time::Duration;

/// The default maximum number of blocks carried by a single transaction.
pub const DEFAULT_MAX_BLOCK_COUNT: u64 = 4;

/// The default gas limit of rollup transactions.
pub const DEFAULT_GAS_LIMIT: u64 = 5_000_000;

/// The default maximum increase of a replacement gas price over the market price, in percent.
pub const DEFAULT_MAX_GAS_PRICE_INCREASE_PERCENTAGE: u64 = 50;

/// The default number of L1 blocks on top of a receipt before it is considered final.
pub const DEFAULT_CONFIRM_BLOCKS_COUNT: u64 = 3;

/// The default time after which an unmined transaction is abandoned, in seconds.
pub const DEFAULT_MAX_WAITING_TIME: u64 = 3600;

/// The default maximum number of broadcasts for a single submission.
pub const DEFAULT_MAX_REPLACEMENT_ATTEMPTS: u32 = 10;

/// Configuration for the submission and confirmation of rollup transactions.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// The rollup contract address.
    pub rollup_contract: Address,
    /// The account signing commit transactions.
    pub commit_signer: Address,
    /// The account signing verify and execute transactions.
    pub verify_signer: Address,
    /// The state root of the empty state tree, used in the genesis block header.
    pub genesis_state_root: B256,
    /// The maximum number of blocks carried by a single transaction.
    pub max_block_count: u64,
    /// The gas limit of rollup transactions.
    pub gas_limit: u64,
    /// A fixed gas price. When unset the price suggested by the L1 node is used.
    pub gas_price: Option<u128>,
    /// The maximum increase of a replacement gas price over the market price, in percent.
    pub max_gas_price_increase_percentage: u64,
    /// The maximum number of broadcasts for a single submission.
    pub max_replacement_attempts: u32,
    /// The number of L1 blocks on top of a receipt before it is considered final.
    pub confirm_blocks_count: u64,
    /// The time after which an unmined transaction is abandoned.
    pub max_waiting_time: Duration,
    /// Disables the submission of commit transactions.
    pub disable_commit_block: bool,
    /// Disables the submission of verify and execute transactions.
    pub disable_verify_block: bool,
}

impl SenderConfig {
    /// Returns the account signing transactions of the provided type.
    pub const fn signer(&self, tx_type: L1RollupTxType) -> Address {
        match tx_type {
            L1RollupTxType::Commit => self.commit_signer,
            L1RollupTxType::VerifyAndExecute => self.verify_signer,
        }
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            rollup_contract: Address::ZERO,
            commit_signer: Address::ZERO,
            verify_signer: Address::ZERO,
            genesis_state_root: B256::ZERO,
            max_block_count: DEFAULT_MAX_BLOCK_COUNT,
            gas_limit: DEFAULT_GAS_LIMIT,
            gas_price: None,
            max_gas_price_increase_percentage: DEFAULT_MAX_GAS_PRICE_INCREASE_PERCENTAGE,
            max_replacement_attempts: DEFAULT_MAX_REPLACEMENT_ATTEMPTS,
            confirm_blocks_count: DEFAULT_CONFIRM_BLOCKS_COUNT,
            max_waiting_time: Duration::from_secs(DEFAULT_MAX_WAITING_TIME),
            disable_commit_block: false,
            disable_verify_block: false,
        }
    }
}

/// Scheduling of the periodic sender tasks.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// The interval between commit submission cycles.
    pub commit_interval: Duration,
    /// The interval between verify submission cycles.
    pub verify_interval: Duration,
    /// The interval between confirmation cycles.
    pub tracker_interval: Duration,
    /// The interval between signer balance reads.
    pub balance_interval: Duration,
    /// The time given to in flight cycles to finish on shutdown.
    pub shutdown_grace_period: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            commit_interval: Duration::from_secs(10),
            verify_interval: Duration::from_secs(10),
            tracker_interval: Duration::from_secs(10),
            balance_interval: Duration::from_secs(15),
            shutdown_grace_period: Duration::from_secs(10),
        }
    }
}
