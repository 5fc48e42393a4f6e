/// The max retries for the L1 provider.
pub(crate) const L1_PROVIDER_MAX_RETRIES: u32 = 10;

/// The initial backoff for the L1 provider, in milliseconds.
pub(crate) const L1_PROVIDER_INITIAL_BACKOFF: u64 = 100;

/// The default provider compute units per second.
pub(crate) const PROVIDER_COMPUTE_UNITS_PER_SECOND: u64 = 10000;

/// The system configuration key of the L1 RPC endpoint.
pub(crate) const SYS_CONFIG_RPC_KEY: &str = "L1RpcEndpoint";

/// The system configuration key of the rollup contract address.
pub(crate) const SYS_CONFIG_CONTRACT_KEY: &str = "RollupContract";
