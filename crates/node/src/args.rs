use crate::{constants, signer::ChannelSigner};

use alloy_primitives::{Address, B256};
use alloy_provider::ProviderBuilder;
use alloy_rpc_client::RpcClient;
use alloy_transport::layers::RetryBackoffLayer;
use settlement_db::{Database, DatabaseConnectionProvider, DatabaseOperations};
use settlement_l1::{AlloyChainClient, ChainClient};
use settlement_migration::{Migrator, MigratorTrait};
use settlement_sender::{
    SenderConfig, SenderContext, ServiceConfig, DEFAULT_CONFIRM_BLOCKS_COUNT, DEFAULT_GAS_LIMIT,
    DEFAULT_MAX_BLOCK_COUNT, DEFAULT_MAX_GAS_PRICE_INCREASE_PERCENTAGE,
    DEFAULT_MAX_REPLACEMENT_ATTEMPTS, DEFAULT_MAX_WAITING_TIME,
};
use std::{path::PathBuf, sync::Arc, time::Duration};

/// The settlement node command line.
#[derive(Debug, clap::Parser)]
#[command(name = "settlement-node", version, about = "Settles rollup blocks on L1")]
pub struct Cli {
    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// The settlement node commands.
#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Runs the commit, verify and confirmation tasks until interrupted.
    Run(SettlementArgs),
    /// Rolls back every block at or above a height, on L1 and locally.
    Rollback(RollbackArgs),
}

/// The arguments shared by every command.
#[derive(Debug, Clone, clap::Args)]
pub struct SettlementArgs {
    /// Database args
    #[command(flatten)]
    pub database_args: DatabaseArgs,
    /// The L1 provider arguments
    #[command(flatten)]
    pub l1_provider_args: L1ProviderArgs,
    /// The L1 chain id.
    #[arg(long = "chain-id", env = "SETTLEMENT_CHAIN_ID", value_name = "CHAIN_ID")]
    pub chain_id: u64,
    /// The system configuration arguments
    #[command(flatten)]
    pub sys_config_args: SysConfigArgs,
    /// The sender arguments
    #[command(flatten)]
    pub sender_args: SenderArgs,
    /// The signer arguments
    #[command(flatten)]
    pub signer_args: SignerArgs,
}

impl SettlementArgs {
    /// Validates the arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.sender_args.max_block_count == 0 {
            return Err("--sender.max-block-count must be greater than zero".to_string());
        }
        self.signer_args.validate()
    }

    /// Connects to the database and L1 and returns the database together with the sender
    /// context.
    ///
    /// The L1 endpoint and the rollup contract address are read from the system configuration,
    /// `--l1.url` overrides the endpoint.
    pub async fn build(
        &self,
    ) -> eyre::Result<(Arc<Database>, Arc<SenderContext<impl ChainClient + 'static>>)> {
        self.validate().map_err(|e| eyre::eyre!(e))?;

        let db = Database::new(&self.database_args.url).await?;
        Migrator::up(db.get_connection(), None).await?;

        let SysConfigArgs { rpc_key, contract_key } = &self.sys_config_args;
        let l1_url = match &self.l1_provider_args.url {
            Some(url) => url.clone(),
            None => db
                .get_sys_config(rpc_key)
                .await?
                .ok_or_else(|| eyre::eyre!("L1 endpoint missing from system config key {rpc_key}"))?
                .trim()
                .parse()?,
        };
        let contract: Address = db
            .get_sys_config(contract_key)
            .await?
            .ok_or_else(|| {
                eyre::eyre!("rollup contract missing from system config key {contract_key}")
            })?
            .trim()
            .parse()?;

        let chain_id = self.chain_id;
        let (commit_signer, verify_signer) = self.signer_args.signers(chain_id).await?;
        let (commit_address, verify_address) = (commit_signer.address(), verify_signer.address());
        let mut wallet = commit_signer.into_wallet();
        verify_signer.register(&mut wallet);

        let L1ProviderArgs { max_retries, initial_backoff, compute_units_per_second, .. } =
            self.l1_provider_args;
        let client = RpcClient::builder()
            .layer(RetryBackoffLayer::new(max_retries, initial_backoff, compute_units_per_second))
            .http(l1_url.clone());
        let provider = ProviderBuilder::new().wallet(wallet).connect_client(client);

        tracing::info!(
            target: "settlement::node",
            %l1_url,
            %contract,
            %commit_address,
            %verify_address,
            chain_id,
            "connected to L1"
        );

        let config = self.sender_args.sender_config(contract, commit_address, verify_address);
        let db = Arc::new(db);
        let ctx = SenderContext::new(db.clone(), AlloyChainClient::new(provider, chain_id), config);
        Ok((db, Arc::new(ctx)))
    }
}

/// The arguments of the rollback command.
#[derive(Debug, Clone, clap::Args)]
pub struct RollbackArgs {
    /// The arguments shared by every command.
    #[command(flatten)]
    pub settlement_args: SettlementArgs,
    /// Enables the rollback. Without it the command refuses to touch L1 or local state.
    #[arg(long = "rollback.enable")]
    pub enable: bool,
    /// The lowest height rolled back.
    #[arg(long = "rollback.height", value_name = "HEIGHT")]
    pub height: u64,
    /// The interval between receipt polls of the revert transaction, in seconds.
    #[arg(long = "rollback.poll-interval", value_name = "SECONDS", default_value_t = 3)]
    pub poll_interval: u64,
    /// The program rolling back the state tree, invoked with the tree arguments followed by the
    /// target height.
    #[arg(long = "tree.rollback-command", value_name = "PROGRAM")]
    pub tree_command: PathBuf,
    /// An argument passed to the tree rollback program.
    #[arg(long = "tree.rollback-arg", value_name = "ARG")]
    pub tree_args: Vec<String>,
}

impl RollbackArgs {
    /// Validates the arguments.
    pub fn validate(&self) -> Result<(), String> {
        if !self.enable {
            return Err("rollback is disabled, pass --rollback.enable to run it".to_string());
        }
        self.settlement_args.validate()
    }
}

/// The database arguments.
#[derive(Debug, Clone, clap::Args)]
pub struct DatabaseArgs {
    /// The database URL.
    #[arg(
        long = "db.url",
        env = "SETTLEMENT_DB_URL",
        value_name = "DB_URL",
        default_value = "sqlite://settlement.db?mode=rwc"
    )]
    pub url: String,
}

/// The arguments for the L1 provider.
#[derive(Debug, Clone, clap::Args)]
pub struct L1ProviderArgs {
    /// The URL for the L1 RPC, overriding the system configuration.
    #[arg(long = "l1.url", id = "l1_url", value_name = "L1_URL")]
    pub url: Option<reqwest::Url>,
    /// The compute units per second for the provider.
    #[arg(long = "l1.cups", id = "l1_compute_units_per_second", value_name = "L1_COMPUTE_UNITS_PER_SECOND", default_value_t = constants::PROVIDER_COMPUTE_UNITS_PER_SECOND)]
    pub compute_units_per_second: u64,
    /// The max amount of retries for the provider.
    #[arg(long = "l1.max-retries", id = "l1_max_retries", value_name = "L1_MAX_RETRIES", default_value_t = constants::L1_PROVIDER_MAX_RETRIES)]
    pub max_retries: u32,
    /// The initial backoff for the provider.
    #[arg(long = "l1.initial-backoff", id = "l1_initial_backoff", value_name = "L1_INITIAL_BACKOFF", default_value_t = constants::L1_PROVIDER_INITIAL_BACKOFF)]
    pub initial_backoff: u64,
}

/// The system configuration keys.
#[derive(Debug, Clone, clap::Args)]
pub struct SysConfigArgs {
    /// The key holding the L1 RPC endpoint.
    #[arg(long = "sys-config.rpc-key", value_name = "KEY", default_value = constants::SYS_CONFIG_RPC_KEY)]
    pub rpc_key: String,
    /// The key holding the rollup contract address.
    #[arg(long = "sys-config.contract-key", value_name = "KEY", default_value = constants::SYS_CONFIG_CONTRACT_KEY)]
    pub contract_key: String,
}

/// The arguments for the sender.
#[derive(Debug, Clone, clap::Args)]
pub struct SenderArgs {
    /// The maximum number of blocks per transaction.
    #[arg(long = "sender.max-block-count", value_name = "COUNT", default_value_t = DEFAULT_MAX_BLOCK_COUNT)]
    pub max_block_count: u64,
    /// The gas limit of rollup transactions.
    #[arg(long = "sender.gas-limit", value_name = "GAS", default_value_t = DEFAULT_GAS_LIMIT)]
    pub gas_limit: u64,
    /// A fixed gas price in wei. The price suggested by L1 is used when unset.
    #[arg(long = "sender.gas-price", value_name = "WEI")]
    pub gas_price: Option<u128>,
    /// The maximum increase of a replacement gas price over the market price, in percent.
    #[arg(long = "sender.max-gas-price-increase-percentage", value_name = "PERCENT", default_value_t = DEFAULT_MAX_GAS_PRICE_INCREASE_PERCENTAGE)]
    pub max_gas_price_increase_percentage: u64,
    /// The maximum number of broadcasts for a single submission.
    #[arg(long = "sender.max-replacement-attempts", value_name = "COUNT", default_value_t = DEFAULT_MAX_REPLACEMENT_ATTEMPTS)]
    pub max_replacement_attempts: u32,
    /// The number of L1 blocks on top of a receipt before it is final.
    #[arg(long = "sender.confirm-blocks-count", value_name = "COUNT", default_value_t = DEFAULT_CONFIRM_BLOCKS_COUNT)]
    pub confirm_blocks_count: u64,
    /// The time after which an unmined transaction is abandoned, in seconds.
    #[arg(long = "sender.max-waiting-time", value_name = "SECONDS", default_value_t = DEFAULT_MAX_WAITING_TIME)]
    pub max_waiting_time: u64,
    /// Disables the submission of commit transactions.
    #[arg(long = "sender.disable-commit-block")]
    pub disable_commit_block: bool,
    /// Disables the submission of verify and execute transactions.
    #[arg(long = "sender.disable-verify-block")]
    pub disable_verify_block: bool,
    /// The root of the empty state tree.
    #[arg(long = "sender.genesis-state-root", value_name = "ROOT", default_value_t = B256::ZERO)]
    pub genesis_state_root: B256,
    /// The interval between commit cycles, in seconds.
    #[arg(long = "sender.commit-interval", value_name = "SECONDS", default_value_t = 10)]
    pub commit_interval: u64,
    /// The interval between verify cycles, in seconds.
    #[arg(long = "sender.verify-interval", value_name = "SECONDS", default_value_t = 10)]
    pub verify_interval: u64,
    /// The interval between confirmation cycles, in seconds.
    #[arg(long = "sender.tracker-interval", value_name = "SECONDS", default_value_t = 10)]
    pub tracker_interval: u64,
    /// The interval between signer balance reads, in seconds.
    #[arg(long = "sender.balance-interval", value_name = "SECONDS", default_value_t = 15)]
    pub balance_interval: u64,
    /// The time given to in flight cycles on shutdown, in seconds.
    #[arg(long = "sender.shutdown-grace-period", value_name = "SECONDS", default_value_t = 10)]
    pub shutdown_grace_period: u64,
}

impl SenderArgs {
    /// Returns the [`SenderConfig`] for the provided contract and signers.
    pub const fn sender_config(
        &self,
        rollup_contract: Address,
        commit_signer: Address,
        verify_signer: Address,
    ) -> SenderConfig {
        SenderConfig {
            rollup_contract,
            commit_signer,
            verify_signer,
            genesis_state_root: self.genesis_state_root,
            max_block_count: self.max_block_count,
            gas_limit: self.gas_limit,
            gas_price: self.gas_price,
            max_gas_price_increase_percentage: self.max_gas_price_increase_percentage,
            max_replacement_attempts: self.max_replacement_attempts,
            confirm_blocks_count: self.confirm_blocks_count,
            max_waiting_time: Duration::from_secs(self.max_waiting_time),
            disable_commit_block: self.disable_commit_block,
            disable_verify_block: self.disable_verify_block,
        }
    }

    /// Returns the [`ServiceConfig`].
    pub const fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            commit_interval: Duration::from_secs(self.commit_interval),
            verify_interval: Duration::from_secs(self.verify_interval),
            tracker_interval: Duration::from_secs(self.tracker_interval),
            balance_interval: Duration::from_secs(self.balance_interval),
            shutdown_grace_period: Duration::from_secs(self.shutdown_grace_period),
        }
    }
}

/// The arguments for the channel signers.
#[derive(Debug, Default, Clone, clap::Args)]
pub struct SignerArgs {
    /// Path to the file containing the commit signer's private key
    #[arg(
        long = "signer.commit-key-file",
        value_name = "FILE_PATH",
        help = "Path to the hex-encoded private key file for the commit signer (optional 0x prefix). Mutually exclusive with --signer.commit-aws-kms-key-id"
    )]
    pub commit_key_file: Option<PathBuf>,
    /// AWS KMS Key ID for signing commit transactions
    #[arg(long = "signer.commit-aws-kms-key-id", value_name = "KEY_ID")]
    pub commit_aws_kms_key_id: Option<String>,
    /// Path to the file containing the verify signer's private key
    #[arg(
        long = "signer.verify-key-file",
        value_name = "FILE_PATH",
        help = "Path to the hex-encoded private key file for the verify signer (optional 0x prefix). Mutually exclusive with --signer.verify-aws-kms-key-id"
    )]
    pub verify_key_file: Option<PathBuf>,
    /// AWS KMS Key ID for signing verify and execute transactions
    #[arg(long = "signer.verify-aws-kms-key-id", value_name = "KEY_ID")]
    pub verify_aws_kms_key_id: Option<String>,
}

impl SignerArgs {
    /// Validates that every channel has exactly one key source.
    pub fn validate(&self) -> Result<(), String> {
        validate_channel("commit", self.commit_key_file.is_some(), self.commit_aws_kms_key_id.is_some())?;
        validate_channel("verify", self.verify_key_file.is_some(), self.verify_aws_kms_key_id.is_some())
    }

    /// Creates the commit and verify signers, which must be distinct accounts so the two channels
    /// never share a nonce.
    pub async fn signers(&self, chain_id: u64) -> eyre::Result<(ChannelSigner, ChannelSigner)> {
        let commit = self.commit_signer(chain_id).await?;
        let verify = self.verify_signer(chain_id).await?;
        if commit.address() == verify.address() {
            eyre::bail!(
                "commit and verify signers share the account {}, configure distinct keys",
                commit.address()
            );
        }
        Ok((commit, verify))
    }

    /// Creates the commit signer.
    pub async fn commit_signer(&self, chain_id: u64) -> eyre::Result<ChannelSigner> {
        load_signer(
            "commit",
            self.commit_key_file.as_ref(),
            self.commit_aws_kms_key_id.as_ref(),
            chain_id,
        )
        .await
    }

    /// Creates the verify signer.
    pub async fn verify_signer(&self, chain_id: u64) -> eyre::Result<ChannelSigner> {
        load_signer(
            "verify",
            self.verify_key_file.as_ref(),
            self.verify_aws_kms_key_id.as_ref(),
            chain_id,
        )
        .await
    }
}

fn validate_channel(channel: &str, key_file: bool, aws_kms_key_id: bool) -> Result<(), String> {
    match (key_file, aws_kms_key_id) {
        (false, false) => Err(format!(
            "Either --signer.{channel}-key-file or --signer.{channel}-aws-kms-key-id is required"
        )),
        (true, true) => Err(format!("Cannot specify more than one {channel} signer key source")),
        _ => Ok(()),
    }
}

async fn load_signer(
    channel: &str,
    key_file: Option<&PathBuf>,
    aws_kms_key_id: Option<&String>,
    chain_id: u64,
) -> eyre::Result<ChannelSigner> {
    let signer = if let Some(path) = key_file {
        ChannelSigner::from_key_file(path, chain_id)?
    } else if let Some(key_id) = aws_kms_key_id {
        ChannelSigner::from_aws_kms(key_id.clone(), chain_id).await?
    } else {
        eyre::bail!("no {channel} signer configured")
    };

    tracing::info!(target: "settlement::node", channel, address = %signer.address(), chain_id, "created signer");
    Ok(signer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const BASE: [&str; 6] = [
        "settlement-node",
        "run",
        "--chain-id",
        "5",
        "--signer.commit-key-file",
        "/keys/commit",
    ];

    fn parse(extra: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(BASE.iter().chain(extra))
    }

    fn run_args(cli: Cli) -> SettlementArgs {
        match cli.command {
            Command::Run(args) => args,
            command => panic!("expected run, got {command:?}"),
        }
    }

    #[test]
    fn test_run_defaults() {
        let args = run_args(parse(&["--signer.verify-aws-kms-key-id", "key"]).unwrap());
        args.validate().unwrap();

        assert_eq!(args.chain_id, 5);
        assert_eq!(args.sys_config_args.rpc_key, "L1RpcEndpoint");
        assert_eq!(args.sys_config_args.contract_key, "RollupContract");
        assert!(args.l1_provider_args.url.is_none());

        let config = args.sender_args.sender_config(Address::ZERO, Address::ZERO, Address::ZERO);
        let defaults = SenderConfig::default();
        assert_eq!(config.max_block_count, defaults.max_block_count);
        assert_eq!(config.gas_limit, defaults.gas_limit);
        assert_eq!(config.gas_price, None);
        assert_eq!(config.max_waiting_time, defaults.max_waiting_time);
        assert_eq!(config.confirm_blocks_count, defaults.confirm_blocks_count);

        let service = args.sender_args.service_config();
        assert_eq!(service.commit_interval, ServiceConfig::default().commit_interval);
        assert_eq!(service.balance_interval, ServiceConfig::default().balance_interval);
    }

    #[test]
    fn test_sender_overrides() {
        let args = run_args(
            parse(&[
                "--signer.verify-key-file",
                "/keys/verify",
                "--sender.gas-price",
                "7000000000",
                "--sender.max-block-count",
                "8",
                "--sender.disable-verify-block",
                "--l1.url",
                "http://localhost:8545",
            ])
            .unwrap(),
        );
        args.validate().unwrap();

        let config = args.sender_args.sender_config(Address::ZERO, Address::ZERO, Address::ZERO);
        assert_eq!(config.gas_price, Some(7_000_000_000));
        assert_eq!(config.max_block_count, 8);
        assert!(config.disable_verify_block);
        assert!(!config.disable_commit_block);
        assert!(args.l1_provider_args.url.is_some());
    }

    #[test]
    fn test_signer_validation() {
        let args = run_args(parse(&[]).unwrap());
        assert!(args.validate().unwrap_err().contains("--signer.verify-key-file"));

        let args = run_args(
            parse(&[
                "--signer.verify-key-file",
                "/keys/verify",
                "--signer.commit-aws-kms-key-id",
                "key",
            ])
            .unwrap(),
        );
        assert_eq!(
            args.validate().unwrap_err(),
            "Cannot specify more than one commit signer key source"
        );

        let args = run_args(
            parse(&["--signer.verify-key-file", "/keys/verify", "--sender.max-block-count", "0"])
                .unwrap(),
        );
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_rollback_requires_height() {
        let cli = Cli::try_parse_from([
            "settlement-node",
            "rollback",
            "--rollback.enable",
            "--signer.commit-key-file",
            "/keys/commit",
            "--signer.verify-key-file",
            "/keys/verify",
            "--chain-id",
            "5",
            "--rollback.height",
            "3",
            "--tree.rollback-command",
            "/bin/tree",
            "--tree.rollback-arg",
            "--data-dir=/data",
        ])
        .unwrap();
        let Command::Rollback(args) = cli.command else { panic!("expected rollback") };
        args.validate().unwrap();
        assert_eq!(args.height, 3);
        assert_eq!(args.tree_args, vec!["--data-dir=/data".to_string()]);

        assert!(Cli::try_parse_from([
            "settlement-node",
            "rollback",
            "--chain-id",
            "5",
            "--tree.rollback-command",
            "/bin/tree",
        ])
        .is_err());
    }

    #[test]
    fn test_rollback_requires_enable() {
        let cli = Cli::try_parse_from([
            "settlement-node",
            "rollback",
            "--signer.commit-key-file",
            "/keys/commit",
            "--signer.verify-key-file",
            "/keys/verify",
            "--chain-id",
            "5",
            "--rollback.height",
            "3",
            "--tree.rollback-command",
            "/bin/tree",
        ])
        .unwrap();
        let Command::Rollback(args) = cli.command else { panic!("expected rollback") };
        assert!(!args.enable);
        assert!(args.validate().unwrap_err().contains("--rollback.enable"));
    }

    #[tokio::test]
    async fn test_signers_must_be_distinct() {
        let dir = std::env::temp_dir();
        let write_key = |name: &str, byte: u8| {
            let path = dir.join(format!("settlement-{name}-{}", std::process::id()));
            std::fs::write(&path, alloy_primitives::hex::encode([byte; 32])).unwrap();
            path
        };
        let commit = write_key("commit", 0x21);
        let verify = write_key("verify", 0x22);

        let shared = SignerArgs {
            commit_key_file: Some(commit.clone()),
            verify_key_file: Some(commit.clone()),
            ..Default::default()
        };
        let err = shared.signers(1).await.unwrap_err();
        assert!(err.to_string().contains("distinct"));

        let distinct = SignerArgs {
            commit_key_file: Some(commit.clone()),
            verify_key_file: Some(verify.clone()),
            ..Default::default()
        };
        let (commit_signer, verify_signer) = distinct.signers(1).await.unwrap();
        assert_ne!(commit_signer.address(), verify_signer.address());

        std::fs::remove_file(commit).unwrap();
        std::fs::remove_file(verify).unwrap();
    }
}
