use crate::{error::SenderResult, SenderContext};

use alloy_primitives::U256;
use settlement_l1::ChainClient;
use std::sync::Arc;

/// Publishes the balances of the signer accounts.
#[derive(Debug)]
pub struct BalanceMonitor<C> {
    ctx: Arc<SenderContext<C>>,
}

impl<C: ChainClient> BalanceMonitor<C> {
    /// Returns a new [`BalanceMonitor`].
    pub const fn new(ctx: Arc<SenderContext<C>>) -> Self {
        Self { ctx }
    }

    /// Reads both signer balances and records them.
    pub async fn run_once(&self) -> SenderResult<(U256, U256)> {
        let config = &self.ctx.config;
        let commit = self.ctx.client.balance(config.commit_signer).await?;
        let verify = self.ctx.client.balance(config.verify_signer).await?;

        self.ctx.metrics.commit_signer_balance.set(as_gauge(commit));
        self.ctx.metrics.verify_signer_balance.set(as_gauge(verify));
        tracing::trace!(target: "settlement::sender", %commit, %verify, "signer balances");

        Ok((commit, verify))
    }
}

fn as_gauge(wei: U256) -> f64 {
    wei.saturating_to::<u128>() as f64
}
