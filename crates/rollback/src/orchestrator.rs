use crate::{RollbackError, TreeStorage};

use alloy_primitives::TxHash;
use settlement_db::DatabaseOperations;
use settlement_l1::{
    revert_blocks_calldata, stored_block_info, ChainClient, L1Receipt, L1Transaction, RollupEvent,
};
use settlement_primitives::{BlockStatus, L1RollupTxType};
use settlement_sender::SenderContext;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// The default interval between receipt polls of the revert transaction.
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// A summary of a completed rollback.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RollbackReport {
    /// The revert transaction, if committed blocks were reverted on L1.
    pub revert_tx: Option<TxHash>,
    /// The number of commit transactions purged from the ledger.
    pub purged_txs: u64,
    /// The number of proofs deleted.
    pub deleted_proofs: u64,
    /// The number of block witnesses deleted.
    pub deleted_witnesses: u64,
}

/// Undoes the blocks at or above a target height, on L1 and locally.
///
/// The rollback is a sequence of steps, each completed before the next starts:
/// 1. revert the committed blocks on L1
/// 2. purge the commit ledger
/// 3. reset the blocks to pending
/// 4. purge the proofs
/// 5. roll the tree storage back to the previous height
/// 6. purge the block witnesses
/// 7. reset the blocks to proposing
///
/// Verified and executed blocks are final on L1, so a target height at or below one is refused
/// before any step runs. A failing step aborts the rollback. Every step is a no-op when already applied, so an aborted
/// rollback is resumed by running it again with the same height. No submission task may run
/// concurrently.
#[derive(Debug)]
pub struct RollbackOrchestrator<C, T> {
    ctx: Arc<SenderContext<C>>,
    tree: T,
    poll_interval: Duration,
}

impl<C: ChainClient, T: TreeStorage> RollbackOrchestrator<C, T> {
    /// Returns a new [`RollbackOrchestrator`].
    pub const fn new(ctx: Arc<SenderContext<C>>, tree: T) -> Self {
        Self { ctx, tree, poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL }
    }

    /// Sets the interval between receipt polls of the revert transaction.
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Rolls back every block at or above `height`.
    pub async fn run(&self, height: u64) -> Result<RollbackReport, RollbackError> {
        if height == 0 {
            return Err(RollbackError::ZeroHeight);
        }
        let db = &self.ctx.database;
        if let Some(block) =
            db.get_first_block_ge_with_status(height, BlockStatus::VerifiedAndExecuted).await?
        {
            tracing::error!(target: "settlement::rollback", height, verified = block.height, "refusing to roll back verified blocks");
            return Err(RollbackError::VerifiedBlock { height: block.height });
        }
        let mut report = RollbackReport::default();

        tracing::info!(target: "settlement::rollback", height, "step 1: reverting committed blocks on L1");
        report.revert_tx = self.revert_on_chain(height).await?;

        tracing::info!(target: "settlement::rollback", height, "step 2: purging commit transactions");
        report.purged_txs = db.delete_l1_rollup_txs_ge(L1RollupTxType::Commit, height).await?;

        tracing::info!(target: "settlement::rollback", height, "step 3: resetting blocks to pending");
        db.set_block_status_ge(height, BlockStatus::Pending).await?;

        tracing::info!(target: "settlement::rollback", height, "step 4: purging proofs");
        report.deleted_proofs = db.delete_proofs_ge(height).await?;

        tracing::info!(target: "settlement::rollback", height = height - 1, "step 5: rolling back tree storage");
        self.tree.rollback_to(height - 1).await?;

        tracing::info!(target: "settlement::rollback", height, "step 6: purging block witnesses");
        report.deleted_witnesses = db.delete_block_witnesses_ge(height).await?;

        tracing::info!(target: "settlement::rollback", height, "step 7: resetting blocks to proposing");
        db.set_block_status_ge(height, BlockStatus::Proposing).await?;

        tracing::info!(target: "settlement::rollback", height, ?report, "rollback complete");
        Ok(report)
    }

    /// Sends a single `revertBlocks` call covering the committed blocks at or above `height`,
    /// highest first, and waits for its confirmation.
    async fn revert_on_chain(&self, height: u64) -> Result<Option<TxHash>, RollbackError> {
        let config = &self.ctx.config;
        let client = &self.ctx.client;

        let blocks = self.ctx.database.get_committed_blocks_ge(height).await?;
        if blocks.is_empty() {
            tracing::info!(target: "settlement::rollback", height, "no committed blocks to revert");
            return Ok(None);
        }
        let headers = blocks.iter().rev().map(stored_block_info).collect::<Result<Vec<_>, _>>()?;

        let from = config.signer(L1RollupTxType::Commit);
        let nonce = client.pending_nonce(from).await?;
        let gas_price = match config.gas_price {
            Some(price) => price,
            None => client.suggested_gas_price().await?,
        };
        let tx_hash = client
            .send_transaction(L1Transaction {
                from,
                to: config.rollup_contract,
                input: revert_blocks_calldata(headers),
                gas_price,
                gas_limit: config.gas_limit,
                nonce,
            })
            .await?;
        tracing::info!(
            target: "settlement::rollback",
            %tx_hash,
            nonce,
            gas_price,
            blocks = blocks.len(),
            "sent revert transaction"
        );

        let receipt = self.wait_for_receipt(tx_hash).await?;
        if !receipt.status {
            return Err(RollbackError::RevertFailed(tx_hash));
        }
        for event in RollupEvent::decode_all(&receipt.logs, config.rollup_contract) {
            if let RollupEvent::BlocksRevert { total_verified, total_committed } = event {
                tracing::info!(target: "settlement::rollback", total_verified, total_committed, "blocks reverted");
            }
        }

        Ok(Some(tx_hash))
    }

    /// Polls the receipt of `tx_hash` until it is final or fails, bounded by the maximum waiting
    /// time.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<L1Receipt, RollbackError> {
        let config = &self.ctx.config;
        let started = Instant::now();

        loop {
            if let Some(receipt) = self.ctx.client.transaction_receipt(tx_hash).await? {
                if !receipt.status {
                    return Ok(receipt);
                }
                let latest = self.ctx.client.latest_block_number().await?;
                if latest >= receipt.block_number.saturating_add(config.confirm_blocks_count) {
                    return Ok(receipt);
                }
            }

            let waited = started.elapsed();
            if waited >= config.max_waiting_time {
                return Err(RollbackError::RevertTimeout { tx_hash, waited });
            }
            tracing::debug!(target: "settlement::rollback", %tx_hash, ?waited, "waiting for revert confirmation");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
