use crate::{
    error::SenderResult,
    submit::{broadcast, contiguous_from, BroadcastOutcome},
    SenderContext, SenderError, SubmitOutcome,
};

use settlement_db::DatabaseOperations;
use settlement_l1::{
    commit_block_info, commit_blocks_calldata, stored_block_info, ChainClient, StoredBlockInfo,
};
use settlement_primitives::{L1RollupTx, L1RollupTxType};
use std::sync::Arc;

/// Submits `commitBlocks` transactions for the compressed blocks following the last committed
/// height.
#[derive(Debug)]
pub struct CommitSubmitter<C> {
    ctx: Arc<SenderContext<C>>,
}

impl<C: ChainClient> CommitSubmitter<C> {
    /// Returns a new [`CommitSubmitter`].
    pub const fn new(ctx: Arc<SenderContext<C>>) -> Self {
        Self { ctx }
    }

    /// Runs a single commit cycle.
    ///
    /// At most one commit transaction is in flight: the cycle returns without touching the chain
    /// while the ledger holds a pending commit.
    pub async fn run_once(&self) -> SenderResult<SubmitOutcome> {
        let db = &self.ctx.database;
        let config = &self.ctx.config;

        if let Some(pending) = db.get_latest_pending_tx(L1RollupTxType::Commit).await? {
            tracing::trace!(
                target: "settlement::sender::commit",
                height = pending.l2_block_height,
                tx_hash = %pending.tx_hash,
                "commit transaction pending"
            );
            return Ok(SubmitOutcome::PendingTx);
        }

        let last_handled = db.get_latest_handled_tx(L1RollupTxType::Commit).await?;
        let start = last_handled.as_ref().map_or(1, |tx| tx.l2_block_height + 1);
        let end = start + config.max_block_count.saturating_sub(1);
        let blocks = db.get_compressed_blocks_between(start, end).await?;
        let blocks = contiguous_from(start, blocks, |block| block.height);
        let Some(last) = blocks.last() else {
            tracing::trace!(target: "settlement::sender::commit", start, "no blocks to commit");
            return Ok(SubmitOutcome::NothingToSubmit);
        };
        let height = last.height;

        let previous = match last_handled {
            Some(tx) => {
                let block = db
                    .get_block_by_height(tx.l2_block_height)
                    .await?
                    .ok_or(SenderError::MissingBlock(tx.l2_block_height))?;
                stored_block_info(&block)?
            }
            None => StoredBlockInfo::genesis(config.genesis_state_root),
        };
        let infos = blocks.iter().map(commit_block_info).collect::<Result<Vec<_>, _>>()?;
        let input = commit_blocks_calldata(previous, infos);

        tracing::debug!(target: "settlement::sender::commit", start, end = height, "committing blocks");
        let sent = match broadcast(&self.ctx, L1RollupTxType::Commit, input).await? {
            BroadcastOutcome::Sent(sent) => sent,
            BroadcastOutcome::CeilingExceeded { candidate, ceiling } => {
                return Ok(SubmitOutcome::GasCeilingExceeded { candidate, ceiling })
            }
        };

        let mut tx = L1RollupTx::pending(
            sent.tx_hash,
            L1RollupTxType::Commit,
            height,
            sent.nonce,
            sent.gas_price,
        );
        tx.id = Some(db.insert_l1_rollup_tx(tx.clone()).await?);
        self.ctx.metrics.record_broadcast(L1RollupTxType::Commit, height);

        tracing::info!(
            target: "settlement::sender::commit",
            start,
            height,
            tx_hash = %tx.tx_hash,
            "submitted commit transaction"
        );
        Ok(SubmitOutcome::Submitted(tx))
    }
}
