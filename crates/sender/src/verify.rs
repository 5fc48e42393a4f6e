use crate::{
    error::SenderResult,
    submit::{broadcast, contiguous_from, BroadcastOutcome},
    FatalIntegrityError, SenderContext, SenderError, SubmitOutcome,
};

use settlement_db::DatabaseOperations;
use settlement_l1::{
    flatten_proofs, verify_and_execute_block_info, verify_and_execute_blocks_calldata,
    ChainClient,
};
use settlement_primitives::{Block, L1RollupTx, L1RollupTxType, Proof};
use std::sync::Arc;

/// Submits `verifyAndExecuteBlocks` transactions for committed blocks with proofs.
#[derive(Debug)]
pub struct VerifySubmitter<C> {
    ctx: Arc<SenderContext<C>>,
}

impl<C: ChainClient> VerifySubmitter<C> {
    /// Returns a new [`VerifySubmitter`].
    pub const fn new(ctx: Arc<SenderContext<C>>) -> Self {
        Self { ctx }
    }

    /// Runs a single verify and execute cycle.
    pub async fn run_once(&self) -> SenderResult<SubmitOutcome> {
        let db = &self.ctx.database;
        let config = &self.ctx.config;
        let tx_type = L1RollupTxType::VerifyAndExecute;

        if let Some(pending) = db.get_latest_pending_tx(tx_type).await? {
            tracing::trace!(
                target: "settlement::sender::verify",
                height = pending.l2_block_height,
                tx_hash = %pending.tx_hash,
                "verify transaction pending"
            );
            return Ok(SubmitOutcome::PendingTx);
        }

        let start = db
            .get_latest_handled_tx(tx_type)
            .await?
            .map_or(1, |tx| tx.l2_block_height + 1);
        let end = start + config.max_block_count.saturating_sub(1);
        let blocks = db.get_committed_blocks_between(start, end).await?;
        let blocks = contiguous_from(start, blocks, |block| block.height);
        let Some(height) = blocks.last().map(|block| block.height) else {
            tracing::trace!(target: "settlement::sender::verify", start, "no committed blocks to verify");
            return Ok(SubmitOutcome::NothingToSubmit);
        };

        let proofs = db.get_proofs_between(start, height).await?;
        check_proofs(start, height, &blocks, &proofs)?;

        let proofs = flatten_proofs(&proofs)?;
        let infos =
            blocks.iter().map(verify_and_execute_block_info).collect::<Result<Vec<_>, _>>()?;
        let input = verify_and_execute_blocks_calldata(infos, proofs);

        tracing::debug!(target: "settlement::sender::verify", start, end = height, "verifying blocks");
        let sent = match broadcast(&self.ctx, tx_type, input).await? {
            BroadcastOutcome::Sent(sent) => sent,
            BroadcastOutcome::CeilingExceeded { candidate, ceiling } => {
                return Ok(SubmitOutcome::GasCeilingExceeded { candidate, ceiling })
            }
        };

        let mut tx = L1RollupTx::pending(sent.tx_hash, tx_type, height, sent.nonce, sent.gas_price);
        tx.id = Some(db.insert_l1_rollup_tx(tx.clone()).await?);
        self.ctx.metrics.record_broadcast(tx_type, height);

        tracing::info!(
            target: "settlement::sender::verify",
            start,
            height,
            tx_hash = %tx.tx_hash,
            "submitted verify and execute transaction"
        );
        Ok(SubmitOutcome::Submitted(tx))
    }
}

/// Checks that every block has its proof at the same position.
fn check_proofs(start: u64, end: u64, blocks: &[Block], proofs: &[Proof]) -> SenderResult<()> {
    if proofs.len() != blocks.len() {
        return Err(SenderError::ProofsNotReady {
            start,
            end,
            blocks: blocks.len(),
            proofs: proofs.len(),
        });
    }

    for (index, (block, proof)) in blocks.iter().zip(proofs).enumerate() {
        if block.height != proof.height {
            return Err(FatalIntegrityError::ProofMismatch {
                index,
                block_height: block.height,
                proof_height: proof.height,
            }
            .into());
        }
    }
    Ok(())
}
