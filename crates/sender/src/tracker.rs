use crate::{error::SenderResult, FatalIntegrityError, SenderContext};

use settlement_db::DatabaseOperations;
use settlement_l1::{ChainClient, L1Receipt, RollupEvent};
use settlement_primitives::{unix_timestamp, L1RollupTx, L1RollupTxType};
use std::sync::Arc;

/// The result of a confirmation cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrackerReport {
    /// The number of transactions confirmed.
    pub confirmed: usize,
    /// The number of transactions abandoned after the waiting time.
    pub abandoned: usize,
    /// The number of transactions still pending.
    pub pending: usize,
}

/// The state of a pending transaction on L1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    /// Final and matched by the expected event.
    Confirmed,
    /// Not final yet, or not provably applied.
    Pending,
    /// Not mined within the waiting time and no longer known to the node.
    Abandoned,
    /// Mined with a failed status.
    Reverted,
}

/// Confirms pending rollup transactions and moves the blocks they carry forward.
#[derive(Debug)]
pub struct ConfirmationTracker<C> {
    ctx: Arc<SenderContext<C>>,
}

impl<C: ChainClient> ConfirmationTracker<C> {
    /// Returns a new [`ConfirmationTracker`].
    pub const fn new(ctx: Arc<SenderContext<C>>) -> Self {
        Self { ctx }
    }

    /// Runs a single confirmation cycle.
    ///
    /// The chain is read first and every resulting ledger, block and proof update is applied in
    /// a single database transaction. A reverted transaction is removed from the ledger and
    /// reported as a [`FatalIntegrityError`] once the updates of the cycle are committed.
    pub async fn run_once(&self) -> SenderResult<TrackerReport> {
        let pending = self.ctx.database.get_pending_txs().await?;
        if pending.is_empty() {
            return Ok(TrackerReport::default());
        }

        let latest = self.ctx.client.latest_block_number().await?;
        let mut report = TrackerReport::default();
        let mut updates = Vec::with_capacity(pending.len());
        for tx in pending {
            let state = self.check(&tx, latest).await?;
            match state {
                TxState::Pending => report.pending += 1,
                TxState::Confirmed => report.confirmed += 1,
                TxState::Abandoned => report.abandoned += 1,
                TxState::Reverted => {}
            }
            if state != TxState::Pending {
                updates.push((tx, state));
            }
            if state == TxState::Reverted {
                break;
            }
        }

        self.apply(&updates).await?;

        for (tx, state) in &updates {
            match state {
                TxState::Confirmed => {
                    self.ctx.metrics.record_confirmation(tx.tx_type, tx.l2_block_height)
                }
                TxState::Abandoned => self.ctx.metrics.timed_out_txs.increment(1),
                TxState::Reverted => {
                    self.ctx.metrics.record_exception(tx.tx_type, tx.l2_block_height);
                    return Err(FatalIntegrityError::ReceiptReverted {
                        tx_hash: tx.tx_hash,
                        tx_type: tx.tx_type,
                        height: tx.l2_block_height,
                    }
                    .into());
                }
                TxState::Pending => {}
            }
        }

        Ok(report)
    }

    /// Determines the state of a pending transaction from the chain.
    async fn check(&self, tx: &L1RollupTx, latest: u64) -> SenderResult<TxState> {
        let config = &self.ctx.config;
        let receipt = match self.ctx.client.transaction_receipt(tx.tx_hash).await {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::warn!(
                    target: "settlement::sender::tracker",
                    tx_hash = %tx.tx_hash,
                    ?err,
                    "failed to fetch receipt"
                );
                None
            }
        };

        let Some(receipt) = receipt else {
            let age = unix_timestamp().saturating_sub(tx.created_at);
            if age <= config.max_waiting_time.as_secs() {
                return Ok(TxState::Pending);
            }
            return self.check_timed_out(tx, age).await;
        };

        if !receipt.status {
            tracing::error!(
                target: "settlement::sender::tracker",
                tx_type = tx.tx_type.as_str(),
                tx_hash = %tx.tx_hash,
                height = tx.l2_block_height,
                block_number = receipt.block_number,
                "rollup transaction reverted"
            );
            return Ok(TxState::Reverted);
        }

        if latest < receipt.block_number.saturating_add(config.confirm_blocks_count) {
            tracing::trace!(
                target: "settlement::sender::tracker",
                tx_hash = %tx.tx_hash,
                block_number = receipt.block_number,
                latest,
                "waiting for confirmations"
            );
            return Ok(TxState::Pending);
        }

        if !self.emitted_expected_event(tx, &receipt) {
            tracing::warn!(
                target: "settlement::sender::tracker",
                tx_type = tx.tx_type.as_str(),
                tx_hash = %tx.tx_hash,
                height = tx.l2_block_height,
                "receipt carries no matching rollup event"
            );
            self.ctx.metrics.record_exception(tx.tx_type, tx.l2_block_height);
            return Ok(TxState::Pending);
        }

        Ok(TxState::Confirmed)
    }

    /// Decides the fate of a transaction that outlived the waiting time without a receipt.
    ///
    /// The transaction is kept while the signer's pending nonce is past its nonce, since it was
    /// then mined or is still known to the node. Otherwise it is abandoned and the next
    /// submission at this nonce replaces it.
    async fn check_timed_out(&self, tx: &L1RollupTx, age: u64) -> SenderResult<TxState> {
        let signer = self.ctx.config.signer(tx.tx_type);
        let pending_nonce = self.ctx.client.pending_nonce(signer).await?;
        if pending_nonce > tx.nonce {
            tracing::warn!(
                target: "settlement::sender::tracker",
                tx_hash = %tx.tx_hash,
                nonce = tx.nonce,
                pending_nonce,
                age,
                "transaction past waiting time but its nonce is used, keeping"
            );
            self.ctx.metrics.record_exception(tx.tx_type, tx.l2_block_height);
            return Ok(TxState::Pending);
        }

        tracing::warn!(
            target: "settlement::sender::tracker",
            tx_type = tx.tx_type.as_str(),
            tx_hash = %tx.tx_hash,
            nonce = tx.nonce,
            age,
            "abandoning transaction past waiting time"
        );
        Ok(TxState::Abandoned)
    }

    /// Returns true if the receipt carries the event expected for the transaction.
    fn emitted_expected_event(&self, tx: &L1RollupTx, receipt: &L1Receipt) -> bool {
        RollupEvent::decode_all(&receipt.logs, self.ctx.config.rollup_contract).into_iter().any(
            |event| match (tx.tx_type, event) {
                (L1RollupTxType::Commit, RollupEvent::BlockCommit(height)) |
                (L1RollupTxType::VerifyAndExecute, RollupEvent::BlockVerification(height)) => {
                    height == tx.l2_block_height
                }
                _ => false,
            },
        )
    }

    /// Applies the updates of a cycle atomically.
    async fn apply(&self, updates: &[(L1RollupTx, TxState)]) -> SenderResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let now = unix_timestamp();
        let db_tx = self.ctx.database.tx().await?;
        for (tx, state) in updates {
            let Some(id) = tx.id else { continue };
            match state {
                TxState::Confirmed => {
                    db_tx.mark_l1_rollup_tx_handled(id).await?;
                    match tx.tx_type {
                        L1RollupTxType::Commit => {
                            db_tx.mark_blocks_committed(tx.l2_block_height, tx.tx_hash, now).await?;
                        }
                        L1RollupTxType::VerifyAndExecute => {
                            db_tx.mark_blocks_verified(tx.l2_block_height, tx.tx_hash, now).await?;
                            db_tx.confirm_proofs_le(tx.l2_block_height).await?;
                        }
                    }
                    tracing::info!(
                        target: "settlement::sender::tracker",
                        tx_type = tx.tx_type.as_str(),
                        tx_hash = %tx.tx_hash,
                        height = tx.l2_block_height,
                        "confirmed rollup transaction"
                    );
                }
                TxState::Abandoned => db_tx.soft_delete_l1_rollup_tx(id).await?,
                TxState::Reverted => db_tx.delete_l1_rollup_tx(id).await?,
                TxState::Pending => {}
            }
        }
        db_tx.commit().await?;
        Ok(())
    }
}
