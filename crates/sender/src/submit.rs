use crate::{
    error::SenderResult,
    gas::{GasDecision, GasEscalation, GasEscalationPolicy},
    SenderContext, SenderError,
};

use alloy_primitives::{Bytes, TxHash};
use settlement_db::DatabaseOperations;
use settlement_l1::{ChainClient, L1Transaction};
use settlement_primitives::L1RollupTxType;

/// A transaction accepted by the L1 node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Broadcast {
    pub(crate) tx_hash: TxHash,
    pub(crate) nonce: u64,
    pub(crate) gas_price: u128,
}

/// The outcome of a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BroadcastOutcome {
    /// The transaction was accepted.
    Sent(Broadcast),
    /// The price required to be accepted is above the ceiling.
    CeilingExceeded { candidate: u128, ceiling: u128 },
}

/// Broadcasts `input` to the rollup contract from the signer of the channel.
///
/// The price starts at the configured or suggested price. When the ledger holds a transaction of
/// the channel at the pending nonce, including an abandoned one, the broadcast replaces it. Every
/// underpriced rejection bumps the price until the ceiling or the attempt budget is reached.
pub(crate) async fn broadcast<C: ChainClient>(
    ctx: &SenderContext<C>,
    tx_type: L1RollupTxType,
    input: Bytes,
) -> SenderResult<BroadcastOutcome> {
    let config = &ctx.config;
    let from = config.signer(tx_type);

    let base_price = match config.gas_price {
        Some(price) => price,
        None => ctx.client.suggested_gas_price().await?,
    };
    let nonce = ctx.client.pending_nonce(from).await?;
    let previous = ctx.database.get_tx_by_nonce(tx_type, nonce).await?;
    if let Some(previous) = &previous {
        tracing::info!(
            target: "settlement::sender",
            tx_type = tx_type.as_str(),
            nonce,
            previous_hash = %previous.tx_hash,
            previous_gas_price = previous.gas_price,
            "replacing transaction at pending nonce"
        );
    }

    let policy = GasEscalationPolicy::new(config.max_gas_price_increase_percentage);
    let mut escalation = GasEscalation::start(
        policy,
        base_price,
        previous.map(|tx| tx.gas_price),
        config.max_replacement_attempts,
    );

    loop {
        let gas_price = match escalation.next_decision() {
            GasDecision::Broadcast(price) => price,
            GasDecision::CeilingExceeded { candidate, ceiling } => {
                tracing::warn!(
                    target: "settlement::sender",
                    tx_type = tx_type.as_str(),
                    nonce,
                    candidate,
                    ceiling,
                    "gas price above ceiling, skipping cycle"
                );
                ctx.metrics.ceiling_aborts.increment(1);
                return Ok(BroadcastOutcome::CeilingExceeded { candidate, ceiling });
            }
            GasDecision::Exhausted(attempts) => {
                return Err(SenderError::GasEscalationExhausted(attempts))
            }
        };

        let tx = L1Transaction {
            from,
            to: config.rollup_contract,
            input: input.clone(),
            gas_price,
            gas_limit: config.gas_limit,
            nonce,
        };

        match ctx.client.send_transaction(tx).await {
            Ok(tx_hash) => {
                tracing::info!(
                    target: "settlement::sender",
                    tx_type = tx_type.as_str(),
                    %tx_hash,
                    nonce,
                    gas_price,
                    attempts = escalation.attempts(),
                    "broadcast rollup transaction"
                );
                return Ok(BroadcastOutcome::Sent(Broadcast { tx_hash, nonce, gas_price }));
            }
            Err(err) if err.is_underpriced() => {
                tracing::debug!(
                    target: "settlement::sender",
                    tx_type = tx_type.as_str(),
                    nonce,
                    gas_price,
                    "transaction underpriced"
                );
                let current = ctx.client.pending_nonce(from).await?;
                if current != nonce {
                    return Err(SenderError::NonceChanged { expected: nonce, got: current });
                }
                ctx.metrics.replacements.increment(1);
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Returns the leading items with consecutive heights starting at `start`.
pub(crate) fn contiguous_from<T>(start: u64, items: Vec<T>, height: impl Fn(&T) -> u64) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .take_while(|(i, item)| height(item) == start + *i as u64)
        .map(|(_, item)| item)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_from_stops_at_gap() {
        assert_eq!(contiguous_from(2, vec![2, 3, 5], |h| *h), vec![2, 3]);
        assert_eq!(contiguous_from(1, vec![1, 2, 3], |h| *h), vec![1, 2, 3]);
        assert!(contiguous_from(3, vec![4], |h| *h).is_empty());
    }
}
