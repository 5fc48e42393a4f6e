use crate::client::{ChainClient, ChainClientResult, L1Receipt, L1Transaction};

use alloy_consensus::TxReceipt as _;
use alloy_network::{ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::TransactionRequest;
use std::fmt;

/// A [`ChainClient`] backed by an alloy [`Provider`].
///
/// The provider is expected to carry a wallet holding a signer for every address the pipeline
/// sends from.
#[derive(Clone)]
pub struct AlloyChainClient<P> {
    /// The L1 provider.
    provider: P,
    /// The L1 chain id, used for replay protection of legacy transactions.
    chain_id: u64,
}

impl<P> AlloyChainClient<P> {
    /// Returns a new [`AlloyChainClient`].
    pub const fn new(provider: P, chain_id: u64) -> Self {
        Self { provider, chain_id }
    }
}

impl<P> fmt::Debug for AlloyChainClient<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlloyChainClient").field("chain_id", &self.chain_id).finish()
    }
}

#[async_trait::async_trait]
impl<P> ChainClient for AlloyChainClient<P>
where
    P: Provider + Send + Sync,
{
    async fn pending_nonce(&self, address: Address) -> ChainClientResult<u64> {
        Ok(self.provider.get_transaction_count(address).pending().await?)
    }

    async fn suggested_gas_price(&self) -> ChainClientResult<u128> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn balance(&self, address: Address) -> ChainClientResult<U256> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> ChainClientResult<Option<L1Receipt>> {
        let Some(receipt) = self.provider.get_transaction_receipt(hash).await? else {
            return Ok(None);
        };
        // A receipt without a block is not mined yet.
        let Some(block_number) = receipt.block_number() else {
            return Ok(None);
        };

        Ok(Some(L1Receipt {
            tx_hash: receipt.transaction_hash(),
            status: receipt.status(),
            block_number,
            logs: receipt.inner.logs().iter().map(|log| log.inner.clone()).collect(),
        }))
    }

    async fn latest_block_number(&self) -> ChainClientResult<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn send_transaction(&self, tx: L1Transaction) -> ChainClientResult<TxHash> {
        tracing::trace!(target: "settlement::l1", from = %tx.from, nonce = tx.nonce, gas_price = tx.gas_price, "Sending transaction");
        let request = TransactionRequest::default()
            .with_from(tx.from)
            .with_to(tx.to)
            .with_input(tx.input)
            .with_gas_price(tx.gas_price)
            .with_gas_limit(tx.gas_limit)
            .with_nonce(tx.nonce)
            .with_chain_id(self.chain_id);

        let pending = self.provider.send_transaction(request).await?;
        Ok(*pending.tx_hash())
    }
}
