//! Test utilities for the L1 crate.

use crate::client::{ChainClient, ChainClientError, ChainClientResult, L1Receipt, L1Transaction};

use alloy_primitives::{keccak256, Address, Log, TxHash, U256};
use alloy_transport::TransportErrorKind;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// A scripted, in-memory [`ChainClient`].
///
/// Successful broadcasts bump the pending nonce of the sender and are recorded. Every trait call
/// is counted.
#[derive(Debug, Default)]
pub struct MockChainClient {
    state: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    nonces: HashMap<Address, u64>,
    balances: HashMap<Address, U256>,
    gas_price: u128,
    gas_price_unavailable: bool,
    latest_block: u64,
    receipts: HashMap<TxHash, L1Receipt>,
    auto_mine: Option<(u64, bool, Vec<Log>)>,
    send_errors: VecDeque<(ChainClientError, Option<u64>)>,
    sent: Vec<(TxHash, L1Transaction)>,
    calls: usize,
}

impl MockChainClient {
    /// Returns a new [`MockChainClient`] suggesting the provided gas price.
    pub fn new(gas_price: u128) -> Self {
        let client = Self::default();
        client.state.lock().gas_price = gas_price;
        client
    }

    /// Sets the suggested gas price.
    pub fn set_gas_price(&self, gas_price: u128) {
        self.state.lock().gas_price = gas_price;
    }

    /// Makes gas price suggestions fail until reset.
    pub fn set_gas_price_unavailable(&self, unavailable: bool) {
        self.state.lock().gas_price_unavailable = unavailable;
    }

    /// Sets the pending nonce of `address`.
    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.state.lock().nonces.insert(address, nonce);
    }

    /// Sets the balance of `address`.
    pub fn set_balance(&self, address: Address, balance: U256) {
        self.state.lock().balances.insert(address, balance);
    }

    /// Sets the latest L1 block number.
    pub fn set_latest_block(&self, number: u64) {
        self.state.lock().latest_block = number;
    }

    /// Mines the transaction in the provided block with the given status and logs.
    pub fn mine(&self, hash: TxHash, block_number: u64, status: bool, logs: Vec<Log>) {
        self.state
            .lock()
            .receipts
            .insert(hash, L1Receipt { tx_hash: hash, status, block_number, logs });
    }

    /// Mines every subsequent broadcast in the provided block with the given status and logs.
    pub fn auto_mine(&self, block_number: u64, status: bool, logs: Vec<Log>) {
        self.state.lock().auto_mine = Some((block_number, status, logs));
    }

    /// Queues an error to be returned by the next broadcast.
    pub fn push_send_error(&self, error: ChainClientError) {
        self.state.lock().send_errors.push_back((error, None));
    }

    /// Queues an error to be returned by the next broadcast, after which the pending nonce of the
    /// sender is `nonce`, as if another transaction of the account was accepted meanwhile.
    pub fn push_send_error_with_nonce(&self, error: ChainClientError, nonce: u64) {
        self.state.lock().send_errors.push_back((error, Some(nonce)));
    }

    /// Returns the hashes and contents of all broadcast transactions.
    pub fn sent_transactions(&self) -> Vec<(TxHash, L1Transaction)> {
        self.state.lock().sent.clone()
    }

    /// Returns the number of calls made to the client.
    pub fn calls(&self) -> usize {
        self.state.lock().calls
    }
}

#[async_trait::async_trait]
impl ChainClient for MockChainClient {
    async fn pending_nonce(&self, address: Address) -> ChainClientResult<u64> {
        let mut state = self.state.lock();
        state.calls += 1;
        Ok(state.nonces.get(&address).copied().unwrap_or_default())
    }

    async fn suggested_gas_price(&self) -> ChainClientResult<u128> {
        let mut state = self.state.lock();
        state.calls += 1;
        if state.gas_price_unavailable {
            return Err(TransportErrorKind::custom_str("gas price unavailable").into());
        }
        Ok(state.gas_price)
    }

    async fn balance(&self, address: Address) -> ChainClientResult<U256> {
        let mut state = self.state.lock();
        state.calls += 1;
        Ok(state.balances.get(&address).copied().unwrap_or_default())
    }

    async fn transaction_receipt(&self, hash: TxHash) -> ChainClientResult<Option<L1Receipt>> {
        let mut state = self.state.lock();
        state.calls += 1;
        Ok(state.receipts.get(&hash).cloned())
    }

    async fn latest_block_number(&self) -> ChainClientResult<u64> {
        let mut state = self.state.lock();
        state.calls += 1;
        Ok(state.latest_block)
    }

    async fn send_transaction(&self, tx: L1Transaction) -> ChainClientResult<TxHash> {
        let mut state = self.state.lock();
        state.calls += 1;
        if let Some((error, nonce)) = state.send_errors.pop_front() {
            if let Some(nonce) = nonce {
                state.nonces.insert(tx.from, nonce);
            }
            return Err(error);
        }

        let mut preimage = tx.from.to_vec();
        preimage.extend_from_slice(&tx.nonce.to_be_bytes());
        preimage.extend_from_slice(&tx.gas_price.to_be_bytes());
        preimage.extend_from_slice(&tx.input);
        let hash = keccak256(preimage);

        let nonce = state.nonces.entry(tx.from).or_default();
        *nonce = (*nonce).max(tx.nonce + 1);
        state.sent.push((hash, tx));
        if let Some((block_number, status, logs)) = state.auto_mine.clone() {
            state.receipts.insert(hash, L1Receipt { tx_hash: hash, status, block_number, logs });
        }
        Ok(hash)
    }
}
