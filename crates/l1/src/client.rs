use alloy_json_rpc::RpcError;
use alloy_primitives::{Address, Bytes, Log, TxHash, U256};
use alloy_transport::TransportErrorKind;
use std::fmt::Debug;

/// A [`Result`] that uses [`ChainClientError`] as the error type.
pub type ChainClientResult<T> = Result<T, ChainClientError>;

/// An error returned by a [`ChainClient`].
#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    /// A Provider error at the RPC level.
    #[error("l1 rpc error: {0:?}")]
    Rpc(RpcError<TransportErrorKind>),
    /// The node refused a transaction because it would replace a pending one at the same nonce
    /// without paying enough.
    #[error("replacement transaction underpriced")]
    ReplacementUnderpriced,
    /// No signer is registered for the sending address.
    #[error("no signer registered for {0}")]
    UnknownSigner(Address),
}

impl ChainClientError {
    /// Returns true if the error asks for a higher gas price at the same nonce.
    pub const fn is_underpriced(&self) -> bool {
        matches!(self, Self::ReplacementUnderpriced)
    }
}

impl From<RpcError<TransportErrorKind>> for ChainClientError {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        if let RpcError::ErrorResp(payload) = &err {
            if payload.message.to_ascii_lowercase().contains("underpriced") {
                return Self::ReplacementUnderpriced;
            }
        }
        Self::Rpc(err)
    }
}

/// A legacy transaction to be signed and broadcast to L1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L1Transaction {
    /// The sending account, which must be backed by a signer of the client.
    pub from: Address,
    /// The rollup contract.
    pub to: Address,
    /// The ABI encoded call.
    pub input: Bytes,
    /// The gas price.
    pub gas_price: u128,
    /// The gas limit.
    pub gas_limit: u64,
    /// The account nonce.
    pub nonce: u64,
}

/// The subset of an L1 transaction receipt the pipeline relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L1Receipt {
    /// The transaction hash.
    pub tx_hash: TxHash,
    /// Whether the transaction succeeded. A mined transaction with a false status reverted.
    pub status: bool,
    /// The L1 block the transaction was included in.
    pub block_number: u64,
    /// The logs emitted by the transaction.
    pub logs: Vec<Log>,
}

/// The L1 chain as seen by the settlement pipeline.
///
/// Transactions are signed by the client, for instance by a key management service, so no
/// private key needs to be held by the caller.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait ChainClient: Send + Sync + Debug {
    /// Returns the next nonce to use for `address`, pending transactions included.
    async fn pending_nonce(&self, address: Address) -> ChainClientResult<u64>;

    /// Returns the gas price suggested by the node.
    async fn suggested_gas_price(&self) -> ChainClientResult<u128>;

    /// Returns the balance of `address`.
    async fn balance(&self, address: Address) -> ChainClientResult<U256>;

    /// Returns the receipt of the transaction, or `None` if it is not mined yet.
    async fn transaction_receipt(&self, hash: TxHash) -> ChainClientResult<Option<L1Receipt>>;

    /// Returns the latest L1 block number.
    async fn latest_block_number(&self) -> ChainClientResult<u64>;

    /// Signs and broadcasts the transaction, returning its hash.
    async fn send_transaction(&self, tx: L1Transaction) -> ChainClientResult<TxHash>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_json_rpc::ErrorPayload;

    fn error_response(message: &'static str) -> RpcError<TransportErrorKind> {
        RpcError::ErrorResp(ErrorPayload { code: -32000, message: message.into(), data: None })
    }

    #[test]
    fn test_underpriced_classification() {
        let err: ChainClientError = error_response("replacement transaction underpriced").into();
        assert!(err.is_underpriced());

        let err: ChainClientError = error_response("transaction underpriced").into();
        assert!(err.is_underpriced());

        let err: ChainClientError = error_response("nonce too low").into();
        assert!(matches!(err, ChainClientError::Rpc(_)));

        let err: ChainClientError = TransportErrorKind::custom_str("connection refused").into();
        assert!(!err.is_underpriced());
    }
}
