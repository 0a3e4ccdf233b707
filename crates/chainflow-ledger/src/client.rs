//! LedgerClient - JSON-RPC client for the target network

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chainflow_primitives::{Address, H256, U256};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::abi::Token;
use crate::interface::Interface;
use crate::transport::{deserialize_response, MockTransport, Transport};
use crate::types::{BlockId, CallRequest, TransactionReceipt};
use crate::LedgerError;

#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Client for the ledger network's JSON-RPC endpoint
pub struct LedgerClient {
    transport: Arc<dyn Transport>,
    chain_id: OnceCell<u64>,
}

impl LedgerClient {
    /// Create a client over HTTP. No request is made until first use.
    #[cfg(feature = "http")]
    pub fn http(url: &str, timeout: Duration) -> Result<Self, LedgerError> {
        Ok(Self::with_transport(HttpTransport::new(url, timeout)?))
    }

    /// Create a new client with mock transport (for testing)
    pub fn new_mock() -> Self {
        Self::with_transport(MockTransport::new())
    }

    /// Create a client with a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            chain_id: OnceCell::new(),
        }
    }

    /// Pin the chain id instead of asking the node
    pub fn with_chain_id(self, chain_id: u64) -> Self {
        Self {
            transport: self.transport,
            chain_id: OnceCell::new_with(Some(chain_id)),
        }
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, LedgerError> {
        debug!(method, "rpc request");
        let value = self.transport.request_json(method, params).await?;
        deserialize_response(value)
    }

    // ==================== Chain Info ====================

    /// Get the chain ID (cached after the first successful lookup)
    pub async fn chain_id(&self) -> Result<u64, LedgerError> {
        self.chain_id
            .get_or_try_init(|| async {
                let result: String = self.request("eth_chainId", vec![]).await?;
                parse_hex_u64(&result)
            })
            .await
            .copied()
    }

    /// Get the current gas price
    pub async fn gas_price(&self) -> Result<U256, LedgerError> {
        let result: String = self.request("eth_gasPrice", vec![]).await?;
        parse_hex_u256(&result)
    }

    /// Get the current block number
    pub async fn block_number(&self) -> Result<u64, LedgerError> {
        let result: String = self.request("eth_blockNumber", vec![]).await?;
        parse_hex_u64(&result)
    }

    // ==================== Account Queries ====================

    /// Get the native balance of an address
    pub async fn get_balance(&self, address: &Address, block: BlockId) -> Result<U256, LedgerError> {
        let result: String = self
            .request(
                "eth_getBalance",
                vec![Value::String(address.to_hex()), serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_u256(&result)
    }

    /// Get the nonce (transaction count) of an address
    pub async fn get_nonce(&self, address: &Address, block: BlockId) -> Result<u64, LedgerError> {
        let result: String = self
            .request(
                "eth_getTransactionCount",
                vec![Value::String(address.to_hex()), serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_u64(&result)
    }

    // ==================== Call & Estimation ====================

    /// Execute a call (read-only, does not create transaction)
    pub async fn call(&self, request: &CallRequest, block: BlockId) -> Result<Bytes, LedgerError> {
        let result: String = self
            .request(
                "eth_call",
                vec![serde_json::to_value(request)?, serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_bytes(&result)
    }

    /// Call a view function on `contract` and decode its outputs
    pub async fn read(
        &self,
        contract: Address,
        interface: &Interface,
        function: &str,
        args: &[Token],
    ) -> Result<Vec<Token>, LedgerError> {
        let data = interface.encode_call(function, args)?;
        let output = self
            .call(&CallRequest::call(contract, data), BlockId::Latest)
            .await?;
        interface.decode_output(function, &output)
    }

    /// Estimate gas for a transaction
    pub async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, LedgerError> {
        let result: String = self
            .request("eth_estimateGas", vec![serde_json::to_value(request)?])
            .await?;
        parse_hex_u64(&result)
    }

    // ==================== Transactions ====================

    /// Broadcast a signed raw transaction, returning its hash
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<H256, LedgerError> {
        let hex = format!("0x{}", hex::encode(raw));
        let result: String = self
            .request("eth_sendRawTransaction", vec![Value::String(hex)])
            .await?;
        Ok(H256::from_hex(&result)?)
    }

    /// Get a transaction receipt, `None` while the transaction is pending
    pub async fn get_receipt(&self, hash: &H256) -> Result<Option<TransactionReceipt>, LedgerError> {
        let result: Value = self
            .request("eth_getTransactionReceipt", vec![Value::String(hash.to_hex())])
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        TransactionReceipt::from_json(result).map(Some)
    }

    /// Poll until the transaction is included.
    ///
    /// There is no internal timeout; the caller bounds the wait.
    pub async fn wait_for_receipt(
        &self,
        hash: &H256,
        poll_interval: Duration,
    ) -> Result<TransactionReceipt, LedgerError> {
        loop {
            if let Some(receipt) = self.get_receipt(hash).await? {
                return Ok(receipt);
            }
            debug!(tx_hash = %hash, "receipt not available yet");
            tokio::time::sleep(poll_interval).await;
        }
    }
}

impl std::fmt::Debug for LedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerClient")
            .field("chain_id", &self.chain_id.get())
            .finish_non_exhaustive()
    }
}

// ==================== Helper Functions ====================

pub(crate) fn parse_hex_u64(s: &str) -> Result<u64, LedgerError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).map_err(|e| LedgerError::InvalidHex(e.to_string()))
}

pub(crate) fn parse_hex_u256(s: &str) -> Result<U256, LedgerError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(s, 16).map_err(|e| LedgerError::InvalidHex(format!("{}: {:?}", s, e)))
}

pub(crate) fn parse_hex_bytes(s: &str) -> Result<Bytes, LedgerError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(Bytes::new());
    }
    let bytes = hex::decode(s)?;
    Ok(Bytes::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_mock_chain_id() {
        let client = LedgerClient::new_mock();
        assert_eq!(client.chain_id().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_client_pinned_chain_id_skips_rpc() {
        let transport = MockTransport::new();
        let client = LedgerClient::with_transport(transport.clone()).with_chain_id(50312);
        assert_eq!(client.chain_id().await.unwrap(), 50312);
        assert_eq!(transport.call_count("eth_chainId"), 0);
    }

    #[tokio::test]
    async fn test_client_chain_id_cached() {
        let transport = MockTransport::new();
        let client = LedgerClient::with_transport(transport.clone());
        client.chain_id().await.unwrap();
        client.chain_id().await.unwrap();
        assert_eq!(transport.call_count("eth_chainId"), 1);
    }

    #[tokio::test]
    async fn test_client_mock_gas_price() {
        let client = LedgerClient::new_mock();
        assert_eq!(client.gas_price().await.unwrap(), U256::from(1_000_000_000u64));
    }

    #[test]
    fn test_parse_hex_u64() {
        assert_eq!(parse_hex_u64("0x1").unwrap(), 1);
        assert_eq!(parse_hex_u64("0x100").unwrap(), 256);
        assert_eq!(parse_hex_u64("100").unwrap(), 256);
        assert!(parse_hex_u64("0xzz").is_err());
    }

    #[test]
    fn test_parse_hex_u256() {
        let result = parse_hex_u256("0xde0b6b3a7640000").unwrap();
        assert_eq!(result, U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(parse_hex_u256("0x").unwrap(), U256::zero());
    }

    #[test]
    fn test_parse_hex_bytes() {
        assert_eq!(parse_hex_bytes("0x1234").unwrap().as_ref(), &[0x12, 0x34]);
        assert!(parse_hex_bytes("0x").unwrap().is_empty());
    }
}
