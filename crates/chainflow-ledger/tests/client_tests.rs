//! Client integration tests for chainflow-ledger
//!
//! Exercises the client against the scripted mock transport.

use std::time::Duration;

use chainflow_ledger::abi::Token;
use chainflow_ledger::{abis, BlockId, CallRequest, LedgerClient, LedgerError, MockTransport};
use chainflow_primitives::{Address, H256, U256};
use serde_json::{json, Value};

fn word(value: u64) -> String {
    format!("0x{:064x}", value)
}

// ==================== Account Query Tests ====================

#[tokio::test]
async fn test_get_balance_default() {
    let client = LedgerClient::new_mock();
    let balance = client.get_balance(&Address::ZERO, BlockId::Latest).await.unwrap();
    assert_eq!(balance, U256::from(1_000_000_000_000_000_000u128));
}

#[tokio::test]
async fn test_get_nonce_uses_requested_block() {
    let transport = MockTransport::new();
    transport.set_response("eth_getTransactionCount", json!("0x7"));
    let client = LedgerClient::with_transport(transport.clone());

    let nonce = client.get_nonce(&Address::ZERO, BlockId::Pending).await.unwrap();
    assert_eq!(nonce, 7);

    let calls = transport.calls();
    assert_eq!(calls[0].1[1], json!("pending"));
}

// ==================== Call Tests ====================

#[tokio::test]
async fn test_read_decodes_outputs() {
    let transport = MockTransport::new();
    let decimals = abis::erc20().get_function("decimals").unwrap().selector;
    transport.set_call_response(decimals, json!(word(6)));
    let client = LedgerClient::with_transport(transport);

    let out = client
        .read(Address::ZERO, abis::erc20(), "decimals", &[])
        .await
        .unwrap();
    assert_eq!(out, vec![Token::Uint(U256::from(6))]);
}

#[tokio::test]
async fn test_call_revert_surfaces_rpc_error() {
    let transport = MockTransport::new();
    let decimals = abis::erc20().get_function("decimals").unwrap().selector;
    transport.set_call_error(decimals, 3, "execution reverted");
    let client = LedgerClient::with_transport(transport);

    let err = client
        .read(Address::ZERO, abis::erc20(), "decimals", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Rpc { code: 3, .. }));
}

#[tokio::test]
async fn test_estimate_gas() {
    let client = LedgerClient::new_mock();
    let gas = client.estimate_gas(&CallRequest::default()).await.unwrap();
    assert_eq!(gas, 21000);
}

// ==================== Submission Tests ====================

#[tokio::test]
async fn test_send_raw_transaction_returns_hash() {
    let transport = MockTransport::new();
    let client = LedgerClient::with_transport(transport.clone());

    let hash = client.send_raw_transaction(&[0xf8, 0x6c]).await.unwrap();
    assert_eq!(hash.to_hex(), chainflow_ledger::MOCK_TX_HASH);
    assert_eq!(transport.calls()[0].1[0], json!("0xf86c"));
}

#[tokio::test]
async fn test_send_raw_transaction_rejection() {
    let transport = MockTransport::new();
    transport.push_error("eth_sendRawTransaction", -32000, "insufficient funds for gas");
    let client = LedgerClient::with_transport(transport);

    let err = client.send_raw_transaction(&[0x01]).await.unwrap_err();
    assert_eq!(err.code(), Some(-32000));
    assert!(err.to_string().contains("insufficient funds"));
}

// ==================== Receipt Tests ====================

#[tokio::test]
async fn test_get_receipt_pending_is_none() {
    let transport = MockTransport::new();
    transport.set_response("eth_getTransactionReceipt", Value::Null);
    let client = LedgerClient::with_transport(transport);

    let receipt = client.get_receipt(&H256::ZERO).await.unwrap();
    assert!(receipt.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_receipt_polls_until_included() {
    let transport = MockTransport::new();
    transport.push_response("eth_getTransactionReceipt", Value::Null);
    transport.push_response("eth_getTransactionReceipt", Value::Null);
    let client = LedgerClient::with_transport(transport.clone());

    let hash: H256 = chainflow_ledger::MOCK_TX_HASH.parse().unwrap();
    let receipt = client
        .wait_for_receipt(&hash, Duration::from_millis(500))
        .await
        .unwrap();

    assert_eq!(receipt.transaction_hash, hash);
    assert_eq!(receipt.block_number, 0x101);
    assert_eq!(transport.call_count("eth_getTransactionReceipt"), 3);
}
