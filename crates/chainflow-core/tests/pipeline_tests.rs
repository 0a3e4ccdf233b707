//! Transaction pipeline tests for chainflow-core
//!
//! Drives the pipeline and single-transaction handlers against the scripted
//! mock transport.

use std::sync::Arc;

use chainflow_core::actions::{DeployErc20, Swap, Transfer};
use chainflow_core::{
    run, ActionContext, ActionError, ActionParams, CallSpec, GasPlan, NetworkConfig,
    StaticPriceSource,
};
use chainflow_crypto::Signer;
use chainflow_ledger::abi::{encode, Token};
use chainflow_ledger::{abis, LedgerClient, MockTransport, MOCK_TX_HASH};
use chainflow_primitives::{Address, U256};
use serde_json::{json, Value};

const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const RECIPIENT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
const TOKEN: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
const OTHER_TOKEN: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

fn setup() -> (ActionContext, MockTransport) {
    let transport = MockTransport::new();
    let ctx = ActionContext::new(
        LedgerClient::with_transport(transport.clone()),
        NetworkConfig {
            receipt_poll_interval_ms: 1,
            ..Default::default()
        },
        Arc::new(StaticPriceSource::new()),
    );
    (ctx, transport)
}

fn params(value: Value) -> ActionParams {
    ActionParams::from_value(value).unwrap()
}

fn encoded(tokens: &[Token]) -> Value {
    json!(format!("0x{}", hex::encode(encode(tokens))))
}

fn selector(function: &str) -> [u8; 4] {
    abis::erc20().get_function(function).unwrap().selector
}

fn address_topic(address: &Address) -> String {
    format!("0x{}{}", "0".repeat(24), &address.to_hex()[2..])
}

/// ERC-20 with 18 decimals, symbol PING and the given balance and allowance
fn script_token(transport: &MockTransport, balance: U256, allowance: U256) {
    transport.set_call_response(selector("decimals"), encoded(&[Token::Uint(U256::from(18))]));
    transport.set_call_response(selector("symbol"), encoded(&[Token::String("PING".into())]));
    transport.set_call_response(selector("name"), encoded(&[Token::String("Ping".into())]));
    transport.set_call_response(selector("balanceOf"), encoded(&[Token::Uint(balance)]));
    transport.set_call_response(selector("allowance"), encoded(&[Token::Uint(allowance)]));
}

fn ether(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

fn methods(transport: &MockTransport, keep: &[&str]) -> Vec<String> {
    transport
        .calls()
        .into_iter()
        .map(|(method, _)| method)
        .filter(|method| keep.contains(&method.as_str()))
        .collect()
}

// ==================== Preflight ====================

#[tokio::test]
async fn test_zero_balance_fails_preflight_without_submitting() {
    let (ctx, transport) = setup();
    transport.set_response("eth_getBalance", json!("0x0"));

    let response = run(
        &Transfer,
        &ctx,
        &params(json!({ "privateKey": DEV_KEY, "toAddress": RECIPIENT, "amount": "0.5" })),
    )
    .await;

    assert_eq!(response.status, 400);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["kind"], "PreflightError");
    assert_eq!(response.body["details"]["balance"], "0.0");
    assert_eq!(response.body["details"]["shortfall"], "0.5");
    assert!(response.body.get("transactionHash").is_none());
    assert_eq!(transport.call_count("eth_estimateGas"), 0);
    assert_eq!(transport.call_count("eth_sendRawTransaction"), 0);
}

#[tokio::test]
async fn test_token_preflight_reports_token_shortfall() {
    let (ctx, transport) = setup();
    script_token(&transport, ether(1), U256::MAX);

    let response = run(
        &Transfer,
        &ctx,
        &params(json!({
            "privateKey": DEV_KEY,
            "toAddress": RECIPIENT,
            "tokenAddress": TOKEN,
            "amount": "2.5",
        })),
    )
    .await;

    assert_eq!(response.status, 400);
    assert_eq!(response.body["details"]["asset"], "PING");
    assert_eq!(response.body["details"]["required"], "2.5");
    assert_eq!(response.body["details"]["shortfall"], "1.5");
    assert_eq!(transport.call_count("eth_sendRawTransaction"), 0);
}

// ==================== Gas ====================

#[tokio::test]
async fn test_gas_limit_is_estimate_plus_twenty_percent() {
    let (ctx, transport) = setup();
    transport.set_response("eth_estimateGas", json!("0x186a0")); // 100000
    let signer = Signer::from_private_key_hex(DEV_KEY).unwrap();

    let result = ctx
        .pipeline()
        .execute(
            &signer,
            &CallSpec::native_transfer(Address::from_hex(RECIPIENT).unwrap(), U256::from(1)),
        )
        .await
        .unwrap();

    assert_eq!(
        result.outcome.gas_plan,
        GasPlan::Estimated {
            estimate: 100_000,
            limit: 120_000
        }
    );
    assert_eq!(result.outcome.block_number, 0x101);
    assert!(result.approval.is_none());
    assert!(result.preflight.unwrap().passed);
}

#[tokio::test]
async fn test_failed_estimate_falls_back_and_submits_once() {
    let (ctx, transport) = setup();
    transport.set_error("eth_estimateGas", -32000, "execution reverted");
    let signer = Signer::from_private_key_hex(DEV_KEY).unwrap();

    let result = ctx
        .pipeline()
        .execute(
            &signer,
            &CallSpec::native_transfer(Address::from_hex(RECIPIENT).unwrap(), U256::from(1)),
        )
        .await
        .unwrap();

    assert_eq!(
        result.outcome.gas_plan,
        GasPlan::NetworkDefault { limit: 500_000 }
    );
    assert_eq!(transport.call_count("eth_estimateGas"), 1);
    assert_eq!(transport.call_count("eth_sendRawTransaction"), 1);
}

// ==================== Submission & Confirmation ====================

#[tokio::test]
async fn test_rejected_submission_is_not_retried() {
    let (ctx, transport) = setup();
    transport.set_error("eth_sendRawTransaction", -32000, "nonce too low");
    let signer = Signer::from_private_key_hex(DEV_KEY).unwrap();

    let err = ctx
        .pipeline()
        .execute(
            &signer,
            &CallSpec::native_transfer(Address::from_hex(RECIPIENT).unwrap(), U256::from(1)),
        )
        .await
        .unwrap_err();

    match err {
        ActionError::SubmissionFailed { reason, code } => {
            assert_eq!(reason, "nonce too low");
            assert_eq!(code, Some(-32000));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(transport.call_count("eth_sendRawTransaction"), 1);
    assert_eq!(transport.call_count("eth_getTransactionReceipt"), 0);
}

#[tokio::test]
async fn test_pending_receipt_is_polled_until_included() {
    let (ctx, transport) = setup();
    transport.push_response("eth_getTransactionReceipt", Value::Null);
    transport.push_response("eth_getTransactionReceipt", Value::Null);
    let signer = Signer::from_private_key_hex(DEV_KEY).unwrap();

    let result = ctx
        .pipeline()
        .execute(
            &signer,
            &CallSpec::native_transfer(Address::from_hex(RECIPIENT).unwrap(), U256::from(1)),
        )
        .await
        .unwrap();

    assert_eq!(result.outcome.tx_hash.to_hex(), MOCK_TX_HASH);
    assert_eq!(transport.call_count("eth_getTransactionReceipt"), 3);
}

#[tokio::test]
async fn test_reverted_receipt() {
    let (ctx, transport) = setup();
    transport.set_response(
        "eth_getTransactionReceipt",
        json!({
            "transactionHash": MOCK_TX_HASH,
            "blockNumber": "0x5",
            "gasUsed": "0x5208",
            "status": "0x0",
            "logs": [],
        }),
    );

    let response = run(
        &Transfer,
        &ctx,
        &params(json!({ "privateKey": DEV_KEY, "toAddress": RECIPIENT, "amount": 0.1 })),
    )
    .await;

    assert_eq!(response.status, 500);
    assert_eq!(response.body["kind"], "SubmissionError");
    assert_eq!(response.body["details"]["transactionHash"], MOCK_TX_HASH);
}

#[tokio::test]
async fn test_receipt_failure_keeps_transaction_hash() {
    let (ctx, transport) = setup();
    transport.set_error("eth_getTransactionReceipt", -32603, "upstream timeout");

    let response = run(
        &Transfer,
        &ctx,
        &params(json!({ "privateKey": DEV_KEY, "toAddress": RECIPIENT, "amount": "0.1" })),
    )
    .await;

    assert_eq!(response.status, 500);
    assert_eq!(response.body["kind"], "NetworkError");
    assert_eq!(response.body["details"]["transactionHash"], MOCK_TX_HASH);
    assert_eq!(response.body["details"]["reason"], "upstream timeout");
    assert_eq!(response.body["details"]["code"], -32603);
    assert_eq!(transport.call_count("eth_sendRawTransaction"), 1);
}

#[tokio::test]
async fn test_native_transfer_envelope() {
    let (ctx, _transport) = setup();

    let response = run(
        &Transfer,
        &ctx,
        &params(json!({ "privateKey": DEV_KEY, "toAddress": RECIPIENT, "amount": "0.25" })),
    )
    .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["type"], "native");
    assert_eq!(response.body["to"], RECIPIENT);
    assert_eq!(response.body["amount"], "0.25");
    assert_eq!(response.body["transactionHash"], MOCK_TX_HASH);
    assert_eq!(response.body["blockNumber"], 0x101);
    assert_eq!(response.body["gasUsed"], "21000");
    assert_eq!(
        response.body["explorerUrl"],
        format!("https://shannon-explorer.somnia.network/tx/{}", MOCK_TX_HASH)
    );
}

// ==================== Token Flows ====================

#[tokio::test]
async fn test_token_without_decimals_is_rejected() {
    let (ctx, transport) = setup();
    transport.set_call_error(selector("decimals"), 3, "execution reverted");

    let response = run(
        &Transfer,
        &ctx,
        &params(json!({
            "privateKey": DEV_KEY,
            "toAddress": RECIPIENT,
            "tokenAddress": TOKEN,
            "amount": "1",
        })),
    )
    .await;

    assert_eq!(response.status, 400);
    assert_eq!(
        response.body["error"],
        "Invalid input: Invalid token address or token does not support decimals()"
    );
}

#[tokio::test]
async fn test_swap_approves_before_swapping() {
    let (ctx, transport) = setup();
    script_token(&transport, ether(10), U256::zero());

    let response = run(
        &Swap,
        &ctx,
        &params(json!({
            "privateKey": DEV_KEY,
            "tokenIn": TOKEN,
            "tokenOut": OTHER_TOKEN,
            "amountIn": "1",
        })),
    )
    .await;

    assert_eq!(response.status, 200, "{}", response.body);
    assert_eq!(response.body["approveTxHash"], MOCK_TX_HASH);
    assert_eq!(response.body["swapTxHash"], MOCK_TX_HASH);
    assert_eq!(response.body["slippageTolerance"], 3);
    assert_eq!(response.body["amountOutMinimum"], "970000000000000000");
    assert_eq!(
        methods(&transport, &["eth_sendRawTransaction", "eth_getTransactionReceipt"]),
        vec![
            "eth_sendRawTransaction",
            "eth_getTransactionReceipt",
            "eth_sendRawTransaction",
            "eth_getTransactionReceipt",
        ]
    );
}

#[tokio::test]
async fn test_failed_swap_reports_confirmed_approval() {
    let (ctx, transport) = setup();
    script_token(&transport, ether(10), U256::zero());
    transport.push_response("eth_sendRawTransaction", json!(MOCK_TX_HASH));
    transport.push_error("eth_sendRawTransaction", -32000, "replacement underpriced");

    let response = run(
        &Swap,
        &ctx,
        &params(json!({
            "privateKey": DEV_KEY,
            "tokenIn": TOKEN,
            "tokenOut": OTHER_TOKEN,
            "amountIn": "1",
        })),
    )
    .await;

    assert_eq!(response.status, 500, "{}", response.body);
    assert_eq!(response.body["kind"], "SubmissionError");
    let details = &response.body["details"];
    assert_eq!(details["failedStep"], "swap");
    assert_eq!(details["completedSteps"].as_array().map(Vec::len), Some(1));
    assert_eq!(details["completedSteps"][0]["step"], "approve");
    assert_eq!(details["completedSteps"][0]["transactionHash"], MOCK_TX_HASH);
    assert_eq!(details["completedSteps"][0]["blockNumber"], 0x101);
    assert_eq!(details["cause"]["details"]["reason"], "replacement underpriced");
    assert_eq!(details["cause"]["details"]["code"], -32000);
    assert_eq!(transport.call_count("eth_sendRawTransaction"), 2);
}

#[tokio::test]
async fn test_swap_with_allowance_skips_approval() {
    let (ctx, transport) = setup();
    script_token(&transport, ether(10), ether(5));

    let response = run(
        &Swap,
        &ctx,
        &params(json!({
            "privateKey": DEV_KEY,
            "tokenIn": TOKEN,
            "tokenOut": OTHER_TOKEN,
            "amountIn": "1",
            "slippageTolerance": 10,
        })),
    )
    .await;

    assert_eq!(response.status, 200, "{}", response.body);
    assert!(response.body["approveTxHash"].is_null());
    assert_eq!(response.body["amountOutMinimum"], "900000000000000000");
    assert_eq!(transport.call_count("eth_sendRawTransaction"), 1);
}

#[tokio::test]
async fn test_swap_rejects_out_of_range_slippage() {
    let (ctx, transport) = setup();

    let response = run(
        &Swap,
        &ctx,
        &params(json!({
            "privateKey": DEV_KEY,
            "tokenIn": TOKEN,
            "tokenOut": OTHER_TOKEN,
            "amountIn": "1",
            "slippageTolerance": 150,
        })),
    )
    .await;

    assert_eq!(response.status, 400);
    assert_eq!(transport.request_count(), 0);
}

// ==================== Event Extraction ====================

fn token_created_log(factory: &Address, token: &Address, creator: &Address) -> Value {
    let topic = abis::token_factory().get_event("TokenCreated").unwrap().topic;
    let data = encode(&[
        Token::String("Ping".into()),
        Token::String("PING".into()),
        Token::Uint(U256::from(1_000_000)),
        Token::Uint(U256::from(1_700_000_000u64)),
    ]);
    json!({
        "address": factory.to_hex(),
        "topics": [topic.to_hex(), address_topic(token), address_topic(creator)],
        "data": format!("0x{}", hex::encode(data)),
    })
}

fn erc20_transfer_log(token: &Address) -> Value {
    let topic = abis::erc20().get_event("Transfer").unwrap().topic;
    json!({
        "address": token.to_hex(),
        "topics": [topic.to_hex(), address_topic(&Address::ZERO), address_topic(token)],
        "data": format!("0x{}", hex::encode(encode(&[Token::Uint(U256::from(5))]))),
    })
}

fn receipt_with_logs(logs: Vec<Value>) -> Value {
    json!({
        "transactionHash": MOCK_TX_HASH,
        "blockNumber": "0x20",
        "gasUsed": "0x2dc6c0",
        "status": "0x1",
        "logs": logs,
    })
}

#[tokio::test]
async fn test_deploy_token_uses_first_matching_event() {
    let (ctx, transport) = setup();
    let factory = ctx.config().token_factory;
    let creator = Signer::from_private_key_hex(DEV_KEY).unwrap().address();
    let first = Address::from_hex(TOKEN).unwrap();
    let second = Address::from_hex(OTHER_TOKEN).unwrap();
    transport.push_response(
        "eth_getTransactionReceipt",
        receipt_with_logs(vec![
            erc20_transfer_log(&second),
            token_created_log(&factory, &first, &creator),
            token_created_log(&factory, &second, &creator),
        ]),
    );

    let response = run(
        &DeployErc20,
        &ctx,
        &params(json!({
            "privateKey": DEV_KEY,
            "name": "Ping",
            "symbol": "PING",
            "initialSupply": 1000000,
        })),
    )
    .await;

    assert_eq!(response.status, 200, "{}", response.body);
    assert_eq!(response.body["contractAddress"], first.to_checksum());
    assert_eq!(response.body["factoryAddress"], factory.to_checksum());
    assert_eq!(response.body["message"], "Token created successfully via TokenFactory");
    assert_eq!(response.body["gasUsed"], "3000000");
    // getTokenInfo is not scripted, so the request values are used
    assert_eq!(
        response.body["tokenInfo"],
        json!({ "name": "Ping", "symbol": "PING", "initialSupply": "1000000" })
    );
}

#[tokio::test]
async fn test_deploy_token_reads_token_info() {
    let (ctx, transport) = setup();
    let factory = ctx.config().token_factory;
    let creator = Signer::from_private_key_hex(DEV_KEY).unwrap().address();
    let token = Address::from_hex(TOKEN).unwrap();
    transport.push_response(
        "eth_getTransactionReceipt",
        receipt_with_logs(vec![token_created_log(&factory, &token, &creator)]),
    );
    transport.set_call_response(
        abis::token_factory().get_function("getTokenInfo").unwrap().selector,
        encoded(&[
            Token::Address(creator),
            Token::String("Ping".into()),
            Token::String("PING".into()),
            Token::Uint(U256::from(1_000_000)),
            Token::Uint(U256::from(1_700_000_000u64)),
            Token::Uint(ether(1_000_000)),
            Token::Address(creator),
        ]),
    );

    let response = run(
        &DeployErc20,
        &ctx,
        &params(json!({
            "privateKey": DEV_KEY,
            "name": "Ping",
            "symbol": "PING",
            "initialSupply": "1000000",
        })),
    )
    .await;

    assert_eq!(response.status, 200, "{}", response.body);
    let info = &response.body["tokenInfo"];
    assert_eq!(info["currentSupply"], "1000000.0");
    assert_eq!(info["deployedAt"], "2023-11-14T22:13:20.000Z");
    assert_eq!(info["owner"], creator.to_checksum());
}

#[tokio::test]
async fn test_deploy_token_without_event_is_not_found() {
    let (ctx, transport) = setup();
    transport.push_response(
        "eth_getTransactionReceipt",
        receipt_with_logs(vec![erc20_transfer_log(&Address::from_hex(TOKEN).unwrap())]),
    );

    let response = run(
        &DeployErc20,
        &ctx,
        &params(json!({
            "privateKey": DEV_KEY,
            "name": "Ping",
            "symbol": "PING",
            "initialSupply": "1000",
        })),
    )
    .await;

    assert_eq!(response.status, 500);
    assert_eq!(response.body["kind"], "NotFoundError");
    assert_eq!(response.body["details"]["event"], "TokenCreated");
    assert_eq!(response.body["details"]["transactionHash"], MOCK_TX_HASH);
}
