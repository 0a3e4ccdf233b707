//! Transport layer for JSON-RPC communication

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::LedgerError;

/// Transport trait for RPC communication (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an RPC request and get the JSON `result`
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, LedgerError>;
}

/// Helper to deserialize response
pub fn deserialize_response<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, LedgerError> {
    serde_json::from_value(value).map_err(|e| LedgerError::Serialization(e.to_string()))
}

// ==================== Mock Transport ====================

#[derive(Debug, Clone)]
enum Reply {
    Ok(Value),
    Err { code: i64, message: String },
}

impl Reply {
    fn into_result(self) -> Result<Value, LedgerError> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Err { code, message } => Err(LedgerError::Rpc {
                code,
                message,
                data: None,
            }),
        }
    }
}

#[derive(Default)]
struct MockState {
    queued: HashMap<String, VecDeque<Reply>>,
    sticky: HashMap<String, Reply>,
    queued_calls: HashMap<[u8; 4], VecDeque<Reply>>,
    sticky_calls: HashMap<[u8; 4], Reply>,
    defaults: HashMap<String, Value>,
    log: Vec<(String, Vec<Value>)>,
}

/// Scripted transport for tests.
///
/// Replies are resolved in this order:
/// 1. queued replies for the method (FIFO, consumed once)
/// 2. for `eth_call`, queued then sticky replies keyed by function selector
/// 3. sticky replies for the method
/// 4. built-in defaults
///
/// Every request is recorded; clones share state so a test can keep a
/// handle while the client owns another.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

/// Hash returned by the default `eth_sendRawTransaction` reply
pub const MOCK_TX_HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert("eth_chainId".to_string(), json!("0x1"));
        defaults.insert("eth_gasPrice".to_string(), json!("0x3b9aca00")); // 1 gwei
        defaults.insert("eth_blockNumber".to_string(), json!("0x100"));
        defaults.insert("eth_getBalance".to_string(), json!("0xde0b6b3a7640000")); // 1 ether
        defaults.insert("eth_getTransactionCount".to_string(), json!("0x0"));
        defaults.insert("eth_estimateGas".to_string(), json!("0x5208")); // 21000
        defaults.insert("eth_sendRawTransaction".to_string(), json!(MOCK_TX_HASH));
        defaults.insert("eth_call".to_string(), json!("0x"));

        Self {
            state: Arc::new(Mutex::new(MockState {
                defaults,
                ..Default::default()
            })),
        }
    }

    /// Set a response returned for every request to `method`
    pub fn set_response(&self, method: &str, response: Value) {
        self.state
            .lock()
            .sticky
            .insert(method.to_string(), Reply::Ok(response));
    }

    /// Make every request to `method` fail with an RPC error
    pub fn set_error(&self, method: &str, code: i64, message: &str) {
        self.state.lock().sticky.insert(
            method.to_string(),
            Reply::Err {
                code,
                message: message.to_string(),
            },
        );
    }

    /// Queue a one-shot response for `method`
    pub fn push_response(&self, method: &str, response: Value) {
        self.state
            .lock()
            .queued
            .entry(method.to_string())
            .or_default()
            .push_back(Reply::Ok(response));
    }

    /// Queue a one-shot RPC error for `method`
    pub fn push_error(&self, method: &str, code: i64, message: &str) {
        self.state
            .lock()
            .queued
            .entry(method.to_string())
            .or_default()
            .push_back(Reply::Err {
                code,
                message: message.to_string(),
            });
    }

    /// Answer every `eth_call` whose data starts with `selector`
    pub fn set_call_response(&self, selector: [u8; 4], response: Value) {
        self.state
            .lock()
            .sticky_calls
            .insert(selector, Reply::Ok(response));
    }

    /// Queue a one-shot answer for the next `eth_call` with `selector`
    pub fn push_call_response(&self, selector: [u8; 4], response: Value) {
        self.state
            .lock()
            .queued_calls
            .entry(selector)
            .or_default()
            .push_back(Reply::Ok(response));
    }

    /// Make every `eth_call` with `selector` revert
    pub fn set_call_error(&self, selector: [u8; 4], code: i64, message: &str) {
        self.state.lock().sticky_calls.insert(
            selector,
            Reply::Err {
                code,
                message: message.to_string(),
            },
        );
    }

    /// Clear scripted responses and the request log
    pub fn clear_responses(&self) {
        let mut state = self.state.lock();
        state.queued.clear();
        state.sticky.clear();
        state.queued_calls.clear();
        state.sticky_calls.clear();
        state.log.clear();
    }

    /// All requests seen so far, in order
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.state.lock().log.clone()
    }

    /// Total number of requests seen
    pub fn request_count(&self) -> usize {
        self.state.lock().log.len()
    }

    /// Number of requests made to `method`
    pub fn call_count(&self, method: &str) -> usize {
        self.state
            .lock()
            .log
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    fn resolve(state: &mut MockState, method: &str, params: &[Value]) -> Option<Reply> {
        if let Some(reply) = state.queued.get_mut(method).and_then(|q| q.pop_front()) {
            return Some(reply);
        }

        if method == "eth_call" {
            if let Some(selector) = call_selector(params) {
                if let Some(reply) = state.queued_calls.get_mut(&selector).and_then(|q| q.pop_front())
                {
                    return Some(reply);
                }
                if let Some(reply) = state.sticky_calls.get(&selector) {
                    return Some(reply.clone());
                }
            }
        }

        if let Some(reply) = state.sticky.get(method) {
            return Some(reply.clone());
        }

        if method == "eth_getTransactionReceipt" {
            // included immediately, successful, no logs
            let hash = params.first().cloned().unwrap_or(Value::Null);
            return Some(Reply::Ok(json!({
                "transactionHash": hash,
                "blockNumber": "0x101",
                "gasUsed": "0x5208",
                "status": "0x1",
                "logs": [],
            })));
        }

        state.defaults.get(method).cloned().map(Reply::Ok)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("requests", &self.request_count())
            .finish()
    }
}

/// First four bytes of the `data` field of an `eth_call` request
fn call_selector(params: &[Value]) -> Option<[u8; 4]> {
    let data = params.first()?.get("data")?.as_str()?;
    let data = data.strip_prefix("0x").unwrap_or(data);
    let bytes = hex::decode(data.get(..8)?).ok()?;
    bytes.try_into().ok()
}

#[async_trait]
impl Transport for MockTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, LedgerError> {
        let reply = {
            let mut state = self.state.lock();
            state.log.push((method.to_string(), params.clone()));
            Self::resolve(&mut state, method, &params)
        };

        match reply {
            Some(reply) => reply.into_result(),
            None => Err(LedgerError::Rpc {
                code: -32601,
                message: format!("Method not found: {}", method),
                data: None,
            }),
        }
    }
}

// ==================== HTTP Transport ====================

/// HTTP transport for real RPC communication
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    request_id: std::sync::atomic::AtomicU64,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// Create a new HTTP transport with a per-request timeout
    pub fn new(url: &str, timeout: std::time::Duration) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
            request_id: std::sync::atomic::AtomicU64::new(1),
        })
    }

    fn next_id(&self) -> u64 {
        self.request_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(feature = "http")]
impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").field("url", &self.url).finish()
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, LedgerError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": self.next_id(),
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        let status = response.status();
        let response: JsonRpcResponse = response.json().await.map_err(|e| {
            LedgerError::Transport(format!("HTTP {}: {}", status, e))
        })?;

        if let Some(error) = response.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
                data: error.data.map(|d| match d {
                    Value::String(s) => s,
                    other => other.to_string(),
                }),
            });
        }

        // `null` is a legitimate result (e.g. a receipt that is not mined yet)
        Ok(response.result.unwrap_or(Value::Null))
    }
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    data: Option<Value>,
}
