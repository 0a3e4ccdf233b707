//! Contract interfaces: function calls and event logs
//!
//! An [`Interface`] bundles the functions and events of one contract.
//! Events are keyed by their topic0 hash, so decoding a log is a single
//! lookup followed by a typed decode; logs that do not belong to the
//! interface decode to `None` instead of an error.

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use chainflow_primitives::{Address, H256, U256};

use crate::abi::{decode, encode_with, event_topic, function_selector, ParamType, Token};
use crate::types::LogRecord;
use crate::LedgerError;

/// Function definition
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// Function name
    pub name: String,
    /// Function signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Function selector (4 bytes)
    pub selector: [u8; 4],
    /// Input parameter types
    pub inputs: Vec<ParamType>,
    /// Output parameter types
    pub outputs: Vec<ParamType>,
}

impl FunctionDef {
    /// Create a function definition; the signature is derived from the inputs
    pub fn new(name: impl Into<String>, inputs: Vec<ParamType>, outputs: Vec<ParamType>) -> Self {
        let name = name.into();
        let signature = format!("{}({})", name, canonical_list(&inputs));
        let selector = function_selector(&signature);
        Self {
            name,
            signature,
            selector,
            inputs,
            outputs,
        }
    }
}

/// One event parameter
#[derive(Debug, Clone)]
pub struct EventParam {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub kind: ParamType,
    /// Whether the value is carried in a topic
    pub indexed: bool,
}

impl EventParam {
    /// Indexed parameter
    pub fn indexed(name: &str, kind: ParamType) -> Self {
        Self {
            name: name.to_string(),
            kind,
            indexed: true,
        }
    }

    /// Data (non-indexed) parameter
    pub fn data(name: &str, kind: ParamType) -> Self {
        Self {
            name: name.to_string(),
            kind,
            indexed: false,
        }
    }
}

/// Event definition
#[derive(Debug, Clone)]
pub struct EventDef {
    /// Event name
    pub name: String,
    /// Event signature, e.g. `Transfer(address,address,uint256)`
    pub signature: String,
    /// topic0
    pub topic: H256,
    /// Parameters in declaration order
    pub params: Vec<EventParam>,
}

impl EventDef {
    /// Create an event definition
    pub fn new(name: impl Into<String>, params: Vec<EventParam>) -> Self {
        let name = name.into();
        let kinds: Vec<ParamType> = params.iter().map(|p| p.kind.clone()).collect();
        let signature = format!("{}({})", name, canonical_list(&kinds));
        let topic = event_topic(&signature);
        Self {
            name,
            signature,
            topic,
            params,
        }
    }

    fn indexed_count(&self) -> usize {
        self.params.iter().filter(|p| p.indexed).count()
    }

    /// Decode a log already known to carry this event's topic0
    pub fn decode(&self, log: &LogRecord) -> Result<DecodedEvent, LedgerError> {
        if log.topics.len() != 1 + self.indexed_count() {
            return Err(LedgerError::AbiDecode(format!(
                "{} expects {} topics, log has {}",
                self.name,
                1 + self.indexed_count(),
                log.topics.len()
            )));
        }

        let data_types: Vec<ParamType> = self
            .params
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.kind.clone())
            .collect();
        let mut data_values = decode(&data_types, &log.data)?.into_iter();
        let mut topics = log.topics.iter().skip(1);

        let mut args = BTreeMap::new();
        for param in &self.params {
            let value = if param.indexed {
                let topic = topics
                    .next()
                    .ok_or_else(|| LedgerError::AbiDecode("missing topic".to_string()))?;
                decode_topic(&param.kind, topic)?
            } else {
                data_values
                    .next()
                    .ok_or_else(|| LedgerError::AbiDecode("missing data value".to_string()))?
            };
            args.insert(param.name.clone(), value);
        }

        Ok(DecodedEvent {
            name: self.name.clone(),
            address: log.address,
            args,
        })
    }
}

/// Indexed values of dynamic types are stored as their hash
fn decode_topic(kind: &ParamType, topic: &H256) -> Result<Token, LedgerError> {
    if kind.is_dynamic() {
        return Ok(Token::FixedBytes(topic.as_bytes().to_vec()));
    }
    let mut tokens = decode(std::slice::from_ref(kind), topic.as_bytes())?;
    tokens
        .pop()
        .ok_or_else(|| LedgerError::AbiDecode("empty topic".to_string()))
}

/// Event decoded from a receipt log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    /// Event name
    pub name: String,
    /// Emitting contract
    pub address: Address,
    /// Arguments by parameter name
    pub args: BTreeMap<String, Token>,
}

impl DecodedEvent {
    /// Address argument
    pub fn address_arg(&self, name: &str) -> Option<Address> {
        self.args.get(name).and_then(Token::as_address)
    }

    /// Integer argument
    pub fn uint_arg(&self, name: &str) -> Option<U256> {
        self.args.get(name).and_then(Token::as_uint)
    }

    /// String argument
    pub fn string_arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).and_then(Token::as_str)
    }
}

/// Functions and events of one contract
#[derive(Debug, Clone)]
pub struct Interface {
    name: String,
    functions: Vec<FunctionDef>,
    events: HashMap<H256, EventDef>,
}

impl Interface {
    /// Create an empty interface
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
            events: HashMap::new(),
        }
    }

    /// Interface name, for diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a function
    pub fn function(mut self, name: &str, inputs: Vec<ParamType>, outputs: Vec<ParamType>) -> Self {
        self.functions.push(FunctionDef::new(name, inputs, outputs));
        self
    }

    /// Add an event
    pub fn event(mut self, name: &str, params: Vec<EventParam>) -> Self {
        let event = EventDef::new(name, params);
        self.events.insert(event.topic, event);
        self
    }

    /// Look up a function by name
    pub fn get_function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Look up an event by name
    pub fn get_event(&self, name: &str) -> Option<&EventDef> {
        self.events.values().find(|e| e.name == name)
    }

    /// Encode a function call
    pub fn encode_call(&self, function_name: &str, args: &[Token]) -> Result<Bytes, LedgerError> {
        let function = self.get_function(function_name).ok_or_else(|| {
            LedgerError::AbiEncode(format!("{}: unknown function {}", self.name, function_name))
        })?;

        let mut data = function.selector.to_vec();
        data.extend(encode_with(&function.inputs, args)?);
        Ok(Bytes::from(data))
    }

    /// Decode function output
    pub fn decode_output(&self, function_name: &str, data: &[u8]) -> Result<Vec<Token>, LedgerError> {
        let function = self.get_function(function_name).ok_or_else(|| {
            LedgerError::AbiDecode(format!("{}: unknown function {}", self.name, function_name))
        })?;
        decode(&function.outputs, data)
    }

    /// Decode a log if its topic0 belongs to this interface.
    ///
    /// Logs with an unknown topic, or whose shape does not match the
    /// event (e.g. ERC-20 vs ERC-721 `Transfer`), yield `None`.
    pub fn decode_log(&self, log: &LogRecord) -> Option<DecodedEvent> {
        let topic0 = log.topics.first()?;
        let event = self.events.get(topic0)?;
        event.decode(log).ok()
    }

    /// First log, in receipt order, that decodes as event `name`
    pub fn find_event(&self, logs: &[LogRecord], name: &str) -> Option<DecodedEvent> {
        logs.iter()
            .filter_map(|log| self.decode_log(log))
            .find(|event| event.name == name)
    }
}

fn canonical_list(types: &[ParamType]) -> String {
    types
        .iter()
        .map(|t| t.canonical())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encode;

    fn transfer_interface() -> Interface {
        Interface::new("Token")
            .function(
                "transfer",
                vec![ParamType::Address, ParamType::Uint(256)],
                vec![ParamType::Bool],
            )
            .event(
                "Transfer",
                vec![
                    EventParam::indexed("from", ParamType::Address),
                    EventParam::indexed("to", ParamType::Address),
                    EventParam::data("value", ParamType::Uint(256)),
                ],
            )
    }

    fn address_topic(addr: Address) -> H256 {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(addr.as_bytes());
        H256::from_bytes(bytes)
    }

    fn transfer_log(emitter: Address, from: Address, to: Address, value: u64) -> LogRecord {
        LogRecord {
            address: emitter,
            topics: vec![
                event_topic("Transfer(address,address,uint256)"),
                address_topic(from),
                address_topic(to),
            ],
            data: Bytes::from(encode(&[Token::Uint(U256::from(value))])),
        }
    }

    #[test]
    fn test_function_signature_derived() {
        let iface = transfer_interface();
        let f = iface.get_function("transfer").unwrap();
        assert_eq!(f.signature, "transfer(address,uint256)");
        assert_eq!(f.selector, [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_encode_call_checks_arity() {
        let iface = transfer_interface();
        assert!(iface.encode_call("transfer", &[Token::Address(Address::ZERO)]).is_err());
        assert!(iface.encode_call("unknown", &[]).is_err());
        let data = iface
            .encode_call(
                "transfer",
                &[Token::Address(Address::ZERO), Token::Uint(U256::from(5))],
            )
            .unwrap();
        assert_eq!(data.len(), 68);
    }

    #[test]
    fn test_decode_log() {
        let iface = transfer_interface();
        let from = Address::from_bytes([1; 20]);
        let to = Address::from_bytes([2; 20]);
        let log = transfer_log(Address::from_bytes([9; 20]), from, to, 42);

        let event = iface.decode_log(&log).unwrap();
        assert_eq!(event.name, "Transfer");
        assert_eq!(event.address, Address::from_bytes([9; 20]));
        assert_eq!(event.address_arg("from"), Some(from));
        assert_eq!(event.address_arg("to"), Some(to));
        assert_eq!(event.uint_arg("value"), Some(U256::from(42)));
    }

    #[test]
    fn test_decode_log_shape_mismatch_is_none() {
        let iface = transfer_interface();
        let mut log = transfer_log(Address::ZERO, Address::ZERO, Address::ZERO, 1);
        // ERC-721 style: tokenId moved into a fourth topic
        log.topics.push(H256::ZERO);
        log.data = Bytes::new();
        assert!(iface.decode_log(&log).is_none());
    }

    #[test]
    fn test_find_event_first_match_in_order() {
        let iface = transfer_interface();
        let unrelated = LogRecord {
            address: Address::ZERO,
            topics: vec![event_topic("Approval(address,address,uint256)")],
            data: Bytes::new(),
        };
        let logs = vec![
            unrelated,
            transfer_log(Address::ZERO, Address::ZERO, Address::ZERO, 1),
            transfer_log(Address::ZERO, Address::ZERO, Address::ZERO, 2),
        ];

        let event = iface.find_event(&logs, "Transfer").unwrap();
        assert_eq!(event.uint_arg("value"), Some(U256::from(1)));
        assert!(iface.find_event(&logs[..1], "Transfer").is_none());
        assert!(iface.find_event(&logs, "Approval").is_none());
    }
}
