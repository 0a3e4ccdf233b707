//! Request parameters

use std::fmt;

use chainflow_crypto::Signer;
use chainflow_primitives::{Address, U256};
use serde_json::{Map, Value};

use crate::error::ActionError;

const PRIVATE_KEY: &str = "privateKey";

/// JSON object of tool parameters
#[derive(Clone, Default)]
pub struct ActionParams(Map<String, Value>);

impl ActionParams {
    /// Wrap a JSON object
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Wrap a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, ActionError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            _ => Err(ActionError::InvalidInput(
                "request body must be a JSON object".to_string(),
            )),
        }
    }

    /// Set a parameter
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Raw value
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether `key` holds something other than null, `""` or `[]`
    pub fn is_present(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }

    /// Fail with every absent field listed
    pub fn require(&self, fields: &[&str]) -> Result<(), ActionError> {
        let missing: Vec<String> = fields
            .iter()
            .filter(|field| !self.is_present(field))
            .map(|field| field.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ActionError::MissingField(missing))
        }
    }

    /// Text value; numbers and booleans are rendered as text
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Required text value
    pub fn required_text(&self, key: &str) -> Result<String, ActionError> {
        self.text(key)
            .ok_or_else(|| ActionError::MissingField(vec![key.to_string()]))
    }

    /// Address, validated against its EIP-55 checksum when mixed-case
    pub fn address(&self, key: &str) -> Result<Address, ActionError> {
        let raw = self.required_text(key)?;
        Address::parse_checked(&raw).map_err(|_| ActionError::InvalidAddress(vec![raw]))
    }

    /// Optional address
    pub fn opt_address(&self, key: &str) -> Result<Option<Address>, ActionError> {
        if self.is_present(key) {
            self.address(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Non-negative integer
    pub fn u64(&self, key: &str) -> Result<u64, ActionError> {
        let raw = self.required_text(key)?;
        raw.parse::<u64>().map_err(|_| {
            ActionError::InvalidInput(format!("{} must be a non-negative integer: {}", key, raw))
        })
    }

    /// Optional non-negative integer
    pub fn opt_u64(&self, key: &str) -> Result<Option<u64>, ActionError> {
        if self.is_present(key) {
            self.u64(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Non-negative integer of up to 256 bits
    pub fn uint(&self, key: &str) -> Result<U256, ActionError> {
        let raw = self.required_text(key)?;
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(ActionError::InvalidInput(format!(
                "{} must be a non-negative integer: {}",
                key, raw
            )));
        }
        U256::from_dec_str(&raw)
            .map_err(|_| ActionError::InvalidInput(format!("{} overflows 256 bits", key)))
    }

    /// List of strings; non-string entries are rendered as JSON text
    pub fn string_list(&self, key: &str) -> Result<Vec<String>, ActionError> {
        match self.0.get(key) {
            Some(Value::Array(items)) => Ok(items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .collect()),
            None | Some(Value::Null) => Err(ActionError::MissingField(vec![key.to_string()])),
            Some(_) => Err(ActionError::InvalidInput(format!("{} must be an array", key))),
        }
    }

    /// Signer built from the `privateKey` parameter
    pub fn signer(&self) -> Result<Signer, ActionError> {
        let key = match self.0.get(PRIVATE_KEY) {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            _ => return Err(ActionError::MissingField(vec![PRIVATE_KEY.to_string()])),
        };
        Signer::from_private_key_hex(key).map_err(|_| ActionError::InvalidPrivateKey)
    }
}

impl fmt::Debug for ActionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.0 {
            if key == PRIVATE_KEY {
                map.entry(key, &"<redacted>");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

impl From<Map<String, Value>> for ActionParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
