//! RPC request and response types

use bytes::Bytes;
use chainflow_primitives::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{parse_hex_bytes, parse_hex_u256, parse_hex_u64};
use crate::LedgerError;

/// Block identifier for RPC queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockId {
    /// Block number
    Number(u64),
    /// Latest block
    #[default]
    Latest,
    /// Pending block (includes pending transactions)
    Pending,
    /// Earliest block (genesis)
    Earliest,
}

impl Serialize for BlockId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            BlockId::Number(n) => serializer.serialize_str(&format!("0x{:x}", n)),
            BlockId::Latest => serializer.serialize_str("latest"),
            BlockId::Pending => serializer.serialize_str("pending"),
            BlockId::Earliest => serializer.serialize_str("earliest"),
        }
    }
}

/// Call request for eth_call and eth_estimateGas
#[derive(Debug, Clone, Default)]
pub struct CallRequest {
    /// Sender address
    pub from: Option<Address>,
    /// Recipient address
    pub to: Option<Address>,
    /// Gas limit
    pub gas: Option<u64>,
    /// Gas price (legacy)
    pub gas_price: Option<U256>,
    /// Value to transfer
    pub value: Option<U256>,
    /// Input data
    pub data: Option<Bytes>,
}

impl CallRequest {
    /// Read-only call of `data` against `to`
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to: Some(to),
            data: Some(data.into()),
            ..Default::default()
        }
    }
}

impl Serialize for CallRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let count = [
            self.from.is_some(),
            self.to.is_some(),
            self.gas.is_some(),
            self.gas_price.is_some(),
            self.value.is_some(),
            self.data.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();

        let mut map = serializer.serialize_map(Some(count))?;

        if let Some(from) = &self.from {
            map.serialize_entry("from", &from.to_hex())?;
        }
        if let Some(to) = &self.to {
            map.serialize_entry("to", &to.to_hex())?;
        }
        if let Some(gas) = &self.gas {
            map.serialize_entry("gas", &format!("0x{:x}", gas))?;
        }
        if let Some(gas_price) = &self.gas_price {
            map.serialize_entry("gasPrice", &format!("0x{:x}", gas_price))?;
        }
        if let Some(value) = &self.value {
            map.serialize_entry("value", &format!("0x{:x}", value))?;
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", &format!("0x{}", hex::encode(data)))?;
        }

        map.end()
    }
}

/// Log record emitted during transaction execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Emitting contract
    pub address: Address,
    /// Indexed topics (topic0 is the event signature hash)
    pub topics: Vec<H256>,
    /// Non-indexed data
    pub data: Bytes,
}

/// Confirmation data for an included transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Transaction hash
    pub transaction_hash: H256,
    /// Including block
    pub block_number: u64,
    /// Gas consumed by this transaction
    pub gas_used: U256,
    /// Execution status; `None` on pre-Byzantium nodes
    pub status: Option<u64>,
    /// Created contract, for deployments
    pub contract_address: Option<Address>,
    /// Logs in emission order
    pub logs: Vec<LogRecord>,
}

impl TransactionReceipt {
    /// Whether execution succeeded (status 1, or no status reported)
    pub fn succeeded(&self) -> bool {
        self.status != Some(0)
    }

    /// Parse an `eth_getTransactionReceipt` result object
    pub fn from_json(value: Value) -> Result<Self, LedgerError> {
        let raw: RawReceipt = serde_json::from_value(value)
            .map_err(|e| LedgerError::MalformedResponse(format!("receipt: {}", e)))?;

        let block_number = raw
            .block_number
            .ok_or_else(|| LedgerError::MissingField("blockNumber".to_string()))?;

        let logs = raw
            .logs
            .into_iter()
            .map(|log| {
                Ok(LogRecord {
                    address: log.address,
                    topics: log.topics,
                    data: parse_hex_bytes(&log.data)?,
                })
            })
            .collect::<Result<Vec<_>, LedgerError>>()?;

        Ok(Self {
            transaction_hash: raw.transaction_hash,
            block_number: parse_hex_u64(&block_number)?,
            gas_used: parse_hex_u256(&raw.gas_used)?,
            status: raw.status.as_deref().map(parse_hex_u64).transpose()?,
            contract_address: raw.contract_address,
            logs,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: H256,
    block_number: Option<String>,
    gas_used: String,
    status: Option<String>,
    contract_address: Option<Address>,
    #[serde(default)]
    logs: Vec<RawLog>,
}

#[derive(Deserialize)]
struct RawLog {
    address: Address,
    #[serde(default)]
    topics: Vec<H256>,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_id_serialize() {
        assert_eq!(serde_json::to_string(&BlockId::Latest).unwrap(), "\"latest\"");
        assert_eq!(serde_json::to_string(&BlockId::Number(100)).unwrap(), "\"0x64\"");
        assert_eq!(serde_json::to_string(&BlockId::Pending).unwrap(), "\"pending\"");
    }

    #[test]
    fn test_call_request_serialize() {
        let req = CallRequest {
            to: Some(Address::ZERO),
            value: Some(U256::from(1000)),
            data: Some(Bytes::from(vec![0x01, 0x02])),
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["to"], "0x0000000000000000000000000000000000000000");
        assert_eq!(json["value"], "0x3e8");
        assert_eq!(json["data"], "0x0102");
        assert!(json.get("from").is_none());
    }

    #[test]
    fn test_receipt_from_json() {
        let receipt = TransactionReceipt::from_json(json!({
            "transactionHash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "blockNumber": "0x1b4",
            "gasUsed": "0x5208",
            "status": "0x1",
            "contractAddress": null,
            "logs": [{
                "address": "0x19fae13f4c2fac0539b5e0bac8ad1785f1c7dee1",
                "topics": ["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
                "data": "0x"
            }]
        }))
        .unwrap();

        assert_eq!(receipt.block_number, 436);
        assert_eq!(receipt.gas_used, U256::from(21000));
        assert!(receipt.succeeded());
        assert_eq!(receipt.logs.len(), 1);
        assert!(receipt.logs[0].data.is_empty());
    }

    #[test]
    fn test_receipt_status_zero_is_failure() {
        let receipt = TransactionReceipt::from_json(json!({
            "transactionHash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "blockNumber": "0x1",
            "gasUsed": "0x0",
            "status": "0x0",
        }))
        .unwrap();
        assert!(!receipt.succeeded());
        assert!(receipt.logs.is_empty());
    }

    #[test]
    fn test_receipt_missing_fields() {
        assert!(TransactionReceipt::from_json(json!({ "blockNumber": "0x1" })).is_err());
    }
}
