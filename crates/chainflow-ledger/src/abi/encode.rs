//! ABI encoding

use chainflow_primitives::{H256, U256};

use super::types::{ParamType, Token};
use crate::LedgerError;

/// Encode tokens using their own inferred types
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let types: Vec<ParamType> = tokens.iter().map(|t| t.type_of()).collect();
    // inferred types always match their tokens
    encode_params(&types, tokens).unwrap_or_default()
}

/// Encode tokens against declared parameter types
pub fn encode_with(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, LedgerError> {
    if types.len() != tokens.len() {
        return Err(LedgerError::AbiEncode(format!(
            "Expected {} arguments, got {}",
            types.len(),
            tokens.len()
        )));
    }
    encode_params(types, tokens)
}

/// Encode function call (selector + params)
pub fn encode_function_call(selector: [u8; 4], tokens: &[Token]) -> Vec<u8> {
    let mut result = selector.to_vec();
    result.extend(encode(tokens));
    result
}

fn encode_params(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, LedgerError> {
    let head_size = types.iter().map(head_length).sum::<usize>();

    let mut head = Vec::new();
    let mut tail = Vec::new();

    for (param_type, token) in types.iter().zip(tokens.iter()) {
        if param_type.is_dynamic() {
            let offset = head_size + tail.len();
            head.extend(encode_u256(&U256::from(offset)));
            tail.extend(encode_token(param_type, token)?);
        } else {
            head.extend(encode_token(param_type, token)?);
        }
    }

    head.extend(tail);
    Ok(head)
}

fn head_length(param_type: &ParamType) -> usize {
    match param_type {
        ParamType::Tuple(types) if !param_type.is_dynamic() => types.iter().map(head_length).sum(),
        _ => 32,
    }
}

fn encode_token(param_type: &ParamType, token: &Token) -> Result<Vec<u8>, LedgerError> {
    let encoded = match (param_type, token) {
        (ParamType::Address, Token::Address(addr)) => {
            let mut buf = [0u8; 32];
            buf[12..32].copy_from_slice(addr.as_bytes());
            buf.to_vec()
        }
        (ParamType::Uint(bits), Token::Uint(value)) => {
            if *bits < 256 && value.bits() > *bits {
                return Err(LedgerError::AbiEncode(format!(
                    "value {} does not fit in uint{}",
                    value, bits
                )));
            }
            encode_u256(value)
        }
        (ParamType::Bool, Token::Bool(b)) => {
            let mut buf = [0u8; 32];
            buf[31] = u8::from(*b);
            buf.to_vec()
        }
        (ParamType::FixedBytes(size), Token::FixedBytes(data)) => {
            let mut buf = [0u8; 32];
            let len = data.len().min(*size).min(32);
            buf[..len].copy_from_slice(&data[..len]);
            buf.to_vec()
        }
        (ParamType::Bytes, Token::Bytes(data)) => encode_bytes(data),
        (ParamType::String, Token::String(s)) => encode_bytes(s.as_bytes()),
        (ParamType::Array(inner), Token::Array(tokens)) => {
            let mut result = encode_u256(&U256::from(tokens.len()));
            let inner_types: Vec<ParamType> = tokens.iter().map(|_| (**inner).clone()).collect();
            result.extend(encode_params(&inner_types, tokens)?);
            result
        }
        (ParamType::Tuple(types), Token::Tuple(tokens)) => encode_with(types, tokens)?,
        (expected, found) => {
            return Err(LedgerError::AbiEncode(format!(
                "type mismatch: expected {}, got {:?}",
                expected.canonical(),
                found.type_of()
            )))
        }
    };
    Ok(encoded)
}

fn encode_u256(value: &U256) -> Vec<u8> {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes.to_vec()
}

fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut result = encode_u256(&U256::from(data.len()));

    // right-pad to a 32-byte boundary
    let padded_len = data.len().div_ceil(32) * 32;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    result.extend(padded);

    result
}

/// Compute function selector (first 4 bytes of keccak256(signature))
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = chainflow_crypto::keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

/// Compute an event's topic0 (keccak256(signature))
pub fn event_topic(signature: &str) -> H256 {
    chainflow_crypto::keccak256(signature.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainflow_primitives::Address;

    #[test]
    fn test_encode_address() {
        let addr = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d").unwrap();
        let encoded = encode(&[Token::Address(addr)]);

        assert_eq!(encoded.len(), 32);
        assert_eq!(&encoded[12..32], addr.as_bytes());
    }

    #[test]
    fn test_encode_uint_and_bool() {
        let encoded = encode(&[Token::Uint(U256::from(100)), Token::Bool(true)]);
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 100);
        assert_eq!(encoded[63], 1);
    }

    #[test]
    fn test_encode_string() {
        let encoded = encode(&[Token::String("hello".to_string())]);

        // offset + length + padded data
        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 32);
        assert_eq!(encoded[63], 5);
        assert_eq!(&encoded[64..69], b"hello");
    }

    #[test]
    fn test_encode_address_array_with_uint() {
        let a = Address::from_bytes([0x11; 20]);
        let b = Address::from_bytes([0x22; 20]);
        let types = [
            ParamType::Array(Box::new(ParamType::Address)),
            ParamType::Uint(256),
        ];
        let encoded = encode_with(
            &types,
            &[
                Token::Array(vec![Token::Address(a), Token::Address(b)]),
                Token::Uint(U256::from(7)),
            ],
        )
        .unwrap();

        // head (offset, uint) + length + two addresses
        assert_eq!(encoded.len(), 32 * 5);
        assert_eq!(encoded[31], 64);
        assert_eq!(encoded[63], 7);
        assert_eq!(encoded[95], 2);
        assert_eq!(&encoded[108..128], a.as_bytes());
        assert_eq!(&encoded[140..160], b.as_bytes());
    }

    #[test]
    fn test_encode_static_tuple_inline() {
        let types = [ParamType::Tuple(vec![ParamType::Address, ParamType::Uint(24)])];
        let encoded = encode_with(
            &types,
            &[Token::Tuple(vec![
                Token::Address(Address::ZERO),
                Token::Uint(U256::from(500)),
            ])],
        )
        .unwrap();
        assert_eq!(encoded.len(), 64);
        assert_eq!(&encoded[62..64], &[0x01, 0xf4]);
    }

    #[test]
    fn test_encode_with_rejects_mismatch() {
        assert!(encode_with(&[ParamType::Address], &[Token::Bool(true)]).is_err());
        assert!(encode_with(&[ParamType::Address], &[]).is_err());
        assert!(encode_with(&[ParamType::Uint(8)], &[Token::Uint(U256::from(256))]).is_err());
    }

    #[test]
    fn test_function_selector() {
        assert_eq!(function_selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(function_selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(function_selector("approve(address,uint256)"), [0x09, 0x5e, 0xa7, 0xb3]);
    }

    #[test]
    fn test_encode_function_call() {
        let to = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d").unwrap();
        let selector = function_selector("transfer(address,uint256)");
        let encoded =
            encode_function_call(selector, &[Token::Address(to), Token::Uint(U256::from(1000))]);

        assert_eq!(encoded.len(), 68);
        assert_eq!(&encoded[..4], &selector);
    }
}
