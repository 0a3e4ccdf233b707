//! ABI decoding

use chainflow_primitives::{Address, U256};

use super::types::{ParamType, Token};
use crate::LedgerError;

/// Decode tokens from ABI-encoded data
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, LedgerError> {
    decode_params(types, data, 0)
}

/// Decode a parameter list whose head starts at `base`.
///
/// Offsets of dynamic members are relative to `base`.
fn decode_params(types: &[ParamType], data: &[u8], base: usize) -> Result<Vec<Token>, LedgerError> {
    let mut cursor = base;
    let mut tokens = Vec::with_capacity(types.len());

    for param_type in types {
        if param_type.is_dynamic() {
            let offset = read_usize(data, cursor)?;
            tokens.push(decode_dynamic(param_type, data, base + offset)?);
            cursor += 32;
        } else {
            let (token, consumed) = decode_static(param_type, data, cursor)?;
            tokens.push(token);
            cursor += consumed;
        }
    }

    Ok(tokens)
}

fn decode_static(
    param_type: &ParamType,
    data: &[u8],
    offset: usize,
) -> Result<(Token, usize), LedgerError> {
    match param_type {
        ParamType::Address => {
            let word = word(data, offset)?;
            let address = Address::from_slice(&word[12..32])?;
            Ok((Token::Address(address), 32))
        }
        ParamType::Uint(_) => Ok((Token::Uint(U256::from_big_endian(word(data, offset)?)), 32)),
        ParamType::Bool => Ok((Token::Bool(word(data, offset)?[31] != 0), 32)),
        ParamType::FixedBytes(size) => {
            let word = word(data, offset)?;
            let size = (*size).min(32);
            Ok((Token::FixedBytes(word[..size].to_vec()), 32))
        }
        ParamType::Tuple(types) => {
            let tokens = decode_params(types, data, offset)?;
            Ok((Token::Tuple(tokens), static_size(param_type)))
        }
        other => Err(LedgerError::AbiDecode(format!(
            "{} is not a static type",
            other.canonical()
        ))),
    }
}

fn static_size(param_type: &ParamType) -> usize {
    match param_type {
        ParamType::Tuple(types) => types.iter().map(static_size).sum(),
        _ => 32,
    }
}

fn decode_dynamic(param_type: &ParamType, data: &[u8], position: usize) -> Result<Token, LedgerError> {
    match param_type {
        ParamType::Bytes => Ok(Token::Bytes(decode_bytes(data, position)?)),
        ParamType::String => {
            let bytes = decode_bytes(data, position)?;
            let s = String::from_utf8(bytes)
                .map_err(|e| LedgerError::AbiDecode(format!("Invalid UTF-8: {}", e)))?;
            Ok(Token::String(s))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, position)?;
            let types = vec![(**inner).clone(); len];
            Ok(Token::Array(decode_params(&types, data, position + 32)?))
        }
        ParamType::Tuple(types) => Ok(Token::Tuple(decode_params(types, data, position)?)),
        other => Err(LedgerError::AbiDecode(format!(
            "{} is not a dynamic type",
            other.canonical()
        ))),
    }
}

fn decode_bytes(data: &[u8], offset: usize) -> Result<Vec<u8>, LedgerError> {
    let len = read_usize(data, offset)?;
    check_length(data, offset + 32 + len)?;
    Ok(data[offset + 32..offset + 32 + len].to_vec())
}

fn word(data: &[u8], offset: usize) -> Result<&[u8], LedgerError> {
    check_length(data, offset + 32)?;
    Ok(&data[offset..offset + 32])
}

/// Read a length/offset word, rejecting values larger than the buffer
fn read_usize(data: &[u8], offset: usize) -> Result<usize, LedgerError> {
    let value = U256::from_big_endian(word(data, offset)?);
    if value > U256::from(data.len()) {
        return Err(LedgerError::AbiDecode(format!(
            "offset or length {} exceeds data size {}",
            value,
            data.len()
        )));
    }
    Ok(value.as_usize())
}

fn check_length(data: &[u8], required: usize) -> Result<(), LedgerError> {
    if data.len() < required {
        return Err(LedgerError::AbiDecode(format!(
            "Insufficient data: need {} bytes, have {}",
            required,
            data.len()
        )));
    }
    Ok(())
}
