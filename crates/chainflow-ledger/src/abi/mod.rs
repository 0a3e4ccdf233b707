//! Solidity ABI encoding and decoding
//!
//! Covers the subset of the ABI the chainflow contracts use: addresses,
//! unsigned integers, booleans, bytes, strings, arrays and tuples.
//!
//! # Example
//!
//! ```rust
//! use chainflow_ledger::abi::{decode, encode, function_selector, ParamType, Token};
//! use chainflow_primitives::{Address, U256};
//!
//! let selector = function_selector("transfer(address,uint256)");
//! assert_eq!(selector, [0xa9, 0x05, 0x9c, 0xbb]);
//!
//! let data = encode(&[Token::Address(Address::ZERO), Token::Uint(U256::from(1000))]);
//! let tokens = decode(&[ParamType::Address, ParamType::Uint(256)], &data).unwrap();
//! assert_eq!(tokens[1], Token::Uint(U256::from(1000)));
//! ```

mod decode;
mod encode;
mod types;

pub use decode::decode;
pub use encode::{encode, encode_function_call, encode_with, event_topic, function_selector};
pub use types::{ParamType, Token};
