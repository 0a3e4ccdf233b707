//! # chainflow-primitives
//!
//! Primitive types shared by every chainflow crate.
//!
//! - [`Address`]: 20-byte account address with EIP-55 checksum validation
//! - [`H256`]: 32-byte hash (transaction hashes, log topics)
//! - [`U256`]: 256-bit unsigned integer for on-chain amounts
//! - [`parse_units`] / [`format_units`]: decimal string <-> base-unit conversion

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;
mod units;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{HashError, H256};
pub use units::{format_ether, format_units, parse_ether, parse_units, UnitsError};

pub use primitive_types::U256;

/// Block number type
pub type BlockNumber = u64;

/// Decimal count of the native currency
pub const NATIVE_DECIMALS: u8 = 18;

/// Render a `U256` as a plain decimal string
pub fn to_decimal_string(value: &U256) -> String {
    value.to_string()
}
