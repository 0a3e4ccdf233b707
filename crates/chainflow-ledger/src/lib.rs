//! # chainflow-ledger
//!
//! Collaborators the action pipeline uses to talk to the ledger network.
//!
//! ## Features
//!
//! - **LedgerClient**: JSON-RPC client (balances, calls, gas estimation, submission, receipts)
//! - **Transport**: pluggable RPC transport, with an HTTP implementation and a scripted mock
//! - **TxBuilder**: EIP-155 legacy transactions, signed with a [`chainflow_crypto::Signer`]
//! - **Interface**: contract functions and events; logs are decoded by topic hash
//! - **ABI**: Solidity ABI encoding and decoding
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chainflow_ledger::{abis, LedgerClient, TxBuilder};
//! use chainflow_crypto::Signer;
//! use chainflow_primitives::{Address, U256};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LedgerClient::new_mock();
//!     let signer = Signer::from_private_key_hex(
//!         "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
//!     )?;
//!
//!     let token = Address::from_hex("0xbecd9b5f373877881d91cbdbaf013d97eb532154")?;
//!     let data = abis::erc20().encode_call(
//!         "transfer",
//!         &[
//!             chainflow_ledger::abi::Token::Address(Address::ZERO),
//!             chainflow_ledger::abi::Token::Uint(U256::from(1000)),
//!         ],
//!     )?;
//!
//!     let tx = TxBuilder::new(client.chain_id().await?)
//!         .nonce(0)
//!         .gas_limit(60_000)
//!         .gas_price(client.gas_price().await?)
//!         .to(token)
//!         .data(data)
//!         .sign(&signer)?;
//!     let hash = client.send_raw_transaction(&tx.raw).await?;
//!     println!("submitted {}", hash);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod abis;
mod client;
mod error;
pub mod interface;
mod transport;
mod tx;
pub mod types;

pub use client::LedgerClient;
pub use error::LedgerError;
pub use interface::{DecodedEvent, Interface};
pub use transport::{MockTransport, Transport, MOCK_TX_HASH};
pub use tx::{SignedTx, TxBuilder};
pub use types::{BlockId, CallRequest, LogRecord, TransactionReceipt};

#[cfg(feature = "http")]
pub use transport::HttpTransport;
