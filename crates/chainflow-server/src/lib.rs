//! # chainflow-server
//!
//! HTTP surface for Chainflow actions.
//!
//! ## Endpoints
//!
//! | Method/Path | Action |
//! |-------------|--------|
//! | `POST /transfer` | Native or ERC-20 transfer |
//! | `POST /deploy-token` | ERC-20 through the token factory |
//! | `POST /deploy-nft-collection` | ERC-721 collection through the NFT factory |
//! | `POST /create-nft-collection` | Collection plus a first mint |
//! | `POST /create-and-mint-nft` | Mint, deploying the collection if needed |
//! | `POST /create-dao` | DAO through the DAO factory |
//! | `POST /swap`, `POST /swap-ping-pong` | Approve and swap |
//! | `POST /airdrop` | Batch native transfer |
//! | `GET /balance/:address[/:token]` | Native or token balance |
//! | `GET /health` | Liveness |
//! | `GET /tools`, `POST /tools/:tool` | Generic tool execution |
//! | `POST /workflow/compile`, `POST /workflow/expand` | Graph and tool chain conversion |
//!
//! ## Usage
//!
//! ```ignore
//! use chainflow_core::{ActionContext, NetworkConfig};
//! use chainflow_server::{ApiServer, ServerConfig};
//!
//! let ctx = ActionContext::from_config(NetworkConfig::default())?;
//! let server = ApiServer::new(ServerConfig::default(), ctx);
//! server.run(std::future::pending()).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
mod error;
mod routes;
mod server;

pub use config::AppConfig;
pub use error::{ApiResponse, ServerError, ServerResult};
pub use routes::routes;
pub use server::{build_router, ApiServer, AppState, ServerConfig};
