//! HTTP server implementation

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chainflow_core::{ActionContext, ActionRegistry};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::error::{ServerError, ServerResult};
use crate::routes;

/// Server configuration, the `[server]` table of the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Maximum request body size (default: 1MB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
    /// Request timeout in seconds (default: 300)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Enable CORS (default: true)
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

// covers submission and confirmation
fn default_request_timeout_secs() -> u64 {
    300
}

fn default_enable_cors() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            max_body_size: default_max_body_size(),
            request_timeout_secs: default_request_timeout_secs(),
            enable_cors: default_enable_cors(),
        }
    }
}

impl ServerConfig {
    /// Create a new server config with the given address
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Default::default()
        }
    }

    /// Request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Shared state of the HTTP handlers
pub struct AppState {
    /// Ledger client, configuration and price source
    pub ctx: ActionContext,
    /// Tool handlers for the generic tool endpoint
    pub registry: ActionRegistry,
}

impl AppState {
    /// Create state with every tool registered
    pub fn new(ctx: ActionContext) -> Self {
        Self {
            ctx,
            registry: ActionRegistry::new(),
        }
    }
}

/// Chainflow HTTP server
pub struct ApiServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new server
    pub fn new(config: ServerConfig, ctx: ActionContext) -> Self {
        Self {
            config,
            state: Arc::new(AppState::new(ctx)),
        }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        build_router(&self.config, self.state.clone())
    }

    /// Run the server until `shutdown` resolves
    pub async fn run(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ServerResult<()> {
        let app = self.router();

        let listener = TcpListener::bind(self.config.listen_addr).await?;
        tracing::info!("API server listening on {}", self.config.listen_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Serve)?;

        Ok(())
    }

    /// Get the server listen address
    pub fn listen_addr(&self) -> SocketAddr {
        self.config.listen_addr
    }
}

/// Routes wrapped in tracing, body limit, timeout and optional CORS layers
pub fn build_router(config: &ServerConfig, state: Arc<AppState>) -> Router {
    let mut router = routes::routes().layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(config.max_body_size))
            .layer(TimeoutLayer::new(config.request_timeout())),
    );

    if config.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert_eq!(config.request_timeout(), Duration::from_secs(300));
        assert!(config.enable_cors);
    }

    #[test]
    fn test_server_config_new() {
        let addr: SocketAddr = "127.0.0.1:9545".parse().unwrap();
        let config = ServerConfig::new(addr);
        assert_eq!(config.listen_addr.port(), 9545);
        assert!(config.enable_cors);
    }
}
