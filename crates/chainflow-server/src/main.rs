//! Chainflow server binary

mod cli;

use anyhow::{Context, Result};
use chainflow_core::ActionContext;
use chainflow_server::{ApiServer, AppConfig};
use cli::Cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading config")?;
    cli.apply(&mut config);

    tracing::info!(
        network = %config.network.network_name,
        rpc_url = %config.network.rpc_url,
        "Chainflow server starting..."
    );

    let ctx = ActionContext::from_config(config.network).context("building ledger client")?;
    let server = ApiServer::new(config.server, ctx);

    server
        .run(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Chainflow server stopped");

    Ok(())
}
