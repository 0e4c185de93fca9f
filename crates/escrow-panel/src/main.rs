//! escrow-panel - admin panel for the bsc usdt escrow
//!
//! usage:
//!   SENDER_KEY=... escrow-panel --escrow 0x.. --token 0x.. --company-wallet 0x..
//!   escrow-panel --config panel.toml --metrics-port 9100
//!
//! the signing key is read from SENDER_KEY (or the config file) and never logged.

use anyhow::Result;
use clap::Parser;
use escrow_panel::{router, Args, PanelConfig, TransferPanel};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "escrow_panel=info,escrow_client=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = PanelConfig::load(args)?;

    info!("escrow-panel v{}", env!("CARGO_PKG_VERSION"));
    info!("  escrow: {}", config.escrow);
    info!("  token: {} ({})", config.token, config.chain.token_symbol);
    info!("  company wallet: {}", config.company_wallet);
    info!("  rpc: {}", config.chain.rpc_endpoint);
    info!("  explorer: {}", config.chain.explorer_url);

    if let Some(port) = config.metrics_port {
        let metrics_addr = SocketAddr::new(config.listen.ip(), port);
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()?;
        info!("  metrics: {}", metrics_addr);
    }

    let panel = Arc::new(TransferPanel::connect(&config)?);

    match panel.verify_company_wallet().await {
        Ok(true) => {}
        Ok(false) => warn!("company wallet mismatch, transfers are expected to revert"),
        Err(e) => warn!("could not read companyWallet from escrow: {}", e),
    }

    let app = router(panel);
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!("listening on http://{}", config.listen);

    axum::serve(listener, app).await?;

    Ok(())
}
