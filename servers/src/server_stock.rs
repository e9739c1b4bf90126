//! # Stock Data Gateway
//!
//! HTTP facade over Yahoo Finance (quotes, history, fundamentals, ownership,
//! options, news) and Finnhub (peer companies). Every `/stock/...` route
//! forwards one symbol to the upstream accessors and reshapes the answer into
//! JSON; failures come back as `{"error": "..."}`.
//!
//! Configuration is layered: built-in defaults, then `server_stock.conf`, then
//! environment variables and CLI flags (see `stock_logic::config`).

use anyhow::Result;
use std::sync::Arc;
use tokio::signal;

use lib_common::{FinnhubPeers, YahooFinance};

mod stock_logic;
use stock_logic::{config, downstream, logger, state};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = config::load_config()?;
    logger::setup_logging(&settings.log_dir, &settings.log_level)?;
    log::debug!("Loaded settings: {:?}", settings);

    // Explicitly install the default crypto provider for rustls
    let _ = rustls::crypto::ring::default_provider().install_default();

    let provider = YahooFinance::new(&settings.yahoo_query_url)?;
    let peers = FinnhubPeers::new(&settings.finnhub_base_url, settings.finnhub_api_key.clone())?;
    let app_state = state::AppState::new(Arc::new(provider), Arc::new(peers));

    let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);

    let mut downstream_handle = tokio::spawn(downstream::run(
        settings.clone(),
        app_state,
        shutdown_tx.subscribe(),
    ));

    // Wait for a shutdown signal, or for the server to stop on its own
    tokio::select! {
        _ = signal::ctrl_c() => {
            log::info!("Ctrl-C received, initiating shutdown.");
        }
        _ = terminate() => {
            log::info!("SIGTERM received, initiating shutdown.");
        }
        result = &mut downstream_handle => {
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    log::error!("Downstream server failed: {:#}", e);
                    Err(e)
                }
                Err(e) => Err(e.into()),
            };
        }
    }

    let _ = shutdown_tx.send(());
    downstream_handle.await??;

    log::info!("Shutdown complete.");
    Ok(())
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut term_signal) => {
            term_signal.recv().await;
        }
        Err(e) => {
            log::warn!("Cannot listen for SIGTERM: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    // On non-unix platforms, just wait forever.
    std::future::pending::<()>().await;
}
