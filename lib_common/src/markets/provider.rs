//! # Upstream Accessor Contract
//!
//! The per-symbol data-retrieval interface the gateway talks to. Concrete
//! providers (Yahoo Finance, Finnhub) implement these traits; tests plug in
//! stubs. Every method reports failures as an `UpstreamError`.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::markets::info::InfoDocument;
use crate::markets::tabular::Table;
use crate::retrieve::ky_http::RetrieveError;

/// Failure reported by an upstream accessor.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),
    #[error("upstream request failed: {0}")]
    Http(String),
    #[error("upstream returned status {status} for {path}")]
    Status { status: u16, path: String },
    #[error("malformed upstream response: {0}")]
    Decode(String),
    #[error("no data found: {0}")]
    NoData(String),
}

impl From<RetrieveError> for UpstreamError {
    fn from(err: RetrieveError) -> Self {
        match err {
            RetrieveError::InvalidUrl(e) => UpstreamError::InvalidUrl(e.to_string()),
            RetrieveError::Transport(e) if e.is_decode() => UpstreamError::Decode(e.to_string()),
            RetrieveError::Transport(e) => UpstreamError::Http(e.to_string()),
        }
    }
}

/// Call and put legs for one expiration date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionChain {
    pub calls: Table,
    pub puts: Table,
}

/// Per-symbol market data accessor.
#[async_trait]
pub trait StockDataProvider: Send + Sync {
    /// Merged summary modules for the ticker.
    async fn info(&self, symbol: &str) -> Result<InfoDocument, UpstreamError>;

    /// Price bars for `period` (e.g. "5d", "1y", "max") at `interval` (e.g. "1d").
    async fn history(&self, symbol: &str, period: &str, interval: &str)
        -> Result<Table, UpstreamError>;

    async fn news(&self, symbol: &str) -> Result<Vec<Value>, UpstreamError>;

    async fn income_stmt(&self, symbol: &str) -> Result<Table, UpstreamError>;

    async fn balance_sheet(&self, symbol: &str) -> Result<Table, UpstreamError>;

    async fn cash_flow(&self, symbol: &str) -> Result<Table, UpstreamError>;

    async fn institutional_holders(&self, symbol: &str) -> Result<Table, UpstreamError>;

    async fn major_holders(&self, symbol: &str) -> Result<Table, UpstreamError>;

    async fn recommendations(&self, symbol: &str) -> Result<Table, UpstreamError>;

    async fn earnings_dates(&self, symbol: &str) -> Result<Table, UpstreamError>;

    async fn dividends(&self, symbol: &str) -> Result<Table, UpstreamError>;

    async fn splits(&self, symbol: &str) -> Result<Table, UpstreamError>;

    async fn sustainability(&self, symbol: &str) -> Result<Table, UpstreamError>;

    /// Available option expiration dates, formatted `YYYY-MM-DD`.
    async fn options(&self, symbol: &str) -> Result<Vec<String>, UpstreamError>;

    async fn option_chain(&self, symbol: &str, date: &str) -> Result<OptionChain, UpstreamError>;

    async fn insider_transactions(&self, symbol: &str) -> Result<Table, UpstreamError>;
}

/// Peer (similar company) lookup.
#[async_trait]
pub trait PeerLookup: Send + Sync {
    /// Raw peer list as returned by the provider, queried symbol included.
    async fn peers(&self, symbol: &str) -> Result<Vec<String>, UpstreamError>;
}
