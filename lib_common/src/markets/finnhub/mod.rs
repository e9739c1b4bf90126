//! # Finnhub Peer Lookup
//!
//! A small client for the Finnhub `stock/peers` endpoint, which lists
//! companies operating in the same industry as a given ticker.
//!
//! ## Authentication:
//! Finnhub expects the API key as a `token` query parameter. The key is handed
//! in by the caller (see the server configuration); it is never part of the
//! source and never written to the logs.

use async_trait::async_trait;
use reqwest::Method;

use crate::markets::provider::{PeerLookup, UpstreamError};
use crate::retrieve::ky_http::ApiClient;

/// Default Finnhub REST base URL.
pub const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1/";

const PEERS_PATH: &str = "stock/peers";

/// # Finnhub Peers Client
///
/// Implements `PeerLookup` against Finnhub.
pub struct FinnhubPeers {
    client: ApiClient,
    api_key: String,
}

impl FinnhubPeers {
    /// Creates a client for `base_url` (normally `FINNHUB_BASE_URL`).
    ///
    /// # Errors
    /// Returns `UpstreamError::InvalidUrl` if `base_url` cannot be parsed.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: ApiClient::new(base_url)?,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl PeerLookup for FinnhubPeers {
    async fn peers(&self, symbol: &str) -> Result<Vec<String>, UpstreamError> {
        let response = self
            .client
            .request::<Vec<String>>(
                Method::GET,
                PEERS_PATH,
                &[("symbol", symbol), ("token", self.api_key.as_str())],
                None,
            )
            .await?;

        if !response.success {
            return Err(UpstreamError::Status {
                status: response.status,
                path: PEERS_PATH.to_string(),
            });
        }

        log::debug!("Finnhub returned peers for {}", symbol);
        Ok(response.data.unwrap_or_default())
    }
}
