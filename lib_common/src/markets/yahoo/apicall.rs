//! # Yahoo Finance API Client
//!
//! Low-level access to the Yahoo Finance JSON endpoints.
//!
//! ## Session:
//! Several endpoints (`quoteSummary`, `options`) reject requests that lack a
//! session cookie and its matching "crumb" token. On first use the client
//! visits the cookie host, then asks the crumb endpoint for a token. The
//! cookie lives in the client's cookie store and the crumb is reused until
//! Yahoo rejects it. A crumb-bearing request answered with 401/403 (or an
//! "Invalid Crumb"/"Invalid Cookie" error) drops the crumb, so the next
//! request bootstraps a fresh session. Nothing is retried: a failed bootstrap
//! or a rejected crumb fails the request that hit it.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::markets::provider::UpstreamError;
use crate::retrieve::ky_http::ApiClient;

/// Default base for the JSON endpoints.
pub const YAHOO_QUERY_URL: &str = "https://query2.finance.yahoo.com/";
/// Visiting this host sets the session cookie.
const YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com/";
/// Returns the crumb matching the session cookie, as plain text.
const YAHOO_CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// Cookie/crumb aware client for the Yahoo Finance endpoints.
pub struct ApiCallYahoo {
    client: ApiClient,
    crumb: RwLock<Option<String>>,
}

impl ApiCallYahoo {
    /// Creates a client for the given query base URL (normally `YAHOO_QUERY_URL`).
    pub fn new(base_url: &str) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| UpstreamError::Http(e.to_string()))?;

        Ok(Self {
            client: ApiClient::with_client(base_url, http)?,
            crumb: RwLock::new(None),
        })
    }

    /// Absolute URL of `prefix/<symbol>`, the symbol escaped as one path segment.
    pub fn symbol_url(&self, prefix: &str, symbol: &str) -> Result<String, UpstreamError> {
        Ok(self.client.segment_url(prefix, symbol)?)
    }

    /// GETs a JSON document. With `with_crumb`, the session crumb is appended
    /// to the query string (bootstrapping the session first if needed).
    pub async fn fetch_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        with_crumb: bool,
    ) -> Result<Value, UpstreamError> {
        let crumb = if with_crumb {
            Some(self.crumb().await?)
        } else {
            None
        };

        let mut params: Vec<(&str, &str)> = query.to_vec();
        if let Some(crumb) = crumb.as_deref() {
            params.push(("crumb", crumb));
        }

        let response = self
            .client
            .request::<Value>(Method::GET, path, &params, Some(json_headers()))
            .await?;

        if !response.success {
            if with_crumb && session_rejected(response.status, response.error_body.as_deref()) {
                self.reset_session().await;
            }
            // Yahoo explains most failures in the body ("Not Found", "Invalid Crumb", ...)
            if let Some(description) = response
                .error_body
                .as_deref()
                .and_then(error_description)
            {
                return Err(UpstreamError::NoData(description));
            }
            return Err(UpstreamError::Status {
                status: response.status,
                path: path.to_string(),
            });
        }

        response
            .data
            .ok_or_else(|| UpstreamError::Decode(format!("empty body for {}", path)))
    }

    async fn crumb(&self) -> Result<String, UpstreamError> {
        if let Some(crumb) = self.crumb.read().await.as_ref() {
            return Ok(crumb.clone());
        }

        // Concurrent first requests bootstrap once
        let mut slot = self.crumb.write().await;
        if let Some(crumb) = slot.as_ref() {
            return Ok(crumb.clone());
        }
        let crumb = self.bootstrap_session().await?;
        *slot = Some(crumb.clone());
        Ok(crumb)
    }

    async fn reset_session(&self) {
        if self.crumb.write().await.take().is_some() {
            log::info!("Yahoo rejected the session crumb, it will be renewed on the next request");
        }
    }

    async fn bootstrap_session(&self) -> Result<String, UpstreamError> {
        // The cookie host answers 404 but still sets the cookie we need
        if let Err(e) = self
            .client
            .request_text(Method::GET, YAHOO_COOKIE_URL, &[], None)
            .await
        {
            log::debug!("Cookie bootstrap request failed: {}", e);
        }

        let response = self
            .client
            .request_text(Method::GET, YAHOO_CRUMB_URL, &[], None)
            .await?;

        match response.data {
            Some(text) if is_valid_crumb(&text) => {
                log::debug!("Yahoo session crumb acquired");
                Ok(text.trim().to_string())
            }
            _ => Err(UpstreamError::Status {
                status: response.status,
                path: YAHOO_CRUMB_URL.to_string(),
            }),
        }
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

fn is_valid_crumb(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && !text.contains('<') && !text.contains(' ')
}

/// Whether a failed crumb-bearing response means the cookie/crumb pair is stale.
fn session_rejected(status: u16, error_body: Option<&str>) -> bool {
    if status == 401 || status == 403 {
        return true;
    }
    error_body
        .and_then(error_description)
        .is_some_and(|d| d.contains("Invalid Crumb") || d.contains("Invalid Cookie"))
}

/// Pulls `{"<root>": {"error": {"description": ...}}}` out of an error body.
fn error_description(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .as_object()?
        .values()
        .find_map(|root| root.get("error"))
        .and_then(|error| error.get("description"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
