//! # HTTP Retrieval Utilities
//!
//! This module provides an asynchronous API client wrapper around `reqwest`
//! with standardized JSON response handling.

use reqwest::{header::HeaderMap, Client, Method, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised before a response status is available.
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// The base URL or the joined request URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Network, TLS or body decoding failure reported by `reqwest`.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A standardized container for API responses.
///
/// This struct wraps the deserialized data along with metadata about the
/// HTTP transaction, such as status codes and headers.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The successfully deserialized response body, if any.
    pub data: Option<T>,
    /// The raw error body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
    /// The headers returned by the server.
    pub headers: HeaderMap,
}

/// A flexible asynchronous HTTP client.
///
/// Handles base URLs, path segments and query strings. Absolute
/// paths passed to `request` bypass the base URL, which lets one client (and
/// its cookie jar) talk to several hosts of the same provider.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The underlying pooled client.
    inner: Client,
    /// The base URL to which all relative paths are joined.
    base_url: Url,
}

impl ApiClient {
    /// Creates a new `ApiClient` with a default `reqwest::Client`.
    ///
    /// # Arguments
    /// * `base_url` - The absolute base URL for the API (e.g., "https://api.example.com/v1/").
    ///
    /// # Errors
    /// Returns `RetrieveError::InvalidUrl` if `base_url` is not a valid absolute URL.
    pub fn new(base_url: &str) -> Result<Self, RetrieveError> {
        Self::with_client(base_url, Client::new())
    }

    /// Creates a new `ApiClient` around a pre-configured `reqwest::Client`
    /// (custom user agent, cookie store, ...).
    pub fn with_client(base_url: &str, client: Client) -> Result<Self, RetrieveError> {
        let url = Url::parse(base_url)?;
        if url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }

        Ok(Self {
            inner: client,
            base_url: url,
        })
    }

    /// The base URL every relative path is joined to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for `prefix` (a `/`-separated path under the base URL)
    /// followed by `segment` as one percent-encoded path segment.
    ///
    /// `/`, `?`, `#` and `%` inside `segment` are escaped, and a segment of
    /// `.` or `..` is dropped, so caller input cannot leave the prefix.
    pub fn segment_url(&self, prefix: &str, segment: &str) -> Result<String, RetrieveError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(prefix.split('/').filter(|part| !part.is_empty()))
            .push(segment);
        Ok(url.into())
    }

    /// Performs a generic HTTP request and decodes a JSON body on success.
    ///
    /// # Arguments
    /// * `method` - The HTTP verb (GET, POST, etc.).
    /// * `path` - The relative path to append to the base URL, or an absolute URL.
    /// * `query` - Query string pairs appended to the URL.
    /// * `headers` - Optional additional headers for this specific request.
    ///
    /// # Errors
    /// Returns a `RetrieveError` if URL joining, network execution or body
    /// decoding fails. Non-2xx statuses are not errors: they come back with
    /// `success == false` and the raw body in `error_body`.
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse<T>, RetrieveError>
    where
        T: DeserializeOwned,
    {
        let req = self.build(method, path, query, headers)?;

        let response: reqwest::Response = req.send().await?;
        let status = response.status();
        let resp_headers = response.headers().clone();

        if status.is_success() {
            let data = response.json::<T>().await?;
            Ok(ApiResponse {
                data: Some(data),
                error_body: None,
                status: status.as_u16(),
                success: true,
                headers: resp_headers,
            })
        } else {
            // Capture the error body as a string for debugging
            let error_text = response.text().await.ok();
            log::warn!("{} answered with status {}", path_for_log(path), status);
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
                headers: resp_headers,
            })
        }
    }

    /// Same as `request` but keeps the body as plain text, for endpoints that
    /// do not answer with JSON.
    pub async fn request_text(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse<String>, RetrieveError> {
        let req = self.build(method, path, query, headers)?;

        let response = req.send().await?;
        let status = response.status();
        let resp_headers = response.headers().clone();
        let text = response.text().await?;

        if status.is_success() {
            Ok(ApiResponse {
                data: Some(text),
                error_body: None,
                status: status.as_u16(),
                success: true,
                headers: resp_headers,
            })
        } else {
            Ok(ApiResponse {
                data: None,
                error_body: Some(text),
                status: status.as_u16(),
                success: false,
                headers: resp_headers,
            })
        }
    }

    fn build(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        headers: Option<HeaderMap>,
    ) -> Result<reqwest::RequestBuilder, RetrieveError> {
        let full_url = self.base_url.join(path)?;
        log::debug!("{} {}", method, path_for_log(path));

        let mut req = self.inner.request(method, full_url);

        if !query.is_empty() {
            req = req.query(query);
        }

        if let Some(h) = headers {
            req = req.headers(h);
        }

        Ok(req)
    }
}

// Query strings may carry credentials, so only the path is ever logged.
fn path_for_log(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}
