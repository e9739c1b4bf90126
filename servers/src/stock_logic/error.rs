//! # HTTP Error Boundary
//!
//! Every handler returns `Result<_, ApiError>`. Upstream failures of any kind
//! collapse into `UpstreamFailure` (400); `NotFound` (404) is reserved for an
//! empty news list. Both render as `{"error": "<message>"}`.

use axum::{
    Json,
    extract::{FromRequestParts, Path, rejection::PathRejection},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;

use lib_common::UpstreamError;

#[derive(Debug, PartialEq)]
pub enum ApiError {
    UpstreamFailure(String),
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UpstreamFailure(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::UpstreamFailure(msg) | ApiError::NotFound(msg) => msg,
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::UpstreamFailure(err.to_string())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::UpstreamFailure(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

/// `Path` extractor whose rejection (bad percent-encoding, invalid UTF-8)
/// is rendered as an `ApiError` body instead of axum's plain text.
pub struct SymbolPath<T>(pub T);

impl<S, T> FromRequestParts<S> for SymbolPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(SymbolPath(value))
    }
}
