//! # Financial Market APIs Module
//!
//! This module groups together all logic and client implementations related to
//! specific financial market data providers and their APIs. Its purpose is to
//! abstract the details of interacting with external market services, providing
//! normalized data to the rest of the system.
//!
//! ## Contained Modules:
//!
//! - **`provider`**: The upstream accessor contract (`StockDataProvider`,
//!   `PeerLookup`) and the `UpstreamError` every accessor reports.
//!
//! - **`tabular`**: The generic `Table` result (named columns plus ordered rows)
//!   and its flattening into JSON records or column maps.
//!
//! - **`info`**: `InfoDocument`, the optional-field view of a ticker's summary
//!   modules.
//!
//! - **`yahoo`**: The Yahoo Finance accessor (quotes, history, fundamentals,
//!   ownership, options, news), including cookie/crumb session bootstrap.
//!
//! - **`finnhub`**: The Finnhub peer-lookup client.
//!
//! By centralizing these market-specific clients, this module ensures a clean
//! separation of concerns and facilitates easier integration of new data providers
//! in the future.

/// Upstream accessor traits and error type.
pub mod provider;
/// Tabular results and their JSON flattening.
pub mod tabular;
/// Optional-field info document.
pub mod info;
/// Client for the Yahoo Finance APIs.
pub mod yahoo;
/// Client for the Finnhub peer-lookup API.
pub mod finnhub;
