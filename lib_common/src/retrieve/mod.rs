//! # Data Retrieval Module
//!
//! This module provides a centralized location for generic data retrieval
//! clients and utilities, primarily focused on HTTP-based interactions.
//!
//! ## Purpose:
//! The goal of the `retrieve` module is to offer a consistent way to fetch
//! data from external services, encapsulating URL joining, header and query
//! injection, and JSON decoding. This prevents duplication of networking
//! logic across the different market API clients.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: A generic HTTP `ApiClient` built on `reqwest`. It serves as
//!   the foundation for the Yahoo Finance and Finnhub clients.
//!
//! Requests are issued exactly once: failures surface to the caller as a
//! `RetrieveError` or as a non-success `ApiResponse`, never as a silent retry.

/// Generic asynchronous HTTP API client.
pub mod ky_http;
