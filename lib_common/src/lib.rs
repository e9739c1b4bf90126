// Declare the feature-gated modules
#[cfg(feature = "retrieve")]
pub mod retrieve; // Generic HTTP client
#[cfg(feature = "markets")]
pub mod markets; // Upstream accessors and tabular results

// Re-export the pieces every consumer touches
#[cfg(feature = "retrieve")]
pub use retrieve::ky_http::{ApiClient, ApiResponse, RetrieveError};
#[cfg(feature = "markets")]
pub use markets::provider::{OptionChain, PeerLookup, StockDataProvider, UpstreamError};
#[cfg(feature = "markets")]
pub use markets::tabular::Table;
#[cfg(feature = "markets")]
pub use markets::info::InfoDocument;
#[cfg(feature = "markets")]
pub use markets::yahoo::YahooFinance;
#[cfg(feature = "markets")]
pub use markets::finnhub::FinnhubPeers;
