use std::sync::Arc;

use lib_common::{PeerLookup, StockDataProvider};

/// Shared handler state: the upstream accessors. Both are immutable and
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn StockDataProvider>,
    pub peers: Arc<dyn PeerLookup>,
}

impl AppState {
    pub fn new(provider: Arc<dyn StockDataProvider>, peers: Arc<dyn PeerLookup>) -> Self {
        Self { provider, peers }
    }
}
