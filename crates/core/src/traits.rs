use crate::models::*;
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// History Provider Trait
// ---------------------------------------------------------------------------

/// Errors that can occur while retrieving price history.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("No data found, symbol may be delisted: {0}")]
    SymbolNotFound(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Source of closing-price history, queried once per interval per request.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Fetch the recent closing-price history of `symbol` at `interval`,
    /// oldest first.
    async fn fetch_history(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<PriceSeries, DataError>;
}
