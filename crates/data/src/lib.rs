pub mod csv_loader;
pub mod memory;
pub mod yahoo;

pub use memory::InMemoryHistoryProvider;
pub use yahoo::{YahooConfig, YahooHistoryProvider};

use async_trait::async_trait;
use std::path::PathBuf;
use trendwatch_core::{DataError, HistoryProvider, Interval, PriceSeries};

/// A CSV-file-based history provider.
///
/// Reads `{directory}/{symbol}_{interval}.csv`, e.g. `AAPL_daily.csv` or
/// `^GSPC_weekly.csv`.
pub struct CsvHistoryProvider {
    pub directory: PathBuf,
}

impl CsvHistoryProvider {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn file_path(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.directory
            .join(format!("{}_{}.csv", symbol, interval.label()))
    }
}

#[async_trait]
impl HistoryProvider for CsvHistoryProvider {
    fn name(&self) -> &str {
        "csv"
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<PriceSeries, DataError> {
        // Symbols are path components; refuse anything that could escape the directory.
        if symbol.is_empty() || symbol.contains(['/', '\\']) || symbol.starts_with('.') {
            return Err(DataError::SymbolNotFound(symbol.to_string()));
        }

        let file_path = self.file_path(symbol, interval);
        if !file_path.exists() {
            tracing::debug!(path = %file_path.display(), "CSV history file missing");
            return Err(DataError::SymbolNotFound(symbol.to_string()));
        }
        csv_loader::load_series_from_csv(&file_path, symbol, interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_naming() {
        let provider = CsvHistoryProvider::new("/data");
        assert_eq!(
            provider.file_path("^GSPC", Interval::Weekly),
            PathBuf::from("/data/^GSPC_weekly.csv")
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let provider = CsvHistoryProvider::new(std::env::temp_dir().join("trendwatch-none"));
        let err = provider.fetch_history("NOPE", Interval::Daily).await.unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound(_)));

        let err = provider.fetch_history("../etc", Interval::Daily).await.unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound(_)));
    }
}
