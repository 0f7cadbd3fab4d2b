use async_trait::async_trait;
use std::collections::HashMap;
use trendwatch_core::{DataError, HistoryProvider, Interval, PriceSeries};

/// History provider backed by preloaded series, keyed by symbol and interval.
///
/// Used for tests and offline demos; records nothing and never touches the
/// network.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryProvider {
    series: HashMap<(String, Interval), PriceSeries>,
}

impl InMemoryHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the series stored under its own symbol and interval.
    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series
            .insert((series.symbol.clone(), series.interval), series);
    }
}

#[async_trait]
impl HistoryProvider for InMemoryHistoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<PriceSeries, DataError> {
        self.series
            .get(&(symbol.to_string(), interval))
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use trendwatch_core::PricePoint;

    #[tokio::test]
    async fn test_lookup_by_symbol_and_interval() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let provider = InMemoryHistoryProvider::new().with_series(PriceSeries::new(
            "^GSPC",
            Interval::Daily,
            vec![PricePoint { timestamp: ts, close: dec!(4700) }],
        ));

        let daily = provider.fetch_history("^GSPC", Interval::Daily).await.unwrap();
        assert_eq!(daily.closes(), vec![dec!(4700)]);

        let weekly = provider.fetch_history("^GSPC", Interval::Weekly).await;
        assert!(matches!(weekly, Err(DataError::SymbolNotFound(_))));
    }
}
