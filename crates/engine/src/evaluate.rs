use std::sync::Arc;
use tracing::{debug, error, warn};
use trendwatch_core::*;
use trendwatch_indicators::streak::{compute_streak, StreakError};

/// Moving average length used for both daily and weekly series.
pub const DEFAULT_WINDOW: usize = 21;

/// Why a ticker could not be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Fewer closes than the window for the given interval.
    InsufficientData(Interval),
    /// The history source failed (unknown symbol, network, bad payload).
    Upstream,
    /// The ticker name could not be read from the request.
    InvalidTicker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TrendFailure {
    fn insufficient(interval: Interval) -> Self {
        Self {
            kind: FailureKind::InsufficientData(interval),
            message: format!("Not enough {} data", interval.label()),
        }
    }

    fn upstream(err: &DataError) -> Self {
        Self {
            kind: FailureKind::Upstream,
            message: format!("Server error: {}", err),
        }
    }

    /// Failure for a ticker name that never reached the provider.
    pub fn invalid_ticker(detail: &str) -> Self {
        Self {
            kind: FailureKind::InvalidTicker,
            message: format!("Server error: {}", detail),
        }
    }
}

/// Outcome of evaluating one ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrendOutcome {
    Success(TrendReport),
    Failure(TrendFailure),
}

impl TrendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TrendOutcome::Success(_))
    }
}

/// Computes daily and weekly streaks for a symbol from a history provider.
#[derive(Clone)]
pub struct TrendEvaluator {
    provider: Arc<dyn HistoryProvider>,
    window: usize,
}

impl std::fmt::Debug for TrendEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrendEvaluator")
            .field("provider", &self.provider.name())
            .field("window", &self.window)
            .finish()
    }
}

impl TrendEvaluator {
    pub fn new(provider: Arc<dyn HistoryProvider>, window: usize) -> Result<Self, StreakError> {
        if window == 0 {
            return Err(StreakError::InvalidWindow);
        }
        Ok(Self { provider, window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Evaluate `symbol` (already resolved to the provider's naming).
    ///
    /// The daily series gates the weekly one: when the daily check fails the
    /// weekly history is never requested.
    pub async fn evaluate(&self, symbol: &str) -> TrendOutcome {
        debug!(%symbol, provider = self.provider.name(), "Evaluating trend");

        let days_above = match self.streak(symbol, Interval::Daily).await {
            Ok(periods) => periods,
            Err(failure) => return TrendOutcome::Failure(failure),
        };

        let weeks_above = match self.streak(symbol, Interval::Weekly).await {
            Ok(periods) => periods,
            Err(failure) => return TrendOutcome::Failure(failure),
        };

        TrendOutcome::Success(TrendReport {
            days_above,
            weeks_above,
        })
    }

    async fn streak(&self, symbol: &str, interval: Interval) -> Result<i64, TrendFailure> {
        let series = self
            .provider
            .fetch_history(symbol, interval)
            .await
            .map_err(|e| {
                error!(%symbol, %interval, error = ?e, "Error fetching data for {}: {}", symbol, e);
                TrendFailure::upstream(&e)
            })?;

        match compute_streak(&series.closes(), self.window) {
            Ok(periods) => Ok(periods),
            Err(StreakError::InsufficientData { observed, .. }) => {
                warn!(
                    "Not enough {} data for {}: {} {}",
                    interval.label(),
                    symbol,
                    observed,
                    interval.unit()
                );
                Err(TrendFailure::insufficient(interval))
            }
            // Window is validated in `new`.
            Err(StreakError::InvalidWindow) => Err(TrendFailure::insufficient(interval)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use trendwatch_data::InMemoryHistoryProvider;

    fn series(symbol: &str, interval: Interval, closes: &[i64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint {
                timestamp: start + Duration::days(i as i64),
                close: Decimal::from(*c),
            })
            .collect();
        PriceSeries::new(symbol, interval, points)
    }

    /// Wraps another provider and records which intervals were requested.
    struct RecordingProvider {
        inner: InMemoryHistoryProvider,
        calls: Mutex<Vec<Interval>>,
    }

    #[async_trait]
    impl HistoryProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn fetch_history(
            &self,
            symbol: &str,
            interval: Interval,
        ) -> Result<PriceSeries, DataError> {
            self.calls.lock().unwrap().push(interval);
            self.inner.fetch_history(symbol, interval).await
        }
    }

    fn evaluator(provider: InMemoryHistoryProvider) -> TrendEvaluator {
        TrendEvaluator::new(Arc::new(provider), DEFAULT_WINDOW).unwrap()
    }

    #[tokio::test]
    async fn test_success_reports_both_streaks() {
        let rising: Vec<i64> = (1..=25).collect();
        let falling: Vec<i64> = (1..=21).rev().collect();
        let provider = InMemoryHistoryProvider::new()
            .with_series(series("^GSPC", Interval::Daily, &rising))
            .with_series(series("^GSPC", Interval::Weekly, &falling));

        let outcome = evaluator(provider).evaluate("^GSPC").await;
        // Daily: last 21 = 5..=25, mean 15 -> 16..=25 above -> 10.
        // Weekly: mean 11, 10..=1 below -> -10.
        assert_eq!(
            outcome,
            TrendOutcome::Success(TrendReport {
                days_above: 10,
                weeks_above: -10
            })
        );
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_daily_failure_skips_weekly_fetch() {
        let provider = RecordingProvider {
            inner: InMemoryHistoryProvider::new()
                .with_series(series("X", Interval::Daily, &[1; 20]))
                .with_series(series("X", Interval::Weekly, &[1; 30])),
            calls: Mutex::new(Vec::new()),
        };
        let provider = Arc::new(provider);
        let evaluator = TrendEvaluator::new(provider.clone(), DEFAULT_WINDOW).unwrap();

        let outcome = evaluator.evaluate("X").await;
        assert_eq!(
            outcome,
            TrendOutcome::Failure(TrendFailure {
                kind: FailureKind::InsufficientData(Interval::Daily),
                message: "Not enough daily data".to_string(),
            })
        );
        assert_eq!(*provider.calls.lock().unwrap(), vec![Interval::Daily]);
    }

    #[tokio::test]
    async fn test_weekly_shortfall_after_daily_passes() {
        let provider = InMemoryHistoryProvider::new()
            .with_series(series("X", Interval::Daily, &[5; 25]))
            .with_series(series("X", Interval::Weekly, &[5; 10]));

        match evaluator(provider).evaluate("X").await {
            TrendOutcome::Failure(f) => {
                assert_eq!(f.kind, FailureKind::InsufficientData(Interval::Weekly));
                assert_eq!(f.message, "Not enough weekly data");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upstream_error_is_server_error() {
        let outcome = evaluator(InMemoryHistoryProvider::new()).evaluate("ZZZZ").await;
        match outcome {
            TrendOutcome::Failure(f) => {
                assert_eq!(f.kind, FailureKind::Upstream);
                assert!(f.message.starts_with("Server error: "));
                assert!(f.message.contains("ZZZZ"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_ticker_failure_message() {
        let failure = TrendFailure::invalid_ticker("Invalid UTF-8 in `name`");
        assert_eq!(failure.kind, FailureKind::InvalidTicker);
        assert_eq!(failure.message, "Server error: Invalid UTF-8 in `name`");
    }

    #[test]
    fn test_zero_window_rejected() {
        let provider: Arc<dyn HistoryProvider> = Arc::new(InMemoryHistoryProvider::new());
        assert!(TrendEvaluator::new(provider, 0).is_err());
    }
}
