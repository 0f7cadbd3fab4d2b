use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Interval
// ---------------------------------------------------------------------------

/// Bar granularity of a price history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    Daily,
    Weekly,
}

impl Interval {
    /// Lowercase label used in messages and file names ("daily" / "weekly").
    pub fn label(&self) -> &'static str {
        match self {
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
        }
    }

    /// Plural unit noun for log lines ("days" / "weeks").
    pub fn unit(&self) -> &'static str {
        match self {
            Interval::Daily => "days",
            Interval::Weekly => "weeks",
        }
    }

    /// Interval code understood by the Yahoo chart API.
    pub fn yahoo_code(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
        }
    }

    /// Default lookback range; long enough to hold 21 bars for a listed symbol.
    pub fn default_range(&self) -> &'static str {
        match self {
            Interval::Daily => "3mo",
            Interval::Weekly => "6mo",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Price history
// ---------------------------------------------------------------------------

/// A single closing price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: Decimal,
}

/// Closing prices for one symbol at one interval, ordered oldest to newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub interval: Interval,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, interval: Interval, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        Self {
            symbol: symbol.into(),
            interval,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closing prices in chronological order.
    pub fn closes(&self) -> Vec<Decimal> {
        self.points.iter().map(|p| p.close).collect()
    }
}

// ---------------------------------------------------------------------------
// Trend report
// ---------------------------------------------------------------------------

/// Signed streak counts for both granularities.
///
/// Positive values count periods above the 21-period average, negative
/// values count periods at or below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub days_above: i64,
    pub weeks_above: i64,
}
