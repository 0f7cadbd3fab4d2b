use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use trendwatch_core::{DataError, Interval, PricePoint, PriceSeries};

/// Load a closing-price series from a CSV file.
///
/// Expected columns (case-insensitive, flexible ordering):
/// `date` (or `timestamp`, `datetime`, `time`) and `close`. An `adj close`
/// column is preferred over `close` when both are present.
pub fn load_series_from_csv(
    path: &Path,
    symbol: &str,
    interval: Interval,
) -> Result<PriceSeries, DataError> {
    let file = std::fs::File::open(path)?;
    load_series_from_reader(file, symbol, interval)
}

/// Same as [`load_series_from_csv`], reading from any byte source.
pub fn load_series_from_reader<R: Read>(
    source: R,
    symbol: &str,
    interval: Interval,
) -> Result<PriceSeries, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| DataError::ParseError(format!("Failed to read headers: {}", e)))?
        .clone();

    let ts_col = find_column(&headers, &["date", "timestamp", "datetime", "time"])
        .ok_or_else(|| DataError::ParseError("No timestamp column found".into()))?;
    let close_col = find_column(&headers, &["adj close", "adj_close", "adjclose"])
        .or_else(|| find_column(&headers, &["close", "c"]))
        .ok_or_else(|| DataError::ParseError("No close column found".into()))?;

    let mut points = Vec::new();
    for result in reader.records() {
        let record =
            result.map_err(|e| DataError::ParseError(format!("CSV record error: {}", e)))?;

        let raw_close = record.get(close_col).unwrap_or("");
        // Blank or "null" closes mark non-trading rows.
        if raw_close.is_empty() || raw_close.eq_ignore_ascii_case("null") {
            continue;
        }

        let timestamp = parse_timestamp(record.get(ts_col).unwrap_or(""))?;
        let close = parse_decimal(raw_close, "close")?;
        points.push(PricePoint { timestamp, close });
    }

    Ok(PriceSeries::new(symbol, interval, points))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let h = header.trim().to_lowercase();
        names.iter().any(|name| h == *name)
    })
}

fn parse_decimal(s: &str, field: &str) -> Result<Decimal, DataError> {
    Decimal::from_str(s.trim())
        .or_else(|_| Decimal::from_scientific(s.trim()))
        .map_err(|e| DataError::ParseError(format!("Failed to parse {} '{}': {}", field, s, e)))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DataError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
    ];
    for fmt in &formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Some(naive) = NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(naive.and_utc());
        }
    }

    // Unix seconds
    if let Some(dt) = s.parse::<i64>().ok().and_then(|ts| DateTime::from_timestamp(ts, 0)) {
        return Ok(dt);
    }

    Err(DataError::ParseError(format!(
        "Unable to parse timestamp: '{}'",
        s
    )))
}
