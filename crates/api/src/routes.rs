use crate::state::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trendwatch_core::TrendReport;
use trendwatch_engine::{TrendFailure, TrendOutcome};

/// Routes mounted under `/api` (subject to the CORS allow-list).
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/ticker/{name}", get(ticker_trend))
}

/// Top-level routes outside `/api`.
pub fn root_routes() -> Router<Arc<AppState>> {
    Router::new().route("/test", get(liveness))
}

// ---------------------------------------------------------------------------
// Liveness
// ---------------------------------------------------------------------------

async fn liveness() -> impl IntoResponse {
    tracing::debug!("Test endpoint accessed");
    Json(serde_json::json!({ "message": "Backend is running" }))
}

// ---------------------------------------------------------------------------
// Ticker trend
// ---------------------------------------------------------------------------

/// Response body of `GET /api/ticker/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TickerResponse {
    Trend(TrendReport),
    Error { error: String },
}

impl From<TrendOutcome> for TickerResponse {
    fn from(outcome: TrendOutcome) -> Self {
        match outcome {
            TrendOutcome::Success(report) => TickerResponse::Trend(report),
            TrendOutcome::Failure(failure) => TickerResponse::Error {
                error: failure.message,
            },
        }
    }
}

async fn ticker_trend(
    State(state): State<Arc<AppState>>,
    name: Result<Path<String>, PathRejection>,
) -> impl IntoResponse {
    // Undecodable names (e.g. invalid UTF-8) still get a JSON error body.
    let name = match name {
        Ok(Path(name)) => name,
        Err(rejection) => {
            let detail = rejection.body_text();
            tracing::warn!(error = %detail, "Rejected ticker path");
            let outcome = TrendOutcome::Failure(TrendFailure::invalid_ticker(&detail));
            let status = state.status_for(&outcome);
            return (status, Json(TickerResponse::from(outcome)));
        }
    };

    tracing::debug!(ticker = %name, "Received request for ticker");
    let symbol = state.aliases.resolve(&name);

    let outcome = state.evaluator.evaluate(symbol).await;
    let status = state.status_for(&outcome);
    (status, Json(TickerResponse::from(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use tower::ServiceExt;
    use trendwatch_core::{AliasTable, Interval, PricePoint, PriceSeries};
    use trendwatch_data::InMemoryHistoryProvider;
    use trendwatch_engine::DEFAULT_WINDOW;

    fn series(symbol: &str, interval: Interval, closes: impl IntoIterator<Item = i64>) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let points = closes
            .into_iter()
            .enumerate()
            .map(|(i, c)| PricePoint {
                timestamp: start + Duration::days(i as i64),
                close: Decimal::from(c),
            })
            .collect();
        PriceSeries::new(symbol, interval, points)
    }

    fn test_state(strict_status: bool) -> Arc<AppState> {
        let provider = InMemoryHistoryProvider::new()
            // SPX resolves to ^GSPC
            .with_series(series("^GSPC", Interval::Daily, 1..=21))
            .with_series(series("^GSPC", Interval::Weekly, vec![100; 21]))
            .with_series(series("SHORT", Interval::Daily, vec![1; 25]))
            .with_series(series("SHORT", Interval::Weekly, vec![1; 10]));
        Arc::new(
            AppState::new(
                Arc::new(AliasTable::builtin()),
                Arc::new(provider),
                DEFAULT_WINDOW,
                strict_status,
            )
            .unwrap(),
        )
    }

    fn app(strict_status: bool) -> Router {
        Router::new()
            .nest("/api", api_routes())
            .merge(root_routes())
            .with_state(test_state(strict_status))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_alias_resolved_and_streaks_returned() {
        let (status, body) = get_json(app(false), "/api/ticker/SPX").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "daysAbove": 10, "weeksAbove": -1 }));
    }

    #[tokio::test]
    async fn test_weekly_shortfall_is_200_with_error_body() {
        let (status, body) = get_json(app(false), "/api/ticker/SHORT").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "error": "Not enough weekly data" }));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_server_error_body() {
        let (status, body) = get_json(app(false), "/api/ticker/NOPE").await;
        assert_eq!(status, StatusCode::OK);
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("Server error: "));
        assert!(error.contains("NOPE"));
    }

    #[tokio::test]
    async fn test_undecodable_name_is_200_with_error_body() {
        let (status, body) = get_json(app(false), "/api/ticker/%FF").await;
        assert_eq!(status, StatusCode::OK);
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("Server error: "));

        let (status, body) = get_json(app(true), "/api/ticker/%FF").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_strict_status_codes() {
        let (status, body) = get_json(app(true), "/api/ticker/SHORT").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Not enough weekly data");

        let (status, _) = get_json(app(true), "/api/ticker/NOPE").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, _) = get_json(app(true), "/api/ticker/SPX").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_liveness_endpoint() {
        let (status, body) = get_json(app(false), "/test").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "message": "Backend is running" }));
    }

    #[test]
    fn test_response_shapes_round_trip() {
        let trend: TickerResponse =
            serde_json::from_str(r#"{"daysAbove":3,"weeksAbove":-2}"#).unwrap();
        assert_eq!(
            trend,
            TickerResponse::Trend(TrendReport {
                days_above: 3,
                weeks_above: -2
            })
        );
        let error: TickerResponse = serde_json::from_str(r#"{"error":"x"}"#).unwrap();
        assert_eq!(error, TickerResponse::Error { error: "x".into() });
    }
}
