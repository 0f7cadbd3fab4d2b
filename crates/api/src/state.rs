use crate::config::{AppConfig, ConfigError};
use axum::http::StatusCode;
use std::sync::Arc;
use trendwatch_core::{AliasTable, HistoryProvider};
use trendwatch_engine::{FailureKind, TrendEvaluator, TrendOutcome};

/// Shared application state accessible by all route handlers.
///
/// Everything here is fixed at startup; handlers only read it.
#[derive(Debug)]
pub struct AppState {
    pub aliases: Arc<AliasTable>,
    pub evaluator: TrendEvaluator,
    /// Map failures to 400/422/502 instead of always answering 200.
    pub strict_status: bool,
}

impl AppState {
    pub fn new(
        aliases: Arc<AliasTable>,
        provider: Arc<dyn HistoryProvider>,
        window: usize,
        strict_status: bool,
    ) -> Result<Self, ConfigError> {
        let evaluator = TrendEvaluator::new(provider, window)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(Self {
            aliases,
            evaluator,
            strict_status,
        })
    }

    /// Build state from configuration: built-in aliases plus overrides, and
    /// the configured history provider.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let aliases = AliasTable::builtin().with_overrides(&config.aliases);
        Self::new(
            Arc::new(aliases),
            config.provider.build()?,
            config.server.window,
            config.server.strict_status,
        )
    }

    /// HTTP status for an evaluation outcome.
    pub fn status_for(&self, outcome: &TrendOutcome) -> StatusCode {
        match outcome {
            TrendOutcome::Failure(f) if self.strict_status => match f.kind {
                FailureKind::InsufficientData(_) => StatusCode::UNPROCESSABLE_ENTITY,
                FailureKind::Upstream => StatusCode::BAD_GATEWAY,
                FailureKind::InvalidTicker => StatusCode::BAD_REQUEST,
            },
            _ => StatusCode::OK,
        }
    }
}
