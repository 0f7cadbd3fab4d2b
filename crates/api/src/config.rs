use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trendwatch_core::HistoryProvider;
use trendwatch_data::{CsvHistoryProvider, YahooConfig, YahooHistoryProvider};
use trendwatch_engine::DEFAULT_WINDOW;

/// Errors raised while loading or applying configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Full application configuration, loadable from TOML.
///
/// Every section and field is optional; missing values fall back to the
/// defaults below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    /// Extra aliases layered over the built-in table.
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Exact origins allowed to call `/api/*` from a browser.
    pub allowed_origins: Vec<String>,
    /// Map failures to 400/422/502 instead of always answering 200.
    pub strict_status: bool,
    /// Moving average window for both intervals.
    pub window: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: vec!["http://localhost:5173".to_string()],
            strict_status: false,
            window: DEFAULT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    #[serde(flatten)]
    pub yahoo: YahooConfig,
    /// Directory of `{symbol}_{daily|weekly}.csv` files for the csv provider.
    pub data_dir: PathBuf,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            yahoo: YahooConfig::default(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ProviderSettings {
    /// Construct the configured history provider.
    pub fn build(&self) -> Result<Arc<dyn HistoryProvider>, ConfigError> {
        match self.kind {
            ProviderKind::Yahoo => {
                let provider = YahooHistoryProvider::new(self.yahoo.clone())
                    .map_err(|e| ConfigError::Invalid(e.to_string()))?;
                Ok(Arc::new(provider))
            }
            ProviderKind::Csv => Ok(Arc::new(CsvHistoryProvider::new(self.data_dir.clone()))),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, or return defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.window == 0 {
            return Err(ConfigError::Invalid("server.window must be > 0".into()));
        }
        if self.provider.yahoo.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider.timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// `host:port` string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
