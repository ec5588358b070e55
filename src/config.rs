//! Configuration types for quote-dl

use crate::alphavantage::{AlphaVantageConfig, Interval, SeriesMode, ALPHA_VANTAGE_URL};
use crate::history::{HistoryClientConfig, HistoryRequest, ReadOptions, TrailerPolicy};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration shipped with the crate, used when no config file exists
pub const EXAMPLE_CONFIG: &str = include_str!("../config.toml.example");

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub history: HistoryConfig,
    pub request: RequestConfig,
    #[serde(default)]
    pub alphavantage: Option<AlphaVantageSection>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// History socket server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    pub host: String,
    pub port: u16,
    /// Bytes per socket read
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Deadline for a complete response
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    #[serde(default)]
    pub trailer: TrailerConfig,
}

/// How the end-of-message trailer is stripped
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrailerConfig {
    /// Cut at the sentinel
    #[default]
    Sentinel,
    /// Drop this many bytes from the end of the response, never keeping the sentinel
    FixedSuffix(usize),
}

/// Bars to request for every symbol
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    pub symbols: Vec<String>,
    /// Bar interval in seconds
    pub rate_seconds: u32,
    /// `YYYYMMDD`
    pub start_date: String,
    /// `HHMMSS`
    pub start_time: String,
    /// `HHMMSS`
    pub day_start_time: String,
    /// `HHMMSS`
    pub day_end_time: String,
}

/// Alpha Vantage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AlphaVantageSection {
    pub api_key: String,
    #[serde(default = "default_alphavantage_url")]
    pub base_url: String,
    #[serde(default = "default_interval")]
    pub interval: Interval,
    #[serde(default)]
    pub mode: SeriesMode,
    /// Years of extended history
    #[serde(default = "default_years")]
    pub years: u8,
    #[serde(default)]
    pub adjusted: bool,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines
    #[serde(default)]
    pub json: bool,
}

fn default_chunk_size() -> usize {
    crate::history::DEFAULT_CHUNK_SIZE
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_read_timeout_secs() -> u64 {
    60
}
fn default_alphavantage_url() -> String {
    ALPHA_VANTAGE_URL.to_string()
}
fn default_interval() -> Interval {
    Interval::SixtyMinutes
}
fn default_years() -> u8 {
    2
}
fn default_http_timeout_secs() -> u64 {
    30
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("data/download")
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration, using the bundled example only if `path` does not exist
    ///
    /// Returns the config and whether the example was used. Unreadable,
    /// malformed, or invalid files are errors.
    pub fn load_or_example(
        path: impl AsRef<std::path::Path>,
    ) -> Result<(Self, bool), ConfigError> {
        match Self::load(path) {
            Ok(config) => Ok((config, false)),
            Err(ConfigError::Read(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok((Self::from_toml(EXAMPLE_CONFIG)?, true))
            }
            Err(e) => Err(e),
        }
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                field: "history.chunk_size",
                reason: "must be positive".to_string(),
            });
        }
        if self.request.rate_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "request.rate_seconds",
                reason: "must be positive".to_string(),
            });
        }
        if let Some(av) = &self.alphavantage {
            if !(1..=2).contains(&av.years) {
                return Err(ConfigError::Invalid {
                    field: "alphavantage.years",
                    reason: format!("{} is outside 1..=2", av.years),
                });
            }
        }
        self.request.history_template()?;
        Ok(())
    }
}

impl HistoryConfig {
    /// Client settings for the history server
    pub fn client_config(&self) -> HistoryClientConfig {
        let trailer = match self.trailer {
            TrailerConfig::Sentinel => TrailerPolicy::AtSentinel,
            TrailerConfig::FixedSuffix(n) => TrailerPolicy::FixedSuffix(n),
        };

        HistoryClientConfig::new(self.host.clone(), self.port)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .read_options(
                ReadOptions::default()
                    .chunk_size(self.chunk_size)
                    .timeout(Duration::from_secs(self.read_timeout_secs))
                    .trailer(trailer),
            )
    }
}

impl RequestConfig {
    /// Request parameters shared by all symbols, with an empty symbol
    pub fn history_template(&self) -> Result<HistoryRequest, ConfigError> {
        Ok(HistoryRequest {
            symbol: String::new(),
            interval_secs: self.rate_seconds,
            start_date: NaiveDate::parse_from_str(&self.start_date, "%Y%m%d").map_err(|e| {
                ConfigError::Invalid {
                    field: "request.start_date",
                    reason: format!("{:?}: {}", self.start_date, e),
                }
            })?,
            start_time: parse_hhmmss(&self.start_time, "request.start_time")?,
            day_start: parse_hhmmss(&self.day_start_time, "request.day_start_time")?,
            day_end: parse_hhmmss(&self.day_end_time, "request.day_end_time")?,
        })
    }
}

fn parse_hhmmss(value: &str, field: &'static str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H%M%S").map_err(|e| ConfigError::Invalid {
        field,
        reason: format!("{:?}: {}", value, e),
    })
}

impl AlphaVantageSection {
    /// Client settings for Alpha Vantage
    pub fn client_config(&self) -> AlphaVantageConfig {
        AlphaVantageConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            interval: self.interval,
            mode: self.mode,
            years: self.years,
            adjusted: self.adjusted,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
