//! Alpha Vantage request types

use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Alpha Vantage query endpoint
pub const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";

/// Bar interval supported by the intraday endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Interval {
    #[serde(rename = "1min")]
    OneMinute,
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "60min")]
    SixtyMinutes,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1min",
            Interval::FiveMinutes => "5min",
            Interval::FifteenMinutes => "15min",
            Interval::ThirtyMinutes => "30min",
            Interval::SixtyMinutes => "60min",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which intraday endpoint to call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeriesMode {
    /// `TIME_SERIES_INTRADAY` with full output size
    Intraday,
    /// `TIME_SERIES_INTRADAY_EXTENDED`, one request per monthly slice
    #[default]
    Extended,
}

/// A month-long window of extended history, counted back from today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    /// 1 or 2
    pub year: u8,
    /// 1 through 12
    pub month: u8,
}

impl Slice {
    /// All slices covering the last `years` years, most recent first
    pub fn all(years: u8) -> Vec<Slice> {
        (1..=years)
            .flat_map(|year| (1..=12).map(move |month| Slice { year, month }))
            .collect()
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "year{}month{}", self.year, self.month)
    }
}

/// Configuration for the Alpha Vantage client
#[derive(Debug, Clone)]
pub struct AlphaVantageConfig {
    pub base_url: String,
    pub api_key: String,
    pub interval: Interval,
    pub mode: SeriesMode,
    /// Years of extended history to request
    pub years: u8,
    pub adjusted: bool,
    /// Request timeout
    pub timeout: Duration,
}

impl AlphaVantageConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: ALPHA_VANTAGE_URL.to_string(),
            api_key: api_key.into(),
            interval: Interval::SixtyMinutes,
            mode: SeriesMode::Extended,
            years: 2,
            adjusted: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Alpha Vantage errors
#[derive(Debug, Error)]
pub enum AlphaVantageError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Error status or JSON error body returned by the API
    #[error("Alpha Vantage API error: {0}")]
    Api(String),
    #[error("CSV response error: {0}")]
    Csv(#[from] csv::Error),
}
