//! Alpha Vantage intraday client
//!
//! Requests intraday series as CSV and parses them into bars. Extended
//! history is split by the API into monthly slices, so each slice is a
//! separate download job.

use super::types::{AlphaVantageConfig, AlphaVantageError, SeriesMode, Slice};
use crate::bars::{
    parse_field, parse_timestamp, parse_volume, Bar, ParsedBars, RecordError, RecordErrorKind,
};
use crate::download::{BarSource, DownloadError, DownloadJob};
use async_trait::async_trait;
use reqwest::Client;

/// Keys Alpha Vantage uses for error and throttling notices
const NOTICE_KEYS: &[&str] = &["Error Message", "Note", "Information"];

/// Client for Alpha Vantage's intraday time series
pub struct AlphaVantageClient {
    config: AlphaVantageConfig,
    client: Client,
}

impl AlphaVantageClient {
    /// Create a new client with the given configuration
    pub fn new(config: AlphaVantageConfig) -> Result<Self, AlphaVantageError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Query parameters for a job
    fn query_params(&self, job: &DownloadJob) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(7);
        match self.config.mode {
            SeriesMode::Extended => {
                params.push(("function", "TIME_SERIES_INTRADAY_EXTENDED".to_string()));
                params.push(("symbol", job.symbol.clone()));
                params.push(("interval", self.config.interval.to_string()));
                if let Some(slice) = &job.slice {
                    params.push(("slice", slice.clone()));
                }
                params.push(("adjusted", self.config.adjusted.to_string()));
            }
            SeriesMode::Intraday => {
                params.push(("function", "TIME_SERIES_INTRADAY".to_string()));
                params.push(("symbol", job.symbol.clone()));
                params.push(("interval", self.config.interval.to_string()));
                params.push(("outputsize", "full".to_string()));
                params.push(("datatype", "csv".to_string()));
            }
        }
        params.push(("apikey", self.config.api_key.clone()));
        params
    }

    /// Fetch the raw CSV body for a job
    async fn fetch_body(&self, job: &DownloadJob) -> Result<String, AlphaVantageError> {
        tracing::debug!(
            symbol = %job.symbol,
            slice = job.slice.as_deref().unwrap_or("-"),
            "Requesting Alpha Vantage series"
        );

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&self.query_params(job))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AlphaVantageError::Api(format!("{} - {}", status, body)));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl BarSource for AlphaVantageClient {
    fn name(&self) -> &str {
        "alphavantage"
    }

    fn plan(&self, symbol: &str) -> Vec<DownloadJob> {
        match self.config.mode {
            SeriesMode::Intraday => vec![DownloadJob::whole(symbol)],
            SeriesMode::Extended => Slice::all(self.config.years)
                .into_iter()
                .map(|slice| DownloadJob {
                    symbol: symbol.to_string(),
                    file_stem: format!("{}-{}-{}", symbol, self.config.interval, slice),
                    slice: Some(slice.to_string()),
                })
                .collect(),
        }
    }

    async fn fetch(&self, job: &DownloadJob) -> Result<ParsedBars, DownloadError> {
        let body = self.fetch_body(job).await?;
        Ok(parse_csv_body(&body)?)
    }
}

/// Parse an intraday CSV body
///
/// The header must name `timestamp` (or `time`), `open`, `high`, `low`,
/// `close` and `volume`; column order does not matter. A JSON body is an
/// API notice and becomes [`AlphaVantageError::Api`].
pub fn parse_csv_body(body: &str) -> Result<ParsedBars, AlphaVantageError> {
    if body.trim_start().starts_with('{') {
        return Err(AlphaVantageError::Api(api_notice(body)));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    let columns = CsvColumns::from_headers(reader.headers()?)?;

    let mut parsed = ParsedBars::default();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1
        let line = idx + 2;
        match columns.parse(&record) {
            Ok(bar) => parsed.bars.push(bar),
            Err(kind) => parsed.rejected.push(RecordError { line, kind }),
        }
    }

    Ok(parsed)
}

/// Pull the message out of a JSON notice body
fn api_notice(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    NOTICE_KEYS
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

/// Column positions in an intraday CSV
struct CsvColumns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl CsvColumns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, AlphaVantageError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
                .ok_or_else(|| {
                    AlphaVantageError::Api(format!("response has no {} column", names[0]))
                })
        };

        Ok(Self {
            timestamp: find(&["timestamp", "time"])?,
            open: find(&["open"])?,
            high: find(&["high"])?,
            low: find(&["low"])?,
            close: find(&["close"])?,
            volume: find(&["volume"])?,
        })
    }

    fn width(&self) -> usize {
        [
            self.timestamp,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }

    fn parse(&self, record: &csv::StringRecord) -> Result<Bar, RecordErrorKind> {
        if record.len() < self.width() {
            return Err(RecordErrorKind::FieldCount {
                expected: self.width(),
                found: record.len(),
            });
        }

        let raw_ts = &record[self.timestamp];
        let timestamp = parse_timestamp(raw_ts)
            .ok_or_else(|| RecordErrorKind::InvalidTimestamp(raw_ts.to_string()))?;

        Ok(Bar {
            timestamp,
            open: parse_field(&record[self.open], "open")?,
            low: parse_field(&record[self.low], "low")?,
            high: parse_field(&record[self.high], "high")?,
            close: parse_field(&record[self.close], "close")?,
            volume: parse_volume(&record[self.volume])?,
            open_interest: 0,
        })
    }
}
