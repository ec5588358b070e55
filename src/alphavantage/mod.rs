//! Alpha Vantage REST source
//!
//! Downloads intraday series, either the recent full series or extended
//! history in monthly slices.

mod client;
mod types;

pub use client::{parse_csv_body, AlphaVantageClient};
pub use types::{
    AlphaVantageConfig, AlphaVantageError, Interval, SeriesMode, Slice, ALPHA_VANTAGE_URL,
};
