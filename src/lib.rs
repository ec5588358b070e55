//! quote-dl: historical stock-price downloader
//!
//! This library provides the core components for:
//! - Interval history requests over a raw socket, read until the
//!   `!ENDMSG!` sentinel with a bounded deadline
//! - Intraday series from the Alpha Vantage REST API
//! - Parsing responses into typed bar records
//! - Writing normalized per-symbol CSV tables
//! - A sequential download loop where one failure never stops the run

pub mod alphavantage;
pub mod bars;
pub mod cli;
pub mod config;
pub mod download;
pub mod history;
pub mod output;
pub mod telemetry;
