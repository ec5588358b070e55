//! Bar record types

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One historical price/volume observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: Decimal,
    pub low: Decimal,
    pub high: Decimal,
    pub close: Decimal,
    pub volume: u64,
    /// Zero when the provider does not report it
    pub open_interest: u64,
}

impl Bar {
    /// Calendar date of the bar
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Time of day of the bar
    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }
}

/// Bars parsed from one response, plus the lines that could not be parsed
#[derive(Debug, Default, Clone)]
pub struct ParsedBars {
    pub bars: Vec<Bar>,
    pub rejected: Vec<RecordError>,
}

impl ParsedBars {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// A record that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct RecordError {
    /// 1-based line number within the response
    pub line: usize,
    pub kind: RecordErrorKind,
}

/// Why a record was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordErrorKind {
    /// Wrong number of comma-separated fields
    FieldCount { expected: usize, found: usize },
    /// Leading field is not a recognised date-time
    InvalidTimestamp(String),
    /// A numeric column did not parse
    InvalidField { column: &'static str, value: String },
}

impl fmt::Display for RecordErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordErrorKind::FieldCount { expected, found } => {
                write!(f, "expected {} fields, found {}", expected, found)
            }
            RecordErrorKind::InvalidTimestamp(value) => write!(f, "invalid timestamp {:?}", value),
            RecordErrorKind::InvalidField { column, value } => {
                write!(f, "invalid {} {:?}", column, value)
            }
        }
    }
}
