//! History payload parsing

use super::types::{Bar, ParsedBars, RecordError, RecordErrorKind};
use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Fields in a full history record
const RECORD_FIELDS: usize = 7;
/// Fields in a record without open interest
const RECORD_FIELDS_NO_OI: usize = 6;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y%m%d %H%M%S",
];

/// Parse a date-time in any of the formats providers send
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Parse a history payload into bars
///
/// Records are `timestamp,open,low,high,close,volume,open_interest` separated
/// by CR/LF. A line that does not parse is recorded in
/// [`ParsedBars::rejected`] and the remaining lines are still parsed.
pub fn parse_history_payload(payload: &str) -> ParsedBars {
    let mut parsed = ParsedBars::default();

    let lines = payload
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    for (idx, line) in lines {
        match parse_history_line(line) {
            Ok(bar) => parsed.bars.push(bar),
            Err(kind) => parsed.rejected.push(RecordError {
                line: idx + 1,
                kind,
            }),
        }
    }

    parsed
}

fn parse_history_line(line: &str) -> Result<Bar, RecordErrorKind> {
    let line = line.strip_suffix(',').unwrap_or(line);
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    if fields.len() != RECORD_FIELDS && fields.len() != RECORD_FIELDS_NO_OI {
        return Err(RecordErrorKind::FieldCount {
            expected: RECORD_FIELDS,
            found: fields.len(),
        });
    }

    let timestamp = parse_timestamp(fields[0])
        .ok_or_else(|| RecordErrorKind::InvalidTimestamp(fields[0].to_string()))?;

    Ok(Bar {
        timestamp,
        open: parse_field(fields[1], "open")?,
        low: parse_field(fields[2], "low")?,
        high: parse_field(fields[3], "high")?,
        close: parse_field(fields[4], "close")?,
        volume: parse_volume(fields[5])?,
        open_interest: match fields.get(6) {
            Some(value) => parse_field(value, "open_interest")?,
            None => 0,
        },
    })
}

/// Parse one numeric column, naming it in the error
pub(crate) fn parse_field<T: FromStr>(
    value: &str,
    column: &'static str,
) -> Result<T, RecordErrorKind> {
    value.parse().map_err(|_| RecordErrorKind::InvalidField {
        column,
        value: value.to_string(),
    })
}

/// Parse a volume that may be sent as a decimal (e.g. `1000.0`)
pub(crate) fn parse_volume(value: &str) -> Result<u64, RecordErrorKind> {
    if let Ok(v) = value.parse::<u64>() {
        return Ok(v);
    }
    Decimal::from_str(value)
        .ok()
        .filter(|d| d.fract().is_zero() && !d.is_sign_negative())
        .and_then(|d| d.to_u64())
        .ok_or_else(|| RecordErrorKind::InvalidField {
            column: "volume",
            value: value.to_string(),
        })
}
