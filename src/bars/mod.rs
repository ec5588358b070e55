//! Bar records and response parsing

mod parser;
mod types;

pub use parser::{parse_history_payload, parse_timestamp};
pub(crate) use parser::{parse_field, parse_volume};
pub use types::{Bar, ParsedBars, RecordError, RecordErrorKind};
