//! Output tables
//!
//! Maps bars onto the normalized column layout and writes them as CSV.

mod table;
mod writer;

pub use table::{InstrumentMetadata, OutputRow, DEFAULT_SECURITY_TYPE};
pub use writer::{CsvTableWriter, OutputError};
