//! Historical-data socket protocol
//!
//! Sends an interval history request over a raw TCP connection and reads
//! the sentinel-terminated text response.

mod client;
mod reader;
mod source;
mod types;

pub use client::{HistoryClient, HistoryClientConfig};
pub use reader::read_until_sentinel;
pub use source::HistorySource;
pub use types::{
    HistoryError, HistoryRequest, ReadOptions, TrailerPolicy, DEFAULT_CHUNK_SIZE, END_SENTINEL,
    LEGACY_TRAILER_LEN,
};
