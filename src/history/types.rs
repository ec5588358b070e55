//! History protocol types and configuration

use chrono::{NaiveDate, NaiveTime};
use std::time::Duration;
use thiserror::Error;

/// Marker the server sends after the last record of a response
pub const END_SENTINEL: &str = "!ENDMSG!";

/// Default number of bytes requested per socket read
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Trailing bytes the reference server leaves after the last record
pub const LEGACY_TRAILER_LEN: usize = 12;

/// How the sentinel and whatever follows it are removed from a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailerPolicy {
    /// Cut at the first byte of the sentinel
    #[default]
    AtSentinel,
    /// Drop a fixed number of bytes from the end of the buffer
    ///
    /// The cut never lands after the start of the sentinel, so a trailer
    /// longer than `n` bytes leaves no sentinel fragment in the payload.
    FixedSuffix(usize),
}

/// Options for reading one sentinel-terminated response
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Maximum bytes per read
    pub chunk_size: usize,
    /// Deadline for the whole response
    pub timeout: Duration,
    /// Trailer removal
    pub trailer: TrailerPolicy,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout: Duration::from_secs(60),
            trailer: TrailerPolicy::AtSentinel,
        }
    }
}

impl ReadOptions {
    /// Set the per-read chunk size
    pub fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n;
        self
    }

    /// Set the response deadline
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Set the trailer policy
    pub fn trailer(mut self, policy: TrailerPolicy) -> Self {
        self.trailer = policy;
        self
    }
}

/// Interval history request (`HIT`) for one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: String,
    /// Bar interval in seconds
    pub interval_secs: u32,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    /// Only bars at or after this time of day are returned
    pub day_start: NaiveTime,
    /// Only bars at or before this time of day are returned
    pub day_end: NaiveTime,
}

impl HistoryRequest {
    /// Render the request line sent to the server
    ///
    /// `HIT,<symbol>,<interval>,<YYYYMMDD HHMMSS>,,,<HHMMSS>,<HHMMSS>,1\n`
    pub fn to_message(&self) -> String {
        format!(
            "HIT,{},{},{} {},,,{},{},1\n",
            self.symbol,
            self.interval_secs,
            self.start_date.format("%Y%m%d"),
            self.start_time.format("%H%M%S"),
            self.day_start.format("%H%M%S"),
            self.day_end.format("%H%M%S"),
        )
    }
}

/// History socket errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Could not open a connection to the server
    #[error("Connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    /// Sentinel did not arrive before the deadline
    #[error("No end of message after {elapsed:?} ({received} bytes received)")]
    Timeout { elapsed: Duration, received: usize },
    /// Peer closed the stream before sending the sentinel
    #[error("Connection closed before end of message ({received} bytes received)")]
    ConnectionClosed { received: usize },
    /// Read or write failure on an open connection
    #[error("Socket I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Response was not valid UTF-8
    #[error("Response is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    /// Server answered with an error line
    #[error("Server error: {0}")]
    Server(String),
    /// Read options cannot be used
    #[error("Invalid read options: {0}")]
    InvalidOptions(String),
}
