//! Sentinel-terminated response reader

use super::types::{HistoryError, ReadOptions, TrailerPolicy, END_SENTINEL};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::{timeout_at, Instant};

/// Read a response until the end-of-message sentinel and return the payload
///
/// Bytes are read in chunks of at most `options.chunk_size` and accumulated.
/// The sentinel is searched for in the accumulated buffer, so a sentinel
/// split across two reads is still found. The whole response must arrive
/// before `options.timeout`; a stalled peer yields [`HistoryError::Timeout`]
/// and a peer that hangs up early yields [`HistoryError::ConnectionClosed`].
///
/// The stream is left open.
pub async fn read_until_sentinel<R>(
    stream: &mut R,
    options: &ReadOptions,
) -> Result<String, HistoryError>
where
    R: AsyncRead + Unpin,
{
    if options.chunk_size == 0 {
        return Err(HistoryError::InvalidOptions(
            "chunk_size must be positive".to_string(),
        ));
    }

    let sentinel = END_SENTINEL.as_bytes();
    let started = Instant::now();
    let deadline = started + options.timeout;
    let mut buffer: Vec<u8> = Vec::with_capacity(options.chunk_size);
    let mut chunk = vec![0u8; options.chunk_size];
    let mut reads = 0usize;

    let sentinel_at = loop {
        let n = match timeout_at(deadline, stream.read(&mut chunk)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(HistoryError::Timeout {
                    elapsed: started.elapsed(),
                    received: buffer.len(),
                })
            }
        };
        if n == 0 {
            return Err(HistoryError::ConnectionClosed {
                received: buffer.len(),
            });
        }
        reads += 1;

        // Back up far enough to catch a sentinel straddling the previous chunk
        let search_from = buffer.len().saturating_sub(sentinel.len() - 1);
        buffer.extend_from_slice(&chunk[..n]);

        if let Some(pos) = find_subslice(&buffer[search_from..], sentinel) {
            break search_from + pos;
        }
    };

    let payload_len = match options.trailer {
        TrailerPolicy::AtSentinel => sentinel_at,
        // Never keep any part of the sentinel, even if the trailer is longer than n
        TrailerPolicy::FixedSuffix(n) => buffer.len().saturating_sub(n).min(sentinel_at),
    };

    tracing::debug!(
        reads,
        received = buffer.len(),
        payload = payload_len,
        "End of message received"
    );

    buffer.truncate(payload_len);
    Ok(String::from_utf8(buffer)?)
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
