//! Integration tests for the history socket client against a local server

use chrono::{NaiveDate, NaiveTime};
use quote_dl::history::{
    HistoryClient, HistoryClientConfig, HistoryError, HistoryRequest, ReadOptions,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const SPY_RESPONSE: &str =
    "2019-10-25 09:30:00,100.0,99.5,100.5,100.2,1000,0\r\n!ENDMSG!\0\0\0\0\0\0\0\0\0\0\0";

/// What the fake server observed on its one connection
struct Observed {
    request: String,
    /// Client closed its side after the exchange
    client_closed: bool,
}

/// Serve one connection: read the request line, write `chunks` with a pause
/// between each, then wait for the client to hang up
async fn serve_once(
    chunks: Vec<Vec<u8>>,
    pause: Duration,
) -> (u16, oneshot::Receiver<Observed>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut reader = BufReader::new(read_half);

        let mut request = String::new();
        reader.read_line(&mut request).await.unwrap();

        for chunk in chunks {
            if write_half.write_all(&chunk).await.is_err() {
                break;
            }
            let _ = write_half.flush().await;
            tokio::time::sleep(pause).await;
        }

        let mut rest = Vec::new();
        let client_closed = tokio::time::timeout(Duration::from_secs(5), reader.read_to_end(&mut rest))
            .await
            .map(|r| r.is_ok())
            .unwrap_or(false);

        let _ = tx.send(Observed {
            request,
            client_closed,
        });
    });

    (port, rx)
}

fn spy_request() -> HistoryRequest {
    HistoryRequest {
        symbol: "SPY".to_string(),
        interval_secs: 60,
        start_date: NaiveDate::from_ymd_opt(2019, 10, 25).unwrap(),
        start_time: NaiveTime::from_hms_opt(7, 50, 0).unwrap(),
        day_start: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        day_end: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
    }
}

fn client(port: u16, read: ReadOptions) -> HistoryClient {
    HistoryClient::new(HistoryClientConfig::new("127.0.0.1", port).read_options(read))
}

#[tokio::test]
async fn test_fetch_payload_sends_request_and_strips_trailer() {
    let (port, observed) = serve_once(vec![SPY_RESPONSE.as_bytes().to_vec()], Duration::ZERO).await;

    let payload = client(port, ReadOptions::default())
        .fetch_payload(&spy_request())
        .await
        .unwrap();
    assert_eq!(payload, "2019-10-25 09:30:00,100.0,99.5,100.5,100.2,1000,0\r\n");

    let observed = observed.await.unwrap();
    assert_eq!(observed.request, "HIT,SPY,60,20191025 075000,,,093000,160000,1\n");
    assert!(observed.client_closed);
}

#[tokio::test]
async fn test_sentinel_split_across_packets() {
    let (head, tail) = SPY_RESPONSE.as_bytes().split_at(SPY_RESPONSE.find("MSG!").unwrap());
    let (port, observed) = serve_once(
        vec![head.to_vec(), tail.to_vec()],
        Duration::from_millis(20),
    )
    .await;

    let payload = client(port, ReadOptions::default().chunk_size(16))
        .fetch_payload(&spy_request())
        .await
        .unwrap();
    assert!(payload.starts_with("2019-10-25 09:30:00"));
    assert!(!payload.contains("!END"));
    assert!(observed.await.unwrap().client_closed);
}

#[tokio::test]
async fn test_missing_sentinel_times_out_and_closes() {
    let (port, observed) = serve_once(
        vec![b"2019-10-25 09:30:00,100.0,99.5,100.5,100.2,1000,0\r\n".to_vec()],
        Duration::ZERO,
    )
    .await;

    let read = ReadOptions::default().timeout(Duration::from_millis(200));
    let err = client(port, read)
        .fetch_payload(&spy_request())
        .await
        .unwrap_err();
    assert!(matches!(err, HistoryError::Timeout { received, .. } if received > 0));

    // The connection is released even though the exchange failed
    assert!(observed.await.unwrap().client_closed);
}

#[tokio::test]
async fn test_server_hangs_up_before_sentinel() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 128];
        let _ = socket.read(&mut buf).await;
        socket.write_all(b"partial,record").await.unwrap();
        // Dropping the socket closes it
    });

    let err = client(port, ReadOptions::default())
        .fetch_payload(&spy_request())
        .await
        .unwrap_err();
    assert!(matches!(err, HistoryError::ConnectionClosed { received: 14 }));
}

#[tokio::test]
async fn test_no_data_response_is_empty() {
    let (port, _observed) = serve_once(
        vec![b"E,!NO_DATA!,\r\n!ENDMSG!,\r\n".to_vec()],
        Duration::ZERO,
    )
    .await;

    let payload = client(port, ReadOptions::default())
        .fetch_payload(&spy_request())
        .await
        .unwrap();
    assert!(payload.is_empty());
}

#[tokio::test]
async fn test_server_error_response() {
    let (port, _observed) = serve_once(
        vec![b"E,Invalid symbol.,\r\n!ENDMSG!,\r\n".to_vec()],
        Duration::ZERO,
    )
    .await;

    let err = client(port, ReadOptions::default())
        .fetch_payload(&spy_request())
        .await
        .unwrap_err();
    assert!(matches!(err, HistoryError::Server(msg) if msg == "Invalid symbol."));
}
