//! Integration tests for the Alpha Vantage client against a local HTTP server

use quote_dl::alphavantage::{
    AlphaVantageClient, AlphaVantageConfig, AlphaVantageError, Interval, SeriesMode,
};
use quote_dl::download::{BarSource, DownloadError, DownloadJob};
use rust_decimal_macros::dec;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Answer one HTTP request with `status` and `body`, reporting the request line
async fn serve_once(status: &'static str, body: &'static str) -> (u16, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut reader = BufReader::new(read_half);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).await.unwrap();
        // Skip headers up to the blank line
        loop {
            let mut header = String::new();
            let n = reader.read_line(&mut header).await.unwrap();
            if n == 0 || header == "\r\n" {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        write_half.write_all(response.as_bytes()).await.unwrap();
        write_half.shutdown().await.unwrap();

        let _ = tx.send(request_line.trim_end().to_string());
    });

    (port, rx)
}

fn client(port: u16, mode: SeriesMode) -> AlphaVantageClient {
    let mut config = AlphaVantageConfig::new("demo");
    config.base_url = format!("http://127.0.0.1:{}/query", port);
    config.interval = Interval::SixtyMinutes;
    config.mode = mode;
    AlphaVantageClient::new(config).unwrap()
}

#[tokio::test]
async fn test_csv_body_is_parsed() {
    let body = "timestamp,open,high,low,close,volume\r\n\
                2021-09-24 16:00:00,137.0,138.0,136.5,137.5,5000\r\n\
                2021-09-24 15:00:00,136.0,137.2,135.9,137.0,4200\r\n";
    let (port, request) = serve_once("200 OK", body).await;

    let parsed = client(port, SeriesMode::Intraday)
        .fetch(&DownloadJob::whole("IBM"))
        .await
        .unwrap();

    assert_eq!(parsed.bars.len(), 2);
    assert!(parsed.rejected.is_empty());
    assert_eq!(parsed.bars[0].open, dec!(137.0));
    assert_eq!(parsed.bars[0].high, dec!(138.0));
    assert_eq!(parsed.bars[1].volume, 4200);

    let request = request.await.unwrap();
    assert!(request.starts_with("GET /query?function=TIME_SERIES_INTRADAY&symbol=IBM"));
    assert!(request.contains("outputsize=full"));
    assert!(request.contains("datatype=csv"));
    assert!(request.contains("apikey=demo"));
}

#[tokio::test]
async fn test_extended_slice_in_request() {
    let body = "time,open,high,low,close,volume\r\n\
                2021-09-24 20:00:00,137.49,137.5,137.49,137.5,1023\r\n";
    let (port, request) = serve_once("200 OK", body).await;

    let client = client(port, SeriesMode::Extended);
    let job = client.plan("IBM").remove(0);
    let parsed = client.fetch(&job).await.unwrap();
    assert_eq!(parsed.bars.len(), 1);

    let request = request.await.unwrap();
    assert!(request.contains("function=TIME_SERIES_INTRADAY_EXTENDED"));
    assert!(request.contains("slice=year1month1"));
    assert!(request.contains("adjusted=false"));
}

#[tokio::test]
async fn test_error_status_becomes_api_error() {
    let (port, _request) = serve_once("503 Service Unavailable", "boom").await;

    let err = client(port, SeriesMode::Intraday)
        .fetch(&DownloadJob::whole("IBM"))
        .await
        .unwrap_err();

    match err {
        DownloadError::AlphaVantage(AlphaVantageError::Api(msg)) => {
            assert!(msg.contains("503"), "{}", msg);
            assert!(msg.contains("boom"), "{}", msg);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_json_note_over_http_becomes_api_error() {
    let body = r#"{"Note": "Our standard API call frequency is 5 calls per minute."}"#;
    let (port, _request) = serve_once("200 OK", body).await;

    let err = client(port, SeriesMode::Intraday)
        .fetch(&DownloadJob::whole("IBM"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DownloadError::AlphaVantage(AlphaVantageError::Api(msg))
            if msg == "Our standard API call frequency is 5 calls per minute."
    ));
}
