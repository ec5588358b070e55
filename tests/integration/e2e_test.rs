//! End-to-end tests: config -> socket download -> CSV on disk

use quote_dl::config::Config;
use quote_dl::download::Downloader;
use quote_dl::history::{HistoryClient, HistorySource};
use quote_dl::output::CsvTableWriter;
use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Start a history server answering each symbol from `responses`
///
/// Symbols without a canned response get the connection dropped without
/// an end-of-message marker.
async fn start_server(responses: HashMap<String, String>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let (read_half, mut write_half) = socket.into_split();
            let mut request = String::new();
            if BufReader::new(read_half)
                .read_line(&mut request)
                .await
                .is_err()
            {
                continue;
            }

            let symbol = request.split(',').nth(1).unwrap_or_default().to_string();
            if let Some(response) = responses.get(&symbol) {
                let _ = write_half.write_all(response.as_bytes()).await;
            }
        }
    });

    port
}

fn config(port: u16, output: &std::path::Path, symbols: &[&str]) -> Config {
    let symbols = symbols
        .iter()
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(", ");
    let toml = format!(
        r#"
        [history]
        host = "127.0.0.1"
        port = {port}
        read_timeout_secs = 5

        [request]
        symbols = [{symbols}]
        rate_seconds = 60
        start_date = "20191025"
        start_time = "075000"
        day_start_time = "093000"
        day_end_time = "160000"

        [output]
        dir = "{}"
        "#,
        output.display()
    );
    Config::from_toml(&toml).unwrap()
}

fn downloader(config: &Config) -> Downloader<HistorySource> {
    let source = HistorySource::new(
        HistoryClient::new(config.history.client_config()),
        config.request.history_template().unwrap(),
    );
    Downloader::new(source, CsvTableWriter::new(config.output.dir.clone()))
}

const SPY_RESPONSE: &str =
    "2019-10-25 09:30:00,100.0,99.5,100.5,100.2,1000,0\r\n!ENDMSG!\0\0\0\0\0\0\0\0\0\0\0";

#[tokio::test]
async fn test_spy_end_to_end() {
    let port = start_server(HashMap::from([("SPY".to_string(), SPY_RESPONSE.to_string())])).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(port, dir.path(), &["SPY"]);

    let summary = downloader(&config).run(&config.request.symbols).await;
    assert_eq!(summary.completed.len(), 1);
    assert!(summary.failed.is_empty());

    let path = dir.path().join("SPY.csv");
    assert_eq!(summary.completed[0].path, path);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    let rows: Vec<HashMap<String, String>> = reader
        .records()
        .map(|r| {
            headers
                .iter()
                .map(str::to_string)
                .zip(r.unwrap().iter().map(str::to_string))
                .collect()
        })
        .collect();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["StartPrice"], "100.0");
    assert_eq!(row["MinPrice"], "99.5");
    assert_eq!(row["MaxPrice"], "100.5");
    assert_eq!(row["EndPrice"], "100.2");
    assert_eq!(row["TradedVolume"], "1000");
    assert_eq!(row["Date"], "2019-10-25");
    assert_eq!(row["Time"], "09:30:00");
    assert_eq!(row["Mnemonic"], "SPY");
    assert_eq!(row["SecurityType"], "Common stock");
    assert_eq!(row["NumberOfTrades"], "1");
}

#[tokio::test]
async fn test_failed_symbol_does_not_block_next() {
    let port = start_server(HashMap::from([("SPY".to_string(), SPY_RESPONSE.to_string())])).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(port, dir.path(), &["NOPE", "SPY"]);

    let summary = downloader(&config).run(&config.request.symbols).await;

    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].job.symbol, "NOPE");
    assert_eq!(summary.completed.len(), 1);
    assert_eq!(summary.completed[0].job.symbol, "SPY");
    assert!(!dir.path().join("NOPE.csv").exists());
    assert!(dir.path().join("SPY.csv").exists());
}

#[tokio::test]
async fn test_unreachable_server_fails_every_symbol() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let config = config(port, dir.path(), &["SPY", "QQQ"]);

    let summary = downloader(&config).run(&config.request.symbols).await;
    assert_eq!(summary.failed.len(), 2);
    assert!(summary.all_failed());
}
