//! History socket client

use super::reader::read_until_sentinel;
use super::types::{HistoryError, HistoryRequest, ReadOptions};
use std::future::Future;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Response line the server sends when a request matched no bars
const NO_DATA: &str = "!NO_DATA!";

/// History server connection settings
#[derive(Debug, Clone)]
pub struct HistoryClientConfig {
    pub host: String,
    pub port: u16,
    /// Timeout for establishing the TCP connection
    pub connect_timeout: Duration,
    pub read: ReadOptions,
}

impl HistoryClientConfig {
    /// Create a config for the given endpoint with default timeouts
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Duration::from_secs(5),
            read: ReadOptions::default(),
        }
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }

    /// Set the read options
    pub fn read_options(mut self, read: ReadOptions) -> Self {
        self.read = read;
        self
    }

    /// `host:port` address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Client for a historical-data socket server
///
/// Every request gets its own connection, which is shut down before the
/// request returns whether or not the exchange succeeded.
pub struct HistoryClient {
    config: HistoryClientConfig,
}

impl HistoryClient {
    /// Create a new client
    pub fn new(config: HistoryClientConfig) -> Self {
        Self { config }
    }

    /// Get the configured endpoint address
    pub fn addr(&self) -> String {
        self.config.addr()
    }

    /// Send a history request and return the raw text payload
    pub async fn fetch_payload(&self, request: &HistoryRequest) -> Result<String, HistoryError> {
        let message = request.to_message();
        let read = self.config.read.clone();

        let payload = self
            .with_connection(|mut stream| async move {
                stream.write_all(message.as_bytes()).await?;
                let result = read_until_sentinel(&mut stream, &read).await;
                Ok::<_, HistoryError>((stream, result))
            })
            .await?;

        check_server_error(payload)
    }

    /// Open a connection, run `exchange` on it, then shut it down
    ///
    /// The exchange hands the stream back together with its result so the
    /// shutdown happens on every path; if the exchange fails before that,
    /// dropping the stream closes the socket.
    async fn with_connection<F, Fut, T>(&self, exchange: F) -> Result<T, HistoryError>
    where
        F: FnOnce(TcpStream) -> Fut,
        Fut: Future<Output = Result<(TcpStream, Result<T, HistoryError>), HistoryError>>,
    {
        let stream = self.connect().await?;
        let (mut stream, result) = exchange(stream).await?;

        if let Err(e) = stream.shutdown().await {
            tracing::debug!(addr = %self.addr(), error = %e, "Shutdown after request failed");
        }

        result
    }

    async fn connect(&self) -> Result<TcpStream, HistoryError> {
        let addr = self.addr();
        tracing::debug!(addr = %addr, "Connecting to history server");

        match timeout(self.config.connect_timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(HistoryError::Connect { addr, source }),
            Err(_) => Err(HistoryError::Connect {
                addr,
                source: std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "connect timed out",
                ),
            }),
        }
    }
}

/// Turn an `E,<message>` response into an error
///
/// `E,!NO_DATA!` means the request was valid but matched nothing.
fn check_server_error(payload: String) -> Result<String, HistoryError> {
    let first_line = payload.lines().next().unwrap_or_default();

    match first_line.strip_prefix("E,") {
        None => Ok(payload),
        Some(rest) => {
            let message = rest.trim_end_matches(['\r', ',']).trim();
            if message == NO_DATA {
                Ok(String::new())
            } else {
                Err(HistoryError::Server(message.to_string()))
            }
        }
    }
}
