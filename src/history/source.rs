//! History server as a bar source

use super::client::HistoryClient;
use super::types::HistoryRequest;
use crate::bars::{parse_history_payload, ParsedBars};
use crate::download::{BarSource, DownloadError, DownloadJob};
use async_trait::async_trait;

/// Downloads interval bars for each symbol from a history server
pub struct HistorySource {
    client: HistoryClient,
    /// Request parameters shared by every symbol
    template: HistoryRequest,
}

impl HistorySource {
    /// `template.symbol` is ignored; each job supplies its own
    pub fn new(client: HistoryClient, template: HistoryRequest) -> Self {
        Self { client, template }
    }

    /// The request sent for a symbol
    pub fn request_for(&self, symbol: &str) -> HistoryRequest {
        HistoryRequest {
            symbol: symbol.to_string(),
            ..self.template.clone()
        }
    }
}

#[async_trait]
impl BarSource for HistorySource {
    fn name(&self) -> &str {
        "iqfeed"
    }

    async fn fetch(&self, job: &DownloadJob) -> Result<ParsedBars, DownloadError> {
        let request = self.request_for(&job.symbol);
        let payload = self.client.fetch_payload(&request).await?;

        tracing::debug!(
            symbol = %job.symbol,
            addr = %self.client.addr(),
            bytes = payload.len(),
            "History payload received"
        );

        Ok(parse_history_payload(&payload))
    }
}
