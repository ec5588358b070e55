//! Download orchestration
//!
//! Drives a [`BarSource`] through every job planned for each symbol and
//! writes one table per job. Jobs run one after another; a failing job is
//! logged and recorded, and the run moves on.

mod runner;

pub use runner::{CompletedJob, DownloadSummary, Downloader, FailedJob};

use crate::alphavantage::AlphaVantageError;
use crate::bars::ParsedBars;
use crate::history::HistoryError;
use crate::output::OutputError;
use async_trait::async_trait;
use thiserror::Error;

/// One request producing one output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub symbol: String,
    /// Output file name without extension
    pub file_stem: String,
    /// Provider-specific time window, if the source splits history
    pub slice: Option<String>,
}

impl DownloadJob {
    /// A job covering everything the source returns for `symbol`
    pub fn whole(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            file_stem: symbol.clone(),
            symbol,
            slice: None,
        }
    }
}

/// Errors that fail a single job
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    AlphaVantage(#[from] AlphaVantageError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// A provider of historical bars
#[async_trait]
pub trait BarSource: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Jobs to run for a symbol
    fn plan(&self, symbol: &str) -> Vec<DownloadJob> {
        vec![DownloadJob::whole(symbol)]
    }

    /// Fetch and parse the bars for one job
    async fn fetch(&self, job: &DownloadJob) -> Result<ParsedBars, DownloadError>;
}
