//! Sequential per-symbol download loop

use super::{BarSource, DownloadError, DownloadJob};
use crate::output::{CsvTableWriter, InstrumentMetadata};
use std::path::PathBuf;
use std::time::Instant;

/// A job whose table was written
#[derive(Debug, Clone)]
pub struct CompletedJob {
    pub job: DownloadJob,
    pub path: PathBuf,
    pub rows: usize,
    /// Lines the parser rejected
    pub rejected: usize,
}

/// A job that failed
#[derive(Debug, Clone)]
pub struct FailedJob {
    pub job: DownloadJob,
    pub error: String,
}

/// Outcome of a download run
#[derive(Debug, Default, Clone)]
pub struct DownloadSummary {
    pub completed: Vec<CompletedJob>,
    pub failed: Vec<FailedJob>,
}

impl DownloadSummary {
    pub fn total_jobs(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    pub fn total_rows(&self) -> usize {
        self.completed.iter().map(|c| c.rows).sum()
    }

    /// True if at least one job ran and none succeeded
    pub fn all_failed(&self) -> bool {
        self.completed.is_empty() && !self.failed.is_empty()
    }
}

/// Runs every planned job of a source and writes the results
pub struct Downloader<S: BarSource> {
    source: S,
    writer: CsvTableWriter,
}

impl<S: BarSource> Downloader<S> {
    pub fn new(source: S, writer: CsvTableWriter) -> Self {
        Self { source, writer }
    }

    /// Download all symbols in order
    ///
    /// Never stops early: each failure is recorded in the summary.
    pub async fn run(&self, symbols: &[String]) -> DownloadSummary {
        let mut summary = DownloadSummary::default();

        for symbol in symbols {
            tracing::info!(source = self.source.name(), symbol = %symbol, "Downloading symbol");

            for job in self.source.plan(symbol) {
                let started = Instant::now();
                match self.run_job(&job).await {
                    Ok(completed) => {
                        tracing::info!(
                            symbol = %job.symbol,
                            path = %completed.path.display(),
                            rows = completed.rows,
                            rejected = completed.rejected,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Job complete"
                        );
                        summary.completed.push(completed);
                    }
                    Err(e) => {
                        tracing::error!(
                            symbol = %job.symbol,
                            file = %job.file_stem,
                            error = %e,
                            "Job failed"
                        );
                        summary.failed.push(FailedJob {
                            job,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        tracing::info!(
            completed = summary.completed.len(),
            failed = summary.failed.len(),
            rows = summary.total_rows(),
            "Download run finished"
        );

        summary
    }

    async fn run_job(&self, job: &DownloadJob) -> Result<CompletedJob, DownloadError> {
        let parsed = self.source.fetch(job).await?;

        for rejected in &parsed.rejected {
            tracing::warn!(symbol = %job.symbol, error = %rejected, "Skipping malformed record");
        }

        let meta = InstrumentMetadata::for_symbol(&job.symbol);
        let path = self.writer.write(&job.file_stem, &parsed.bars, &meta)?;

        Ok(CompletedJob {
            job: job.clone(),
            path,
            rows: parsed.bars.len(),
            rejected: parsed.rejected.len(),
        })
    }
}
