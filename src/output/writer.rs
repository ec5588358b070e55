//! CSV table writer

use super::table::{InstrumentMetadata, OutputRow};
use crate::bars::Bar;
use std::path::PathBuf;
use thiserror::Error;

/// Output errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Output I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes one CSV file per download job
#[derive(Debug, Clone)]
pub struct CsvTableWriter {
    output_dir: PathBuf,
}

impl CsvTableWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Path the table for `file_stem` is written to
    pub fn path_for(&self, file_stem: &str) -> PathBuf {
        self.output_dir.join(format!("{}.csv", file_stem))
    }

    /// Write `bars` as `{output_dir}/{file_stem}.csv`, replacing any existing file
    pub fn write(
        &self,
        file_stem: &str,
        bars: &[Bar],
        meta: &InstrumentMetadata,
    ) -> Result<PathBuf, OutputError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| OutputError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.path_for(file_stem);
        let mut writer = csv::Writer::from_path(&path)?;

        if bars.is_empty() {
            writer.write_record(HEADER)?;
        }
        for bar in bars {
            writer.serialize(OutputRow::from_bar(bar, meta))?;
        }
        writer.flush().map_err(|source| OutputError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), rows = bars.len(), "Wrote table");
        Ok(path)
    }
}

/// Header row, used when there are no rows to derive it from
const HEADER: [&str; 15] = [
    "DateTime",
    "StartPrice",
    "MinPrice",
    "MaxPrice",
    "EndPrice",
    "TradedVolume",
    "Mnemonic",
    "ISIN",
    "SecurityDesc",
    "SecurityType",
    "Currency",
    "SecurityID",
    "NumberOfTrades",
    "Time",
    "Date",
];
