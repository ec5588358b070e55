//! Alpha Vantage download command

use super::TargetArgs;
use crate::alphavantage::AlphaVantageClient;
use crate::config::Config;
use crate::download::{DownloadSummary, Downloader};
use crate::output::CsvTableWriter;
use clap::Args;

#[derive(Args, Debug)]
pub struct AlphaVantageArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

impl AlphaVantageArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<DownloadSummary> {
        let Some(section) = &config.alphavantage else {
            anyhow::bail!("No [alphavantage] section in configuration");
        };

        let symbols = self.target.symbols(config);
        let output_dir = self.target.output_dir(config);
        let av_config = section.client_config();

        tracing::info!(
            mode = ?av_config.mode,
            interval = %av_config.interval,
            symbols = symbols.len(),
            output = %output_dir.display(),
            "Starting Alpha Vantage download"
        );

        let client = AlphaVantageClient::new(av_config)?;
        let downloader = Downloader::new(client, CsvTableWriter::new(output_dir));

        Ok(downloader.run(&symbols).await)
    }
}
