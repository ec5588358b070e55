//! History socket download command

use super::TargetArgs;
use crate::config::Config;
use crate::download::{DownloadSummary, Downloader};
use crate::history::{HistoryClient, HistorySource};
use crate::output::CsvTableWriter;
use clap::Args;

#[derive(Args, Debug)]
pub struct IqFeedArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

impl IqFeedArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<DownloadSummary> {
        let symbols = self.target.symbols(config);
        let output_dir = self.target.output_dir(config);
        let client_config = config.history.client_config();

        tracing::info!(
            addr = %client_config.addr(),
            symbols = symbols.len(),
            output = %output_dir.display(),
            "Starting history download"
        );

        let source = HistorySource::new(
            HistoryClient::new(client_config),
            config.request.history_template()?,
        );
        let downloader = Downloader::new(source, CsvTableWriter::new(output_dir));

        Ok(downloader.run(&symbols).await)
    }
}
