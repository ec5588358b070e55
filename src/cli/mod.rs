//! CLI interface for quote-dl
//!
//! Provides subcommands for:
//! - `iqfeed`: download interval bars from the history socket server
//! - `alphavantage`: download intraday series from Alpha Vantage
//! - `config`: show the effective configuration

mod alphavantage;
mod iqfeed;

pub use alphavantage::AlphaVantageArgs;
pub use iqfeed::IqFeedArgs;

use crate::config::Config;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quote-dl")]
#[command(about = "Download historical stock prices to CSV")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download bars from the history socket server
    Iqfeed(IqFeedArgs),
    /// Download intraday series from Alpha Vantage
    Alphavantage(AlphaVantageArgs),
    /// Show the effective configuration
    Config,
}

/// Options shared by the download commands
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Symbols to download, overriding the config list
    #[arg(short, long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Output directory, overriding the config
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl TargetArgs {
    /// Symbols from the command line, or the configured list
    pub fn symbols(&self, config: &Config) -> Vec<String> {
        if self.symbols.is_empty() {
            config.request.symbols.clone()
        } else {
            self.symbols.clone()
        }
    }

    /// Output directory from the command line, or the configured one
    pub fn output_dir(&self, config: &Config) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| config.output.dir.clone())
    }
}
