use clap::Parser;
use quote_dl::cli::{Cli, Commands};
use quote_dl::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let (config, used_example) = Config::load_or_example(&cli.config)?;
    if used_example {
        eprintln!("Warning: {} not found, using default configuration", cli.config);
    }

    // Initialize telemetry
    quote_dl::telemetry::init_telemetry(&config.telemetry)?;

    let summary = match cli.command {
        Commands::Iqfeed(args) => args.execute(&config).await?,
        Commands::Alphavantage(args) => args.execute(&config).await?,
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  History: {}:{} (chunk {} bytes, timeout {}s, trailer {:?})",
                config.history.host,
                config.history.port,
                config.history.chunk_size,
                config.history.read_timeout_secs,
                config.history.trailer
            );
            println!(
                "  Request: {}s bars from {} {}, {}-{}",
                config.request.rate_seconds,
                config.request.start_date,
                config.request.start_time,
                config.request.day_start_time,
                config.request.day_end_time
            );
            println!("  Symbols: {}", config.request.symbols.join(","));
            match &config.alphavantage {
                Some(av) => println!(
                    "  Alpha Vantage: {:?} {} ({} years)",
                    av.mode, av.interval, av.years
                ),
                None => println!("  Alpha Vantage: not configured"),
            }
            println!("  Output: {}", config.output.dir.display());
            return Ok(());
        }
    };

    for completed in &summary.completed {
        println!(
            "{} : {} rows -> {}",
            completed.job.symbol,
            completed.rows,
            completed.path.display()
        );
    }
    for failed in &summary.failed {
        eprintln!("{} : failed ({})", failed.job.file_stem, failed.error);
    }

    if summary.all_failed() {
        anyhow::bail!("All {} download jobs failed", summary.total_jobs());
    }

    Ok(())
}
