use anyhow::Context;
use clap::Parser;
use ratecast::cli::{Cli, Commands};
use ratecast::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Could not load config from {}", cli.config))?;

    ratecast::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting ratecast");
            args.execute(config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed: {} ({})", config.rates.url, config.rates.currency);
            println!("  Store: {}", config.store.path.display());
            println!("  Broadcast every: {}s", config.broadcast.interval_secs);
            println!("  Poll timeout: {}s", config.transport.poll_timeout_secs);
            println!("  Log level: {}", config.telemetry.log_level);
        }
    }

    Ok(())
}
