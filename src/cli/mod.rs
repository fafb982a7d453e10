//! CLI interface for ratecast

mod run;

pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ratecast")]
#[command(about = "Subscription bot broadcasting EUR→TRY exchange rates", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start serving commands and broadcasting rates
    Run(RunArgs),

    /// Show current configuration
    Config,
}
