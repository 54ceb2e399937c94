//! CLI interface for xau-trader
//!
//! Provides subcommands for:
//! - `run`: Start the trading bot
//! - `trade`: Send one command to the venue bridge
//! - `stats`: Show or reset the performance ledger
//! - `status`: Query venue bridge health
//! - `config`: Show the effective configuration

mod run;
mod stats;
mod status;
mod trade;

pub use run::RunArgs;
pub use stats::StatsArgs;
pub use status::StatusArgs;
pub use trade::{TradeAction, TradeArgs};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "xau-trader")]
#[command(about = "Signal-driven XAU/USD trading bot")]
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
    /// Start the trading bot
    Run(RunArgs),
    /// Send one command to the venue bridge
    Trade(TradeArgs),
    /// Show or reset the performance ledger
    Stats(StatsArgs),
    /// Query venue bridge health
    Status(StatusArgs),
    /// Show the effective configuration
    Config,
}
