use clap::Parser;
use xau_trader::cli::{Cli, Commands};
use xau_trader::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using bundled default configuration");
            toml::from_str(include_str!("../config.toml.example"))?
        }
    };

    // Initialize telemetry
    let _telemetry = xau_trader::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!(mode = ?config.execution.mode, symbol = %config.instrument.symbol, "Starting trading bot");
            args.execute(&config).await?;
        }
        Commands::Trade(args) => {
            args.execute(&config).await?;
        }
        Commands::Stats(args) => {
            args.execute(&config)?;
        }
        Commands::Status(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Instrument: {} (feed {}, x{})",
                config.instrument.symbol, config.instrument.feed_symbol, config.instrument.contract_multiplier
            );
            println!(
                "  Feed: {} granularity={}s candles={}",
                config.feed.url, config.feed.granularity_secs, config.feed.candle_count
            );
            println!(
                "  Strategy: EMA{}/EMA{} RSI{} ({}/{})",
                config.strategy.ema_fast,
                config.strategy.ema_slow,
                config.strategy.rsi_period,
                config.strategy.rsi_lower,
                config.strategy.rsi_upper
            );
            println!(
                "  Risk: lot={} SL={}% TP={}% trail={}% partial={}%",
                config.risk.default_lot,
                config.risk.stop_loss_pct * rust_decimal_macros::dec!(100),
                config.risk.take_profit_pct * rust_decimal_macros::dec!(100),
                config.risk.trailing_pct * rust_decimal_macros::dec!(100),
                config.risk.partial_close_pct * rust_decimal_macros::dec!(100)
            );
            println!("  Execution: {:?} via {}", config.execution.mode, config.execution.bridge_url);
            let sessions: Vec<String> = config.scheduler.sessions.iter().map(|s| s.to_string()).collect();
            println!(
                "  Scheduler: every {}s, sessions [{}]",
                config.scheduler.period_secs,
                sessions.join(", ")
            );
            println!("  Observer: {}", config.observer.bind);
            println!("  Ledger: {}", config.ledger.path.display());
        }
    }

    Ok(())
}
