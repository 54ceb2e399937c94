//! Stats command implementation

use crate::config::Config;
use crate::ledger::{JsonFileStore, PerformanceLedger};
use clap::Args;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Zero the persisted ledger
    #[arg(long)]
    pub reset: bool,
}

impl StatsArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut ledger = PerformanceLedger::load(
            Box::new(JsonFileStore::new(&config.ledger.path)),
            config.instrument.contract_multiplier,
        );

        if self.reset {
            ledger.reset()?;
            println!("Performance stats reset ({})", config.ledger.path.display());
        }

        let stats = ledger.snapshot();
        println!("Ledger: {}", config.ledger.path.display());
        println!("  Total trades: {}", stats.total_trades);
        println!("  Wins/Losses:  {}/{}", stats.wins, stats.losses);
        println!("  Win rate:     {:.1}%", stats.win_rate * 100.0);
        println!("  Net profit:   {:.2}", stats.net_profit);
        Ok(())
    }
}
