//! Trade command implementation

use crate::config::Config;
use crate::execution::{BridgeVenue, Venue, VenueCommand};
use crate::signal::Side;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

/// Manual bridge action
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
    ClosePartial,
    Modify,
}

#[derive(Args, Debug)]
pub struct TradeArgs {
    /// Action to send
    #[arg(value_enum)]
    pub action: TradeAction,

    /// Lot size (defaults to risk.default_lot)
    #[arg(long)]
    pub lot: Option<Decimal>,

    /// Stop-loss level (required for modify)
    #[arg(long)]
    pub sl: Option<Decimal>,

    /// Take-profit level
    #[arg(long)]
    pub tp: Option<Decimal>,

    /// Bridge URL override
    #[arg(long)]
    pub url: Option<String>,
}

impl TradeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let command = self.command(config)?;
        let url = self.url.clone().unwrap_or_else(|| config.execution.bridge_url.clone());
        let venue = BridgeVenue::new(url, config.execution.timeout())?;

        tracing::info!(action = command.action(), lot = %command.lot(), "Sending manual command");
        let receipt = venue.execute(&command).await?;

        println!("status: {}", receipt.status);
        if let Some(details) = receipt.details {
            println!("{}", serde_json::to_string_pretty(&details)?);
        }
        Ok(())
    }

    fn command(&self, config: &Config) -> anyhow::Result<VenueCommand> {
        let symbol = config.instrument.symbol.clone();
        let lot = self.lot.unwrap_or(config.risk.default_lot);
        anyhow::ensure!(lot > Decimal::ZERO, "lot must be positive");

        Ok(match self.action {
            TradeAction::Buy | TradeAction::Sell => {
                let side = if self.action == TradeAction::Buy {
                    Side::Buy
                } else {
                    Side::Sell
                };
                // bare market order when no levels are given
                VenueCommand::Open {
                    side,
                    symbol,
                    lot,
                    stop_loss: self.sl.unwrap_or_default(),
                    take_profit: self.tp.unwrap_or_default(),
                }
            }
            TradeAction::ClosePartial => VenueCommand::ClosePartial { symbol, lot },
            TradeAction::Modify => {
                let stop = self
                    .sl
                    .ok_or_else(|| anyhow::anyhow!("modify requires --sl"))?;
                VenueCommand::Modify {
                    symbol,
                    lot,
                    stop,
                    take_profit: self.tp,
                }
            }
        })
    }
}
