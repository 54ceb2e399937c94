//! Status command implementation

use crate::config::Config;
use crate::execution::{BridgeVenue, Venue};
use clap::Args;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Bridge URL override
    #[arg(long)]
    pub url: Option<String>,
}

impl StatusArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let url = self.url.clone().unwrap_or_else(|| config.execution.bridge_url.clone());
        let venue = BridgeVenue::new(url.clone(), config.execution.timeout())?;

        println!("xau-trader status");
        println!("  Mode: {:?}", config.execution.mode);
        println!("  Bridge: {url}");

        match venue.health().await {
            Ok(health) => {
                println!("  Connected: {}", health.connected);
                if let Some(login) = health.login {
                    println!("  Login: {login}");
                }
                if let Some(server) = health.server {
                    println!("  Server: {server}");
                }
                if let Some(balance) = health.balance {
                    println!("  Balance: {balance}");
                }
            }
            Err(e) => {
                println!("  Connected: false ({e})");
            }
        }
        Ok(())
    }
}
