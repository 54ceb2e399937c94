//! Paper trading venue

use super::{Venue, VenueCommand, VenueError, VenueHealth, VenueReceipt};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process venue that accepts every command and keeps a journal
#[derive(Clone, Default)]
pub struct PaperVenue {
    journal: Arc<RwLock<Vec<VenueCommand>>>,
}

impl PaperVenue {
    /// Create a new paper venue
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands accepted so far
    pub async fn journal(&self) -> Vec<VenueCommand> {
        self.journal.read().await.clone()
    }
}

#[async_trait]
impl Venue for PaperVenue {
    async fn execute(&self, command: &VenueCommand) -> Result<VenueReceipt, VenueError> {
        self.journal.write().await.push(command.clone());
        tracing::info!(action = command.action(), lot = %command.lot(), "Paper command accepted");
        Ok(VenueReceipt {
            status: "success".to_string(),
            details: None,
        })
    }

    async fn health(&self) -> Result<VenueHealth, VenueError> {
        Ok(VenueHealth {
            connected: true,
            balance: None,
            login: None,
            server: Some("paper".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Side;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_paper_venue_journal() {
        let venue = PaperVenue::new();

        let open = VenueCommand::Open {
            side: Side::Buy,
            symbol: "XAUUSD".to_string(),
            lot: dec!(0.01),
            stop_loss: dec!(1996),
            take_profit: dec!(2010),
        };
        let partial = VenueCommand::ClosePartial {
            symbol: "XAUUSD".to_string(),
            lot: dec!(0.008),
        };

        let receipt = venue.execute(&open).await.unwrap();
        assert_eq!(receipt.status, "success");
        venue.execute(&partial).await.unwrap();

        let journal = venue.journal().await;
        assert_eq!(journal, vec![open, partial]);
    }

    #[tokio::test]
    async fn test_paper_venue_clones_share_journal() {
        let venue = PaperVenue::new();
        let handle = venue.clone();

        handle
            .execute(&VenueCommand::ClosePartial {
                symbol: "XAUUSD".to_string(),
                lot: dec!(0.001),
            })
            .await
            .unwrap();

        assert_eq!(venue.journal().await.len(), 1);
    }

    #[tokio::test]
    async fn test_paper_venue_health() {
        let health = PaperVenue::new().health().await.unwrap();
        assert!(health.connected);
        assert_eq!(health.server.as_deref(), Some("paper"));
    }
}
