//! Execution module
//!
//! Sends position commands to the venue (paper or HTTP bridge)

mod bridge;
mod paper;
mod types;

pub use bridge::{BridgeVenue, DEFAULT_BRIDGE_URL};
pub use paper::PaperVenue;
pub use types::{VenueCommand, VenueError, VenueHealth, VenueReceipt};

use crate::position::Position;
use async_trait::async_trait;

/// Trait for execution venue implementations
#[async_trait]
pub trait Venue: Send + Sync {
    /// Execute one command
    async fn execute(&self, command: &VenueCommand) -> Result<VenueReceipt, VenueError>;
    /// Report venue connectivity
    async fn health(&self) -> Result<VenueHealth, VenueError>;
}

/// Hook invoked when a venue command fails after the position was already updated.
///
/// Position state is never rolled back; implementations may query the venue and
/// repair state out of band.
pub trait Reconciler: Send + Sync {
    fn venue_failed(&self, command: &VenueCommand, error: &VenueError, position: Option<&Position>);
}

/// Reconciler that only records the divergence in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReconciler;

impl Reconciler for LogReconciler {
    fn venue_failed(&self, command: &VenueCommand, error: &VenueError, position: Option<&Position>) {
        tracing::warn!(
            action = command.action(),
            lot = %command.lot(),
            error = %error,
            position_id = ?position.map(|p| p.id),
            "Venue command failed; in-memory position kept"
        );
    }
}
