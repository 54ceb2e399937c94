//! Observer module
//!
//! Fan-out of engine events to WebSocket observers and intake of their
//! control messages

mod events;
mod server;

pub use events::{ControlCommand, ControlError, ObserverEvent};
pub use server::{ObserverServer, ServerConfig};

use crate::ledger::PerformanceStats;
use rust_decimal::Decimal;
use tokio::sync::{broadcast, watch};

/// What a newly connected observer is greeted with
#[derive(Debug, Clone, PartialEq)]
pub struct Greeting {
    pub stats: PerformanceStats,
    pub lot_size: Decimal,
}

/// Broadcast hub shared by the engine and the observer server
#[derive(Debug, Clone)]
pub struct ObserverHub {
    events: broadcast::Sender<ObserverEvent>,
    greeting: watch::Sender<Greeting>,
}

impl ObserverHub {
    /// Create a hub buffering up to `capacity` events per slow observer
    pub fn new(capacity: usize, greeting: Greeting) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        let (greeting, _) = watch::channel(greeting);
        Self { events, greeting }
    }

    /// Send an event to every connected observer; no-op when nobody listens
    pub fn publish(&self, event: ObserverEvent) {
        if let ObserverEvent::Performance { stats } = &event {
            self.greeting.send_modify(|g| g.stats = stats.clone());
        }
        if self.events.send(event).is_err() {
            tracing::trace!("No observers connected, event dropped");
        }
    }

    /// Publish a batch in order
    pub fn publish_all(&self, events: impl IntoIterator<Item = ObserverEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Record the ledger totals shown to new observers
    pub fn set_stats(&self, stats: PerformanceStats) {
        self.greeting.send_modify(|g| g.stats = stats);
    }

    /// Record the lot size shown to new observers
    pub fn set_lot_size(&self, lot_size: Decimal) {
        self.greeting.send_modify(|g| g.lot_size = lot_size);
    }

    /// Current greeting contents
    pub fn greeting(&self) -> Greeting {
        self.greeting.borrow().clone()
    }

    /// New receiver for the live event stream
    pub fn subscribe(&self) -> broadcast::Receiver<ObserverEvent> {
        self.events.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.events.receiver_count()
    }
}
