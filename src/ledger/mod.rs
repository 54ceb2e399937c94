//! Performance ledger
//!
//! Books closed lot slices into running totals and persists them after every
//! change.

mod store;

pub use store::{JsonFileStore, LedgerError, LedgerStore, MemoryStore};

use crate::signal::Side;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Persisted performance totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStats {
    pub total_trades: u64,
    pub wins: u64,
    pub losses: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_profit: Decimal,
}

impl LedgerStats {
    /// Wins over total trades, 0 when nothing has been booked
    pub fn win_rate(&self) -> f64 {
        if self.total_trades == 0 {
            return 0.0;
        }
        self.wins as f64 / self.total_trades as f64
    }
}

/// Totals plus derived figures, as sent to observers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub total_trades: u64,
    pub wins: u64,
    pub losses: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_profit: Decimal,
    /// Fraction in `[0, 1]`
    pub win_rate: f64,
}

impl From<&LedgerStats> for PerformanceStats {
    fn from(stats: &LedgerStats) -> Self {
        Self {
            total_trades: stats.total_trades,
            wins: stats.wins,
            losses: stats.losses,
            net_profit: stats.net_profit,
            win_rate: stats.win_rate(),
        }
    }
}

/// One booked slice
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub entry: Decimal,
    pub exit: Decimal,
    pub side: Side,
    pub lot: Decimal,
    pub pnl: Decimal,
}

/// Result of booking a slice. The in-memory totals are updated even when
/// persisting them failed.
#[derive(Debug)]
pub struct Recorded {
    pub trade: ClosedTrade,
    pub persist_error: Option<LedgerError>,
}

/// Running performance totals backed by a [`LedgerStore`]
pub struct PerformanceLedger {
    store: Box<dyn LedgerStore>,
    contract_multiplier: Decimal,
    stats: LedgerStats,
}

impl PerformanceLedger {
    /// Load totals from `store`. A missing or unreadable record starts from zero.
    pub fn load(store: Box<dyn LedgerStore>, contract_multiplier: Decimal) -> Self {
        let stats = match store.load() {
            Ok(Some(stats)) => {
                tracing::info!(
                    total_trades = stats.total_trades,
                    net_profit = %stats.net_profit,
                    "Loaded performance ledger"
                );
                stats
            }
            Ok(None) => LedgerStats::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Performance ledger unreadable, starting from zero");
                LedgerStats::default()
            }
        };

        Self {
            store,
            contract_multiplier,
            stats,
        }
    }

    /// Profit of a slice in account currency
    pub fn pnl(&self, entry: Decimal, exit: Decimal, side: Side, lot: Decimal) -> Decimal {
        (exit - entry) * side.sign() * self.contract_multiplier * lot
    }

    /// Book a closed slice and persist the new totals
    pub fn record_trade(&mut self, entry: Decimal, exit: Decimal, side: Side, lot: Decimal) -> Recorded {
        let pnl = self.pnl(entry, exit, side, lot);

        self.stats.total_trades += 1;
        self.stats.net_profit += pnl;
        if pnl > Decimal::ZERO {
            self.stats.wins += 1;
        } else {
            self.stats.losses += 1;
        }

        tracing::info!(
            %side,
            %entry,
            %exit,
            %lot,
            %pnl,
            total_trades = self.stats.total_trades,
            net_profit = %self.stats.net_profit,
            "Trade booked"
        );

        let persist_error = self.persist().err();
        Recorded {
            trade: ClosedTrade {
                entry,
                exit,
                side,
                lot,
                pnl,
            },
            persist_error,
        }
    }

    /// Zero all totals and persist
    pub fn reset(&mut self) -> Result<(), LedgerError> {
        self.stats = LedgerStats::default();
        tracing::info!("Performance ledger reset");
        self.persist()
    }

    /// Totals with the derived win rate
    pub fn snapshot(&self) -> PerformanceStats {
        PerformanceStats::from(&self.stats)
    }

    pub fn stats(&self) -> &LedgerStats {
        &self.stats
    }

    fn persist(&self) -> Result<(), LedgerError> {
        self.store.save(&self.stats).map_err(|e| {
            tracing::error!(error = %e, "Failed to persist performance ledger");
            e
        })
    }
}

impl std::fmt::Debug for PerformanceLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceLedger")
            .field("contract_multiplier", &self.contract_multiplier)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Lossy view used for metrics gauges
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct FailingStore;

    impl LedgerStore for FailingStore {
        fn load(&self) -> Result<Option<LedgerStats>, LedgerError> {
            Err(LedgerError::Unavailable("disk gone".to_string()))
        }

        fn save(&self, _stats: &LedgerStats) -> Result<(), LedgerError> {
            Err(LedgerError::Unavailable("disk gone".to_string()))
        }
    }

    fn ledger() -> (PerformanceLedger, MemoryStore) {
        let store = MemoryStore::new();
        (PerformanceLedger::load(Box::new(store.clone()), dec!(100)), store)
    }

    #[test]
    fn test_buy_win() {
        let (mut ledger, store) = ledger();
        let recorded = ledger.record_trade(dec!(2000), dec!(2008), Side::Buy, dec!(0.008));

        assert_eq!(recorded.trade.pnl, dec!(6.4));
        assert!(recorded.persist_error.is_none());
        assert_eq!(ledger.stats().wins, 1);
        assert_eq!(ledger.stats().losses, 0);
        assert_eq!(store.stored().unwrap().net_profit, dec!(6.4));
    }

    #[test]
    fn test_sell_pnl_sign() {
        let (mut ledger, _) = ledger();
        let win = ledger.record_trade(dec!(2000), dec!(1990), Side::Sell, dec!(0.01));
        assert_eq!(win.trade.pnl, dec!(10));
        let loss = ledger.record_trade(dec!(2000), dec!(2004), Side::Sell, dec!(0.01));
        assert_eq!(loss.trade.pnl, dec!(-4));
        assert_eq!(ledger.stats().net_profit, dec!(6));
    }

    #[test]
    fn test_breakeven_counts_as_loss() {
        let (mut ledger, _) = ledger();
        ledger.record_trade(dec!(2000), dec!(2000), Side::Buy, dec!(0.01));
        assert_eq!(ledger.stats().wins, 0);
        assert_eq!(ledger.stats().losses, 1);
    }

    #[test]
    fn test_partial_then_stop_scenario() {
        let (mut ledger, _) = ledger();
        ledger.record_trade(dec!(2000), dec!(2008), Side::Buy, dec!(0.008));
        ledger.record_trade(dec!(2000), dec!(1995), Side::Buy, dec!(0.002));

        let snap = ledger.snapshot();
        assert_eq!(snap.total_trades, 2);
        assert_eq!(snap.wins, 1);
        assert_eq!(snap.losses, 1);
        assert_eq!(snap.net_profit, dec!(5.4));
        assert_eq!(snap.win_rate, 0.5);
        assert_eq!(snap.wins + snap.losses, snap.total_trades);
    }

    #[test]
    fn test_reset() {
        let (mut ledger, store) = ledger();
        ledger.record_trade(dec!(2000), dec!(2010), Side::Buy, dec!(0.01));
        ledger.reset().unwrap();

        assert_eq!(ledger.snapshot(), PerformanceStats::default());
        assert_eq!(ledger.snapshot().win_rate, 0.0);
        assert_eq!(store.stored(), Some(LedgerStats::default()));
    }

    #[test]
    fn test_loads_existing() {
        let seeded = LedgerStats {
            total_trades: 4,
            wins: 3,
            losses: 1,
            net_profit: dec!(20),
        };
        let ledger = PerformanceLedger::load(Box::new(MemoryStore::with_stats(seeded)), dec!(100));
        assert_eq!(ledger.snapshot().win_rate, 0.75);
    }

    #[test]
    fn test_unreadable_store_starts_at_zero() {
        let mut ledger = PerformanceLedger::load(Box::new(FailingStore), dec!(100));
        assert_eq!(ledger.stats(), &LedgerStats::default());

        let recorded = ledger.record_trade(dec!(2000), dec!(2001), Side::Buy, dec!(0.01));
        assert!(recorded.persist_error.is_some());
        // totals still advance in memory
        assert_eq!(ledger.stats().total_trades, 1);
        assert!(ledger.reset().is_err());
    }

    #[test]
    fn test_performance_wire_format() {
        let stats = LedgerStats {
            total_trades: 2,
            wins: 1,
            losses: 1,
            net_profit: dec!(5.4),
        };
        let json = serde_json::to_value(PerformanceStats::from(&stats)).unwrap();
        assert_eq!(json["totalTrades"], 2);
        assert_eq!(json["netProfit"], 5.4);
        assert_eq!(json["winRate"], 0.5);
    }
}
