//! Prometheus metrics

use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Candle request round trip
    CandleFetch,
    /// Full evaluation cycle
    Cycle,
    /// Venue command round trip
    VenueCommand,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Ledger net profit
    NetProfit,
    /// Ledger win rate (fraction)
    WinRate,
    /// Booked slices
    TotalTrades,
    /// 1 while a position is open
    OpenPosition,
    /// Lots still open
    LotRemaining,
    /// Lot size for new positions
    LotSize,
    /// Connected observers
    Observers,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Cycles that ran to completion
    CyclesCompleted,
    /// Cycles that ended before touching the position
    CyclesAborted,
    /// Ticks dropped because a cycle was still running
    TicksDropped,
    /// Venue commands that failed
    VenueFailures,
    /// Ledger writes that failed
    PersistFailures,
}

fn latency_name(metric: LatencyMetric) -> &'static str {
    match metric {
        LatencyMetric::CandleFetch => "xau_candle_fetch_latency_ms",
        LatencyMetric::Cycle => "xau_cycle_latency_ms",
        LatencyMetric::VenueCommand => "xau_venue_command_latency_ms",
    }
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::NetProfit => "xau_net_profit_usd",
        GaugeMetric::WinRate => "xau_win_rate",
        GaugeMetric::TotalTrades => "xau_total_trades",
        GaugeMetric::OpenPosition => "xau_open_position",
        GaugeMetric::LotRemaining => "xau_lot_remaining",
        GaugeMetric::LotSize => "xau_lot_size",
        GaugeMetric::Observers => "xau_observers",
    }
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::CyclesCompleted => "xau_cycles_completed_total",
        CounterMetric::CyclesAborted => "xau_cycles_aborted_total",
        CounterMetric::TicksDropped => "xau_ticks_dropped_total",
        CounterMetric::VenueFailures => "xau_venue_failures_total",
        CounterMetric::PersistFailures => "xau_persist_failures_total",
    }
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let name = latency_name(metric);
    metrics::histogram!(name).record(duration.as_secs_f64() * 1000.0);
    tracing::trace!(metric = name, value_ms = duration.as_millis(), "Recording latency");
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(gauge_name(metric)).set(value);
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    metrics::counter!(counter_name(metric)).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_prefixed() {
        for metric in [LatencyMetric::CandleFetch, LatencyMetric::Cycle, LatencyMetric::VenueCommand] {
            assert!(latency_name(metric).starts_with("xau_"));
        }
        assert_eq!(counter_name(CounterMetric::TicksDropped), "xau_ticks_dropped_total");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_latency(LatencyMetric::Cycle, Duration::from_millis(5));
        set_gauge(GaugeMetric::WinRate, 0.5);
        increment(CounterMetric::CyclesCompleted);
    }
}
