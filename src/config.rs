//! Configuration types for xau-trader

use crate::execution::DEFAULT_BRIDGE_URL;
use crate::feed::DERIV_WS_URL;
use crate::indicator::IndicatorEngine;
use crate::position::PositionParams;
use crate::scheduler::SessionWindow;
use crate::signal::SignalThresholds;
use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub instrument: InstrumentConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub observer: ObserverConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Traded instrument
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentConfig {
    /// Venue symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Feed-side instrument code
    #[serde(default = "default_feed_symbol")]
    pub feed_symbol: String,

    /// Account currency per 1.0 price move per lot
    #[serde(default = "default_contract_multiplier")]
    pub contract_multiplier: Decimal,
}

fn default_symbol() -> String {
    "XAUUSD".to_string()
}
fn default_feed_symbol() -> String {
    "frxXAUUSD".to_string()
}
fn default_contract_multiplier() -> Decimal {
    Decimal::new(100, 0)
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            feed_symbol: default_feed_symbol(),
            contract_multiplier: default_contract_multiplier(),
        }
    }
}

/// Candle feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,

    /// Candle bucket size (seconds)
    #[serde(default = "default_granularity_secs")]
    pub granularity_secs: u32,

    /// Candles requested per cycle
    #[serde(default = "default_candle_count")]
    pub candle_count: usize,

    /// Cycles with fewer candles are skipped
    #[serde(default = "default_min_candles")]
    pub min_candles: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_feed_url() -> String {
    DERIV_WS_URL.to_string()
}
fn default_granularity_secs() -> u32 {
    300 // M5
}
fn default_candle_count() -> usize {
    1000
}
fn default_min_candles() -> usize {
    200
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            granularity_secs: default_granularity_secs(),
            candle_count: default_candle_count(),
            min_candles: default_min_candles(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Indicator periods and RSI thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    #[serde(default = "default_ema_fast")]
    pub ema_fast: usize,

    #[serde(default = "default_ema_slow")]
    pub ema_slow: usize,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_rsi_upper")]
    pub rsi_upper: f64,

    #[serde(default = "default_rsi_lower")]
    pub rsi_lower: f64,
}

fn default_ema_fast() -> usize {
    50
}
fn default_ema_slow() -> usize {
    200
}
fn default_rsi_period() -> usize {
    14
}
fn default_rsi_upper() -> f64 {
    55.0
}
fn default_rsi_lower() -> f64 {
    45.0
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            ema_fast: default_ema_fast(),
            ema_slow: default_ema_slow(),
            rsi_period: default_rsi_period(),
            rsi_upper: default_rsi_upper(),
            rsi_lower: default_rsi_lower(),
        }
    }
}

impl StrategyConfig {
    pub fn indicators(&self) -> IndicatorEngine {
        IndicatorEngine::new(self.ema_fast, self.ema_slow, self.rsi_period)
    }

    pub fn thresholds(&self) -> SignalThresholds {
        SignalThresholds {
            rsi_upper: self.rsi_upper,
            rsi_lower: self.rsi_lower,
        }
    }
}

/// Position risk configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    /// Lot size until an observer changes it
    #[serde(default = "default_lot")]
    pub default_lot: Decimal,

    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: Decimal,

    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: Decimal,

    #[serde(default = "default_trailing_pct")]
    pub trailing_pct: Decimal,

    /// Fraction of the lot closed at the take-profit target
    #[serde(default = "default_partial_close_pct")]
    pub partial_close_pct: Decimal,

    #[serde(default = "default_min_remaining_lot")]
    pub min_remaining_lot: Decimal,
}

fn default_lot() -> Decimal {
    Decimal::new(1, 2) // 0.01
}
fn default_stop_loss_pct() -> Decimal {
    Decimal::new(2, 3) // 0.2%
}
fn default_take_profit_pct() -> Decimal {
    Decimal::new(5, 3) // 0.5%
}
fn default_trailing_pct() -> Decimal {
    Decimal::new(3, 3) // 0.3%
}
fn default_partial_close_pct() -> Decimal {
    Decimal::new(8, 1) // 80%
}
fn default_min_remaining_lot() -> Decimal {
    Decimal::new(1, 4) // 0.0001
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            default_lot: default_lot(),
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
            trailing_pct: default_trailing_pct(),
            partial_close_pct: default_partial_close_pct(),
            min_remaining_lot: default_min_remaining_lot(),
        }
    }
}

/// Execution engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Base URL of the venue HTTP bridge (live mode)
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Execution mode: paper trading or live
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Paper,
    Live,
}

fn default_bridge_url() -> String {
    DEFAULT_BRIDGE_URL.to_string()
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Paper,
            bridge_url: default_bridge_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ExecutionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Evaluation cadence and trading sessions
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,

    /// UTC "HH:MM-HH:MM" windows; empty means always on
    #[serde(default = "default_sessions")]
    pub sessions: Vec<SessionWindow>,
}

fn default_period_secs() -> u64 {
    60
}
fn default_sessions() -> Vec<SessionWindow> {
    // London open and New York overlap
    vec![
        SessionWindow::from_minutes(7 * 60, 10 * 60),
        SessionWindow::from_minutes(12 * 60 + 30, 15 * 60 + 30),
    ]
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period_secs: default_period_secs(),
            sessions: default_sessions(),
        }
    }
}

impl SchedulerConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs.max(1))
    }
}

/// Observer WebSocket server
#[derive(Debug, Clone, Deserialize)]
pub struct ObserverConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,

    /// Events buffered per slow observer before it starts missing some
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}
fn default_heartbeat_secs() -> u64 {
    30
}
fn default_channel_capacity() -> usize {
    256
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            heartbeat_secs: default_heartbeat_secs(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Performance ledger location
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("data/stats.json")
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Prometheus scrape port; disabled when unset
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        let risk = &self.risk;
        anyhow::ensure!(risk.default_lot > Decimal::ZERO, "risk.default_lot must be positive");
        anyhow::ensure!(
            risk.partial_close_pct > Decimal::ZERO && risk.partial_close_pct <= Decimal::ONE,
            "risk.partial_close_pct must be in (0, 1]"
        );
        anyhow::ensure!(
            risk.stop_loss_pct > Decimal::ZERO
                && risk.take_profit_pct > Decimal::ZERO
                && risk.trailing_pct > Decimal::ZERO,
            "risk percentages must be positive"
        );
        anyhow::ensure!(
            self.strategy.rsi_lower <= self.strategy.rsi_upper,
            "strategy.rsi_lower must not exceed strategy.rsi_upper"
        );
        anyhow::ensure!(
            self.feed.candle_count >= self.feed.min_candles,
            "feed.candle_count must be at least feed.min_candles"
        );
        Ok(())
    }

    /// Position state machine parameters
    pub fn position_params(&self) -> PositionParams {
        PositionParams {
            symbol: self.instrument.symbol.clone(),
            stop_loss_pct: self.risk.stop_loss_pct,
            take_profit_pct: self.risk.take_profit_pct,
            trailing_pct: self.risk.trailing_pct,
            partial_close_pct: self.risk.partial_close_pct,
            min_remaining_lot: self.risk.min_remaining_lot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [instrument]
            symbol = "XAUUSD"
            feed_symbol = "frxXAUUSD"
            contract_multiplier = 100

            [feed]
            granularity_secs = 300
            candle_count = 500

            [strategy]
            ema_fast = 20
            ema_slow = 100

            [risk]
            default_lot = 0.02
            partial_close_pct = 0.5

            [execution]
            mode = "live"
            bridge_url = "http://10.0.0.5:5000"

            [scheduler]
            period_secs = 30
            sessions = ["08:00-11:00"]

            [telemetry]
            log_level = "debug"
            log_format = "json"
            metrics_port = 9090
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.feed.candle_count, 500);
        assert_eq!(config.feed.min_candles, 200);
        assert_eq!(config.strategy.ema_fast, 20);
        assert_eq!(config.strategy.rsi_period, 14);
        assert_eq!(config.risk.default_lot, dec!(0.02));
        assert_eq!(config.risk.partial_close_pct, dec!(0.5));
        assert_eq!(config.risk.stop_loss_pct, dec!(0.002));
        assert_eq!(config.execution.mode, ExecutionMode::Live);
        assert_eq!(config.scheduler.sessions.len(), 1);
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        assert_eq!(config.telemetry.metrics_port, Some(9090));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.instrument.symbol, "XAUUSD");
        assert_eq!(config.instrument.contract_multiplier, dec!(100));
        assert_eq!(config.feed.granularity_secs, 300);
        assert_eq!(config.execution.mode, ExecutionMode::Paper);
        assert_eq!(config.scheduler.sessions.len(), 2);
        assert_eq!(config.scheduler.period(), Duration::from_secs(60));
        assert_eq!(config.observer.bind, "0.0.0.0:8080");
        assert_eq!(config.ledger.path, PathBuf::from("data/stats.json"));
        assert!(config.telemetry.metrics_port.is_none());
    }

    #[test]
    fn test_position_params_from_config() {
        let config = Config::default();
        let params = config.position_params();
        assert_eq!(params, PositionParams::default());
    }

    #[test]
    fn test_invalid_session_rejected() {
        let toml = r#"
            [scheduler]
            sessions = ["25:00-26:00"]
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_risk() {
        let mut config = Config::default();
        config.risk.partial_close_pct = dec!(1.5);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.risk.default_lot = Decimal::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_execution_mode_equality() {
        assert_eq!(ExecutionMode::default(), ExecutionMode::Paper);
        assert_ne!(ExecutionMode::Paper, ExecutionMode::Live);
    }
}
