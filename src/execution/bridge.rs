//! HTTP bridge venue
//!
//! Talks to the local MetaTrader bridge (`POST /trade`, `GET /status`).

use super::{Venue, VenueCommand, VenueError, VenueHealth, VenueReceipt};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bridge address
pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:5000";

/// Request body for `POST /trade`
#[derive(Debug, Serialize, PartialEq)]
struct TradePayload<'a> {
    action: &'static str,
    symbol: &'a str,
    lot: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tp: Option<f64>,
}

/// Response body for both endpoints
#[derive(Debug, Deserialize)]
struct BridgeReply {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<serde_json::Value>,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    balance: Option<Decimal>,
    #[serde(default)]
    login: Option<i64>,
    #[serde(default)]
    server: Option<String>,
}

/// Venue backed by the HTTP trade bridge
pub struct BridgeVenue {
    base_url: String,
    client: Client,
}

impl BridgeVenue {
    /// Create a bridge client with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, VenueError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VenueError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn payload(command: &VenueCommand) -> TradePayload<'_> {
        let (sl, tp) = match command {
            VenueCommand::Open {
                stop_loss,
                take_profit,
                ..
            } => (Some(*stop_loss), Some(*take_profit)),
            VenueCommand::Modify {
                stop, take_profit, ..
            } => (Some(*stop), *take_profit),
            VenueCommand::ClosePartial { .. } | VenueCommand::Close { .. } => (None, None),
        };

        TradePayload {
            action: command.action(),
            symbol: command.symbol(),
            lot: command.lot().to_f64().unwrap_or_default(),
            // zero level means "unset" on the bridge side
            sl: sl.filter(|v| !v.is_zero()).and_then(|v| v.to_f64()),
            tp: tp.filter(|v| !v.is_zero()).and_then(|v| v.to_f64()),
        }
    }

    fn transport_error(e: reqwest::Error) -> VenueError {
        if e.is_timeout() {
            VenueError::Timeout
        } else {
            VenueError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl Venue for BridgeVenue {
    async fn execute(&self, command: &VenueCommand) -> Result<VenueReceipt, VenueError> {
        let url = format!("{}/trade", self.base_url);
        let payload = Self::payload(command);

        tracing::info!(action = payload.action, symbol = payload.symbol, lot = payload.lot, "Sending to bridge");

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(Self::transport_error)?;
        let reply: Option<BridgeReply> = serde_json::from_str(&body).ok();

        match reply {
            Some(reply) if status.is_success() && reply.status != "error" => {
                tracing::debug!(status = %reply.status, "Bridge accepted command");
                Ok(VenueReceipt {
                    status: reply.status,
                    details: reply.details.or(reply.result),
                })
            }
            Some(reply) => Err(VenueError::Rejected {
                action: command.action().to_string(),
                reason: reply
                    .message
                    .or_else(|| reply.details.map(|d| d.to_string()))
                    .unwrap_or_else(|| status.to_string()),
            }),
            None => Err(VenueError::Rejected {
                action: command.action().to_string(),
                reason: format!("{} - {}", status, body),
            }),
        }
    }

    async fn health(&self) -> Result<VenueHealth, VenueError> {
        let url = format!("{}/status", self.base_url);
        let reply: BridgeReply = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::transport_error)?
            .json()
            .await
            .map_err(Self::transport_error)?;

        if let Some(ref error) = reply.error {
            tracing::warn!(error = %error, "Bridge reports disconnected terminal");
        }

        Ok(VenueHealth {
            connected: reply.status == "connected",
            balance: reply.balance,
            login: reply.login,
            server: reply.server,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Side;
    use rust_decimal_macros::dec;

    #[test]
    fn test_open_payload() {
        let command = VenueCommand::Open {
            side: Side::Sell,
            symbol: "XAUUSD".to_string(),
            lot: dec!(0.01),
            stop_loss: dec!(2004),
            take_profit: dec!(1990),
        };
        let json = serde_json::to_value(BridgeVenue::payload(&command)).unwrap();
        assert_eq!(json["action"], "SELL");
        assert_eq!(json["symbol"], "XAUUSD");
        assert_eq!(json["lot"], 0.01);
        assert_eq!(json["sl"], 2004.0);
        assert_eq!(json["tp"], 1990.0);
    }

    #[test]
    fn test_close_payload_omits_levels() {
        let command = VenueCommand::Close {
            side: Side::Buy,
            symbol: "XAUUSD".to_string(),
            lot: dec!(0.002),
        };
        let json = serde_json::to_value(BridgeVenue::payload(&command)).unwrap();
        assert_eq!(json["action"], "BUY");
        assert!(json.get("sl").is_none());
        assert!(json.get("tp").is_none());
    }

    #[test]
    fn test_modify_payload_without_target() {
        let command = VenueCommand::Modify {
            symbol: "XAUUSD".to_string(),
            lot: dec!(0.002),
            stop: dec!(2010.5),
            take_profit: None,
        };
        let json = serde_json::to_value(BridgeVenue::payload(&command)).unwrap();
        assert_eq!(json["action"], "MODIFY");
        assert_eq!(json["sl"], 2010.5);
        assert!(json.get("tp").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let venue = BridgeVenue::new("http://127.0.0.1:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(venue.base_url, DEFAULT_BRIDGE_URL);
    }

    #[tokio::test]
    async fn test_unreachable_bridge_is_error() {
        let venue = BridgeVenue::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let command = VenueCommand::ClosePartial {
            symbol: "XAUUSD".to_string(),
            lot: dec!(0.001),
        };
        tokio_test::assert_err!(venue.execute(&command).await);
    }
}
