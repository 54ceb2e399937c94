//! Deriv WebSocket candle feed implementation

use super::{Candle, CandleRequest, CandleSource, FeedError};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures_util::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Deriv public WebSocket endpoint
pub const DERIV_WS_URL: &str = "wss://ws.derivws.com/websockets/v3?app_id=110261";

/// `ticks_history` request in candle style
#[derive(Debug, Serialize)]
struct TicksHistoryRequest<'a> {
    ticks_history: &'a str,
    granularity: u32,
    count: usize,
    end: &'a str,
    style: &'a str,
}

/// Subset of a Deriv response envelope we care about
#[derive(Debug, Deserialize)]
struct DerivResponse {
    #[serde(default)]
    candles: Option<Vec<DerivCandle>>,
    #[serde(default)]
    error: Option<DerivError>,
}

#[derive(Debug, Deserialize)]
struct DerivError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DerivCandle {
    epoch: i64,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    #[serde(default)]
    tick_count: Option<Decimal>,
}

/// Deriv feed that opens a short-lived connection per request
pub struct DerivFeed {
    url: String,
}

impl DerivFeed {
    /// Create a feed against the given WebSocket URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Build the request frame for a candle request
    fn build_request(request: &CandleRequest) -> String {
        let payload = TicksHistoryRequest {
            ticks_history: &request.symbol,
            granularity: request.granularity_secs,
            count: request.count,
            end: "latest",
            style: "candles",
        };
        // Serializing a struct of plain fields cannot fail
        serde_json::to_string(&payload).unwrap_or_default()
    }

    /// Parse a response frame.
    ///
    /// Returns `None` for frames that carry neither candles nor an error.
    fn parse_response(text: &str) -> Option<Result<Vec<Candle>, FeedError>> {
        let response: DerivResponse = match serde_json::from_str(text) {
            Ok(r) => r,
            Err(e) => return Some(Err(FeedError::Malformed(e.to_string()))),
        };

        if let Some(error) = response.error {
            return Some(Err(FeedError::Rejected(error.message)));
        }

        let raw = response.candles?;
        let mut candles = Vec::with_capacity(raw.len());
        for c in raw {
            let open_time = match Utc.timestamp_opt(c.epoch, 0).single() {
                Some(ts) => ts,
                None => {
                    return Some(Err(FeedError::Malformed(format!(
                        "invalid epoch {}",
                        c.epoch
                    ))))
                }
            };
            candles.push(Candle {
                open_time,
                open: c.open,
                high: c.high,
                low: c.low,
                close: c.close,
                volume: c.tick_count.unwrap_or(Decimal::ZERO),
            });
        }
        Some(Ok(candles))
    }
}

impl Default for DerivFeed {
    fn default() -> Self {
        Self::new(DERIV_WS_URL)
    }
}

#[async_trait]
impl CandleSource for DerivFeed {
    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>, FeedError> {
        tracing::debug!(url = %self.url, symbol = %request.symbol, "Requesting candles");

        let (ws_stream, _response) = connect_async(&self.url)
            .await
            .map_err(|e| FeedError::Connection(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        write
            .send(Message::Text(Self::build_request(request)))
            .await
            .map_err(|e| FeedError::Connection(e.to_string()))?;

        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Some(result) = Self::parse_response(&text) {
                        let _ = write.send(Message::Close(None)).await;
                        if let Ok(ref candles) = result {
                            tracing::info!(count = candles.len(), "Fetched candles from Deriv");
                        }
                        return result;
                    }
                }
                Ok(Message::Ping(data)) => {
                    write
                        .send(Message::Pong(data))
                        .await
                        .map_err(|e| FeedError::Connection(e.to_string()))?;
                }
                Ok(Message::Close(_)) => return Err(FeedError::Closed),
                Ok(_) => {}
                Err(e) => return Err(FeedError::Connection(e.to_string())),
            }
        }

        Err(FeedError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_build_request() {
        let request = CandleRequest {
            symbol: "frxXAUUSD".to_string(),
            granularity_secs: 300,
            count: 1000,
        };
        let frame: serde_json::Value =
            serde_json::from_str(&DerivFeed::build_request(&request)).unwrap();
        assert_eq!(frame["ticks_history"], "frxXAUUSD");
        assert_eq!(frame["granularity"], 300);
        assert_eq!(frame["count"], 1000);
        assert_eq!(frame["end"], "latest");
        assert_eq!(frame["style"], "candles");
    }

    #[test]
    fn test_parse_candles() {
        let msg = r#"{
            "candles": [
                {"epoch": 1704067200, "open": 2062.5, "high": 2064.1, "low": 2061.9, "close": 2063.4},
                {"epoch": 1704067500, "open": "2063.4", "high": "2065", "low": "2063", "close": "2064.8"}
            ],
            "msg_type": "candles"
        }"#;

        let candles = DerivFeed::parse_response(msg).unwrap().unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].close, dec!(2064.8));
        assert_eq!(candles[0].volume, Decimal::ZERO);
        assert_eq!(candles[0].open_time.timestamp(), 1704067200);
    }

    #[test]
    fn test_parse_error_payload() {
        let msg = r#"{"error": {"code": "InvalidSymbol", "message": "Symbol not found"}}"#;
        let result = DerivFeed::parse_response(msg).unwrap();
        assert!(matches!(result, Err(FeedError::Rejected(m)) if m == "Symbol not found"));
    }

    #[test]
    fn test_parse_unrelated_frame() {
        let msg = r#"{"msg_type": "ping", "ping": "pong"}"#;
        assert!(DerivFeed::parse_response(msg).is_none());
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = DerivFeed::parse_response("not valid json").unwrap();
        assert!(matches!(result, Err(FeedError::Malformed(_))));
    }

    #[test]
    fn test_default_url() {
        let feed = DerivFeed::default();
        assert_eq!(feed.url, DERIV_WS_URL);
    }
}
