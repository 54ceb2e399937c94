//! WebSocket server for observers

use super::{ControlCommand, ObserverEvent, ObserverHub};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Observer server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,
    /// Ping period; a client that misses one pong is dropped
    pub heartbeat: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            heartbeat: Duration::from_secs(30),
        }
    }
}

/// Accepts observer connections and relays hub events to them
pub struct ObserverServer {
    config: ServerConfig,
    hub: ObserverHub,
    control_tx: mpsc::Sender<ControlCommand>,
}

impl ObserverServer {
    pub fn new(config: ServerConfig, hub: ObserverHub, control_tx: mpsc::Sender<ControlCommand>) -> Self {
        Self {
            config,
            hub,
            control_tx,
        }
    }

    /// Bind the listen socket
    pub async fn bind(&self) -> std::io::Result<TcpListener> {
        let listener = TcpListener::bind(&self.config.bind).await?;
        tracing::info!(addr = %listener.local_addr()?, "Observer server listening");
        Ok(listener)
    }

    /// Accept connections until `shutdown` flips to true
    pub async fn serve(self, listener: TcpListener, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let hub = self.hub.clone();
                            let control_tx = self.control_tx.clone();
                            let heartbeat = self.config.heartbeat;
                            tokio::spawn(async move {
                                handle_client(stream, peer, hub, control_tx, heartbeat).await;
                            });
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to accept observer connection");
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Observer server shutting down");
                        return;
                    }
                }
            }
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    hub: ObserverHub,
    control_tx: mpsc::Sender<ControlCommand>,
    heartbeat: Duration,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!(%peer, error = %e, "WebSocket handshake failed");
            return;
        }
    };
    let (mut write, mut read) = ws_stream.split();

    // Subscribe before greeting so nothing published in between is lost
    let mut events = hub.subscribe();
    let greeting = hub.greeting();
    tracing::info!(%peer, observers = hub.observer_count(), "Observer connected");

    let hello = [
        ObserverEvent::performance(greeting.stats),
        ObserverEvent::status(format!("Current lot size: {}", greeting.lot_size)),
    ];
    for event in hello {
        if write.send(Message::Text(event.to_json())).await.is_err() {
            return;
        }
    }
    hub.publish(ObserverEvent::status("Frontend connected to backend"));

    let mut ping_interval = tokio::time::interval(heartbeat);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // first tick completes immediately
    ping_interval.tick().await;
    let mut waiting_for_pong = false;

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if let Err(e) = write.send(Message::Text(event.to_json())).await {
                            tracing::debug!(%peer, error = %e, "Send to observer failed");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(%peer, skipped, "Observer lagging, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match ControlCommand::parse(&text) {
                            Ok(command) => {
                                tracing::info!(%peer, ?command, "Control message received");
                                if control_tx.send(command).await.is_err() {
                                    tracing::warn!("Engine control channel closed");
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(%peer, error = %e, "Rejected control message");
                                let reply = ObserverEvent::error(e.to_string());
                                if write.send(Message::Text(reply.to_json())).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if write.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        waiting_for_pong = false;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(%peer, error = %e, "Observer read failed");
                        break;
                    }
                    _ => {}
                }
            }

            _ = ping_interval.tick() => {
                if waiting_for_pong {
                    tracing::info!(%peer, "Observer missed heartbeat, dropping");
                    break;
                }
                if write.send(Message::Ping(vec![])).await.is_err() {
                    break;
                }
                waiting_for_pong = true;
            }
        }
    }

    tracing::info!(%peer, "Observer disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::PerformanceStats;
    use crate::observer::Greeting;
    use rust_decimal_macros::dec;
    use tokio_tungstenite::connect_async;

    async fn start() -> (SocketAddr, ObserverHub, mpsc::Receiver<ControlCommand>, watch::Sender<bool>) {
        let hub = ObserverHub::new(
            16,
            Greeting {
                stats: PerformanceStats::default(),
                lot_size: dec!(0.01),
            },
        );
        let (control_tx, control_rx) = mpsc::channel(8);
        let server = ObserverServer::new(
            ServerConfig {
                bind: "127.0.0.1:0".to_string(),
                heartbeat: Duration::from_secs(30),
            },
            hub.clone(),
            control_tx,
        );
        let listener = server.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(server.serve(listener, shutdown_rx));
        (addr, hub, control_rx, shutdown_tx)
    }

    async fn next_json<S>(read: &mut S) -> serde_json::Value
    where
        S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), read.next())
                .await
                .expect("timed out waiting for frame")
                .expect("stream ended")
                .expect("read failed");
            if let Message::Text(text) = msg {
                return serde_json::from_str(&text).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_greeting_and_control() {
        let (addr, hub, mut control_rx, _shutdown) = start().await;
        let (ws, _) = connect_async(format!("ws://{addr}")).await.unwrap();
        let (mut write, mut read) = ws.split();

        let first = next_json(&mut read).await;
        assert_eq!(first["type"], "performance");
        assert_eq!(first["stats"]["totalTrades"], 0);

        let second = next_json(&mut read).await;
        assert_eq!(second["text"], "Current lot size: 0.01");

        let third = next_json(&mut read).await;
        assert_eq!(third["text"], "Frontend connected to backend");

        write
            .send(Message::Text(r#"{"type":"lotSize","value":0.03}"#.to_string()))
            .await
            .unwrap();
        let command = tokio::time::timeout(Duration::from_secs(5), control_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(command, ControlCommand::LotSize(dec!(0.03)));

        hub.publish(ObserverEvent::status("broadcast"));
        assert_eq!(next_json(&mut read).await["text"], "broadcast");
    }

    #[tokio::test]
    async fn test_invalid_message_gets_error_reply() {
        let (addr, _hub, mut control_rx, _shutdown) = start().await;
        let (ws, _) = connect_async(format!("ws://{addr}")).await.unwrap();
        let (mut write, mut read) = ws.split();
        for _ in 0..3 {
            next_json(&mut read).await;
        }

        write
            .send(Message::Text(r#"{"type":"lotSize","value":-2}"#.to_string()))
            .await
            .unwrap();
        let reply = next_json(&mut read).await;
        assert_eq!(reply["type"], "error");
        assert!(control_rx.try_recv().is_err());
    }
}
