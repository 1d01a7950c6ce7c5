//! Low-level CDP (Chrome DevTools Protocol) WebSocket client.
//!
//! Connects to a headless Chrome page target and provides JSON-RPC 2.0
//! command/response correlation plus delivery of protocol events. A
//! background reader task routes incoming messages: those carrying an `id`
//! resolve a pending command, those carrying only a `method` are queued as
//! events for the session driver to consume.
//!
//! The driver needs events in two modes: blocking (waiting for
//! `Page.loadEventFired`) and non-blocking (draining queued
//! `Network.responseReceived` events between readiness polls), so the event
//! channel exposes both `recv_event` and `try_recv_event`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::ScrapeError;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<CdpReply>>>>;

/// Default per-command response deadline.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// A protocol event pushed by the browser (e.g. `Network.responseReceived`).
#[derive(Debug, Clone)]
pub struct CdpEvent {
    /// Event method name.
    pub method: String,
    /// Event parameters; `Null` when the event carries none.
    pub params: Value,
}

/// Outgoing command frame.
#[derive(Debug, serde::Serialize)]
struct CdpCommand<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

/// Reply to a command, correlated by id.
#[derive(Debug, Clone)]
pub struct CdpReply {
    pub id: u64,
    pub result: Option<Value>,
    pub error: Option<CdpReplyError>,
}

/// Error object inside a command reply.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CdpReplyError {
    pub code: i64,
    pub message: String,
}

/// CDP client over a DevTools page-target WebSocket.
///
/// Commands get auto-incrementing ids; replies are routed back to the
/// caller through per-command oneshot channels. Events are forwarded in
/// arrival order to an unbounded queue.
pub struct CdpClient {
    next_id: AtomicU64,
    pending: PendingMap,
    writer: Arc<Mutex<WsSink>>,
    event_rx: mpsc::UnboundedReceiver<CdpEvent>,
    _reader: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to a DevTools page target, e.g.
    /// `ws://127.0.0.1:{port}/devtools/page/{target_id}`.
    pub async fn connect(ws_url: &str) -> Result<Self, ScrapeError> {
        tracing::debug!(url = ws_url, "connecting to DevTools WebSocket");

        let (stream, _) = tokio_tungstenite::connect_async(ws_url)
            .await
            .map_err(|e| ScrapeError::ConnectionFailed {
                url: ws_url.to_string(),
                reason: e.to_string(),
            })?;

        let (writer, reader) = stream.split();

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let pending_for_reader = Arc::clone(&pending);
        let reader_task = tokio::spawn(async move {
            Self::read_loop(reader, pending_for_reader, event_tx).await;
        });

        Ok(Self {
            next_id: AtomicU64::new(1),
            pending,
            writer: Arc::new(Mutex::new(writer)),
            event_rx,
            _reader: reader_task,
        })
    }

    /// Send a command and wait for its reply, with the default deadline.
    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value, ScrapeError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let frame = CdpCommand { id, method, params };

        let json = serde_json::to_string(&frame).map_err(|e| ScrapeError::Protocol {
            detail: format!("failed to serialize command: {e}"),
        })?;

        tracing::trace!(id, method, "sending CDP command");

        // Register the reply slot before writing so the reader can never
        // race ahead of us.
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            pending.insert(id, tx);
        }

        {
            let mut writer = self.writer.lock().await;
            writer
                .send(Message::Text(json.into()))
                .await
                .map_err(|e| ScrapeError::Protocol {
                    detail: format!("failed to send WebSocket message: {e}"),
                })?;
        }

        let reply = tokio::time::timeout(COMMAND_TIMEOUT, rx)
            .await
            .map_err(|_| ScrapeError::CommandTimeout {
                method: method.to_string(),
                duration: COMMAND_TIMEOUT,
            })?
            .map_err(|_| ScrapeError::Protocol {
                detail: "reply channel closed unexpectedly".to_string(),
            })?;

        if let Some(err) = reply.error {
            return Err(ScrapeError::Cdp {
                code: err.code,
                message: err.message,
            });
        }

        Ok(reply.result.unwrap_or(Value::Null))
    }

    /// Wait for the next event. Returns `None` once the WebSocket is gone.
    pub async fn recv_event(&mut self) -> Option<CdpEvent> {
        self.event_rx.recv().await
    }

    /// Pop a queued event without waiting.
    pub fn try_recv_event(&mut self) -> Option<CdpEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Enable the given CDP domains. Most domains emit no events until
    /// their `enable` command has been acknowledged.
    pub async fn enable_domains(&self, domains: &[&str]) -> Result<(), ScrapeError> {
        for domain in domains {
            let method = format!("{domain}.enable");
            self.send_command(&method, serde_json::json!({})).await?;
        }
        Ok(())
    }

    /// Reader task: routes replies to pending commands and queues events.
    async fn read_loop(
        mut reader: WsSource,
        pending: PendingMap,
        event_tx: mpsc::UnboundedSender<CdpEvent>,
    ) {
        while let Some(msg) = reader.next().await {
            let msg = match msg {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(error = %e, "WebSocket read error, stopping reader");
                    break;
                }
            };

            let text = match msg {
                Message::Text(t) => t.to_string(),
                Message::Binary(b) => match String::from_utf8(b.to_vec()) {
                    Ok(s) => s,
                    Err(_) => continue,
                },
                Message::Close(_) => {
                    tracing::debug!("WebSocket closed by browser");
                    break;
                }
                _ => continue,
            };

            let json: Value = match serde_json::from_str(&text) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = %e, "unparseable CDP frame, skipping");
                    continue;
                }
            };

            if let Some(reply) = parse_cdp_reply(&json) {
                let mut pending = pending.lock().await;
                if let Some(tx) = pending.remove(&reply.id) {
                    let _ = tx.send(reply);
                } else {
                    tracing::trace!(id = reply.id, "reply for unknown command id");
                }
            } else if let Some(event) = parse_cdp_event(&json) {
                // Nobody draining the queue just means the event is dropped
                // when the client goes away.
                let _ = event_tx.send(event);
            }
        }

        // Connection gone: fail every command still in flight.
        let mut pending = pending.lock().await;
        for (id, tx) in pending.drain() {
            let _ = tx.send(CdpReply {
                id,
                result: None,
                error: Some(CdpReplyError {
                    code: -1,
                    message: "WebSocket connection closed".to_string(),
                }),
            });
        }
    }
}

/// Parse a frame as a command reply. Replies carry an `id`.
pub fn parse_cdp_reply(json: &Value) -> Option<CdpReply> {
    let id = json.get("id")?.as_u64()?;
    Some(CdpReply {
        id,
        result: json.get("result").cloned(),
        error: json
            .get("error")
            .and_then(|e| serde_json::from_value(e.clone()).ok()),
    })
}

/// Parse a frame as an event. Events carry a `method` and no `id`.
pub fn parse_cdp_event(json: &Value) -> Option<CdpEvent> {
    if json.get("id").is_some() {
        return None;
    }
    let method = json.get("method")?.as_str()?.to_string();
    let params = json.get("params").cloned().unwrap_or(Value::Null);
    Some(CdpEvent { method, params })
}
