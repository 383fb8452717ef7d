//! DevTools WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::{debug, error, trace, warn};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::protocol::{BrowserVersion, CdpRequest, CdpResponse};
use super::session::PageSession;
use super::CdpError;
use crate::config::CDP_COMMAND_TIMEOUT;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

pub(crate) type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;

/// Connection to one browser instance.
///
/// Commands are correlated with responses by id; a background task drains
/// the socket and resolves the matching oneshot. Events are ignored; the
/// audit drivers poll page state instead of subscribing.
pub struct CdpClient {
    ws_tx: Arc<Mutex<WsSink>>,
    request_id: Arc<AtomicU64>,
    pending: PendingMap,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connects to the browser behind `endpoint`
    /// (e.g. `http://127.0.0.1:9222`): discovers the WebSocket debugger URL
    /// via `/json/version`, then opens the socket.
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let version_url = format!("{}/json/version", endpoint.trim_end_matches('/'));
        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| CdpError::BrowserNotAvailable(format!("{endpoint}: {e}")))?
            .json()
            .await
            .map_err(|e| CdpError::BrowserNotAvailable(format!("{endpoint}: {e}")))?;

        debug!("Connecting to {}", version.browser);

        let (ws_stream, _) = tokio_tungstenite::connect_async(&version.web_socket_debugger_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("websocket: {e}")))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending).await;
            })
        };

        Ok(Self {
            ws_tx: Arc::new(Mutex::new(ws_sink)),
            request_id: Arc::new(AtomicU64::new(1)),
            pending,
            recv_task,
        })
    }

    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("cdp recv: {text}");
                    let resp = match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(resp) => resp,
                        Err(e) => {
                            warn!("Unparseable devtools message: {e}");
                            continue;
                        }
                    };
                    if let Some(id) = resp.id {
                        if let Some(tx) = pending.lock().await.remove(&id) {
                            let result = match resp.error {
                                Some(err) => Err(CdpError::Protocol {
                                    code: err.code,
                                    message: err.message,
                                }),
                                None => Ok(resp.result.unwrap_or(Value::Null)),
                            };
                            let _ = tx.send(result);
                        }
                    }
                    // Events (id-less messages) are intentionally dropped
                }
                Ok(Message::Close(_)) => {
                    debug!("Devtools socket closed");
                    break;
                }
                Err(e) => {
                    error!("Devtools socket error: {e}");
                    break;
                }
                _ => {}
            }
        }
    }

    pub(crate) async fn send_raw(
        ws_tx: &Arc<Mutex<WsSink>>,
        pending: &PendingMap,
        request_id: &Arc<AtomicU64>,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = request_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };
        let payload = serde_json::to_string(&request)?;
        trace!("cdp send: {payload}");

        let (tx, rx) = oneshot::channel();
        pending.lock().await.insert(id, tx);

        {
            let mut ws = ws_tx.lock().await;
            ws.send(Message::Text(payload.into())).await?;
        }

        match tokio::time::timeout(CDP_COMMAND_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                pending.lock().await.remove(&id);
                Err(CdpError::Timeout(format!("{method} got no answer")))
            }
        }
    }

    /// Sends a browser-scoped command and waits for its response.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        Self::send_raw(
            &self.ws_tx,
            &self.pending,
            &self.request_id,
            method,
            params,
            None,
        )
        .await
    }

    /// Creates a blank page target and attaches a flattened session to it.
    pub async fn new_page(&self) -> Result<PageSession, CdpError> {
        let created = self
            .call(
                "Target.createTarget",
                Some(json!({"url": "about:blank"})),
            )
            .await?;
        let target_id = created["targetId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("missing targetId".to_string()))?
            .to_string();

        let attached = self
            .call(
                "Target.attachToTarget",
                Some(json!({"targetId": target_id, "flatten": true})),
            )
            .await?;
        let session_id = attached["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("missing sessionId".to_string()))?
            .to_string();

        let session = PageSession::new(
            session_id,
            self.ws_tx.clone(),
            self.pending.clone(),
            self.request_id.clone(),
        );
        session.enable_domains().await?;
        Ok(session)
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
