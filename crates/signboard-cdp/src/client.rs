//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use crate::error::{CdpError, CdpResult};
use crate::protocol::{BrowserVersion, CdpMessage, CdpRequest};
use crate::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<CdpResult<Value>>>>>;

/// One WebSocket connection to a Chrome instance.
///
/// Commands are correlated to responses by id. CDP events are not consumed
/// beyond trace logging; the display loop drives the page by polling, not
/// by event subscription.
pub struct CdpClient {
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: Pending,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to the browser behind a debug endpoint such as
    /// `http://127.0.0.1:9222`.
    pub async fn connect(endpoint: &str) -> CdpResult<Self> {
        let endpoint = endpoint.trim_end_matches('/');
        let version_url = format!("{endpoint}/json/version");

        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{endpoint}: {e}")))?
            .json()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{endpoint}: {e}")))?;

        debug!("connecting to browser: {}", version.browser);

        let (ws_stream, _) = tokio_tungstenite::connect_async(&version.web_socket_debugger_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("websocket: {e}")))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));

        let recv_task = tokio::spawn(Self::receive_loop(ws_source, pending.clone()));

        Ok(Self {
            ws_tx: tokio::sync::Mutex::new(ws_sink),
            request_id: AtomicU64::new(1),
            pending,
            recv_task,
        })
    }

    async fn receive_loop(mut ws_source: WsSource, pending: Pending) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("cdp recv: {}", text);
                    let parsed: CdpMessage = match serde_json::from_str(&text) {
                        Ok(parsed) => parsed,
                        Err(e) => {
                            warn!("unparseable CDP message: {e}");
                            continue;
                        }
                    };

                    if let Some(id) = parsed.id {
                        let waiter = pending.lock().remove(&id);
                        if let Some(tx) = waiter {
                            let result = match parsed.error {
                                Some(err) => Err(CdpError::Protocol {
                                    code: err.code,
                                    message: err.message,
                                }),
                                None => Ok(parsed.result.unwrap_or(Value::Null)),
                            };
                            let _ = tx.send(result);
                        }
                    } else if let Some(method) = parsed.method.as_deref() {
                        trace!("cdp event {method} (session {:?})", parsed.session_id);
                    }
                }
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }

        // Connection gone: fail every waiter instead of leaving it hanging.
        let waiters: Vec<_> = pending.lock().drain().collect();
        for (_, tx) in waiters {
            let _ = tx.send(Err(CdpError::ConnectionClosed));
        }
        debug!("CDP receive loop ended");
    }

    /// Send a command and wait for its response.
    pub async fn send(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> CdpResult<Value> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(String::from),
        };

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        let payload = serde_json::to_string(&request)?;
        trace!("cdp send: {}", payload);

        {
            let mut sink = self.ws_tx.lock().await;
            sink.send(Message::Text(payload.into()))
                .await
                .map_err(|e| {
                    self.pending.lock().remove(&id);
                    CdpError::ConnectionFailed(e.to_string())
                })?;
        }

        rx.await.map_err(|_| CdpError::ConnectionClosed)?
    }

    /// Create a fresh page target and attach to it.
    pub async fn attach_page(self: &Arc<Self>) -> CdpResult<PageSession> {
        let created = self
            .send(
                "Target.createTarget",
                Some(json!({"url": "about:blank"})),
                None,
            )
            .await?;
        let target_id = created["targetId"]
            .as_str()
            .ok_or_else(|| CdpError::ConnectionFailed("no targetId in createTarget".into()))?
            .to_string();

        let attached = self
            .send(
                "Target.attachToTarget",
                Some(json!({"targetId": target_id, "flatten": true})),
                None,
            )
            .await?;
        let session_id = attached["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::ConnectionFailed("no sessionId in attachToTarget".into()))?
            .to_string();

        let session = PageSession::new(self.clone(), session_id, target_id);
        session.enable_domains().await?;
        Ok(session)
    }

    /// Ask the browser to shut itself down.
    pub async fn close_browser(&self) -> CdpResult<()> {
        self.send("Browser.close", None, None).await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
