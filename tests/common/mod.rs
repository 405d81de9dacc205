//! Mock remote ends shared by the integration tests.
//!
//! - [`ws_pair`]: a [`Connection`] wired to a scripted WebSocket peer
//! - [`spawn_responder`]: an auto-replying peer that records every call
//! - [`http_mock`]: a one-shot-per-request HTTP discovery endpoint

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use inspector_rpc::{Connection, ConnectionOptions};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

/// Upper bound for any single step the peer waits on.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Logging
// ============================================================================

/// Installs a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// WebSocket Peer
// ============================================================================

/// Server side of a test WebSocket.
pub struct Peer {
    ws: WebSocketStream<TcpStream>,
}

/// Opens a connection to a fresh local peer.
pub async fn ws_pair(options: ConnectionOptions) -> (Connection, Peer) {
    init_tracing();

    let (url, listener) = ws_listener().await;
    let accept = async {
        let (stream, _) = listener.accept().await.expect("accept");
        tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake")
    };

    let (connection, ws) = tokio::join!(Connection::open_with(&url, options), accept);
    (connection.expect("open connection"), Peer { ws })
}

/// Binds a listener and returns the socket address a client should use.
pub async fn ws_listener() -> (String, TcpListener) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    (format!("ws://{addr}/devtools/page/TEST"), listener)
}

impl Peer {
    /// Accepts one WebSocket client on `listener`.
    pub async fn accept(listener: &TcpListener) -> Self {
        let (stream, _) = listener.accept().await.expect("accept");
        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake");
        Self { ws }
    }

    /// Receives the next call frame.
    pub async fn recv_call(&mut self) -> Value {
        loop {
            let message = timeout(STEP_TIMEOUT, self.ws.next())
                .await
                .expect("call within step timeout");
            match message {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(&text).expect("call is JSON");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("expected call frame, got {other:?}"),
            }
        }
    }

    /// Receives `n` call frames in arrival order.
    pub async fn recv_calls(&mut self, n: usize) -> Vec<Value> {
        let mut calls = Vec::with_capacity(n);
        for _ in 0..n {
            calls.push(self.recv_call().await);
        }
        calls
    }

    /// Answers a call with a result.
    pub async fn reply(&mut self, id: &Value, result: Value) {
        self.send_json(json!({ "id": id, "result": result })).await;
    }

    /// Answers a call with an error object.
    pub async fn reply_error(&mut self, id: &Value, code: i64, message: &str) {
        self.send_json(json!({ "id": id, "error": { "code": code, "message": message } }))
            .await;
    }

    /// Pushes an event.
    pub async fn send_event(&mut self, method: &str, params: Value) {
        self.send_json(json!({ "method": method, "params": params }))
            .await;
    }

    /// Pushes an arbitrary text frame.
    pub async fn send_raw(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.to_string().into()))
            .await
            .expect("send frame");
    }

    /// Pushes raw bytes as a binary frame.
    pub async fn send_binary(&mut self, data: &[u8]) {
        self.ws
            .send(Message::Binary(data.to_vec().into()))
            .await
            .expect("send frame");
    }

    async fn send_json(&mut self, value: Value) {
        self.send_raw(&value.to_string()).await;
    }

    /// Closes the socket from the peer side.
    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }

    /// Waits until the client closes the socket.
    pub async fn expect_closed(&mut self) {
        loop {
            let message = timeout(STEP_TIMEOUT, self.ws.next())
                .await
                .expect("close within step timeout");
            match message {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                Some(Ok(_)) => continue,
            }
        }
    }
}

// ============================================================================
// Auto Responder
// ============================================================================

/// Calls received by a responder, in arrival order.
pub type CallLog = Arc<Mutex<Vec<Value>>>;

/// Runs the peer in the background, answering every call with `handler`.
///
/// `handler` gets the method and params and returns a result or an
/// `(code, message)` error.
pub fn spawn_responder<F>(mut peer: Peer, handler: F) -> CallLog
where
    F: Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + 'static,
{
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);

    tokio::spawn(async move {
        while let Some(Ok(message)) = peer.ws.next().await {
            let Message::Text(text) = message else {
                continue;
            };
            let Ok(call) = serde_json::from_str::<Value>(&text) else {
                continue;
            };
            recorded.lock().push(call.clone());

            let method = call["method"].as_str().unwrap_or_default();
            let params = call.get("params").cloned().unwrap_or(Value::Null);
            let reply = match handler(method, &params) {
                Ok(result) => json!({ "id": call["id"], "result": result }),
                Err((code, message)) => {
                    json!({ "id": call["id"], "error": { "code": code, "message": message } })
                }
            };

            if peer
                .ws
                .send(Message::Text(reply.to_string().into()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    calls
}

/// Answers every call with an empty object.
pub fn empty_result(_method: &str, _params: &Value) -> Result<Value, (i64, String)> {
    Ok(json!({}))
}

// ============================================================================
// HTTP Discovery Mock
// ============================================================================

/// Local HTTP endpoint answering every request through a handler.
pub struct HttpMock {
    /// `http://127.0.0.1:<port>`
    pub endpoint: String,
    /// `"<METHOD> <path>"` of every request received.
    pub requests: Arc<Mutex<Vec<String>>>,
}

/// Starts an HTTP endpoint; `handler` maps `(method, path)` to `(status, body)`.
pub async fn http_mock<F>(handler: F) -> HttpMock
where
    F: Fn(&str, &str) -> (u16, String) + Send + Sync + 'static,
{
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let endpoint = format!("http://{}", listener.local_addr().expect("local addr"));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let handler = Arc::new(handler);
    let recorded = Arc::clone(&requests);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let handler = Arc::clone(&handler);
            let recorded = Arc::clone(&recorded);
            tokio::spawn(async move {
                serve_one(stream, handler.as_ref(), &recorded).await;
            });
        }
    });

    HttpMock { endpoint, requests }
}

async fn serve_one<F>(mut stream: TcpStream, handler: &F, recorded: &Mutex<Vec<String>>)
where
    F: Fn(&str, &str) -> (u16, String),
{
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&buffer);
    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    recorded.lock().push(format!("{method} {path}"));

    let (status, body) = handler(&method, &path);
    let reason = if status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );

    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// A `/json` entry for a target with the given socket address.
pub fn target_json(id: &str, target_type: &str, url: &str, socket_address: &str) -> Value {
    json!({
        "id": id,
        "type": target_type,
        "title": format!("{id} title"),
        "url": url,
        "webSocketDebuggerUrl": socket_address,
    })
}
