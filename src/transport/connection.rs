//! WebSocket connection and event loop.
//!
//! This module owns the WebSocket to one target, including call/reply
//! correlation and event routing.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming frames from the target (replies, events)
//! - Outgoing calls from the Rust API
//! - Periodic rejection of calls whose deadline passed
//! - Failing every pending call when the socket closes

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{MissedTickBehavior, timeout};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::client::ConnectionOptions;
use crate::error::{Error, Result, saturating_millis};
use crate::identifiers::CallId;
use crate::protocol::{Call, Event, Frame};

use super::correlator::Correlator;
use super::router::{EventListener, EventRouter, Subscription};

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Write a serialized call to the socket.
    Send { call_id: CallId, frame: String },
    /// Close the socket.
    Shutdown,
}

// ============================================================================
// Shared
// ============================================================================

/// State shared between API handles and the event loop.
struct Shared {
    correlator: Correlator,
    router: EventRouter,
    closed: watch::Sender<bool>,
}

impl Shared {
    /// Marks the connection dead and fails all pending calls.
    fn close(&self) -> usize {
        let failed = self.correlator.close();
        self.closed.send_replace(true);
        failed
    }
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket connection to one inspectable target.
///
/// Handles call/reply correlation and event routing. The connection
/// spawns an internal event loop task; dropping the last clone closes
/// the socket.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and cheap to clone. Calls may be issued
/// concurrently from any number of tasks.
///
/// # Example
///
/// ```ignore
/// let connection = Connection::open("ws://127.0.0.1:9222/devtools/page/ABC").await?;
/// connection.enable_domain("Runtime").await?;
/// let title = connection.evaluate("document.title").await?;
/// ```
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
    url: String,
    options: ConnectionOptions,
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    shared: Arc<Shared>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.inner.url)
            .field("closed", &self.is_closed())
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Connection - Lifecycle
// ============================================================================

impl Connection {
    /// Opens a connection with default options.
    ///
    /// # Errors
    ///
    /// See [`open_with`](Self::open_with).
    pub async fn open(url: &str) -> Result<Self> {
        Self::open_with(url, ConnectionOptions::default()).await
    }

    /// Opens a connection to a `ws://` or `wss://` socket address.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the options are invalid
    /// - [`Error::InvalidArgument`] if the address is not a WebSocket URL
    /// - [`Error::ConnectionTimeout`] if the handshake exceeds the connect timeout
    /// - [`Error::Connection`] if the socket cannot be opened
    pub async fn open_with(url: &str, options: ConnectionOptions) -> Result<Self> {
        options.validate()?;

        let parsed = Url::parse(url)
            .map_err(|e| Error::invalid_argument(format!("Invalid socket address {url}: {e}")))?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(Error::invalid_argument(format!(
                "Socket address must use ws:// or wss://, got {url}"
            )));
        }

        let connect_timeout_ms = saturating_millis(options.connect_timeout);
        let (ws_stream, _response) = timeout(options.connect_timeout, connect_async(url))
            .await
            .map_err(|_| Error::connection_timeout(connect_timeout_ms))?
            .map_err(|e| Error::connection(format!("WebSocket handshake with {url} failed: {e}")))?;

        debug!(url, "Connection opened");
        Self::from_stream(url, ws_stream, options)
    }

    /// Wraps an already-established WebSocket stream.
    ///
    /// Spawns the event loop task internally.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the options are invalid. The stream is
    /// dropped without spawning the event loop.
    pub fn from_stream<S>(
        url: impl Into<String>,
        ws_stream: WebSocketStream<S>,
        options: ConnectionOptions,
    ) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        options.validate()?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (closed, _) = watch::channel(false);
        let shared = Arc::new(Shared {
            correlator: Correlator::new(options.max_pending),
            router: EventRouter::new(),
            closed,
        });

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&shared),
            options.sweep_interval,
        ));

        Ok(Self {
            inner: Arc::new(ConnectionInner {
                url: url.into(),
                options,
                command_tx,
                shared,
            }),
        })
    }

    /// Closes the connection.
    ///
    /// Every pending call fails with [`Error::ConnectionClosed`] before this
    /// returns, and later calls fail immediately.
    pub fn disconnect(&self) {
        let failed = self.inner.shared.close();
        let _ = self.inner.command_tx.send(ConnectionCommand::Shutdown);
        debug!(url = %self.inner.url, failed, "Connection disconnected");
    }

    /// Waits until the connection is closed by either side.
    pub async fn closed(&self) {
        let mut closed = self.inner.shared.closed.subscribe();
        let _ = closed.wait_for(|closed| *closed).await;
    }

    /// Returns `true` if the connection is closed.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.shared.correlator.is_closed()
    }

    /// Returns the socket address this connection was opened with.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Returns the options this connection was opened with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ConnectionOptions {
        &self.inner.options
    }

    /// Returns the number of pending calls.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.shared.correlator.len()
    }
}

// ============================================================================
// Connection - Calls
// ============================================================================

impl Connection {
    /// Issues a call and waits for its reply with the default timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::CallTimeout`] if no reply arrives in time
    /// - [`Error::Remote`] if the target answers with an error
    /// - [`Error::ConnectionClosed`] if the connection is or becomes closed
    /// - [`Error::Cancelled`] if the call is cancelled
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        self.call_with_timeout(method, params, self.inner.options.call_timeout)
            .await
    }

    /// Issues a call and waits for its reply with a custom timeout.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn call_with_timeout(
        &self,
        method: &str,
        params: Value,
        call_timeout: Duration,
    ) -> Result<Value> {
        self.start_call(method, params, call_timeout)?.wait().await
    }

    /// Issues a call without waiting for its reply.
    ///
    /// The returned handle exposes the call id and can cancel or await it.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is closed
    /// - [`Error::Protocol`] if too many calls are pending
    pub fn start_call(&self, method: &str, params: Value, call_timeout: Duration) -> Result<CallHandle> {
        let shared = &self.inner.shared;
        let (call_id, receiver) = shared.correlator.register(method, call_timeout)?;

        let frame = match Call::new(call_id, method, params).to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                shared.correlator.expire(call_id);
                return Err(e);
            }
        };

        if self
            .inner
            .command_tx
            .send(ConnectionCommand::Send { call_id, frame })
            .is_err()
        {
            shared.correlator.fail(call_id, Error::ConnectionClosed);
            return Err(Error::ConnectionClosed);
        }

        trace!(%call_id, method, "Call queued");
        Ok(CallHandle {
            call_id,
            method: method.to_string(),
            timeout: call_timeout,
            receiver,
            shared: Arc::clone(shared),
        })
    }

    /// Cancels a pending call.
    ///
    /// The caller awaiting it receives [`Error::Cancelled`]. Other calls and
    /// the socket are unaffected. Returns `false` if the call already completed.
    pub fn cancel(&self, call_id: CallId) -> bool {
        self.inner.shared.correlator.cancel(call_id)
    }
}

// ============================================================================
// Connection - Events
// ============================================================================

impl Connection {
    /// Registers a listener for one event name.
    ///
    /// Listeners run on the event loop task in subscription order.
    pub fn on<F>(&self, event: &str, listener: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let listener: EventListener = Arc::new(listener);
        self.inner.shared.router.subscribe(event, listener)
    }

    /// Removes a listener. Returns `false` if it was already removed.
    pub fn off(&self, subscription: &Subscription) -> bool {
        self.inner.shared.router.unsubscribe(subscription.id())
    }

    /// Returns the number of listeners registered for an event name.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.inner.shared.router.listener_count(event)
    }

    /// Subscribes to an event name and forwards each event into a channel.
    ///
    /// The channel ends once the subscription is removed with [`off`](Self::off).
    pub fn event_channel(&self, event: &str) -> (Subscription, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.on(event, move |event| {
            let _ = tx.send(event.clone());
        });
        (subscription, rx)
    }

    /// Waits for the next event with the given name.
    ///
    /// The one-shot listener is removed whether the wait succeeds or not.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if no such event arrives in time
    /// - [`Error::ConnectionClosed`] if the connection closes first
    pub async fn wait_for_event(&self, event: &str, wait_timeout: Duration) -> Result<Event> {
        if self.is_closed() {
            return Err(Error::ConnectionClosed);
        }

        let (tx, rx) = oneshot::channel();
        let slot = Mutex::new(Some(tx));
        let subscription = self.on(event, move |event| {
            if let Some(tx) = slot.lock().take() {
                let _ = tx.send(event.clone());
            }
        });

        let result = tokio::select! {
            received = timeout(wait_timeout, rx) => match received {
                Ok(Ok(event)) => Ok(event),
                Ok(Err(_)) => Err(Error::ConnectionClosed),
                Err(_) => Err(Error::timeout(
                    format!("waiting for event {event}"),
                    saturating_millis(wait_timeout),
                )),
            },
            () = self.closed() => Err(Error::ConnectionClosed),
        };

        self.off(&subscription);
        result
    }
}

// ============================================================================
// Connection - Event Loop
// ============================================================================

impl Connection {
    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop<S>(
        ws_stream: WebSocketStream<S>,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        shared: Arc<Shared>,
        sweep_interval: Duration,
    ) where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        let mut sweep = tokio::time::interval(sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Incoming frames from the target
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, &shared);
                        }

                        Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                            Ok(text) => Self::handle_incoming_message(text, &shared),
                            Err(_) => warn!(len = data.len(), "Ignoring non-UTF-8 binary frame"),
                        },

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Ping, Pong, raw frames
                        _ => {}
                    }
                }

                // Calls from the Rust API
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { call_id, frame }) => {
                            if let Err(e) = ws_write.send(Message::Text(frame.into())).await {
                                warn!(%call_id, error = %e, "Failed to send call");
                                shared.correlator.fail(call_id, Error::WebSocket(e));
                                break;
                            }
                            trace!(%call_id, "Call sent");
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("All connection handles dropped");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }

                _ = sweep.tick() => {
                    shared.correlator.sweep(Instant::now());
                }
            }
        }

        shared.close();
        debug!("Event loop terminated");
    }

    /// Classifies an incoming frame and hands it to the correlator or router.
    fn handle_incoming_message(text: &str, shared: &Shared) {
        match Frame::decode(text) {
            Ok(Frame::Reply(reply)) => {
                shared.correlator.resolve(reply);
            }

            Ok(Frame::Event(event)) => {
                trace!(event = %event.method, "Event received");
                shared.router.dispatch(&event);
            }

            Err(e) => {
                warn!(error = %e, len = text.len(), "Failed to parse incoming frame");
            }
        }
    }
}

// ============================================================================
// CallHandle
// ============================================================================

/// An issued call that has not been awaited yet.
///
/// Returned by [`Connection::start_call`].
pub struct CallHandle {
    call_id: CallId,
    method: String,
    timeout: Duration,
    receiver: oneshot::Receiver<Result<Value>>,
    shared: Arc<Shared>,
}

impl fmt::Debug for CallHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallHandle")
            .field("call_id", &self.call_id)
            .field("method", &self.method)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl CallHandle {
    /// Returns the id assigned to this call.
    #[inline]
    #[must_use]
    pub fn id(&self) -> CallId {
        self.call_id
    }

    /// Returns the called method.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Cancels the call. See [`Connection::cancel`].
    pub fn cancel(&self) -> bool {
        self.shared.correlator.cancel(self.call_id)
    }

    /// Waits for the reply.
    ///
    /// # Errors
    ///
    /// See [`Connection::call`].
    pub async fn wait(mut self) -> Result<Value> {
        match timeout(self.timeout, &mut self.receiver).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                // The reply may have landed between the deadline and the removal.
                if !self.shared.correlator.expire(self.call_id)
                    && let Ok(result) = self.receiver.try_recv()
                {
                    return result;
                }

                Err(Error::call_timeout(
                    self.call_id,
                    self.method,
                    saturating_millis(self.timeout),
                ))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::DuplexStream;
    use tokio_tungstenite::tungstenite::protocol::Role;

    async fn duplex_socket() -> (WebSocketStream<DuplexStream>, DuplexStream) {
        let (client, server) = tokio::io::duplex(4096);
        let ws_stream = WebSocketStream::from_raw_socket(client, Role::Client, None).await;
        (ws_stream, server)
    }

    #[tokio::test]
    async fn test_from_stream_rejects_zero_sweep_interval() {
        let (ws_stream, _server) = duplex_socket().await;
        let options = ConnectionOptions::new().with_sweep_interval(Duration::ZERO);

        let err = Connection::from_stream("ws://local/devtools/page/X", ws_stream, options)
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_from_stream_marks_closed_when_peer_goes_away() {
        let (ws_stream, server) = duplex_socket().await;
        let connection =
            Connection::from_stream("ws://local/devtools/page/X", ws_stream, ConnectionOptions::new())
                .expect("wrap stream");
        assert!(!connection.is_closed());

        drop(server);
        timeout(Duration::from_secs(5), connection.closed())
            .await
            .expect("event loop should observe the dropped peer");
        assert!(connection.is_closed());
    }

    #[tokio::test]
    async fn test_open_rejects_http_scheme() {
        let err = Connection::open("http://127.0.0.1:9222/json").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_open_rejects_garbage_address() {
        let err = Connection::open("not a url").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_options() {
        let options = ConnectionOptions::new().with_max_pending(0);
        let err = Connection::open_with("ws://127.0.0.1:1/devtools", options)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn test_open_unreachable_is_transport_error() {
        // Bind then drop to obtain a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let err = Connection::open(&format!("ws://127.0.0.1:{port}/devtools/page/X"))
            .await
            .unwrap_err();
        assert!(err.is_transport_error(), "unexpected error: {err:?}");
    }
}
