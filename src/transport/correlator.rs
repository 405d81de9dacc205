//! Call correlation.
//!
//! Maps each in-flight call's identifier to the channel its caller is
//! waiting on. A pending call leaves the map exactly once: by reply,
//! deadline, cancellation, send failure, or connection close.

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{Error, Result, saturating_millis};
use crate::identifiers::CallId;
use crate::protocol::Reply;

// ============================================================================
// Types
// ============================================================================

/// Channel half that completes one call.
pub(crate) type Completion = oneshot::Sender<Result<Value>>;

/// One outstanding call.
struct PendingCall {
    method: String,
    /// `None` when the timeout is too large to represent.
    deadline: Option<Instant>,
    timeout: Duration,
    completion: Completion,
}

/// Pending map plus the state guarded with it.
///
/// `closed` lives under the same lock so a call cannot register after
/// the close drain and wait forever.
struct State {
    next_id: CallId,
    pending: FxHashMap<CallId, PendingCall>,
    closed: bool,
}

// ============================================================================
// Correlator
// ============================================================================

/// Pending-call registry for one connection.
pub(crate) struct Correlator {
    state: Mutex<State>,
    max_pending: usize,
}

impl Correlator {
    /// Creates an empty correlator.
    pub(crate) fn new(max_pending: usize) -> Self {
        Self {
            state: Mutex::new(State {
                next_id: CallId::FIRST,
                pending: FxHashMap::default(),
                closed: false,
            }),
            max_pending,
        }
    }

    /// Allocates the next call id and registers a pending call for it.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is closed
    /// - [`Error::Protocol`] if too many calls are pending
    pub(crate) fn register(
        &self,
        method: &str,
        timeout: Duration,
    ) -> Result<(CallId, oneshot::Receiver<Result<Value>>)> {
        let mut state = self.state.lock();

        if state.closed {
            return Err(Error::ConnectionClosed);
        }

        if state.pending.len() >= self.max_pending {
            warn!(
                pending = state.pending.len(),
                max = self.max_pending,
                "Too many pending calls"
            );
            return Err(Error::protocol(format!(
                "Too many pending calls: {}/{}",
                state.pending.len(),
                self.max_pending
            )));
        }

        let id = state.next_id;
        state.next_id = id.next();

        let (completion, receiver) = oneshot::channel();
        state.pending.insert(
            id,
            PendingCall {
                method: method.to_string(),
                deadline: Instant::now().checked_add(timeout),
                timeout,
                completion,
            },
        );

        Ok((id, receiver))
    }

    /// Completes the pending call matching the reply.
    ///
    /// Returns `false` if no call is waiting for this id; the reply is
    /// then dropped.
    pub(crate) fn resolve(&self, reply: Reply) -> bool {
        let id = reply.id;
        let Some(call) = self.state.lock().pending.remove(&id) else {
            warn!(call_id = %id, "Dropping reply with no pending call");
            return false;
        };

        debug!(call_id = %id, method = %call.method, success = reply.is_success(), "Call completed");
        let _ = call.completion.send(reply.into_result());
        true
    }

    /// Cancels a pending call, failing it with [`Error::Cancelled`].
    pub(crate) fn cancel(&self, id: CallId) -> bool {
        self.fail(id, Error::cancelled(id))
    }

    /// Removes a pending call whose caller gave up waiting.
    pub(crate) fn expire(&self, id: CallId) -> bool {
        let removed = self.state.lock().pending.remove(&id);
        if let Some(call) = &removed {
            debug!(call_id = %id, method = %call.method, "Call timed out");
        }
        removed.is_some()
    }

    /// Fails a single pending call with the given error.
    pub(crate) fn fail(&self, id: CallId, error: Error) -> bool {
        let Some(call) = self.state.lock().pending.remove(&id) else {
            return false;
        };

        debug!(call_id = %id, method = %call.method, error = %error, "Call failed");
        let _ = call.completion.send(Err(error));
        true
    }

    /// Fails every pending call whose deadline is at or before `now`.
    ///
    /// Returns the number of calls expired.
    pub(crate) fn sweep(&self, now: Instant) -> usize {
        let expired: Vec<(CallId, PendingCall)> = {
            let mut state = self.state.lock();
            let ids: Vec<CallId> = state
                .pending
                .iter()
                .filter(|(_, call)| call.deadline.is_some_and(|deadline| deadline <= now))
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| state.pending.remove(&id).map(|call| (id, call)))
                .collect()
        };

        let count = expired.len();
        for (id, call) in expired {
            let timeout_ms = saturating_millis(call.timeout);
            let _ = call
                .completion
                .send(Err(Error::call_timeout(id, call.method, timeout_ms)));
        }

        if count > 0 {
            debug!(count, "Swept expired calls");
        }
        count
    }

    /// Marks the correlator closed and fails every pending call with
    /// [`Error::ConnectionClosed`].
    ///
    /// Returns the number of calls failed. Idempotent.
    pub(crate) fn close(&self) -> usize {
        let pending: Vec<(CallId, PendingCall)> = {
            let mut state = self.state.lock();
            state.closed = true;
            state.pending.drain().collect()
        };

        let count = pending.len();
        for (_, call) in pending {
            let _ = call.completion.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending calls on close");
        }
        count
    }

    /// Returns `true` once [`close`](Self::close) has run.
    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Returns the number of pending calls.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.state.lock().pending.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
