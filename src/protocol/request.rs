//! Call and Reply message types.
//!
//! Defines the envelope of a correlated unit of work: the outgoing
//! [`Call`] and the incoming [`Reply`] that answers it.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::CallId;

// ============================================================================
// Call
// ============================================================================

/// A call from local end to remote end.
///
/// # Format
///
/// ```json
/// {
///   "id": 1,
///   "method": "Domain.method",
///   "params": { ... }
/// }
/// ```
///
/// `params` is omitted when it is `null`.
#[derive(Debug, Clone, Serialize)]
pub struct Call {
    /// Identifier used for reply correlation.
    pub id: CallId,

    /// Method in `Domain.method` format.
    pub method: String,

    /// Method parameters.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl Call {
    /// Creates a new call.
    #[inline]
    #[must_use]
    pub fn new(id: CallId, method: impl Into<String>, params: Value) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }

    /// Serializes the call into a text frame payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if params cannot be serialized.
    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// RemoteFailure
// ============================================================================

/// Error object carried by a failed reply.
///
/// ```json
/// { "code": -32601, "message": "'Foo.bar' wasn't found", "data": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteFailure {
    /// Protocol error code.
    #[serde(default)]
    pub code: i64,

    /// Human-readable message.
    #[serde(default)]
    pub message: String,

    /// Optional extra detail.
    #[serde(default)]
    pub data: Option<Value>,
}

impl From<RemoteFailure> for Error {
    fn from(failure: RemoteFailure) -> Self {
        let message = match failure.data {
            Some(Value::String(data)) if !data.is_empty() => {
                format!("{} ({data})", failure.message)
            }
            _ => failure.message,
        };
        Error::remote(failure.code, message)
    }
}

// ============================================================================
// Reply
// ============================================================================

/// A reply from remote end answering one call.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 1, "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": 1, "error": { "code": -32000, "message": "..." } }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Matches the call `id`.
    pub id: CallId,

    /// Result value or remote failure.
    pub outcome: std::result::Result<Value, RemoteFailure>,
}

impl Reply {
    /// Creates a successful reply.
    #[inline]
    #[must_use]
    pub fn success(id: CallId, result: Value) -> Self {
        Self {
            id,
            outcome: Ok(result),
        }
    }

    /// Creates a failed reply.
    #[inline]
    #[must_use]
    pub fn failure(id: CallId, failure: RemoteFailure) -> Self {
        Self {
            id,
            outcome: Err(failure),
        }
    }

    /// Returns `true` if this is a success reply.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Extracts the result value, converting a remote failure to [`Error::Remote`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] if the remote end reported an error.
    pub fn into_result(self) -> Result<Value> {
        self.outcome.map_err(Error::from)
    }
}

// ============================================================================
// Tests
// ============================================================================
