//! Incoming frame decoding.
//!
//! Every text frame from the remote end is either a [`Reply`] (has an
//! integer `id`) or an [`Event`] (has a `method` and no `id`). Whether a
//! reply still has a caller waiting for it is decided later by the
//! correlator, not here.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::CallId;

use super::{Event, RemoteFailure, Reply};

// ============================================================================
// Frame
// ============================================================================

/// A decoded incoming frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Answer to a call.
    Reply(Reply),
    /// Unsolicited notification.
    Event(Event),
}

/// Wire shape shared by replies and events.
#[derive(Deserialize)]
struct RawFrame {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RemoteFailure>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
}

impl Frame {
    /// Decodes one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the text is not a JSON object, or has
    /// neither an `id` nor a `method`.
    pub fn decode(text: &str) -> Result<Self> {
        let raw: RawFrame = serde_json::from_str(text)
            .map_err(|e| Error::protocol(format!("Malformed frame: {e}")))?;

        if let Some(id) = raw.id {
            let id = CallId::new(id);
            return Ok(match raw.error {
                Some(failure) => Frame::Reply(Reply::failure(id, failure)),
                None => Frame::Reply(Reply::success(id, raw.result.unwrap_or(Value::Null))),
            });
        }

        match raw.method {
            Some(method) => Ok(Frame::Event(Event::new(
                method,
                raw.params.unwrap_or(Value::Null),
            ))),
            None => Err(Error::protocol("Frame has neither id nor method")),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_success_reply() {
        let frame = Frame::decode(r#"{"id":4,"result":{"frameId":"A1"}}"#).expect("decode");
        assert_eq!(
            frame,
            Frame::Reply(Reply::success(CallId::new(4), json!({ "frameId": "A1" })))
        );
    }

    #[test]
    fn test_decode_empty_result() {
        let frame = Frame::decode(r#"{"id":2,"result":{}}"#).expect("decode");
        match frame {
            Frame::Reply(reply) => assert_eq!(reply.into_result().expect("ok"), json!({})),
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_error_reply() {
        let frame =
            Frame::decode(r#"{"id":9,"error":{"code":-32000,"message":"Not allowed"}}"#).expect("decode");
        match frame {
            Frame::Reply(reply) => {
                assert_eq!(reply.id, CallId::new(9));
                assert!(!reply.is_success());
            }
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_error_without_code() {
        let frame = Frame::decode(r#"{"id":1,"error":{"message":"boom"}}"#).expect("decode");
        match frame {
            Frame::Reply(reply) => match reply.into_result() {
                Err(Error::Remote { code, message }) => {
                    assert_eq!(code, 0);
                    assert_eq!(message, "boom");
                }
                other => panic!("expected remote error, got {other:?}"),
            },
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_event() {
        let frame =
            Frame::decode(r#"{"method":"Console.output","params":{"text":"hello"}}"#).expect("decode");
        assert_eq!(
            frame,
            Frame::Event(Event::new("Console.output", json!({ "text": "hello" })))
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = Frame::decode("not json").unwrap_err();
        assert!(err.is_protocol_error());

        let err = Frame::decode("[1, 2, 3]").unwrap_err();
        assert!(err.is_protocol_error());
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let err = Frame::decode(r#"{"params":{}}"#).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_decode_rejects_non_integer_id() {
        let err = Frame::decode(r#"{"id":"abc","result":{}}"#).unwrap_err();
        assert!(err.is_protocol_error());
    }
}
