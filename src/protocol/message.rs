//! Inbound frame classification.
//!
//! Every inbound text frame is decoded once into an [`Incoming`] message:
//! a frame with a non-zero `id` is a command response, a frame with a
//! `method` and no meaningful `id` is an event push.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::CommandId;

use super::{Event, RemoteError, Response};

// ============================================================================
// RawFrame
// ============================================================================

/// Union of all envelope fields, before classification.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(default)]
    id: Option<CommandId>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RemoteError>,
    #[serde(rename = "sessionId", default)]
    session_id: Option<String>,
}

// ============================================================================
// Incoming
// ============================================================================

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// Reply to a previously sent command.
    Response(Response),
    /// Pushed event.
    Event(Event),
}

impl Incoming {
    /// Decodes and classifies one inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the frame is not a JSON envelope, or
    /// carries neither a correlation ID nor a method name.
    pub fn parse(text: &str) -> Result<Self> {
        let frame: RawFrame =
            serde_json::from_str(text).map_err(|e| Error::decode(format!("invalid frame: {e}")))?;

        match frame {
            RawFrame {
                id: Some(id),
                result,
                error,
                session_id,
                ..
            } if id.is_some() => Ok(Self::Response(Response {
                id,
                result,
                error,
                session_id,
            })),

            RawFrame {
                method: Some(method),
                params,
                session_id,
                ..
            } => Ok(Self::Event(Event {
                method,
                params: params.unwrap_or(Value::Null),
                session_id,
            })),

            _ => Err(Error::decode("frame has neither id nor method")),
        }
    }

    /// Returns the correlation ID if this is a response.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<CommandId> {
        match self {
            Self::Response(response) => Some(response.id),
            Self::Event(_) => None,
        }
    }

    /// Returns the method name if this is an event.
    #[inline]
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Response(_) => None,
            Self::Event(event) => Some(&event.method),
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
    fn test_parse_success_response() {
        let incoming = Incoming::parse(r#"{"id":7,"result":{}}"#).expect("parse");

        match incoming {
            Incoming::Response(response) => {
                assert_eq!(response.id, CommandId::new(7));
                assert_eq!(response.result, Some(json!({})));
                assert!(response.error.is_none());
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_response() {
        let incoming =
            Incoming::parse(r#"{"id":7,"error":{"code":1,"message":"boom"}}"#).expect("parse");

        let Incoming::Response(response) = incoming else {
            panic!("expected response");
        };
        let error = response.error.expect("error object");
        assert_eq!(error.code, 1);
        assert_eq!(error.message, "boom");
        assert!(response.result.is_none());
    }

    #[test]
    fn test_parse_event() {
        let incoming = Incoming::parse(
            r#"{"method":"Network.requestWillBeSent","params":{"requestId":"1"}}"#,
        )
        .expect("parse");

        assert_eq!(incoming.id(), None);
        assert_eq!(incoming.method(), Some("Network.requestWillBeSent"));

        let Incoming::Event(event) = incoming else {
            panic!("expected event");
        };
        assert_eq!(event.params, json!({"requestId": "1"}));
    }

    #[test]
    fn test_zero_id_with_method_is_event() {
        let frame = r#"{"id":0,"method":"Page.loadEventFired","params":{}}"#;
        let incoming = Incoming::parse(frame).expect("parse");
        assert!(matches!(incoming, Incoming::Event(_)));
    }

    #[test]
    fn test_non_zero_id_takes_precedence_over_method() {
        let incoming =
            Incoming::parse(r#"{"id":3,"method":"Page.enable","result":{}}"#).expect("parse");
        assert_eq!(incoming.id(), Some(CommandId::new(3)));
    }

    #[test]
    fn test_session_id_is_kept() {
        let incoming =
            Incoming::parse(r#"{"id":4,"result":{},"sessionId":"S"}"#).expect("parse");
        let Incoming::Response(response) = incoming else {
            panic!("expected response");
        };
        assert_eq!(response.session_id.as_deref(), Some("S"));
    }

    #[test]
    fn test_unclassifiable_frames() {
        assert!(matches!(Incoming::parse("{}"), Err(Error::Decode { .. })));
        assert!(matches!(
            Incoming::parse(r#"{"id":0,"result":{}}"#),
            Err(Error::Decode { .. })
        ));
        assert!(matches!(Incoming::parse("not json"), Err(Error::Decode { .. })));
        assert!(matches!(
            Incoming::parse(r#"{"id":"abc","result":{}}"#),
            Err(Error::Decode { .. })
        ));
    }
}
