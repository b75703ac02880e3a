//! Request and Response message types.
//!
//! Defines the envelope for command requests and their correlated
//! responses exchanged with the DevTools endpoint.

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::identifiers::CommandId;

// ============================================================================
// Request
// ============================================================================

/// A command request from the client to the DevTools endpoint.
///
/// # Format
///
/// ```json
/// {
///   "id": 7,
///   "method": "Domain.method",
///   "params": { ... },
///   "sessionId": "optional"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Correlation ID, unique per connection.
    pub id: CommandId,

    /// Command name in `Domain.method` format.
    pub method: String,

    /// Command parameters. Always an object on the wire.
    #[serde(default = "empty_object")]
    pub params: Value,

    /// Target session when using flat session mode.
    #[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl Request {
    /// Creates a new request.
    ///
    /// `null` params are sent as an empty object.
    #[inline]
    #[must_use]
    pub fn new(id: CommandId, method: impl Into<String>, params: Value) -> Self {
        let params = if params.is_null() {
            empty_object()
        } else {
            params
        };

        Self {
            id,
            method: method.into(),
            params,
            session_id: None,
        }
    }

    /// Addresses the request to a target session.
    #[inline]
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

// ============================================================================
// RemoteError
// ============================================================================

/// Error object returned by the remote end for a failed command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
    /// Error code.
    pub code: i64,

    /// Human-readable message.
    pub message: String,

    /// Extra data, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        Error::protocol(err.code, err.message, err.data)
    }
}

// ============================================================================
// Response
// ============================================================================

/// A response from the DevTools endpoint to a command.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 7, "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": 7, "error": { "code": -32601, "message": "...", "data": ... } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: CommandId,

    /// Result data (if success).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error object (if error).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,

    /// Session the response belongs to.
    #[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl Response {
    /// Creates a success response.
    #[inline]
    #[must_use]
    pub fn success(id: CommandId, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
            session_id: None,
        }
    }

    /// Creates an error response.
    #[inline]
    #[must_use]
    pub fn failure(id: CommandId, error: RemoteError) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
            session_id: None,
        }
    }

    /// Returns `true` if this is a success response.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the result value, returning error if response was error.
    ///
    /// A success response without a `result` yields an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the response carries an error object.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(error) => Err(error.into()),
            None => Ok(self.result.unwrap_or_else(empty_object)),
        }
    }

    /// Extracts and deserializes the result into `T`.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the response carries an error object
    /// - [`Error::Decode`] if the result does not match `T`
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        let id = self.id;
        let value = self.into_result()?;
        serde_json::from_value(value)
            .map_err(|e| Error::decode(format!("result of command {id}: {e}")))
    }
}

// ============================================================================
// Helpers
// ============================================================================

#[inline]
fn empty_object() -> Value {
    Value::Object(Map::new())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use serde_json::json;

    use crate::protocol::Incoming;

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[ -~]{0,16}".prop_map(Value::from),
        ]
    }

    // `null` data is omitted on the wire, so it never appears here
    fn data() -> impl Strategy<Value = Value> {
        leaf().prop_filter("non-null", |value| !value.is_null())
    }

    fn objects() -> impl Strategy<Value = Value> {
        proptest::collection::btree_map("[a-zA-Z]{1,8}", leaf(), 0..6)
            .prop_map(|map| Value::Object(map.into_iter().collect()))
    }

    fn methods() -> impl Strategy<Value = String> {
        "[A-Z][a-zA-Z]{0,11}\\.[a-z][a-zA-Z]{0,15}"
    }

    fn sessions() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[A-F0-9]{8,32}")
    }

    fn outcomes() -> impl Strategy<Value = std::result::Result<Value, RemoteError>> {
        prop_oneof![
            objects().prop_map(Ok),
            (any::<i64>(), "[ -~]{0,32}", proptest::option::of(data())).prop_map(
                |(code, message, data)| Err(RemoteError {
                    code,
                    message,
                    data,
                })
            ),
        ]
    }

    #[test]
    fn test_request_serialization() {
        let request = Request::new(CommandId::new(7), "Page.enable", json!({}));
        let json = serde_json::to_value(&request).expect("serialize");

        assert_eq!(json, json!({"id": 7, "method": "Page.enable", "params": {}}));
    }

    #[test]
    fn test_request_null_params_become_object() {
        let request = Request::new(CommandId::new(1), "Page.enable", Value::Null);
        assert_eq!(request.params, json!({}));
    }

    #[test]
    fn test_request_with_session() {
        let request = Request::new(CommandId::new(2), "Runtime.enable", json!({}))
            .with_session("SESSION-1");
        let json = serde_json::to_value(&request).expect("serialize");

        assert_eq!(json["sessionId"], "SESSION-1");
    }

    #[test]
    fn test_request_round_trip() {
        let request = Request::new(
            CommandId::new(11),
            "Page.navigate",
            json!({"url": "https://example.com"}),
        );
        let text = serde_json::to_string(&request).expect("serialize");
        let decoded: Request = serde_json::from_str(&text).expect("parse");

        assert_eq!(decoded, request);
    }

    #[test]
    fn test_success_response() {
        let response: Response =
            serde_json::from_str(r#"{"id": 7, "result": {"frameId": "F1"}}"#).expect("parse");

        assert!(response.is_success());
        assert!(!response.is_error());
        assert_eq!(response.into_result().expect("ok"), json!({"frameId": "F1"}));
    }

    #[test]
    fn test_error_response() {
        let json_str = r#"{
            "id": 7,
            "error": {"code": -32601, "message": "'Foo.bar' wasn't found"}
        }"#;

        let response: Response = serde_json::from_str(json_str).expect("parse");
        assert!(response.is_error());

        match response.into_result() {
            Err(Error::Protocol { code, message, data }) => {
                assert_eq!(code, -32601);
                assert_eq!(message, "'Foo.bar' wasn't found");
                assert!(data.is_none());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_response_round_trip_never_populates_both() {
        let ok = Response::success(CommandId::new(3), json!({"value": 1}));
        let text = serde_json::to_string(&ok).expect("serialize");
        assert!(!text.contains("error"));
        let decoded: Response = serde_json::from_str(&text).expect("parse");
        assert_eq!(decoded, ok);

        let err = Response::failure(
            CommandId::new(4),
            RemoteError {
                code: 1,
                message: "boom".into(),
                data: Some(json!("detail")),
            },
        );
        let text = serde_json::to_string(&err).expect("serialize");
        assert!(!text.contains("result"));
        let decoded: Response = serde_json::from_str(&text).expect("parse");
        assert_eq!(decoded, err);
    }

    #[test]
    fn test_into_result_missing_result_is_empty_object() {
        let response: Response = serde_json::from_str(r#"{"id": 5}"#).expect("parse");
        assert_eq!(response.into_result().expect("ok"), json!({}));
    }

    #[test]
    fn test_into_typed() {
        #[derive(Debug, Deserialize)]
        struct Navigated {
            #[serde(rename = "frameId")]
            frame_id: String,
        }

        let response = Response::success(CommandId::new(1), json!({"frameId": "ABC"}));
        let navigated: Navigated = response.into_typed().expect("typed");
        assert_eq!(navigated.frame_id, "ABC");

        let response = Response::success(CommandId::new(2), json!({"frameId": 5}));
        let err = response.into_typed::<Navigated>().unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    proptest! {
        #[test]
        fn prop_request_survives_encoding(
            id in 1u64..,
            method in methods(),
            params in objects(),
            session_id in sessions(),
        ) {
            let mut request = Request::new(CommandId::new(id), method, params);
            if let Some(session_id) = session_id {
                request = request.with_session(session_id);
            }

            let text = serde_json::to_string(&request).expect("serialize");
            let decoded: Request = serde_json::from_str(&text).expect("parse");
            prop_assert_eq!(decoded, request);
        }

        #[test]
        fn prop_response_survives_inbound_classification(
            id in 1u64..,
            outcome in outcomes(),
            session_id in sessions(),
        ) {
            let id = CommandId::new(id);
            let mut response = match outcome {
                Ok(result) => Response::success(id, result),
                Err(error) => Response::failure(id, error),
            };
            response.session_id = session_id;

            let text = serde_json::to_string(&response).expect("serialize");
            let incoming = Incoming::parse(&text).expect("classify");

            let Incoming::Response(decoded) = incoming else {
                return Err(TestCaseError::fail("response classified as event"));
            };
            prop_assert!(decoded.result.is_none() || decoded.error.is_none());
            prop_assert_eq!(decoded, response);
        }
    }
}
