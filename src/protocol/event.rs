//! Event message types.
//!
//! Events are pushed by the DevTools endpoint without a correlation ID and
//! are routed to handlers by their `Domain.event` method name.

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// EventParams
// ============================================================================

/// Typed payload of a named event.
///
/// Implemented by protocol-domain layers to decode an [`Event`] on demand.
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct LoadEventFired {
///     timestamp: f64,
/// }
///
/// impl EventParams for LoadEventFired {
///     const METHOD: &'static str = "Page.loadEventFired";
/// }
/// ```
pub trait EventParams: DeserializeOwned {
    /// Event name in `Domain.event` format.
    const METHOD: &'static str;
}

// ============================================================================
// Event
// ============================================================================

/// An event pushed from the DevTools endpoint.
///
/// # Format
///
/// ```json
/// {
///   "method": "Domain.event",
///   "params": { ... },
///   "sessionId": "optional"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event name in `Domain.event` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,

    /// Session the event originated from.
    #[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl Event {
    /// Creates a new event.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
            session_id: None,
        }
    }

    /// Returns the domain name from the method.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let event = Event::new("Network.requestWillBeSent", json!({}));
    /// assert_eq!(event.domain(), "Network");
    /// ```
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.method.split('.').next().unwrap_or_default()
    }

    /// Returns the event name from the method.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let event = Event::new("Network.requestWillBeSent", json!({}));
    /// assert_eq!(event.event_name(), "requestWillBeSent");
    /// ```
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.method.split('.').nth(1).unwrap_or_default()
    }

    /// Returns `true` if this event has the given method name.
    #[inline]
    #[must_use]
    pub fn is(&self, method: &str) -> bool {
        self.method == method
    }

    /// Decodes the params into a typed event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the method does not match `E::METHOD`
    /// or the params do not match `E`.
    pub fn parse<E: EventParams>(&self) -> Result<E> {
        if self.method != E::METHOD {
            return Err(Error::decode(format!(
                "expected event {}, got {}",
                E::METHOD,
                self.method
            )));
        }

        self.params_as()
    }

    /// Decodes the params into any deserializable type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the params do not match `T`.
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.params)
            .map_err(|e| Error::decode(format!("params of {}: {e}", self.method)))
    }
}

// ============================================================================
// Tests
// ============================================================================
