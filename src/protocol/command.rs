//! Typed command seam.
//!
//! The transport only moves method names and opaque JSON params. Protocol
//! domain layers implement [`Command`] to pair a params type with its
//! result type; [`RawCommand`] covers untyped calls.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

// ============================================================================
// Command
// ============================================================================

/// A command with a typed response.
///
/// The default [`Command::params`] serializes `self`, so a params struct
/// only has to name its method:
///
/// ```ignore
/// #[derive(Serialize)]
/// struct Navigate {
///     url: String,
/// }
///
/// impl Command for Navigate {
///     type Response = NavigateResult;
///
///     fn method(&self) -> &str {
///         "Page.navigate"
///     }
/// }
/// ```
pub trait Command: Serialize {
    /// Result type returned by the remote end.
    type Response: DeserializeOwned;

    /// Command name in `Domain.method` format.
    fn method(&self) -> &str;

    /// Command params as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if serialization fails.
    fn params(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

// ============================================================================
// RawCommand
// ============================================================================

/// An untyped command: method name plus arbitrary JSON params.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawCommand {
    /// Command name in `Domain.method` format.
    pub method: String,

    /// Command parameters.
    pub params: Value,
}

impl RawCommand {
    /// Creates a raw command.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

impl Command for RawCommand {
    type Response = Value;

    fn method(&self) -> &str {
        &self.method
    }

    fn params(&self) -> Result<Value> {
        Ok(self.params.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
