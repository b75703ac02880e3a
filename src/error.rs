//! Error types for the DevTools transport.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use cdtp::{Connection, Result};
//! use serde_json::json;
//!
//! async fn example(conn: &Connection) -> Result<()> {
//!     conn.send("Page.enable", json!({})).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::Protocol`], [`Error::Decode`], [`Error::TooManyPending`] |
//! | Registry | [`Error::CommandNotFound`], [`Error::HandlerNotFound`], [`Error::DuplicateHandler`] |
//! | Execution | [`Error::RequestTimeout`] |
//! | External | [`Error::Json`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::CommandId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when an endpoint URL or connection option is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    ///
    /// Returned when the connection cannot be established or a frame
    /// cannot be written.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Timed out while opening the connection.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// The connection closed before a reply arrived.
    ///
    /// Delivered to every pending command when the event loop ends, and
    /// returned by sends on a closed connection.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// The remote end answered a command with an error object.
    #[error("Protocol error {code}: {message}")]
    Protocol {
        /// Error code reported by the remote end.
        code: i64,
        /// Error message reported by the remote end.
        message: String,
        /// Optional extra data attached to the error.
        data: Option<Value>,
    },

    /// An inbound frame or payload could not be decoded.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },

    /// Too many commands are awaiting a reply.
    #[error("Too many pending commands: {pending}/{max}")]
    TooManyPending {
        /// Commands currently pending.
        pending: usize,
        /// Configured limit.
        max: usize,
    },

    // ========================================================================
    // Registry Errors
    // ========================================================================
    /// No pending command is registered under this ID.
    #[error("Command not found: {id}")]
    CommandNotFound {
        /// The missing command ID.
        id: CommandId,
    },

    /// The handler is not registered for this event.
    #[error("Handler not found for event: {method}")]
    HandlerNotFound {
        /// Event method name.
        method: String,
    },

    /// The handler is already registered for this event.
    #[error("Handler already registered for event: {method}")]
    DuplicateHandler {
        /// Event method name.
        method: String,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Command request timeout.
    #[error("Command {id} ({method}) timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The command ID that timed out.
        id: CommandId,
        /// The command method.
        method: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a protocol error from a remote error object.
    #[inline]
    pub fn protocol(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self::Protocol {
            code,
            message: message.into(),
            data,
        }
    }

    /// Creates a decode error.
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a too-many-pending error.
    #[inline]
    pub fn too_many_pending(pending: usize, max: usize) -> Self {
        Self::TooManyPending { pending, max }
    }

    /// Creates a command not found error.
    #[inline]
    pub fn command_not_found(id: CommandId) -> Self {
        Self::CommandNotFound { id }
    }

    /// Creates a handler not found error.
    #[inline]
    pub fn handler_not_found(method: impl Into<String>) -> Self {
        Self::HandlerNotFound {
            method: method.into(),
        }
    }

    /// Creates a duplicate handler error.
    #[inline]
    pub fn duplicate_handler(method: impl Into<String>) -> Self {
        Self::DuplicateHandler {
            method: method.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(id: CommandId, method: impl Into<String>, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            id,
            method: method.into(),
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if this error was reported by the remote end.
    #[inline]
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }

    /// Returns `true` if this is a registry lookup or registration error.
    #[inline]
    #[must_use]
    pub fn is_registry_error(&self) -> bool {
        matches!(
            self,
            Self::CommandNotFound { .. }
                | Self::HandlerNotFound { .. }
                | Self::DuplicateHandler { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. }
                | Self::RequestTimeout { .. }
                | Self::TooManyPending { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
