//! cdtp - Chrome DevTools Protocol command/event transport.
//!
//! This library multiplexes DevTools commands and pushed events over a
//! single WebSocket connection to a browser or page target.
//!
//! # Architecture
//!
//! - **Commands**: each send allocates a correlation ID, registers a
//!   single-use channel, and suspends only its caller until the matching
//!   response arrives
//! - **Events**: frames without an ID are fanned out by method name to the
//!   registered handlers, on a task separate from the read loop
//! - **Teardown**: when the socket closes, every pending command fails with
//!   [`Error::ConnectionClosed`]
//!
//! Protocol-domain types (Page, Network, Runtime, ...) are not part of this
//! crate. They plug in through [`Command`] and [`EventParams`].
//!
//! # Quick Start
//!
//! ```no_run
//! use cdtp::{Result, connect};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let conn = connect("ws://127.0.0.1:9222/devtools/page/ABC").await?;
//!
//!     conn.on("Page.loadEventFired", |event| {
//!         println!("loaded: {}", event.params);
//!     })?;
//!
//!     conn.send("Page.enable", json!({})).await?;
//!     conn.send("Page.navigate", json!({"url": "https://example.com"})).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Command and handler IDs |
//! | [`protocol`] | Wire envelope and typed seam |
//! | [`transport`] | Connection, registries, event loop |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for commands and handlers.
pub mod identifiers;

/// DevTools protocol message types.
///
/// Defines request/response/event envelopes and the [`Command`] and
/// [`EventParams`] traits.
pub mod protocol;

/// WebSocket transport layer.
///
/// Connection management, pending-command and event-handler registries.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{CommandId, CommandIdGenerator, HandlerId};

// Protocol types
pub use protocol::{
    Command, Event, EventParams, Incoming, RawCommand, RemoteError, Request, Response,
};

// Transport types
pub use transport::{
    Connection, ConnectionOptions, EventHandler, EventHandlers, PendingCommand, PendingCommands,
    connect, connect_with_options,
};
