//! WebSocket transport layer.
//!
//! This module owns the WebSocket connection to a DevTools endpoint and
//! multiplexes concurrent commands and pushed events over it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐                         ┌─────────────────┐
//! │  Connection (Rust)   │                         │  Browser        │
//! │                      │        WebSocket        │  DevTools       │
//! │  PendingCommands ◄───┼─── {"id":…,"result"} ───┤  endpoint       │
//! │  EventHandlers   ◄───┼─── {"method":…}     ────┤                 │
//! │  event loop      ────┼──► {"id","method"}  ───►│                 │
//! └──────────────────────┘                         └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `connect` - Validate URL, perform WebSocket handshake
//! 2. `Connection` - Send commands, receive responses/events
//! 3. `Connection::shutdown` - Close socket, fail pending commands
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connect` | Endpoint validation and handshake |
//! | `connection` | WebSocket connection and event loop |
//! | `handlers` | Event-handler registry |
//! | `options` | Timeouts and limits |
//! | `pending` | Pending-command registry |

// ============================================================================
// Submodules
// ============================================================================

/// Endpoint validation and handshake.
pub mod connect;

/// WebSocket connection and event loop.
pub mod connection;

/// Event-handler registry.
pub mod handlers;

/// Connection options.
pub mod options;

/// Pending-command registry.
pub mod pending;

// ============================================================================
// Re-exports
// ============================================================================

pub use connect::{connect, connect_with_options};
pub use connection::Connection;
pub use handlers::{EventHandler, EventHandlers, HandlerFn};
pub use options::ConnectionOptions;
pub use pending::{Delivery, PendingCommand, PendingCommands};
