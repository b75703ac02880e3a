//! DevTools protocol message types.
//!
//! This module defines the JSON envelope exchanged with a DevTools
//! endpoint, plus the typed seam that protocol-domain layers plug into.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Local → Remote | Command with correlation `id` |
//! | `Response` | Remote → Local | `result` or `error` for that `id` |
//! | `Event` | Remote → Local | Pushed notification, no `id` |
//!
//! # Method Naming
//!
//! Commands and events follow `Domain.method` format:
//!
//! - `Page.navigate`
//! - `Runtime.evaluate`
//! - `Network.requestWillBeSent`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | `Command` trait and `RawCommand` |
//! | `event` | `Event` and `EventParams` |
//! | `message` | Inbound frame classification |
//! | `request` | `Request`, `Response`, `RemoteError` |

// ============================================================================
// Submodules
// ============================================================================

/// Typed command seam.
pub mod command;

/// Event message types.
pub mod event;

/// Inbound frame classification.
pub mod message;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, RawCommand};
pub use event::{Event, EventParams};
pub use message::Incoming;
pub use request::{RemoteError, Request, Response};
