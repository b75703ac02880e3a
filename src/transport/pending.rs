//! Pending-command registry.
//!
//! Maps the correlation ID of every in-flight command to the single-use
//! channel its caller is waiting on. Entries leave the registry exactly
//! once: when the response is claimed, when the caller gives up, or when
//! the connection tears down.

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::oneshot;
use tracing::warn;

use crate::error::{Error, Result};
use crate::identifiers::CommandId;
use crate::protocol::Response;

// ============================================================================
// Types
// ============================================================================

/// Single-use channel delivering a command's outcome.
pub type Delivery = oneshot::Sender<Result<Response>>;

// ============================================================================
// PendingCommand
// ============================================================================

/// A sent command awaiting its reply.
#[derive(Debug)]
pub struct PendingCommand {
    /// Command method, kept for diagnostics.
    method: String,
    /// When the command was registered.
    sent_at: Instant,
    /// Caller's delivery channel.
    tx: Delivery,
}

impl PendingCommand {
    /// Creates a pending command.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, tx: Delivery) -> Self {
        Self {
            method: method.into(),
            sent_at: Instant::now(),
            tx,
        }
    }

    /// Returns the command method.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns how long the command has been pending.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.sent_at.elapsed()
    }

    /// Delivers the outcome to the waiting caller.
    ///
    /// Never blocks. Returns `false` if the caller already stopped waiting.
    #[inline]
    pub fn resolve(self, outcome: Result<Response>) -> bool {
        self.tx.send(outcome).is_ok()
    }
}

// ============================================================================
// PendingCommands
// ============================================================================

/// Registry of in-flight commands, keyed by correlation ID.
///
/// # Thread Safety
///
/// Guarded by its own mutex; safe to use from many sending tasks and the
/// event loop at once. No lock is held while delivering.
#[derive(Debug, Default)]
pub struct PendingCommands {
    inner: Mutex<FxHashMap<CommandId, PendingCommand>>,
}

impl PendingCommands {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a newly sent command.
    ///
    /// IDs come from a monotonic generator, so a collision means a caller
    /// reused an ID; the older entry is replaced and its caller is failed.
    pub fn insert(&self, id: CommandId, pending: PendingCommand) {
        let previous = self.inner.lock().insert(id, pending);

        if let Some(previous) = previous {
            warn!(%id, method = previous.method(), "Pending command replaced");
            previous.resolve(Err(Error::command_not_found(id)));
        }
    }

    /// Registers a newly sent command unless `max` are already pending.
    ///
    /// The limit check and the insert happen under one lock, so concurrent
    /// senders cannot overshoot `max`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyPending`] if the registry is full.
    pub fn try_insert(&self, id: CommandId, pending: PendingCommand, max: usize) -> Result<()> {
        let previous = {
            let mut inner = self.inner.lock();
            let count = inner.len();
            if count >= max && !inner.contains_key(&id) {
                return Err(Error::too_many_pending(count, max));
            }
            inner.insert(id, pending)
        };

        if let Some(previous) = previous {
            warn!(%id, method = previous.method(), "Pending command replaced");
            previous.resolve(Err(Error::command_not_found(id)));
        }
        Ok(())
    }

    /// Claims the command registered under `id`, removing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandNotFound`] if no such command is pending,
    /// either because it was never registered or was already claimed.
    pub fn take(&self, id: CommandId) -> Result<PendingCommand> {
        self.inner
            .lock()
            .remove(&id)
            .ok_or_else(|| Error::command_not_found(id))
    }

    /// Removes the command registered under `id`, if any.
    ///
    /// Returns `true` if an entry was removed.
    #[inline]
    pub fn remove(&self, id: CommandId) -> bool {
        self.inner.lock().remove(&id).is_some()
    }

    /// Returns `true` if a command is pending under `id`.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: CommandId) -> bool {
        self.inner.lock().contains_key(&id)
    }

    /// Returns the number of pending commands.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if nothing is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Removes and returns every pending command.
    #[must_use]
    pub fn drain(&self) -> Vec<(CommandId, PendingCommand)> {
        self.inner.lock().drain().collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
