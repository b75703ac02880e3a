//! Event-handler registry.
//!
//! Maps an event method name to the handlers subscribed to it. One method
//! may have many handlers; the same handler (by [`HandlerId`]) may be
//! registered only once per method.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::identifiers::HandlerId;
use crate::protocol::Event;

// ============================================================================
// Types
// ============================================================================

/// Event handler callback type.
///
/// Called on the connection's handler loop for each matching event.
pub type HandlerFn = dyn Fn(&Event) + Send + Sync;

// ============================================================================
// EventHandler
// ============================================================================

/// A callback bound to one event method name.
///
/// Clones share the same identity, so a clone can be used to remove the
/// original registration.
#[derive(Clone)]
pub struct EventHandler {
    id: HandlerId,
    method: Arc<str>,
    callback: Arc<HandlerFn>,
}

impl EventHandler {
    /// Creates a handler for `method` with a fresh identity.
    pub fn new<F>(method: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        Self {
            id: HandlerId::generate(),
            method: Arc::from(method.into()),
            callback: Arc::new(callback),
        }
    }

    /// Returns the handler identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Returns the event method this handler is bound to.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Invokes the callback.
    #[inline]
    pub fn call(&self, event: &Event) {
        (self.callback)(event);
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("id", &self.id)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// EventHandlers
// ============================================================================

/// Registry of event handlers, keyed by event method name.
///
/// Handlers for one method are kept in registration order.
#[derive(Debug, Default)]
pub struct EventHandlers {
    inner: RwLock<FxHashMap<String, Vec<EventHandler>>>,
}

impl EventHandlers {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under its method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateHandler`] if this handler is already
    /// registered for its method.
    pub fn add(&self, handler: EventHandler) -> Result<()> {
        let mut inner = self.inner.write();
        let handlers = inner.entry(handler.method().to_string()).or_default();

        if handlers.iter().any(|h| h.id == handler.id) {
            return Err(Error::duplicate_handler(handler.method()));
        }

        handlers.push(handler);
        Ok(())
    }

    /// Unregisters a handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HandlerNotFound`] if this handler is not registered.
    pub fn remove(&self, handler: &EventHandler) -> Result<()> {
        let mut inner = self.inner.write();
        let Some(handlers) = inner.get_mut(handler.method()) else {
            return Err(Error::handler_not_found(handler.method()));
        };

        let Some(index) = handlers.iter().position(|h| h.id == handler.id) else {
            return Err(Error::handler_not_found(handler.method()));
        };

        handlers.remove(index);
        if handlers.is_empty() {
            inner.remove(handler.method());
        }
        Ok(())
    }

    /// Removes every handler for `method`.
    ///
    /// Returns the number removed; zero when none were registered.
    pub fn delete(&self, method: &str) -> usize {
        self.inner
            .write()
            .remove(method)
            .map_or(0, |handlers| handlers.len())
    }

    /// Returns a snapshot of the handlers for `method`.
    #[must_use]
    pub fn get(&self, method: &str) -> Vec<EventHandler> {
        self.inner.read().get(method).cloned().unwrap_or_default()
    }

    /// Returns the total number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().values().map(Vec::len).sum()
    }

    /// Returns `true` if no handler is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Removes every handler.
    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    fn counting(method: &str) -> (EventHandler, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let handler = EventHandler::new(method, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (handler, count)
    }

    #[test]
    fn test_add_duplicate_fails() {
        let registry = EventHandlers::new();
        let (handler, _) = counting("Page.loadEventFired");

        registry.add(handler.clone()).expect("first add");
        let err = registry.add(handler).unwrap_err();

        assert!(matches!(
            err,
            Error::DuplicateHandler { ref method } if method == "Page.loadEventFired"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_twice_fails() {
        let registry = EventHandlers::new();
        let (handler, _) = counting("Page.loadEventFired");

        registry.add(handler.clone()).expect("add");
        registry.remove(&handler).expect("first remove");
        let err = registry.remove(&handler).unwrap_err();

        assert!(matches!(err, Error::HandlerNotFound { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_keeps_other_subscribers() {
        let registry = EventHandlers::new();
        let (first, _) = counting("Network.requestWillBeSent");
        let (second, _) = counting("Network.requestWillBeSent");

        registry.add(first.clone()).expect("add first");
        registry.add(second.clone()).expect("add second");
        registry.remove(&first).expect("remove first");

        let remaining = registry.get("Network.requestWillBeSent");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), second.id());
    }

    #[test]
    fn test_delete_is_not_an_error_when_empty() {
        let registry = EventHandlers::new();
        assert_eq!(registry.delete("Page.loadEventFired"), 0);

        let (a, _) = counting("Page.loadEventFired");
        let (b, _) = counting("Page.loadEventFired");
        registry.add(a).expect("add a");
        registry.add(b).expect("add b");

        assert_eq!(registry.delete("Page.loadEventFired"), 2);
        assert!(registry.get("Page.loadEventFired").is_empty());
    }

    #[test]
    fn test_get_returns_handlers_in_order() {
        let registry = EventHandlers::new();
        let (a, a_count) = counting("Page.frameNavigated");
        let (b, b_count) = counting("Page.frameNavigated");
        let (other, other_count) = counting("Page.loadEventFired");

        registry.add(a.clone()).expect("add a");
        registry.add(b.clone()).expect("add b");
        registry.add(other).expect("add other");

        let handlers = registry.get("Page.frameNavigated");
        let ids: Vec<_> = handlers.iter().map(EventHandler::id).collect();
        assert_eq!(ids, vec![a.id(), b.id()]);

        let event = Event::new("Page.frameNavigated", json!({}));
        for handler in &handlers {
            handler.call(&event);
        }

        assert_eq!(a_count.load(Ordering::SeqCst), 1);
        assert_eq!(b_count.load(Ordering::SeqCst), 1);
        assert_eq!(other_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_same_callback_shape_is_not_a_duplicate() {
        let registry = EventHandlers::new();
        registry
            .add(EventHandler::new("Page.loadEventFired", |_| {}))
            .expect("first");
        registry
            .add(EventHandler::new("Page.loadEventFired", |_| {}))
            .expect("second");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_clear() {
        let registry = EventHandlers::new();
        registry
            .add(EventHandler::new("Page.loadEventFired", |_| {}))
            .expect("add");
        registry.clear();
        assert!(registry.is_empty());
    }
}
