//! WebSocket connection and event loop.
//!
//! This module handles the WebSocket connection to a DevTools endpoint,
//! including command/response correlation and event routing.
//!
//! # Event Loop
//!
//! The connection spawns two tasks:
//!
//! - **Event loop**: owns the socket; writes queued commands, reads
//!   inbound frames, resolves pending commands by correlation ID.
//! - **Handler loop**: invokes event handlers in arrival order on the
//!   blocking pool, so a slow or blocking handler never holds up command
//!   responses, even on a current-thread runtime.
//!
//! When the event loop ends, every pending command fails with
//! [`Error::ConnectionClosed`] and all handlers are dropped.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde_json::{Value, to_string};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::{CommandId, CommandIdGenerator};
use crate::protocol::{Command, Event, EventParams, Incoming, Request, Response};

use super::handlers::{EventHandler, EventHandlers};
use super::options::ConnectionOptions;
use super::pending::{PendingCommand, PendingCommands};

// ============================================================================
// Constants
// ============================================================================

/// Maximum characters of a dropped frame echoed into logs.
const FRAME_LOG_LIMIT: usize = 256;

// ============================================================================
// Internal Types
// ============================================================================

/// Internal commands for the event loop.
enum LoopCommand {
    /// Write a serialized request.
    Send { id: CommandId, frame: String },
    /// Close the socket and stop.
    Shutdown,
}

/// One event with the handlers it fans out to.
struct Dispatch {
    event: Event,
    handlers: Vec<EventHandler>,
}

/// State shared between connection handles and the event loop.
struct Shared {
    ids: CommandIdGenerator,
    pending: PendingCommands,
    handlers: EventHandlers,
    options: ConnectionOptions,
    closed: AtomicBool,
}

/// Removes a caller's pending entry when its wait ends for any reason.
///
/// A no-op when the event loop already claimed the entry.
struct PendingGuard<'a> {
    pending: &'a PendingCommands,
    id: CommandId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(self.id);
    }
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket connection to a DevTools endpoint.
///
/// Handles command/response correlation and event routing.
/// The connection spawns its event loop and handler loop internally.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and cheap to clone; clones share one
/// socket. The socket closes on [`Connection::shutdown`], when the remote
/// end closes it, or when the last clone is dropped.
#[derive(Clone)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<LoopCommand>,
    /// Registries and options (shared with event loop).
    shared: Arc<Shared>,
}

impl Connection {
    /// Creates a connection over an established WebSocket stream.
    ///
    /// Spawns the event loop and handler loop, so this must be called from
    /// within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `options` are invalid.
    pub fn new<S>(stream: S, options: ConnectionOptions) -> Result<Self>
    where
        S: Stream<Item = std::result::Result<Message, WsError>>
            + Sink<Message, Error = WsError>
            + Send
            + Unpin
            + 'static,
    {
        options.validate()?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            ids: CommandIdGenerator::new(),
            pending: PendingCommands::new(),
            handlers: EventHandlers::new(),
            options,
            closed: AtomicBool::new(false),
        });

        tokio::task::spawn_blocking(move || Self::run_handler_loop(event_rx));
        tokio::spawn(Self::run_event_loop(
            stream,
            command_rx,
            Arc::clone(&shared),
            event_tx,
        ));

        Ok(Self { command_tx, shared })
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Sends a command and waits for its result with the default timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the remote end answered with an error
    /// - [`Error::ConnectionClosed`] if the connection is closed
    /// - [`Error::RequestTimeout`] if no reply arrived in time
    /// - [`Error::TooManyPending`] if the pending limit is reached
    pub async fn send(&self, method: &str, params: Value) -> Result<Value> {
        self.call(method, params, None, self.shared.options.command_timeout)
            .await?
            .into_result()
    }

    /// Sends a command and waits for its result with a custom timeout.
    ///
    /// # Errors
    ///
    /// Same as [`Connection::send`].
    pub async fn send_with_timeout(
        &self,
        method: &str,
        params: Value,
        request_timeout: Duration,
    ) -> Result<Value> {
        self.call(method, params, None, request_timeout)
            .await?
            .into_result()
    }

    /// Sends a command to a target session (flat session mode).
    ///
    /// # Errors
    ///
    /// Same as [`Connection::send`].
    pub async fn send_in_session(
        &self,
        session_id: &str,
        method: &str,
        params: Value,
    ) -> Result<Value> {
        self.call(
            method,
            params,
            Some(session_id),
            self.shared.options.command_timeout,
        )
        .await?
        .into_result()
    }

    /// Sends a typed command and decodes its result.
    ///
    /// # Errors
    ///
    /// Same as [`Connection::send`], plus [`Error::Decode`] if the result
    /// does not match `C::Response`.
    pub async fn execute<C: Command>(&self, command: &C) -> Result<C::Response> {
        let params = command.params()?;
        self.call(
            command.method(),
            params,
            None,
            self.shared.options.command_timeout,
        )
        .await?
        .into_typed()
    }

    /// Sends a command and returns the raw response envelope.
    ///
    /// A remote error is not converted; inspect [`Response::error`].
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is closed
    /// - [`Error::RequestTimeout`] if no reply arrived in time
    /// - [`Error::TooManyPending`] if the pending limit is reached
    pub async fn call(
        &self,
        method: &str,
        params: Value,
        session_id: Option<&str>,
        request_timeout: Duration,
    ) -> Result<Response> {
        if self.is_closed() {
            return Err(Error::ConnectionClosed);
        }

        let id = self.shared.ids.next_id();
        let mut request = Request::new(id, method, params);
        if let Some(session_id) = session_id {
            request = request.with_session(session_id);
        }
        let frame = to_string(&request)?;

        let (response_tx, response_rx) = oneshot::channel();

        // Register before the frame can reach the wire
        let max = self.shared.options.max_pending;
        self.shared
            .pending
            .try_insert(id, PendingCommand::new(method, response_tx), max)
            .inspect_err(|e| warn!(%id, method, error = %e, "Too many pending commands"))?;
        let _guard = PendingGuard {
            pending: &self.shared.pending,
            id,
        };

        self.command_tx
            .send(LoopCommand::Send { id, frame })
            .map_err(|_| Error::ConnectionClosed)?;

        trace!(%id, method, "Command queued");

        match timeout(request_timeout, response_rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                debug!(%id, method, "Command timed out");
                Err(Error::request_timeout(
                    id,
                    method,
                    request_timeout.as_millis() as u64,
                ))
            }
        }
    }

    // ========================================================================
    // Event Handlers
    // ========================================================================

    /// Registers an event handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateHandler`] if this handler is already
    /// registered.
    pub fn add_handler(&self, handler: EventHandler) -> Result<()> {
        let method = handler.method().to_string();
        self.shared.handlers.add(handler)?;
        debug!(%method, "Event handler added");
        Ok(())
    }

    /// Unregisters an event handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HandlerNotFound`] if this handler is not registered.
    pub fn remove_handler(&self, handler: &EventHandler) -> Result<()> {
        self.shared.handlers.remove(handler)?;
        debug!(method = handler.method(), "Event handler removed");
        Ok(())
    }

    /// Unregisters every handler for `method`, returning how many there were.
    pub fn remove_handlers(&self, method: &str) -> usize {
        let removed = self.shared.handlers.delete(method);
        debug!(method, removed, "Event handlers removed");
        removed
    }

    /// Registers a callback for `method` and returns its handler.
    ///
    /// Keep the returned handler to unregister it later.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateHandler`] only if identities collide.
    pub fn on<F>(&self, method: &str, callback: F) -> Result<EventHandler>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let handler = EventHandler::new(method, callback);
        self.add_handler(handler.clone())?;
        Ok(handler)
    }

    /// Registers a typed callback for the event `E`.
    ///
    /// Events whose params do not decode as `E` are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateHandler`] only if identities collide.
    pub fn on_event<E, F>(&self, callback: F) -> Result<EventHandler>
    where
        E: EventParams + 'static,
        F: Fn(E) + Send + Sync + 'static,
    {
        self.on(E::METHOD, move |event| match event.parse::<E>() {
            Ok(params) => callback(params),
            Err(e) => warn!(method = %event.method, error = %e, "Skipping undecodable event"),
        })
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Returns the number of commands awaiting a reply.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.pending.len()
    }

    /// Returns the number of registered event handlers.
    #[inline]
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.shared.handlers.len()
    }

    /// Returns `true` once the event loop has stopped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Returns the options this connection was opened with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ConnectionOptions {
        &self.shared.options
    }

    /// Closes the socket and stops the event loop.
    ///
    /// Pending commands fail with [`Error::ConnectionClosed`].
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(LoopCommand::Shutdown);
    }

    // ========================================================================
    // Event Loop
    // ========================================================================

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop<S>(
        stream: S,
        mut command_rx: mpsc::UnboundedReceiver<LoopCommand>,
        shared: Arc<Shared>,
        event_tx: mpsc::UnboundedSender<Dispatch>,
    ) where
        S: Stream<Item = std::result::Result<Message, WsError>>
            + Sink<Message, Error = WsError>
            + Send
            + Unpin
            + 'static,
    {
        let (mut ws_write, mut ws_read) = stream.split();

        loop {
            tokio::select! {
                // Inbound frames from the endpoint
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, &shared, &event_tx);
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Commands from connection handles
                command = command_rx.recv() => {
                    match command {
                        Some(LoopCommand::Send { id, frame }) => {
                            Self::handle_send_command(id, frame, &mut ws_write, &shared).await;
                        }

                        Some(LoopCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("All connection handles dropped");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }
            }
        }

        shared.closed.store(true, Ordering::Release);
        command_rx.close();

        shared.handlers.clear();
        Self::fail_pending_commands(&shared.pending);

        debug!("Event loop terminated");
    }

    /// Handler loop that invokes event callbacks off the runtime threads.
    ///
    /// Ends once the event loop drops its sender.
    fn run_handler_loop(mut event_rx: mpsc::UnboundedReceiver<Dispatch>) {
        while let Some(Dispatch { event, handlers }) = event_rx.blocking_recv() {
            for handler in &handlers {
                if catch_unwind(AssertUnwindSafe(|| handler.call(&event))).is_err() {
                    error!(
                        method = %event.method,
                        handler = %handler.id(),
                        "Event handler panicked"
                    );
                }
            }
        }

        debug!("Handler loop terminated");
    }

    /// Handles an incoming text frame from the endpoint.
    fn handle_incoming_message(
        text: &str,
        shared: &Shared,
        event_tx: &mpsc::UnboundedSender<Dispatch>,
    ) {
        match Incoming::parse(text) {
            Ok(Incoming::Response(response)) => match shared.pending.take(response.id) {
                Ok(pending) => {
                    trace!(
                        id = %response.id,
                        method = pending.method(),
                        elapsed_ms = pending.elapsed().as_millis() as u64,
                        "Response received"
                    );

                    if !pending.resolve(Ok(response)) {
                        debug!("Caller stopped waiting before response arrived");
                    }
                }

                Err(_) => {
                    warn!(id = %response.id, "Response for unknown command");
                }
            },

            Ok(Incoming::Event(event)) => {
                let handlers = shared.handlers.get(&event.method);
                if handlers.is_empty() {
                    trace!(method = %event.method, "Event without handlers");
                    return;
                }

                if event_tx.send(Dispatch { event, handlers }).is_err() {
                    warn!("Handler loop stopped; event dropped");
                }
            }

            Err(e) => {
                warn!(error = %e, frame = %preview(text), "Dropping inbound frame");
            }
        }
    }

    /// Writes a queued request to the socket.
    async fn handle_send_command<W>(
        id: CommandId,
        frame: String,
        ws_write: &mut W,
        shared: &Shared,
    ) where
        W: Sink<Message, Error = WsError> + Unpin,
    {
        // Caller already gave up
        if !shared.pending.contains(id) {
            trace!(%id, "Skipping abandoned command");
            return;
        }

        if let Err(e) = ws_write.send(Message::Text(frame.into())).await {
            warn!(%id, error = %e, "Failed to send command");
            if let Ok(pending) = shared.pending.take(id) {
                pending.resolve(Err(Error::connection(e.to_string())));
            }
            return;
        }

        trace!(%id, "Command sent");
    }

    /// Fails all pending commands with ConnectionClosed error.
    fn fail_pending_commands(pending: &PendingCommands) {
        let drained = pending.drain();
        let count = drained.len();

        for (_, command) in drained {
            command.resolve(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending commands on shutdown");
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("pending", &self.pending_count())
            .field("handlers", &self.handler_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Truncates a frame for logging.
fn preview(text: &str) -> &str {
    match text.char_indices().nth(FRAME_LOG_LIMIT) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

// ============================================================================
// Tests
// ============================================================================
