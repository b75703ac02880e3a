//! Opening connections to a DevTools endpoint.
//!
//! # Connection Flow
//!
//! 1. Validate the `ws://` / `wss://` endpoint URL
//! 2. Perform the WebSocket handshake (with timeout)
//! 3. Wrap the stream in a [`Connection`], which starts its event loop

// ============================================================================
// Imports
// ============================================================================

use tokio::time::timeout;
use tokio_tungstenite::connect_async_with_config;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};

use super::Connection;
use super::options::ConnectionOptions;

// ============================================================================
// Public API
// ============================================================================

/// Connects to a DevTools WebSocket endpoint with default options.
///
/// The URL is the `webSocketDebuggerUrl` reported by the browser, e.g.
/// `ws://127.0.0.1:9222/devtools/browser/<id>`.
///
/// # Errors
///
/// See [`connect_with_options`].
pub async fn connect(url: &str) -> Result<Connection> {
    connect_with_options(url, ConnectionOptions::new()).await
}

/// Connects to a DevTools WebSocket endpoint.
///
/// # Errors
///
/// - [`Error::Config`] if the URL or options are invalid
/// - [`Error::ConnectionTimeout`] if the handshake does not finish in time
/// - [`Error::Connection`] if the handshake fails
pub async fn connect_with_options(url: &str, options: ConnectionOptions) -> Result<Connection> {
    options.validate()?;
    let url = parse_endpoint(url)?;

    let mut config = WebSocketConfig::default();
    if let Some(max) = options.max_message_size {
        config.max_message_size = Some(max);
        config.max_frame_size = Some(max);
    }

    debug!(%url, "Connecting to DevTools endpoint");

    let handshake = timeout(
        options.connect_timeout,
        connect_async_with_config(url.as_str(), Some(config), true),
    )
    .await
    .map_err(|_| Error::connection_timeout(options.connect_timeout.as_millis() as u64))?;

    let (ws_stream, response) =
        handshake.map_err(|e| Error::connection(format!("WebSocket handshake failed: {e}")))?;

    info!(%url, status = %response.status(), "DevTools connection established");

    Connection::new(ws_stream, options)
}

// ============================================================================
// Helpers
// ============================================================================

/// Parses and validates a WebSocket endpoint URL.
fn parse_endpoint(url: &str) -> Result<Url> {
    let parsed =
        Url::parse(url).map_err(|e| Error::config(format!("invalid endpoint {url:?}: {e}")))?;

    match parsed.scheme() {
        "ws" | "wss" => {}
        scheme => {
            return Err(Error::config(format!(
                "endpoint must use ws:// or wss://, got {scheme}://"
            )));
        }
    }

    if parsed.host_str().is_none() {
        return Err(Error::config(format!("endpoint {url:?} has no host")));
    }

    Ok(parsed)
}

// ============================================================================
// Tests
// ============================================================================
