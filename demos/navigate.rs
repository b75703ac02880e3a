//! Navigate a page and watch its load events.
//!
//! Demonstrates:
//! - Connecting to a page's DevTools WebSocket endpoint
//! - Typed commands and events defined outside the transport
//! - Raw JSON commands
//! - Graceful shutdown
//!
//! Start Chromium with `--remote-debugging-port=9222`, copy a page's
//! `webSocketDebuggerUrl` from `http://127.0.0.1:9222/json`, then:
//!
//! Usage:
//!   cargo run --example navigate -- ws://127.0.0.1:9222/devtools/page/<id>
//!   cargo run --example navigate -- <ws-url> https://example.com --debug

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use cdtp::{Command, ConnectionOptions, EventParams, connect_with_options};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Protocol Types
// ============================================================================

/// `Page.navigate`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Navigate {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NavigateResult {
    frame_id: String,
    #[serde(default)]
    error_text: Option<String>,
}

impl Command for Navigate {
    type Response = NavigateResult;

    fn method(&self) -> &str {
        "Page.navigate"
    }
}

/// `Page.loadEventFired`
#[derive(Debug, Deserialize)]
struct LoadEventFired {
    timestamp: f64,
}

impl EventParams for LoadEventFired {
    const METHOD: &'static str = "Page.loadEventFired";
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let debug = args.iter().any(|a| a == "--debug");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    init_logging(debug);

    let Some(endpoint) = positional.first() else {
        eprintln!("usage: navigate <ws-url> [page-url] [--debug]");
        std::process::exit(2);
    };
    let target = positional
        .get(1)
        .map_or("https://example.com", |s| s.as_str());

    if let Err(e) = run(endpoint, target).await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run(endpoint: &str, target: &str) -> Result<()> {
    println!("=== DevTools: navigate ===\n");

    let options = ConnectionOptions::new().with_command_timeout(Duration::from_secs(15));
    let conn = connect_with_options(endpoint, options)
        .await
        .context("connecting to DevTools endpoint")?;
    println!("[1] Connected to {endpoint}");

    let (loaded_tx, mut loaded_rx) = mpsc::unbounded_channel();
    let handler = conn.on_event(move |event: LoadEventFired| {
        let _ = loaded_tx.send(event.timestamp);
    })?;

    conn.send("Page.enable", json!({})).await?;
    println!("[2] Page domain enabled");

    let navigated = conn
        .execute(&Navigate {
            url: target.to_string(),
        })
        .await?;
    if let Some(error) = navigated.error_text {
        anyhow::bail!("navigation failed: {error}");
    }
    println!("[3] Navigating frame {} to {target}", navigated.frame_id);

    let timestamp = tokio::time::timeout(Duration::from_secs(30), loaded_rx.recv())
        .await
        .context("waiting for Page.loadEventFired")?
        .context("connection closed before load")?;
    println!("    ✓ Load event at {timestamp}");

    let title = conn
        .send(
            "Runtime.evaluate",
            json!({"expression": "document.title", "returnByValue": true}),
        )
        .await?;
    println!("[4] Title: {}", title["result"]["value"]);

    conn.remove_handler(&handler)?;
    conn.shutdown();
    println!("\n=== Done ===");

    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let filter = if debug { "cdtp=trace" } else { "cdtp=info" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
