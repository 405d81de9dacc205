//! Inspector RPC - minimal client for inspector-style debugging protocols.
//!
//! Discovers inspectable targets (pages, background workers, iframes)
//! over HTTP, attaches to one over WebSocket, and multiplexes correlated
//! calls and unsolicited events on that socket.
//!
//! # Architecture
//!
//! - **Discovery**: `GET /json` lists targets with their socket addresses
//! - **Connection**: one WebSocket per target, owned by one event loop task
//! - **Calls**: `{id, method, params}` out, `{id, result | error}` back,
//!   matched by id in any order
//! - **Events**: `{method, params}` frames fanned out to listeners by exact name
//!
//! Key design principles:
//!
//! - Every call completes exactly once: reply, remote error, timeout,
//!   cancellation or connection closure
//! - A late reply for a timed-out call is dropped, never delivered elsewhere
//! - A closed connection is dead; open a new one to retry
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use inspector_rpc::{Inspector, Key, Result, TargetFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let inspector = Inspector::builder().port(9222).build()?;
//!
//!     let target = inspector
//!         .wait_for_target(
//!             TargetFilter::new().url_contains("options.html"),
//!             Duration::from_secs(5),
//!         )
//!         .await?;
//!
//!     let connection = inspector.connect(&target).await?;
//!     connection.on("Runtime.consoleAPICalled", |event| {
//!         println!("console: {:?}", event.parse());
//!     });
//!     connection.enable_domain("Runtime").await?;
//!
//!     let title = connection.evaluate("document.title").await?;
//!     println!("Page title: {title}");
//!
//!     connection.press_key(Key::Char('t')).await?;
//!     connection.disconnect();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`actions`] | Evaluation, input, snapshot and domain primitives |
//! | [`client`] | [`Inspector`] entry point and configuration |
//! | [`discovery`] | HTTP target discovery |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Wire message types |
//! | [`transport`] | WebSocket connection, correlation and event routing |

// ============================================================================
// Modules
// ============================================================================

/// Action primitives built on [`Connection::call`].
pub mod actions;

/// Client entry point and configuration.
///
/// Use [`Inspector::builder()`] to create a configured instance.
pub mod client;

/// Target discovery over HTTP.
pub mod discovery;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Wire message types.
pub mod protocol;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Action types
pub use actions::{
    EvaluateOptions, ImageFormat, InputEvent, Key, KeyEvent, KeyEventType, MouseButton,
    MouseEvent, MouseEventType, Snapshot,
};

// Client types
pub use client::{ConnectionOptions, Inspector, InspectorBuilder};

// Discovery types
pub use discovery::{BrowserVersion, Target, TargetDirectory, TargetFilter, TargetPredicate, TargetType};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{CallId, SubscriptionId, TargetId};

// Protocol types
pub use protocol::{Event, ParsedEvent};

// Transport types
pub use transport::{CallHandle, Connection, EventListener, Subscription};
