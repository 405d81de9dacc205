//! WebSocket transport layer.
//!
//! This module owns the socket to a target and multiplexes correlated
//! calls and unsolicited events over it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐                         ┌─────────────────┐
//! │  Connection (Rust)   │                         │  Target         │
//! │                      │        WebSocket        │  (page, worker, │
//! │  Correlator ◄─ reply ├◄───────────────────────►│   iframe, ...)  │
//! │  EventRouter ◄ event │  /devtools/<type>/<id>  │                 │
//! └──────────────────────┘                         └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::open` - WebSocket handshake with the target
//! 2. `Connection::call` / `Connection::on` - calls and listeners
//! 3. Socket closes or `Connection::disconnect` - pending calls fail, connection is dead
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |
//! | `correlator` | Pending call registry |
//! | `router` | Event listener registry |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// Pending call registry.
pub(crate) mod correlator;

/// Event listener registry.
pub mod router;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{CallHandle, Connection};
pub use router::{EventListener, Subscription};
