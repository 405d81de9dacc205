//! WebSocket protocol message types.
//!
//! This module defines the envelope exchanged with an inspector-style
//! remote end. Individual domain semantics are not modelled here.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Call` | Local → Remote | Correlated request |
//! | `Reply` | Remote → Local | Result or error for one call |
//! | `Event` | Remote → Local | Unsolicited notification |
//!
//! A frame with an integer `id` is a reply; a frame with a `method` and no
//! `id` is an event.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `request` | Call and Reply types |
//! | `event` | Event and ParsedEvent types |
//! | `frame` | Incoming frame classification |

// ============================================================================
// Submodules
// ============================================================================

/// Event message types.
pub mod event;

/// Incoming frame decoding.
pub mod frame;

/// Call and Reply message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use event::{Event, ParsedEvent};
pub use frame::Frame;
pub use request::{Call, RemoteFailure, Reply};
