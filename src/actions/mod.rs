//! Action primitives.
//!
//! Thin wrappers over [`Connection::call`](crate::Connection::call) for the
//! calls automation scripts issue most: evaluation, synthetic input,
//! snapshots and domain enabling.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `domain` | `<Domain>.enable`, `Page.bringToFront` |
//! | `evaluate` | `Runtime.evaluate` |
//! | `input` | `Input.dispatchKeyEvent`, `Input.dispatchMouseEvent` |
//! | `keyboard` | Key definitions |
//! | `snapshot` | `Page.captureScreenshot` |

// ============================================================================
// Submodules
// ============================================================================

mod domain;

/// Script evaluation.
pub mod evaluate;

/// Synthetic input events.
pub mod input;

/// Key definitions.
pub mod keyboard;

/// Viewport capture.
pub mod snapshot;

// ============================================================================
// Re-exports
// ============================================================================

pub use evaluate::EvaluateOptions;
pub use input::{
    InputEvent, KeyEvent, KeyEventType, MouseButton, MouseEvent, MouseEventType,
};
pub use keyboard::{Key, KeyDefinition};
pub use snapshot::{ImageFormat, Snapshot};
