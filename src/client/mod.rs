//! Client entry point.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Inspector`] | Discovery plus connection factory |
//! | [`InspectorBuilder`] | Fluent configuration builder |
//! | [`ConnectionOptions`] | Per-connection timeouts and limits |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for inspector configuration.
pub mod builder;

/// Core inspector implementation.
pub mod core;

/// Connection timeouts and limits.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{DEFAULT_HOST, DEFAULT_PORT, InspectorBuilder};
pub use core::Inspector;
pub use options::ConnectionOptions;
