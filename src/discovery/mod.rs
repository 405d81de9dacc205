//! Target discovery.
//!
//! Finds inspectable contexts (pages, background workers, iframes) through
//! the browser's HTTP discovery endpoint.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `directory` | HTTP client for `/json` endpoints |
//! | `target` | Target descriptors, filters and predicates |

// ============================================================================
// Submodules
// ============================================================================

/// HTTP client for the discovery endpoint.
pub mod directory;

/// Target descriptors and matching.
pub mod target;

// ============================================================================
// Re-exports
// ============================================================================

pub use directory::{DEFAULT_HTTP_TIMEOUT, TargetDirectory};
pub use target::{BrowserVersion, Target, TargetFilter, TargetPredicate, TargetType};
