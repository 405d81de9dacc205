//! Connection configuration.
//!
//! Timeouts and limits applied to every [`Connection`](crate::Connection)
//! opened with these options.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use inspector_rpc::ConnectionOptions;
//!
//! let options = ConnectionOptions::new()
//!     .with_call_timeout(Duration::from_secs(5))
//!     .with_max_pending(64);
//!
//! options.validate()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for a call without an explicit override.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for the WebSocket handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default limit of simultaneously pending calls.
pub const DEFAULT_MAX_PENDING: usize = 512;

/// Default period of the expired-call sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// ConnectionOptions
// ============================================================================

/// Per-connection timeouts and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Timeout applied by [`Connection::call`](crate::Connection::call).
    pub call_timeout: Duration,

    /// Timeout for opening the socket.
    pub connect_timeout: Duration,

    /// Calls beyond this many pending fail with [`Error::Protocol`].
    pub max_pending: usize,

    /// How often the event loop rejects calls whose deadline passed
    /// without anyone awaiting them.
    pub sweep_interval: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ConnectionOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_pending: DEFAULT_MAX_PENDING,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ConnectionOptions {
    /// Sets the default call timeout.
    #[inline]
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Sets the handshake timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the pending call limit.
    #[inline]
    #[must_use]
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    /// Sets the expired-call sweep period.
    #[inline]
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ConnectionOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a timeout, the sweep interval, or the
    /// pending limit is zero.
    pub fn validate(&self) -> Result<()> {
        if self.call_timeout.is_zero() {
            return Err(Error::config("Call timeout must be greater than zero"));
        }
        if self.connect_timeout.is_zero() {
            return Err(Error::config("Connect timeout must be greater than zero"));
        }
        if self.sweep_interval.is_zero() {
            return Err(Error::config("Sweep interval must be greater than zero"));
        }
        if self.max_pending == 0 {
            return Err(Error::config("Pending call limit must be greater than zero"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConnectionOptions::default();
        assert_eq!(options.call_timeout, Duration::from_secs(10));
        assert_eq!(options.connect_timeout, Duration::from_secs(10));
        assert_eq!(options.max_pending, 512);
        assert_eq!(options.sweep_interval, Duration::from_secs(1));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let options = ConnectionOptions::new()
            .with_call_timeout(Duration::from_millis(250))
            .with_connect_timeout(Duration::from_secs(2))
            .with_max_pending(8)
            .with_sweep_interval(Duration::from_millis(50));

        assert_eq!(options.call_timeout, Duration::from_millis(250));
        assert_eq!(options.connect_timeout, Duration::from_secs(2));
        assert_eq!(options.max_pending, 8);
        assert_eq!(options.sweep_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_validate_rejects_zero() {
        let zero_timeout = ConnectionOptions::new().with_call_timeout(Duration::ZERO);
        assert!(matches!(zero_timeout.validate(), Err(Error::Config { .. })));

        let zero_pending = ConnectionOptions::new().with_max_pending(0);
        assert!(matches!(zero_pending.validate(), Err(Error::Config { .. })));

        let zero_sweep = ConnectionOptions::new().with_sweep_interval(Duration::ZERO);
        assert!(zero_sweep.validate().is_err());
    }
}
