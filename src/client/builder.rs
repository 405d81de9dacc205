//! Builder pattern for inspector configuration.
//!
//! # Example
//!
//! ```ignore
//! use inspector_rpc::Inspector;
//!
//! let inspector = Inspector::builder()
//!     .host("127.0.0.1")
//!     .port(9222)
//!     .build()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::discovery::{DEFAULT_HTTP_TIMEOUT, TargetDirectory};
use crate::error::{Error, Result};

use super::core::Inspector;
use super::options::ConnectionOptions;

// ============================================================================
// Constants
// ============================================================================

/// Default discovery host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default discovery port.
pub const DEFAULT_PORT: u16 = 9222;

// ============================================================================
// InspectorBuilder
// ============================================================================

/// Builder for configuring an [`Inspector`].
///
/// Use [`Inspector::builder()`] to create one.
#[derive(Debug, Clone)]
pub struct InspectorBuilder {
    host: String,
    port: u16,
    /// Full endpoint URL; overrides host and port.
    endpoint: Option<String>,
    http_timeout: Duration,
    connection_options: ConnectionOptions,
}

impl Default for InspectorBuilder {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            endpoint: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            connection_options: ConnectionOptions::default(),
        }
    }
}

// ============================================================================
// InspectorBuilder Implementation
// ============================================================================

impl InspectorBuilder {
    /// Creates a builder targeting `127.0.0.1:9222`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the discovery host.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the discovery port.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the full discovery endpoint, e.g. `http://10.0.0.5:9333`.
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Sets the timeout for discovery requests.
    #[inline]
    #[must_use]
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Sets the options used for every opened connection.
    #[inline]
    #[must_use]
    pub fn connection_options(mut self, options: ConnectionOptions) -> Self {
        self.connection_options = options;
        self
    }

    /// Builds the inspector with validation.
    ///
    /// No network traffic happens here.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the host is empty, the port is 0 or a timeout is zero
    /// - [`Error::InvalidArgument`] if the endpoint is not an HTTP URL
    pub fn build(self) -> Result<Inspector> {
        self.connection_options.validate()?;
        if self.http_timeout.is_zero() {
            return Err(Error::config("http_timeout must be greater than zero"));
        }

        let endpoint = self.resolve_endpoint()?;
        let directory = TargetDirectory::with_timeout(&endpoint, self.http_timeout)?;

        Ok(Inspector::new(directory, self.connection_options))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl InspectorBuilder {
    fn resolve_endpoint(&self) -> Result<String> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.clone());
        }

        if self.host.trim().is_empty() {
            return Err(Error::config(
                "Discovery host is empty. Use .host() or .endpoint() to set it.",
            ));
        }
        if self.port == 0 {
            return Err(Error::config("Discovery port must be non-zero"));
        }

        Ok(format!("http://{}:{}", self.host, self.port))
    }
}

// ============================================================================
// Tests
// ============================================================================
