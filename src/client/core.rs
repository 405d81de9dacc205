//! Inspector entry point.
//!
//! [`Inspector`] ties discovery to connection opening: find a target
//! through the HTTP endpoint, then attach to its socket.
//!
//! # Example
//!
//! ```ignore
//! use inspector_rpc::{Inspector, TargetFilter};
//!
//! let inspector = Inspector::builder().port(9222).build()?;
//! let target = inspector
//!     .find_target(TargetFilter::new().url_contains("options.html"))
//!     .await?
//!     .expect("options page open");
//!
//! let connection = inspector.connect(&target).await?;
//! connection.enable_domain("Runtime").await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::discovery::{BrowserVersion, Target, TargetDirectory, TargetPredicate};
use crate::error::Result;
use crate::transport::Connection;

use super::builder::InspectorBuilder;
use super::options::ConnectionOptions;

// ============================================================================
// Constants
// ============================================================================

/// Poll interval used by [`Inspector::wait_for_target`].
const TARGET_POLL_INTERVAL: Duration = Duration::from_millis(250);

// ============================================================================
// Types
// ============================================================================

struct InspectorInner {
    directory: TargetDirectory,
    connection_options: ConnectionOptions,
}

// ============================================================================
// Inspector
// ============================================================================

/// Discovery client plus connection factory.
///
/// Cheap to clone. Holds no open sockets; each [`connect`](Self::connect)
/// returns an independent [`Connection`].
#[derive(Clone)]
pub struct Inspector {
    inner: Arc<InspectorInner>,
}

impl fmt::Debug for Inspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inspector")
            .field("endpoint", &self.inner.directory.endpoint().as_str())
            .field("connection_options", &self.inner.connection_options)
            .finish()
    }
}

// ============================================================================
// Inspector - Public API
// ============================================================================

impl Inspector {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> InspectorBuilder {
        InspectorBuilder::new()
    }

    pub(crate) fn new(directory: TargetDirectory, connection_options: ConnectionOptions) -> Self {
        Self {
            inner: Arc::new(InspectorInner {
                directory,
                connection_options,
            }),
        }
    }

    /// Returns the discovery client.
    #[inline]
    #[must_use]
    pub fn directory(&self) -> &TargetDirectory {
        &self.inner.directory
    }

    /// Returns the options applied to opened connections.
    #[inline]
    #[must_use]
    pub fn connection_options(&self) -> &ConnectionOptions {
        &self.inner.connection_options
    }

    /// Lists inspectable targets.
    ///
    /// # Errors
    ///
    /// See [`TargetDirectory::list_targets`].
    pub async fn targets(&self) -> Result<Vec<Target>> {
        self.inner.directory.list_targets().await
    }

    /// Returns the first target matching the predicate.
    ///
    /// # Errors
    ///
    /// See [`TargetDirectory::list_targets`].
    pub async fn find_target<P>(&self, predicate: P) -> Result<Option<Target>>
    where
        P: TargetPredicate,
    {
        self.inner.directory.find_target(predicate).await
    }

    /// Polls until a matching target appears.
    ///
    /// # Errors
    ///
    /// See [`TargetDirectory::wait_for_target`].
    pub async fn wait_for_target<P>(&self, predicate: P, timeout: Duration) -> Result<Target>
    where
        P: TargetPredicate,
    {
        self.inner
            .directory
            .wait_for_target(predicate, timeout, TARGET_POLL_INTERVAL)
            .await
    }

    /// Returns browser version info.
    ///
    /// # Errors
    ///
    /// See [`TargetDirectory::version`].
    pub async fn version(&self) -> Result<BrowserVersion> {
        self.inner.directory.version().await
    }

    /// Opens a new page and returns its descriptor.
    ///
    /// # Errors
    ///
    /// See [`TargetDirectory::new_target`].
    pub async fn new_target(&self, url: &str) -> Result<Target> {
        self.inner.directory.new_target(url).await
    }
}

// ============================================================================
// Inspector - Connections
// ============================================================================

impl Inspector {
    /// Opens a connection to a target's socket.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`](crate::Error::Protocol) if the target has no socket address
    /// - any error from [`Connection::open_with`]
    pub async fn connect(&self, target: &Target) -> Result<Connection> {
        let url = target.ws_url()?;
        let connection = Connection::open_with(url, self.inner.connection_options).await?;
        info!(target_id = %target.id, target_type = %target.target_type, "Attached to target");
        Ok(connection)
    }

    /// Opens a connection to the browser-level socket.
    ///
    /// # Errors
    ///
    /// - any error from [`TargetDirectory::version`]
    /// - any error from [`Connection::open_with`]
    pub async fn connect_browser(&self) -> Result<Connection> {
        let version = self.inner.directory.version().await?;
        let connection =
            Connection::open_with(&version.socket_address, self.inner.connection_options).await?;
        info!(browser = %version.browser, "Attached to browser");
        Ok(connection)
    }
}
