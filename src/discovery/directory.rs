//! Discovery endpoint client.
//!
//! Queries the HTTP endpoint that lists inspectable targets.
//!
//! # Endpoints
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | `GET` | `/json` | [`TargetDirectory::list_targets`] |
//! | `GET` | `/json/version` | [`TargetDirectory::version`] |
//! | `PUT` | `/json/new?<url>` | [`TargetDirectory::new_target`] |
//! | `GET` | `/json/activate/<id>` | [`TargetDirectory::activate_target`] |
//! | `GET` | `/json/close/<id>` | [`TargetDirectory::close_target`] |

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, Instant};

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result, saturating_millis};
use crate::identifiers::TargetId;

use super::target::{BrowserVersion, Target, TargetPredicate};

// ============================================================================
// Constants
// ============================================================================

/// Default request timeout for discovery queries.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// TargetDirectory
// ============================================================================

/// Read-mostly client for the discovery endpoint.
///
/// No call retries implicitly; [`wait_for_target`](Self::wait_for_target)
/// is an explicit poll loop with an overall deadline.
///
/// # Example
///
/// ```ignore
/// let directory = TargetDirectory::new("http://127.0.0.1:9222")?;
/// let page = directory
///     .find_target(TargetFilter::new().url_contains("google.com"))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct TargetDirectory {
    client: Client,
    endpoint: Url,
}

impl TargetDirectory {
    /// Creates a directory for an `http://host:port` endpoint.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the endpoint is not an HTTP URL
    /// - [`Error::Http`] if the HTTP client cannot be built
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_HTTP_TIMEOUT)
    }

    /// Creates a directory with a custom request timeout.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).no_proxy().build()?;
        Self::with_client(endpoint, client)
    }

    /// Creates a directory using a preconfigured HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the endpoint is not an HTTP URL.
    pub fn with_client(endpoint: &str, client: Client) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::invalid_argument(format!("Invalid endpoint {endpoint}: {e}")))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::invalid_argument(format!(
                "Discovery endpoint must use http:// or https://, got {endpoint}"
            )));
        }

        Ok(Self { client, endpoint })
    }

    /// Returns the endpoint base URL.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

// ============================================================================
// TargetDirectory - Queries
// ============================================================================

impl TargetDirectory {
    /// Lists the currently inspectable targets.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the endpoint is unreachable
    /// - [`Error::Protocol`] if the body is not a target list
    pub async fn list_targets(&self) -> Result<Vec<Target>> {
        let targets: Vec<Target> = self.get_json(Method::GET, "/json").await?;
        debug!(count = targets.len(), "Listed targets");
        Ok(targets)
    }

    /// Returns the first target matching the predicate.
    ///
    /// # Errors
    ///
    /// See [`list_targets`](Self::list_targets).
    pub async fn find_target<P>(&self, predicate: P) -> Result<Option<Target>>
    where
        P: TargetPredicate,
    {
        self.find_first(&predicate).await
    }

    /// Returns every target matching the predicate.
    ///
    /// # Errors
    ///
    /// See [`list_targets`](Self::list_targets).
    pub async fn find_targets<P>(&self, predicate: P) -> Result<Vec<Target>>
    where
        P: TargetPredicate,
    {
        let targets = self.list_targets().await?;
        Ok(targets
            .into_iter()
            .filter(|target| predicate.matches(target))
            .collect())
    }

    /// Polls until a matching target appears.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if nothing matches before `timeout` elapses
    /// - any error from [`list_targets`](Self::list_targets)
    pub async fn wait_for_target<P>(
        &self,
        predicate: P,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Target>
    where
        P: TargetPredicate,
    {
        // None when the timeout is too large to represent: poll until found.
        let deadline = Instant::now().checked_add(timeout);

        loop {
            if let Some(target) = self.find_first(&predicate).await? {
                return Ok(target);
            }

            let mut pause = poll_interval;
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return Err(Error::timeout(
                        "waiting for matching target",
                        saturating_millis(timeout),
                    ));
                }
                pause = pause.min(deadline - now);
            }

            trace!("No matching target yet");
            tokio::time::sleep(pause).await;
        }
    }

    /// Returns browser version info and the browser-level socket address.
    ///
    /// # Errors
    ///
    /// See [`list_targets`](Self::list_targets).
    pub async fn version(&self) -> Result<BrowserVersion> {
        self.get_json(Method::GET, "/json/version").await
    }

    async fn find_first<P>(&self, predicate: &P) -> Result<Option<Target>>
    where
        P: TargetPredicate,
    {
        let targets = self.list_targets().await?;
        Ok(targets.into_iter().find(|target| predicate.matches(target)))
    }
}

// ============================================================================
// TargetDirectory - Target Management
// ============================================================================

impl TargetDirectory {
    /// Opens a new page at `url`.
    ///
    /// # Errors
    ///
    /// See [`list_targets`](Self::list_targets).
    pub async fn new_target(&self, url: &str) -> Result<Target> {
        let path = format!("/json/new?{}", urlencoding::encode(url));
        let target: Target = self.get_json(Method::PUT, &path).await?;
        debug!(target_id = %target.id, url, "Opened target");
        Ok(target)
    }

    /// Brings a target to the foreground.
    ///
    /// # Errors
    ///
    /// See [`list_targets`](Self::list_targets).
    pub async fn activate_target(&self, id: &TargetId) -> Result<()> {
        self.get_text(Method::GET, &format!("/json/activate/{id}"))
            .await?;
        debug!(target_id = %id, "Activated target");
        Ok(())
    }

    /// Closes a target.
    ///
    /// # Errors
    ///
    /// See [`list_targets`](Self::list_targets).
    pub async fn close_target(&self, id: &TargetId) -> Result<()> {
        self.get_text(Method::GET, &format!("/json/close/{id}"))
            .await?;
        debug!(target_id = %id, "Closed target");
        Ok(())
    }
}

// ============================================================================
// TargetDirectory - HTTP
// ============================================================================

impl TargetDirectory {
    async fn get_json<T>(&self, method: Method, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.get_text(method, path).await?;
        serde_json::from_str(&body)
            .map_err(|e| Error::protocol(format!("Malformed response from {path}: {e}")))
    }

    async fn get_text(&self, method: Method, path: &str) -> Result<String> {
        let url = self
            .endpoint
            .join(path)
            .map_err(|e| Error::invalid_argument(format!("Invalid path {path}: {e}")))?;

        trace!(%method, %url, "Discovery request");

        let response = self
            .client
            .request(method, url.clone())
            .send()
            .await
            .map_err(|e| Error::connection(format!("Discovery endpoint {url} unreachable: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::connection(format!("Failed to read response from {url}: {e}")))?;

        if !status.is_success() {
            return Err(Error::protocol(format!(
                "{url} returned HTTP {status}: {}",
                body.trim()
            )));
        }

        Ok(body)
    }
}

// ============================================================================
// Tests
// ============================================================================
