//! Target descriptors and matching.
//!
//! A [`Target`] is a snapshot of one inspectable context as listed by the
//! discovery endpoint. It goes stale when the context navigates or
//! closes; re-query instead of caching.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identifiers::TargetId;

// ============================================================================
// TargetType
// ============================================================================

/// Kind of inspectable context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetType {
    /// Top-level page (tab).
    Page,
    /// Extension background page.
    BackgroundPage,
    /// Service worker, including extension background workers.
    ServiceWorker,
    /// Embedded frame with its own process.
    Iframe,
    /// Dedicated worker.
    Worker,
    /// Shared worker.
    SharedWorker,
    /// The browser itself.
    Browser,
    /// Any type this crate does not name.
    Other(String),
}

impl TargetType {
    /// Returns the wire name of this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Page => "page",
            Self::BackgroundPage => "background_page",
            Self::ServiceWorker => "service_worker",
            Self::Iframe => "iframe",
            Self::Worker => "worker",
            Self::SharedWorker => "shared_worker",
            Self::Browser => "browser",
            Self::Other(name) => name,
        }
    }

    /// Returns `true` for extension background contexts.
    #[inline]
    #[must_use]
    pub fn is_background(&self) -> bool {
        matches!(self, Self::BackgroundPage | Self::ServiceWorker)
    }
}

impl From<String> for TargetType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "page" => Self::Page,
            "background_page" => Self::BackgroundPage,
            "service_worker" => Self::ServiceWorker,
            "iframe" => Self::Iframe,
            "worker" => Self::Worker,
            "shared_worker" => Self::SharedWorker,
            "browser" => Self::Browser,
            _ => Self::Other(name),
        }
    }
}

impl From<TargetType> for String {
    fn from(target_type: TargetType) -> Self {
        match target_type {
            TargetType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Target
// ============================================================================

/// One entry of `GET /json`.
///
/// # Format
///
/// ```json
/// {
///   "id": "079471019CB0604A35B05F739AA50908",
///   "type": "page",
///   "title": "Google",
///   "url": "https://www.google.com/",
///   "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/0794..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Target identifier.
    pub id: TargetId,

    /// Context kind.
    #[serde(rename = "type")]
    pub target_type: TargetType,

    /// Current URL.
    #[serde(default)]
    pub url: String,

    /// Current title.
    #[serde(default)]
    pub title: String,

    /// Per-target socket address. Absent while another client is attached.
    #[serde(
        rename = "webSocketDebuggerUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub socket_address: Option<String>,

    /// Owning target for iframes and workers.
    #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TargetId>,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Target {
    /// Returns the socket address to open a connection with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the descriptor carries no socket address.
    pub fn ws_url(&self) -> Result<&str> {
        self.socket_address.as_deref().ok_or_else(|| {
            Error::protocol(format!(
                "Target {} has no webSocketDebuggerUrl (already attached?)",
                self.id
            ))
        })
    }
}

// ============================================================================
// TargetPredicate
// ============================================================================

/// Pure match over target fields.
///
/// Implemented by [`TargetFilter`], [`TargetType`] and any
/// `Fn(&Target) -> bool`.
pub trait TargetPredicate {
    /// Returns `true` if the target matches.
    fn matches(&self, target: &Target) -> bool;
}

impl<F> TargetPredicate for F
where
    F: Fn(&Target) -> bool,
{
    fn matches(&self, target: &Target) -> bool {
        self(target)
    }
}

impl TargetPredicate for TargetType {
    fn matches(&self, target: &Target) -> bool {
        target.target_type == *self
    }
}

// ============================================================================
// TargetFilter
// ============================================================================

/// Conjunction of substring and type conditions.
///
/// An empty filter matches every target.
///
/// # Example
///
/// ```ignore
/// let filter = TargetFilter::new()
///     .target_type(TargetType::Page)
///     .url_contains("google.com");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetFilter {
    /// Required substring of the URL.
    pub url_contains: Option<String>,
    /// Required substring of the title.
    pub title_contains: Option<String>,
    /// Required type.
    pub target_type: Option<TargetType>,
}

impl TargetFilter {
    /// Creates a filter that matches everything.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the URL to contain `needle`.
    #[inline]
    #[must_use]
    pub fn url_contains(mut self, needle: impl Into<String>) -> Self {
        self.url_contains = Some(needle.into());
        self
    }

    /// Requires the title to contain `needle`.
    #[inline]
    #[must_use]
    pub fn title_contains(mut self, needle: impl Into<String>) -> Self {
        self.title_contains = Some(needle.into());
        self
    }

    /// Requires the given type.
    #[inline]
    #[must_use]
    pub fn target_type(mut self, target_type: TargetType) -> Self {
        self.target_type = Some(target_type);
        self
    }
}

impl TargetPredicate for TargetFilter {
    fn matches(&self, target: &Target) -> bool {
        self.url_contains
            .as_deref()
            .is_none_or(|needle| target.url.contains(needle))
            && self
                .title_contains
                .as_deref()
                .is_none_or(|needle| target.title.contains(needle))
            && self
                .target_type
                .as_ref()
                .is_none_or(|target_type| target.target_type == *target_type)
    }
}

// ============================================================================
// BrowserVersion
// ============================================================================

/// Body of `GET /json/version`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BrowserVersion {
    /// Product name and version.
    #[serde(rename = "Browser", default)]
    pub browser: String,

    /// Protocol version.
    #[serde(rename = "Protocol-Version", default)]
    pub protocol_version: String,

    /// User agent string.
    #[serde(rename = "User-Agent", default)]
    pub user_agent: String,

    /// Browser-level socket address.
    #[serde(rename = "webSocketDebuggerUrl")]
    pub socket_address: String,
}

// ============================================================================
// Tests
// ============================================================================
