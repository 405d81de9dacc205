//! Event message types.
//!
//! Events are unsolicited notifications sent from the remote end over the
//! same socket as replies. They carry no `id`.
//!
//! # Typed Events
//!
//! | Method | Variant |
//! |--------|---------|
//! | `Runtime.consoleAPICalled` | [`ParsedEvent::ConsoleApiCalled`] |
//! | `Runtime.exceptionThrown` | [`ParsedEvent::ExceptionThrown`] |
//! | `Log.entryAdded` | [`ParsedEvent::LogEntryAdded`] |

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// Event
// ============================================================================

/// An event notification from remote end to local end.
///
/// # Format
///
/// ```json
/// {
///   "method": "Domain.eventName",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    /// Event name in `Domain.eventName` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,
}

impl Event {
    /// Creates an event.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Returns the domain name from the method.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let event = Event::new("Runtime.consoleAPICalled", json!({}));
    /// assert_eq!(event.domain(), "Runtime");
    /// ```
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.method.split('.').next().unwrap_or_default()
    }

    /// Returns the event name from the method.
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.method.split('.').nth(1).unwrap_or_default()
    }

    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        match self.method.as_str() {
            "Runtime.consoleAPICalled" => ParsedEvent::ConsoleApiCalled {
                kind: self.get_string_or("type", "log"),
                text: console_text(self.params.get("args")),
            },

            "Runtime.exceptionThrown" => {
                let details = self.params.get("exceptionDetails");
                ParsedEvent::ExceptionThrown {
                    text: details
                        .and_then(|d| d.get("text"))
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown error")
                        .to_string(),
                    description: details
                        .and_then(|d| d.get("exception"))
                        .and_then(|e| e.get("description"))
                        .and_then(Value::as_str)
                        .map(str::to_string),
                }
            }

            "Log.entryAdded" => {
                let entry = self.params.get("entry");
                let field = |key: &str| {
                    entry
                        .and_then(|e| e.get(key))
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                ParsedEvent::LogEntryAdded {
                    level: field("level"),
                    source: field("source"),
                    text: field("text"),
                }
            }

            _ => ParsedEvent::Unknown {
                method: self.method.clone(),
                params: self.params.clone(),
            },
        }
    }

    #[inline]
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.params
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
            .to_string()
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    /// `console.*` was called in the target.
    ConsoleApiCalled {
        /// Console method (`log`, `error`, `warning`, ...).
        kind: String,
        /// Arguments joined by spaces.
        text: String,
    },

    /// An uncaught exception was thrown in the target.
    ExceptionThrown {
        /// Summary text.
        text: String,
        /// Exception description (message and stack), when available.
        description: Option<String>,
    },

    /// A browser log entry was added.
    LogEntryAdded {
        /// Severity level.
        level: String,
        /// Log source (`javascript`, `network`, ...).
        source: String,
        /// Entry text.
        text: String,
    },

    /// Any other event.
    Unknown {
        /// Event method.
        method: String,
        /// Event params.
        params: Value,
    },
}

/// Joins console call arguments into one line.
///
/// Strings are taken verbatim, other values fall back to their
/// `value` and then their `description`.
fn console_text(args: Option<&Value>) -> String {
    let Some(args) = args.and_then(Value::as_array) else {
        return String::new();
    };

    args.iter()
        .map(|arg| match arg.get("value") {
            Some(Value::String(s)) => s.clone(),
            Some(value) if !value.is_null() => value.to_string(),
            _ => arg
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Tests
// ============================================================================
