//! Script evaluation in the target context.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::Connection;

// ============================================================================
// EvaluateOptions
// ============================================================================

/// Options for [`Connection::evaluate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluateOptions {
    /// Wait for a returned promise to settle.
    pub await_promise: bool,
    /// Return the value itself instead of a remote object reference.
    pub return_by_value: bool,
    /// Overrides the connection's call timeout.
    pub timeout: Option<Duration>,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            await_promise: false,
            return_by_value: true,
            timeout: None,
        }
    }
}

impl EvaluateOptions {
    /// Creates default options (by value, no promise awaiting).
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether a returned promise is awaited.
    #[inline]
    #[must_use]
    pub fn await_promise(mut self, await_promise: bool) -> Self {
        self.await_promise = await_promise;
        self
    }

    /// Sets whether the result is returned by value.
    #[inline]
    #[must_use]
    pub fn return_by_value(mut self, return_by_value: bool) -> Self {
        self.return_by_value = return_by_value;
        self
    }

    /// Sets a per-call timeout.
    #[inline]
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ============================================================================
// Connection - Script Evaluation
// ============================================================================

impl Connection {
    /// Evaluates an expression and returns its value.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let title = connection.evaluate("document.title").await?;
    /// ```
    ///
    /// # Errors
    ///
    /// - [`Error::Script`] if the expression throws
    /// - any error from [`Connection::call`]
    pub async fn evaluate(&self, expression: &str) -> Result<Value> {
        self.evaluate_with(expression, EvaluateOptions::new()).await
    }

    /// Evaluates an expression and awaits the promise it returns.
    ///
    /// # Errors
    ///
    /// See [`evaluate`](Self::evaluate).
    pub async fn evaluate_async(&self, expression: &str) -> Result<Value> {
        self.evaluate_with(expression, EvaluateOptions::new().await_promise(true))
            .await
    }

    /// Evaluates an expression with explicit options.
    ///
    /// With `return_by_value` the plain value is returned (`null` for
    /// `undefined`); otherwise the raw remote object descriptor.
    ///
    /// # Errors
    ///
    /// See [`evaluate`](Self::evaluate).
    pub async fn evaluate_with(&self, expression: &str, options: EvaluateOptions) -> Result<Value> {
        debug!(
            expression_len = expression.len(),
            await_promise = options.await_promise,
            "Evaluating expression"
        );

        let params = json!({
            "expression": expression,
            "awaitPromise": options.await_promise,
            "returnByValue": options.return_by_value,
        });

        let call_timeout = options.timeout.unwrap_or(self.options().call_timeout);
        let response = self
            .call_with_timeout("Runtime.evaluate", params, call_timeout)
            .await?;

        if let Some(details) = response.get("exceptionDetails") {
            return Err(Error::script(exception_message(details)));
        }

        let remote_object = response.get("result").cloned().unwrap_or(Value::Null);
        if !options.return_by_value {
            return Ok(remote_object);
        }

        Ok(remote_object.get("value").cloned().unwrap_or(Value::Null))
    }
}

/// Extracts the most useful message from `exceptionDetails`.
fn exception_message(details: &Value) -> String {
    details
        .get("exception")
        .and_then(|exception| exception.get("description"))
        .and_then(Value::as_str)
        .or_else(|| details.get("text").and_then(Value::as_str))
        .unwrap_or("Uncaught exception")
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================
