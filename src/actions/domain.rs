//! Domain enabling and target focus.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::Connection;

impl Connection {
    /// Enables event delivery for a protocol domain (`Runtime`, `Log`, ...).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `domain` is empty or contains `.`
    /// - any error from [`Connection::call`]
    pub async fn enable_domain(&self, domain: &str) -> Result<()> {
        if domain.is_empty() || domain.contains('.') {
            return Err(Error::invalid_argument(format!("Invalid domain name: {domain:?}")));
        }

        self.call(&format!("{domain}.enable"), Value::Null).await?;
        debug!(domain, "Domain enabled");
        Ok(())
    }

    /// Brings the attached page to the foreground.
    ///
    /// # Errors
    ///
    /// Any error from [`Connection::call`].
    pub async fn bring_to_front(&self) -> Result<()> {
        self.call("Page.bringToFront", Value::Null).await?;
        Ok(())
    }
}
