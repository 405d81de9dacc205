//! Viewport snapshot capture.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::Connection;

// ============================================================================
// ImageFormat
// ============================================================================

/// Image encoding of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// PNG (lossless).
    #[default]
    Png,
    /// JPEG with quality (0-100).
    Jpeg(u8),
}

impl ImageFormat {
    /// Creates JPEG format, clamping quality to 100.
    #[inline]
    #[must_use]
    pub fn jpeg(quality: u8) -> Self {
        Self::Jpeg(quality.min(100))
    }

    /// Returns the MIME type.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg(_) => "image/jpeg",
        }
    }

    /// Returns the file extension.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg(_) => "jpg",
        }
    }

    fn params(&self) -> Value {
        let mut params = Map::new();
        match self {
            Self::Png => {
                params.insert("format".into(), json!("png"));
            }
            Self::Jpeg(quality) => {
                params.insert("format".into(), json!("jpeg"));
                params.insert("quality".into(), json!((*quality).min(100)));
            }
        }
        Value::Object(params)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// A captured image, kept base64-encoded as received.
///
/// Writing it anywhere is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    format: ImageFormat,
    data: String,
}

impl Snapshot {
    /// Returns the image format.
    #[inline]
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Returns the base64 payload.
    #[inline]
    #[must_use]
    pub fn base64(&self) -> &str {
        &self.data
    }

    /// Decodes the image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the payload is not valid base64.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        Base64Standard
            .decode(&self.data)
            .map_err(|e| Error::protocol(format!("Snapshot payload is not base64: {e}")))
    }
}

// ============================================================================
// Connection - Snapshot
// ============================================================================

impl Connection {
    /// Captures the visible viewport.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let snapshot = connection.capture_snapshot(ImageFormat::Png).await?;
    /// std::fs::write("page.png", snapshot.bytes()?)?;
    /// ```
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the reply carries no `data`
    /// - any error from [`Connection::call`]
    pub async fn capture_snapshot(&self, format: ImageFormat) -> Result<Snapshot> {
        debug!(?format, "Capturing snapshot");

        let response = self.call("Page.captureScreenshot", format.params()).await?;
        let data = response
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::protocol(format!("Snapshot reply missing data field: {response}")))?;

        Ok(Snapshot {
            format,
            data: data.to_string(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
