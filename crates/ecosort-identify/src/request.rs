use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::IdentifyError;

/// A captured image, carried as base64 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    captured: String,
}

impl ImagePayload {
    /// Accepts plain base64 or a `data:<mime>;base64,` URI.
    pub fn from_base64(captured: impl Into<String>) -> Result<Self, IdentifyError> {
        let captured = captured.into();
        let payload = Self { captured };
        let stripped = payload.stripped();
        if stripped.is_empty() {
            return Err(IdentifyError::InvalidInput("image payload is empty".to_string()));
        }
        let decoded = STANDARD
            .decode(stripped)
            .map_err(|error| IdentifyError::InvalidInput(format!("image is not base64: {error}")))?;
        if decoded.is_empty() {
            return Err(IdentifyError::InvalidInput("image payload is empty".to_string()));
        }
        Ok(payload)
    }

    /// The payload as captured, data-URI prefix included if there was one.
    pub fn as_captured(&self) -> &str {
        &self.captured
    }

    /// The bare base64 data without any data-URI prefix.
    pub fn stripped(&self) -> &str {
        match self.captured.split_once(',') {
            Some((_, data)) => data.trim(),
            None => self.captured.trim(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.captured.len()
    }
}

/// What the user asked to have identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentificationRequest {
    ImageCapture { image: ImagePayload },
    BarcodeCapture { image: ImagePayload },
    TextQuery { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Image,
    Barcode,
    Text,
}

impl IdentificationRequest {
    pub fn image(base64: impl Into<String>) -> Result<Self, IdentifyError> {
        Ok(Self::ImageCapture {
            image: ImagePayload::from_base64(base64)?,
        })
    }

    pub fn barcode(base64: impl Into<String>) -> Result<Self, IdentifyError> {
        Ok(Self::BarcodeCapture {
            image: ImagePayload::from_base64(base64)?,
        })
    }

    pub fn text(query: impl AsRef<str>) -> Result<Self, IdentifyError> {
        let text = query.as_ref().trim();
        if text.is_empty() {
            return Err(IdentifyError::InvalidInput("search query is empty".to_string()));
        }
        Ok(Self::TextQuery {
            text: text.to_string(),
        })
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            Self::ImageCapture { .. } => RequestKind::Image,
            Self::BarcodeCapture { .. } => RequestKind::Barcode,
            Self::TextQuery { .. } => RequestKind::Text,
        }
    }
}
