//! Error type shared by every engine operation.

use image::ImageError;
use qrcode::types::QrError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("QR text must not be empty")]
    EmptyText,
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },
    #[error("Unknown blend mode: {0}")]
    UnknownMode(String),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("QR encode error: {0}")]
    Encode(#[from] QrError),
    #[error("Unsupported image format (only PNG and JPEG are accepted)")]
    UnsupportedFormat,
    #[error("Image error: {0}")]
    Image(#[from] ImageError),
}

impl EngineError {
    pub(crate) fn out_of_range<T: ToString>(field: &'static str, value: T, min: T, max: T) -> Self {
        Self::OutOfRange {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Whether the failure was caused by the caller's input rather than the
    /// encoder or codec.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::EmptyText
            | Self::OutOfRange { .. }
            | Self::UnknownMode(_)
            | Self::InvalidColor(_)
            | Self::UnsupportedFormat
            | Self::Encode(QrError::DataTooLong) => true,
            Self::Image(ImageError::Encoding(_) | ImageError::Parameter(_)) => false,
            Self::Image(_) => true,
            Self::Encode(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
