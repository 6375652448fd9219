//! Error types for scanning and lookup.

use thiserror::Error;

use crate::frame::FrameError;

/// Result type for configuration and catalog operations.
pub type TaggerResult<T> = Result<T, TaggerError>;

/// Errors that can occur while setting up the tagger.
#[derive(Debug, Error)]
pub enum TaggerError {
    /// Catalog or config (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading a config or catalog file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A config value is out of range.
    #[error("Invalid config value for '{field}': {reason}")]
    InvalidConfig {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A catalog must hold at least one product.
    #[error("Product catalog is empty")]
    EmptyCatalog,
}

/// Failures of a single scan attempt.
///
/// Every variant is recovered by the controller. Most become a [`Notice`]
/// and return the scanner to idle; [`ScanError::is_retryable`] ones keep the
/// camera running so the user can capture again.
///
/// [`Notice`]: crate::Notice
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Camera permission was not granted.
    #[error("Camera permission denied")]
    PermissionDenied,

    /// No camera, or the user declined access to it.
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    /// The stream is open but has not produced a picture yet.
    #[error("Camera is still starting")]
    CameraWarmingUp,

    /// The scan finished without reading a barcode.
    #[error("No barcode detected")]
    NoBarcodeDetected,

    /// A frame could not be captured or decoded.
    #[error("Decode failed: {0}")]
    DecodeFailed(String),

    /// Lookup found nothing and the catalog is set to report misses.
    #[error("No product found for barcode {0}")]
    ProductNotFound(String),

    /// Anything else the platform threw at us.
    #[error("Scan error: {0}")]
    Unknown(String),
}

impl ScanError {
    /// Short, non-technical text shown to the user.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Camera permission is required to scan barcodes. Please allow access and try again."
            }
            Self::CameraUnavailable(_) => {
                "Couldn't access the camera. Check that one is connected and try again."
            }
            Self::CameraWarmingUp => "The camera is still starting. Try again in a moment.",
            Self::NoBarcodeDetected => "No barcode detected. Please try again.",
            Self::DecodeFailed(_) => "Couldn't read that barcode. Please try again.",
            Self::ProductNotFound(_) => "We don't know this product yet. Try another one.",
            Self::Unknown(_) => "Something went wrong while scanning. Please try again.",
        }
    }

    /// Short toast title.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Permission denied",
            Self::CameraUnavailable(_) => "Camera error",
            Self::CameraWarmingUp => "Camera starting",
            Self::NoBarcodeDetected => "No barcode found",
            Self::DecodeFailed(_) => "Scan failed",
            Self::ProductNotFound(_) => "Unknown product",
            Self::Unknown(_) => "Scan error",
        }
    }

    /// Whether a live camera session should survive this failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NoBarcodeDetected | Self::CameraWarmingUp)
    }
}

impl From<FrameError> for ScanError {
    fn from(err: FrameError) -> Self {
        Self::DecodeFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_non_technical() {
        let err = ScanError::CameraUnavailable("NotAllowedError: Permission denied".into());
        assert!(!err.user_message().contains("NotAllowedError"));
        assert!(err.to_string().contains("NotAllowedError"));
    }

    #[test]
    fn frame_errors_become_decode_failures() {
        let err: ScanError = FrameError::InvalidFrameData {
            expected: 16,
            actual: 3,
        }
        .into();
        assert!(matches!(err, ScanError::DecodeFailed(_)));
    }

    #[test]
    fn only_empty_frames_and_warm_up_are_retryable() {
        assert!(ScanError::NoBarcodeDetected.is_retryable());
        assert!(ScanError::CameraWarmingUp.is_retryable());
        assert!(!ScanError::DecodeFailed("camera stream stopped".into()).is_retryable());
        assert!(!ScanError::PermissionDenied.is_retryable());
        assert_eq!(ScanError::CameraWarmingUp.title(), "Camera starting");
    }

    #[test]
    fn invalid_config_names_the_field() {
        let err = TaggerError::InvalidConfig {
            field: "scan_delay_ms",
            reason: "too long".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid config value for 'scan_delay_ms': too long"
        );
    }
}
