//! Platform collaborators the scanner talks to.
//!
//! The controller never touches a camera, a plugin or a clock directly. Each
//! host (the browser app, the terminal, tests) supplies implementations of
//! these traits. Everything runs on a single-threaded event loop, so the
//! async traits are `?Send`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Frame, Notice, Product, ScanError, ScanState};

/// Camera permission as reported by the native shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// Full access.
    Granted,
    /// Restricted access that still allows capture (iOS "limited").
    Limited,
    /// The user said no.
    Denied,
    /// The platform could not tell.
    Unknown,
}

impl PermissionStatus {
    /// Whether a scan may proceed.
    #[must_use]
    pub const fn is_authorized(self) -> bool {
        matches!(self, Self::Granted | Self::Limited)
    }

    /// Parse the status strings plugins report. Unrecognized values map to
    /// [`PermissionStatus::Unknown`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "granted" => Self::Granted,
            "limited" => Self::Limited,
            "denied" => Self::Denied,
            _ => Self::Unknown,
        }
    }
}

/// Which camera to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    /// Rear camera, the one pointed at products.
    #[default]
    Back,
    /// Selfie camera.
    Front,
}

impl CameraFacing {
    /// Value for the `facingMode` media constraint.
    #[must_use]
    pub const fn facing_mode(self) -> &'static str {
        match self {
            Self::Back => "environment",
            Self::Front => "user",
        }
    }
}

/// What the runtime can do, as seen when a scan is requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Running inside the native mobile shell.
    pub native_shell: bool,
    /// The device reports barcode scanning support.
    pub scanning_supported: bool,
    /// A media-capture API is present.
    pub media_capture: bool,
}

/// One-shot native barcode scanner (the mobile shell's plugin).
#[async_trait(?Send)]
pub trait NativeScanner {
    /// Whether the device can scan at all.
    async fn is_supported(&self) -> bool;

    /// Ask for camera permission.
    async fn request_permission(&self) -> Result<PermissionStatus, ScanError>;

    /// Show the platform scanner and wait until the user aligns a barcode or
    /// cancels. Returns every decoded value, possibly none.
    async fn scan(&self) -> Result<Vec<String>, ScanError>;
}

/// Access to live camera streams.
#[async_trait(?Send)]
pub trait MediaCapture {
    /// Whether the runtime exposes a media-capture API.
    fn is_available(&self) -> bool;

    /// Open a video stream on the given camera.
    async fn open(&self, facing: CameraFacing) -> Result<Box<dyn VideoStream>, ScanError>;
}

/// A live video stream backed by one or more hardware tracks.
pub trait VideoStream {
    /// Grab the current frame.
    ///
    /// # Errors
    ///
    /// Fails if the stream has no picture yet or was stopped.
    fn capture_frame(&mut self) -> Result<Frame, ScanError>;

    /// Number of hardware tracks in the stream.
    fn track_count(&self) -> usize;

    /// Stop every track, releasing the camera.
    fn stop_tracks(&mut self);
}

/// Decodes a barcode out of a still frame.
pub trait FrameDecoder {
    /// The decoded text, or `None` if no barcode is visible.
    fn decode(&self, frame: &Frame) -> Option<String>;
}

/// Source of the artificial delays in the simulated scan.
#[async_trait(?Send)]
pub trait Timer {
    /// Suspend for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Timer backed by the tokio time driver.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Receives everything the scanner wants to show.
pub trait ScanObserver {
    /// The scan state changed.
    fn on_state(&mut self, _state: ScanState) {}

    /// A toast should be shown.
    fn on_notice(&mut self, _notice: &Notice) {}

    /// A scan succeeded. Called exactly once per successful scan.
    fn on_product(&mut self, product: Product);
}

/// The set of devices a host provides.
///
/// `native` is `None` outside the native shell; `media` is `None` where no
/// media-capture API exists.
pub struct ScanDevices {
    /// The mobile shell's scanner plugin.
    pub native: Option<Box<dyn NativeScanner>>,
    /// Browser camera access.
    pub media: Option<Box<dyn MediaCapture>>,
    /// Frame decoder for the browser path.
    pub decoder: Box<dyn FrameDecoder>,
    /// Clock for the simulated path.
    pub timer: Box<dyn Timer>,
}

impl std::fmt::Debug for ScanDevices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanDevices")
            .field("native", &self.native.is_some())
            .field("media", &self.media.is_some())
            .finish_non_exhaustive()
    }
}
