//! # Scan Acquisition Controller
//!
//! Drives one scan at a time from the tap on the scan button to a
//! [`Product`] handed to the [`ScanObserver`].
//!
//! ```text
//!            start_scan                    lookup ok
//!   Idle ───────────────► Scanning ───────────────────► Complete
//!    ▲                       │                             │
//!    │      any failure      │            reset / unmount  │
//!    └───────────────────────┴─────────────────────────────┘
//! ```
//!
//! The strategy is picked on every `start_scan`:
//!
//! - **Native**: permission request, then the plugin's one-shot scan.
//! - **Browser camera**: the stream opens and stays live; each
//!   `capture_frame` call decodes a single frame.
//! - **Simulated**: two fixed delays, then a sample product.
//!
//! Failures never escape. They release the camera, drop the state back to
//! `Idle` and surface as a [`Notice`].

use serde::{Deserialize, Serialize};

use crate::{
    CameraSession, Capabilities, Product, ProductLookup, ScanDevices, ScanError, ScanObserver,
    ScanState, ScanStrategy, ScannerConfig,
};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// A hint; the scan is still running.
    Info,
    /// The scan attempt failed.
    Error,
}

/// A short user-facing message (toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Toast title.
    pub title: String,
    /// Toast body.
    pub message: String,
}

impl Notice {
    /// An informational notice.
    #[must_use]
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Hint shown when a captured frame held no barcode.
    #[must_use]
    pub fn no_barcode_in_frame() -> Self {
        Self::info(
            "No barcode found",
            "No barcode found in frame. Line it up and tap capture again.",
        )
    }

    /// Hint shown when the camera has not delivered a picture yet.
    #[must_use]
    pub fn camera_warming_up() -> Self {
        let err = ScanError::CameraWarmingUp;
        Self::info(err.title(), err.user_message())
    }
}

impl From<&ScanError> for Notice {
    fn from(err: &ScanError) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: err.title().to_string(),
            message: err.user_message().to_string(),
        }
    }
}

/// What a controller call ended with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", content = "data", rename_all = "snake_case")]
pub enum ScanStep {
    /// A product was delivered.
    Completed(Product),
    /// The camera is live; waiting for the user to capture a frame.
    AwaitingCapture,
    /// The frame held no barcode; the camera is still live.
    Retry(Notice),
    /// The attempt failed and the scanner is idle again.
    Failed(Notice),
    /// A scan is already in progress or its result is still shown.
    Busy,
    /// Nothing to do (e.g. capture without a live camera).
    Ignored,
}

/// Runs scans against the host's devices and a product lookup.
pub struct ScanController {
    devices: ScanDevices,
    lookup: Box<dyn ProductLookup>,
    observer: Box<dyn ScanObserver>,
    config: ScannerConfig,
    scanning_supported: bool,
    state: ScanState,
    active: Option<ScanStrategy>,
    camera: Option<CameraSession>,
}

impl ScanController {
    /// Enter the scanner view.
    ///
    /// Asks the native shell for scanning support once; the answer is
    /// reused by every scan until the view is left.
    pub async fn mount(
        devices: ScanDevices,
        lookup: Box<dyn ProductLookup>,
        observer: Box<dyn ScanObserver>,
        config: ScannerConfig,
    ) -> Self {
        let scanning_supported = match devices.native.as_deref() {
            Some(native) => native.is_supported().await,
            None => false,
        };
        tracing::debug!(?devices, scanning_supported, "Scanner mounted");

        Self {
            devices,
            lookup,
            observer,
            config,
            scanning_supported,
            state: ScanState::Idle,
            active: None,
            camera: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Strategy of the scan in flight, if any.
    #[must_use]
    pub fn active_strategy(&self) -> Option<ScanStrategy> {
        self.active
    }

    /// Whether a camera stream is currently held.
    #[must_use]
    pub fn camera_live(&self) -> bool {
        self.camera.as_ref().is_some_and(CameraSession::is_live)
    }

    /// Scanner settings.
    #[must_use]
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// What the runtime supports right now.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            native_shell: self.devices.native.is_some(),
            scanning_supported: self.scanning_supported,
            media_capture: self
                .devices
                .media
                .as_deref()
                .is_some_and(|media| media.is_available()),
        }
    }

    /// The strategy the next scan would use.
    #[must_use]
    pub fn select_strategy(&self) -> ScanStrategy {
        ScanStrategy::select(self.capabilities())
    }

    /// Begin a scan.
    ///
    /// Native and simulated scans run to completion here. The browser
    /// camera returns [`ScanStep::AwaitingCapture`] once the stream is live.
    pub async fn start_scan(&mut self) -> ScanStep {
        if !self.state.can_start() {
            tracing::debug!(state = %self.state, "Scan requested while busy");
            return ScanStep::Busy;
        }

        let strategy = self.select_strategy();
        tracing::info!(strategy = strategy.label(), "Starting scan");
        self.active = Some(strategy);
        self.transition(ScanState::Scanning);

        let outcome = match strategy {
            ScanStrategy::Native => self.scan_native().await.map(Some),
            ScanStrategy::BrowserCamera => self.open_camera().await.map(|()| None),
            ScanStrategy::Simulated => self.scan_simulated().await.map(Some),
        };

        match outcome {
            Ok(Some(product)) => self.complete(product),
            Ok(None) => ScanStep::AwaitingCapture,
            Err(err) => self.fail(&err),
        }
    }

    /// Capture and decode one frame from the live camera.
    ///
    /// An empty frame, or a camera that has no picture yet, is a
    /// [`ScanStep::Retry`]: the stream keeps running.
    /// A decoded barcode stops the stream before the lookup runs.
    pub async fn capture_frame(&mut self) -> ScanStep {
        if self.state != ScanState::Scanning {
            return ScanStep::Ignored;
        }
        let Some(session) = self.camera.as_mut() else {
            return ScanStep::Ignored;
        };

        match session.capture(self.devices.decoder.as_ref()) {
            Ok(result) => {
                session.release();
                self.camera = None;
                tracing::debug!(barcode = %result.barcode, "Frame decoded");
                match self.lookup.lookup(&result.barcode).await {
                    Ok(product) => self.complete(product),
                    Err(err) => self.fail(&err),
                }
            }
            Err(err) if err.is_retryable() => {
                let notice = if err == ScanError::CameraWarmingUp {
                    tracing::debug!("Camera not ready, keeping stream");
                    Notice::camera_warming_up()
                } else {
                    Notice::no_barcode_in_frame()
                };
                self.observer.on_notice(&notice);
                ScanStep::Retry(notice)
            }
            Err(err) => self.fail(&err),
        }
    }

    /// Leave the result screen. Only acts in `Complete`.
    pub fn reset(&mut self) -> bool {
        if self.state != ScanState::Complete {
            return false;
        }
        self.active = None;
        self.transition(ScanState::Idle)
    }

    /// Leave the scanner view: release the camera and go idle.
    pub fn unmount(&mut self) {
        self.release_camera();
        self.active = None;
        if self.state != ScanState::Idle {
            self.transition(ScanState::Idle);
        }
        tracing::debug!("Scanner unmounted");
    }

    async fn scan_native(&self) -> Result<Product, ScanError> {
        let native = self
            .devices
            .native
            .as_deref()
            .ok_or_else(|| ScanError::Unknown("native scanner not available".into()))?;

        let status = native.request_permission().await?;
        if !status.is_authorized() {
            tracing::warn!(?status, "Camera permission not granted");
            return Err(ScanError::PermissionDenied);
        }

        let barcodes = native.scan().await?;
        let barcode = barcodes
            .into_iter()
            .next()
            .ok_or(ScanError::NoBarcodeDetected)?;
        tracing::debug!(%barcode, "Native scan decoded");
        self.lookup.lookup(&barcode).await
    }

    async fn open_camera(&mut self) -> Result<(), ScanError> {
        let media = self
            .devices
            .media
            .as_deref()
            .ok_or_else(|| ScanError::CameraUnavailable("no media capture API".into()))?;
        let session = CameraSession::acquire(media, self.config.camera_facing).await?;
        self.camera = Some(session);
        Ok(())
    }

    async fn scan_simulated(&mut self) -> Result<Product, ScanError> {
        self.devices.timer.sleep(self.config.scan_delay()).await;
        self.transition(ScanState::Complete);
        self.devices.timer.sleep(self.config.compute_delay()).await;
        self.lookup.sample().await
    }

    fn complete(&mut self, product: Product) -> ScanStep {
        if self.state != ScanState::Complete {
            self.transition(ScanState::Complete);
        }
        tracing::info!(
            product = %product.name,
            barcode = %product.barcode,
            co2_kg = product.co2_impact,
            "Scan complete"
        );
        self.observer.on_product(product.clone());
        ScanStep::Completed(product)
    }

    fn fail(&mut self, err: &ScanError) -> ScanStep {
        tracing::warn!(error = %err, "Scan failed");
        self.release_camera();
        self.active = None;
        if self.state != ScanState::Idle {
            self.transition(ScanState::Idle);
        }
        let notice = Notice::from(err);
        self.observer.on_notice(&notice);
        ScanStep::Failed(notice)
    }

    fn release_camera(&mut self) {
        if let Some(mut session) = self.camera.take() {
            session.release();
        }
    }

    fn transition(&mut self, next: ScanState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::error!(from = %self.state, to = %next, "Illegal scan state transition");
            return false;
        }
        tracing::debug!(from = %self.state, to = %next, "Scan state");
        self.state = next;
        self.observer.on_state(next);
        true
    }
}

impl std::fmt::Debug for ScanController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanController")
            .field("state", &self.state)
            .field("active", &self.active)
            .field("camera", &self.camera)
            .field("scanning_supported", &self.scanning_supported)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_notices_use_user_text() {
        let notice = Notice::from(&ScanError::PermissionDenied);
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.title, "Permission denied");
        assert!(notice.message.contains("Camera permission"));
    }

    #[test]
    fn no_barcode_hint_is_informational() {
        let notice = Notice::no_barcode_in_frame();
        assert_eq!(notice.level, NoticeLevel::Info);
        assert!(notice.message.contains("No barcode found in frame"));
    }

    #[test]
    fn scan_step_serializes_with_tag() {
        let json = serde_json::to_value(ScanStep::AwaitingCapture).expect("serialize");
        assert_eq!(json["step"], "awaiting_capture");

        let json = serde_json::to_value(ScanStep::Retry(Notice::no_barcode_in_frame()))
            .expect("serialize");
        assert_eq!(json["step"], "retry");
        assert_eq!(json["data"]["level"], "info");
    }
}
