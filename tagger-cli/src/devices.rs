//! Scripted devices for the terminal.
//!
//! Camera frames carry their barcode as a test pattern: one pixel per
//! character with the ASCII code in the red channel. [`PatternDecoder`]
//! reads it back.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use async_trait::async_trait;
use tagger_core::{
    CameraFacing, Frame, FrameDecoder, MediaCapture, NativeScanner, Notice, NoticeLevel,
    PermissionStatus, Product, ScanDevices, ScanError, ScanObserver, ScanState, TokioTimer,
    VideoStream,
};

/// Frame value meaning "nothing readable in view".
pub const EMPTY_FRAME: &str = "-";

/// Native scanner plugin that returns fixed values.
#[derive(Debug, Clone)]
pub struct ScriptedScanner {
    barcodes: Vec<String>,
    permission: PermissionStatus,
}

impl ScriptedScanner {
    /// Scanner that reports `permission` and then reads `barcodes`.
    #[must_use]
    pub fn new(barcodes: Vec<String>, permission: PermissionStatus) -> Self {
        Self {
            barcodes,
            permission,
        }
    }
}

#[async_trait(?Send)]
impl NativeScanner for ScriptedScanner {
    async fn is_supported(&self) -> bool {
        true
    }

    async fn request_permission(&self) -> Result<PermissionStatus, ScanError> {
        Ok(self.permission)
    }

    async fn scan(&self) -> Result<Vec<String>, ScanError> {
        Ok(self.barcodes.clone())
    }
}

type FrameQueue = Rc<RefCell<VecDeque<String>>>;

/// Camera whose frames show scripted values in order.
#[derive(Debug, Clone)]
pub struct ScriptedCamera {
    frames: FrameQueue,
}

impl ScriptedCamera {
    /// Camera that will show `frames`, one per capture.
    #[must_use]
    pub fn new(frames: Vec<String>) -> Self {
        Self {
            frames: Rc::new(RefCell::new(frames.into())),
        }
    }

    /// Frames not yet captured.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.borrow().len()
    }
}

#[async_trait(?Send)]
impl MediaCapture for ScriptedCamera {
    fn is_available(&self) -> bool {
        true
    }

    async fn open(&self, facing: CameraFacing) -> Result<Box<dyn VideoStream>, ScanError> {
        tracing::debug!(facing = facing.facing_mode(), "Opening scripted camera");
        Ok(Box::new(ScriptedStream {
            frames: Rc::clone(&self.frames),
            live: true,
        }))
    }
}

struct ScriptedStream {
    frames: FrameQueue,
    live: bool,
}

impl VideoStream for ScriptedStream {
    fn capture_frame(&mut self) -> Result<Frame, ScanError> {
        if !self.live {
            return Err(ScanError::DecodeFailed("camera stopped".into()));
        }
        let value = self
            .frames
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ScanError::CameraUnavailable("camera feed ended".into()))?;
        Ok(pattern_frame(&value))
    }

    fn track_count(&self) -> usize {
        1
    }

    fn stop_tracks(&mut self) {
        self.live = false;
    }
}

/// Encode `value` as a one-row test pattern. [`EMPTY_FRAME`] gives a blank frame.
#[must_use]
pub fn pattern_frame(value: &str) -> Frame {
    if value == EMPTY_FRAME || value.is_empty() {
        return Frame::blank(8, 1);
    }
    let data = value.bytes().flat_map(|b| [b, 0, 0, 255]).collect::<Vec<_>>();
    let width = u32::try_from(value.len()).unwrap_or(u32::MAX);
    Frame::new(width, 1, data).unwrap_or_else(|_| Frame::blank(8, 1))
}

/// Reads the test pattern written by [`pattern_frame`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternDecoder;

impl FrameDecoder for PatternDecoder {
    fn decode(&self, frame: &Frame) -> Option<String> {
        let text: String = frame.red_channel().map(char::from).collect();
        let looks_like_barcode = !text.is_empty() && text.chars().all(|c| c.is_ascii_digit());
        looks_like_barcode.then_some(text)
    }
}

/// Pick devices for the requested path.
///
/// Native barcodes win over camera frames; with neither the scan is
/// simulated.
#[must_use]
pub fn scripted_devices(
    barcodes: Vec<String>,
    permission: PermissionStatus,
    frames: Vec<String>,
) -> ScanDevices {
    let native: Option<Box<dyn NativeScanner>> = if barcodes.is_empty() {
        None
    } else {
        Some(Box::new(ScriptedScanner::new(barcodes, permission)))
    };
    let media: Option<Box<dyn MediaCapture>> = if frames.is_empty() {
        None
    } else {
        Some(Box::new(ScriptedCamera::new(frames)))
    };

    ScanDevices {
        native,
        media,
        decoder: Box::new(PatternDecoder),
        timer: Box::new(TokioTimer),
    }
}

/// Prints notices to stderr and logs state changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalObserver;

impl ScanObserver for TerminalObserver {
    fn on_state(&mut self, state: ScanState) {
        tracing::info!("{} {}", state.headline(), state.instructions());
    }

    fn on_notice(&mut self, notice: &Notice) {
        let marker = match notice.level {
            NoticeLevel::Info => "i",
            NoticeLevel::Error => "!",
        };
        eprintln!("[{marker}] {}: {}", notice.title, notice.message);
    }

    fn on_product(&mut self, product: Product) {
        tracing::debug!(product = %product.name, "Product delivered");
    }
}
