//! Scripted collaborators shared by the scanner integration tests.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use async_trait::async_trait;
use tagger_core::{
    CameraFacing, Frame, FrameDecoder, MediaCapture, NativeScanner, Notice, PermissionStatus,
    Product, ScanDevices, ScanError, ScanObserver, ScanState, TokioTimer, VideoStream,
};

/// Everything the observer saw.
#[derive(Debug, Default)]
pub struct Seen {
    pub states: Vec<ScanState>,
    pub notices: Vec<Notice>,
    pub products: Vec<Product>,
}

/// Observer that records into a shared log.
pub struct Recorder(pub Rc<RefCell<Seen>>);

impl Recorder {
    pub fn new() -> (Box<Self>, Rc<RefCell<Seen>>) {
        let seen = Rc::new(RefCell::new(Seen::default()));
        (Box::new(Self(Rc::clone(&seen))), seen)
    }
}

impl ScanObserver for Recorder {
    fn on_state(&mut self, state: ScanState) {
        self.0.borrow_mut().states.push(state);
    }

    fn on_notice(&mut self, notice: &Notice) {
        self.0.borrow_mut().notices.push(notice.clone());
    }

    fn on_product(&mut self, product: Product) {
        self.0.borrow_mut().products.push(product);
    }
}

/// Native plugin with a fixed permission answer and scan result.
pub struct ScriptedNative {
    pub supported: bool,
    pub permission: PermissionStatus,
    pub result: Result<Vec<String>, ScanError>,
    pub scan_calls: Rc<Cell<usize>>,
}

impl ScriptedNative {
    pub fn new(permission: PermissionStatus, result: Result<Vec<String>, ScanError>) -> Self {
        Self {
            supported: true,
            permission,
            result,
            scan_calls: Rc::new(Cell::new(0)),
        }
    }
}

#[async_trait(?Send)]
impl NativeScanner for ScriptedNative {
    async fn is_supported(&self) -> bool {
        self.supported
    }

    async fn request_permission(&self) -> Result<PermissionStatus, ScanError> {
        Ok(self.permission)
    }

    async fn scan(&self) -> Result<Vec<String>, ScanError> {
        self.scan_calls.set(self.scan_calls.get() + 1);
        self.result.clone()
    }
}

/// Per-track stop flags of every stream a camera handed out.
pub type TrackLog = Rc<RefCell<Vec<Rc<Vec<Cell<bool>>>>>>;

/// Camera that opens streams with `tracks` hardware tracks.
pub struct ScriptedCamera {
    pub available: bool,
    pub deny: bool,
    pub tracks: usize,
    /// Captures that report no picture before frames start arriving.
    pub warmup_frames: usize,
    pub opened: TrackLog,
}

impl ScriptedCamera {
    pub fn new(tracks: usize) -> Self {
        Self {
            available: true,
            deny: false,
            tracks,
            warmup_frames: 0,
            opened: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Whether every track of every opened stream was stopped.
    pub fn all_stopped(log: &TrackLog) -> bool {
        log.borrow()
            .iter()
            .all(|tracks| tracks.iter().all(Cell::get))
    }
}

#[async_trait(?Send)]
impl MediaCapture for ScriptedCamera {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn open(&self, _facing: CameraFacing) -> Result<Box<dyn VideoStream>, ScanError> {
        if self.deny {
            return Err(ScanError::CameraUnavailable("NotAllowedError".into()));
        }
        let tracks = Rc::new((0..self.tracks).map(|_| Cell::new(false)).collect::<Vec<_>>());
        self.opened.borrow_mut().push(Rc::clone(&tracks));
        Ok(Box::new(ScriptedStream {
            tracks,
            warmup: self.warmup_frames,
        }))
    }
}

struct ScriptedStream {
    tracks: Rc<Vec<Cell<bool>>>,
    warmup: usize,
}

impl VideoStream for ScriptedStream {
    fn capture_frame(&mut self) -> Result<Frame, ScanError> {
        if self.warmup > 0 {
            self.warmup -= 1;
            return Err(ScanError::CameraWarmingUp);
        }
        Ok(Frame::blank(4, 4))
    }

    fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn stop_tracks(&mut self) {
        for track in self.tracks.iter() {
            track.set(true);
        }
    }
}

/// Decoder that returns scripted results, one per captured frame.
#[derive(Clone, Default)]
pub struct ScriptedDecoder(pub Rc<RefCell<VecDeque<Option<String>>>>);

impl ScriptedDecoder {
    pub fn with(results: &[Option<&str>]) -> Self {
        Self(Rc::new(RefCell::new(
            results.iter().map(|r| r.map(str::to_string)).collect(),
        )))
    }
}

impl FrameDecoder for ScriptedDecoder {
    fn decode(&self, _frame: &Frame) -> Option<String> {
        self.0.borrow_mut().pop_front().flatten()
    }
}

/// Devices with nothing but a timer: the simulated path.
pub fn simulated_devices() -> ScanDevices {
    ScanDevices {
        native: None,
        media: None,
        decoder: Box::new(ScriptedDecoder::default()),
        timer: Box::new(TokioTimer),
    }
}

/// Devices inside the native shell.
pub fn native_devices(native: ScriptedNative) -> ScanDevices {
    ScanDevices {
        native: Some(Box::new(native)),
        media: None,
        decoder: Box::new(ScriptedDecoder::default()),
        timer: Box::new(TokioTimer),
    }
}

/// Devices in a browser with a camera.
pub fn browser_devices(camera: ScriptedCamera, decoder: ScriptedDecoder) -> ScanDevices {
    ScanDevices {
        native: None,
        media: Some(Box::new(camera)),
        decoder: Box::new(decoder),
        timer: Box::new(TokioTimer),
    }
}

/// Check a state log is a run of `Idle → Scanning → Complete → Idle`
/// cycles, with failures allowed to skip `Complete`.
pub fn assert_forward_only(states: &[ScanState]) {
    let mut prev = ScanState::Idle;
    for &next in states {
        assert!(
            prev.can_transition_to(next),
            "illegal transition {prev} -> {next} in {states:?}"
        );
        prev = next;
    }
}
