//! Scoped camera acquisition for the browser strategy.

use crate::{CameraFacing, FrameDecoder, MediaCapture, ScanError, ScanResult, VideoStream};

/// A live camera stream that is released when the session ends.
///
/// Tracks are stopped on [`CameraSession::release`] and again, if still
/// running, when the session is dropped.
pub struct CameraSession {
    stream: Option<Box<dyn VideoStream>>,
}

impl CameraSession {
    /// Open the camera.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::CameraUnavailable`] if access is declined or no
    /// camera exists.
    pub async fn acquire(media: &dyn MediaCapture, facing: CameraFacing) -> Result<Self, ScanError> {
        let stream = media.open(facing).await?;
        tracing::debug!(tracks = stream.track_count(), ?facing, "Camera stream acquired");
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already open stream.
    #[must_use]
    pub fn from_stream(stream: Box<dyn VideoStream>) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    /// Whether the stream is still running.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.stream.is_some()
    }

    /// Capture one frame and try to decode it.
    ///
    /// A frame without a barcode is [`ScanError::NoBarcodeDetected`] and
    /// leaves the stream running.
    ///
    /// # Errors
    ///
    /// [`ScanError::DecodeFailed`] if the session was already released or the
    /// frame could not be grabbed, [`ScanError::NoBarcodeDetected`] if the
    /// decoder found nothing.
    pub fn capture(&mut self, decoder: &dyn FrameDecoder) -> Result<ScanResult, ScanError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ScanError::DecodeFailed("camera stream already released".into()))?;

        let frame = stream.capture_frame()?;
        match decoder.decode(&frame) {
            Some(barcode) if !barcode.trim().is_empty() => Ok(ScanResult::new(barcode.trim())),
            _ => Err(ScanError::NoBarcodeDetected),
        }
    }

    /// Stop every track. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let tracks = stream.track_count();
            stream.stop_tracks();
            tracing::debug!(tracks, "Camera stream released");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("live", &self.is_live())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::Frame;

    struct FakeStream {
        stopped: Rc<Cell<usize>>,
        frame: Option<Frame>,
    }

    impl VideoStream for FakeStream {
        fn capture_frame(&mut self) -> Result<Frame, ScanError> {
            self.frame
                .clone()
                .ok_or_else(|| ScanError::DecodeFailed("no picture".into()))
        }

        fn track_count(&self) -> usize {
            1
        }

        fn stop_tracks(&mut self) {
            self.stopped.set(self.stopped.get() + 1);
        }
    }

    struct FixedDecoder(Option<&'static str>);

    impl FrameDecoder for FixedDecoder {
        fn decode(&self, _frame: &Frame) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn session(stopped: &Rc<Cell<usize>>, frame: Option<Frame>) -> CameraSession {
        CameraSession::from_stream(Box::new(FakeStream {
            stopped: Rc::clone(stopped),
            frame,
        }))
    }

    #[test]
    fn empty_decode_keeps_stream_live() {
        let stopped = Rc::new(Cell::new(0));
        let mut session = session(&stopped, Some(Frame::blank(2, 2)));

        let result = session.capture(&FixedDecoder(None));
        assert_eq!(result, Err(ScanError::NoBarcodeDetected));
        assert!(session.is_live());
        assert_eq!(stopped.get(), 0);
    }

    #[test]
    fn whitespace_decode_counts_as_empty() {
        let stopped = Rc::new(Cell::new(0));
        let mut session = session(&stopped, Some(Frame::blank(2, 2)));
        assert_eq!(
            session.capture(&FixedDecoder(Some("  "))),
            Err(ScanError::NoBarcodeDetected)
        );
    }

    #[test]
    fn successful_decode_returns_trimmed_barcode() {
        let stopped = Rc::new(Cell::new(0));
        let mut session = session(&stopped, Some(Frame::blank(2, 2)));
        let result = session.capture(&FixedDecoder(Some(" 123456789012\n")));
        assert_eq!(result, Ok(ScanResult::new("123456789012")));
    }

    #[test]
    fn release_is_idempotent_and_drop_does_not_double_stop() {
        let stopped = Rc::new(Cell::new(0));
        let mut session = session(&stopped, None);
        session.release();
        session.release();
        assert!(!session.is_live());
        drop(session);
        assert_eq!(stopped.get(), 1);
    }

    #[test]
    fn drop_releases_live_stream() {
        let stopped = Rc::new(Cell::new(0));
        {
            let _session = session(&stopped, None);
        }
        assert_eq!(stopped.get(), 1);
    }

    #[test]
    fn capture_after_release_fails() {
        let stopped = Rc::new(Cell::new(0));
        let mut session = session(&stopped, Some(Frame::blank(1, 1)));
        session.release();
        assert!(matches!(
            session.capture(&FixedDecoder(Some("1"))),
            Err(ScanError::DecodeFailed(_))
        ));
    }
}
