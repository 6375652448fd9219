//! Browser-side camera and timer.
//!
//! The camera goes through `navigator.mediaDevices.getUserMedia`. The stream
//! plays into the page's preview `<video>` (or a detached one when the page
//! has none) and frames are grabbed by drawing that element onto an
//! offscreen canvas and reading the pixels back.

use std::time::Duration;

use async_trait::async_trait;
use js_sys::Promise;
use tagger_core::{CameraFacing, Frame, MediaCapture, ScanError, Timer, VideoStream};
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlVideoElement, MediaDevices,
    MediaStream, MediaStreamConstraints, MediaStreamTrack,
};

use crate::bridge::js_error_message;

fn document() -> Result<Document, ScanError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| ScanError::CameraUnavailable("no document object".into()))
}

fn media_devices() -> Option<MediaDevices> {
    web_sys::window()?.navigator().media_devices().ok()
}

/// `getUserMedia` camera access.
#[derive(Debug, Default, Clone)]
pub struct BrowserCamera {
    preview: Option<HtmlVideoElement>,
}

impl BrowserCamera {
    /// Camera that shows its stream in `preview`, if given.
    #[must_use]
    pub fn new(preview: Option<HtmlVideoElement>) -> Self {
        Self { preview }
    }
}

#[async_trait(?Send)]
impl MediaCapture for BrowserCamera {
    fn is_available(&self) -> bool {
        media_devices().is_some()
    }

    async fn open(&self, facing: CameraFacing) -> Result<Box<dyn VideoStream>, ScanError> {
        let devices = media_devices()
            .ok_or_else(|| ScanError::CameraUnavailable("media devices not available".into()))?;

        let video = js_sys::Object::new();
        js_sys::Reflect::set(
            &video,
            &JsValue::from_str("facingMode"),
            &JsValue::from_str(facing.facing_mode()),
        )
        .map_err(|e| ScanError::CameraUnavailable(js_error_message(&e)))?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&video.into());
        constraints.set_audio(&JsValue::FALSE);

        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|e| ScanError::CameraUnavailable(js_error_message(&e)))?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(|e| ScanError::CameraUnavailable(js_error_message(&e)))?
            .dyn_into()
            .map_err(|_| ScanError::CameraUnavailable("getUserMedia did not return a stream".into()))?;

        let mut browser_stream = BrowserStream::attach(stream, self.preview.clone())?;
        if let Err(err) = browser_stream.play().await {
            browser_stream.stop_tracks();
            return Err(err);
        }
        Ok(Box::new(browser_stream))
    }
}

/// A `MediaStream` playing into a video element.
pub struct BrowserStream {
    stream: MediaStream,
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    stopped: bool,
}

impl BrowserStream {
    fn attach(stream: MediaStream, preview: Option<HtmlVideoElement>) -> Result<Self, ScanError> {
        let unavailable =
            |_: JsValue| ScanError::CameraUnavailable("failed to build video surface".into());
        let document = document()?;

        let video = match preview {
            Some(video) => video,
            None => document
                .create_element("video")
                .map_err(unavailable)?
                .dyn_into::<HtmlVideoElement>()
                .map_err(|_| ScanError::CameraUnavailable("element is not a video".into()))?,
        };
        video.set_muted(true);
        video.set_autoplay(true);
        // iOS Safari goes fullscreen without it.
        video.set_attribute("playsinline", "").map_err(unavailable)?;
        video.set_src_object(Some(&stream));

        let canvas = document
            .create_element("canvas")
            .map_err(unavailable)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ScanError::CameraUnavailable("element is not a canvas".into()))?;
        let ctx = canvas
            .get_context("2d")
            .map_err(unavailable)?
            .ok_or_else(|| ScanError::CameraUnavailable("2D context not available".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ScanError::CameraUnavailable("failed to cast to 2D context".into()))?;

        Ok(Self {
            stream,
            video,
            canvas,
            ctx,
            stopped: false,
        })
    }

    async fn play(&self) -> Result<(), ScanError> {
        let promise = self
            .video
            .play()
            .map_err(|e| ScanError::CameraUnavailable(js_error_message(&e)))?;
        JsFuture::from(promise)
            .await
            .map_err(|e| ScanError::CameraUnavailable(js_error_message(&e)))?;
        Ok(())
    }

    fn tracks(&self) -> Vec<MediaStreamTrack> {
        self.stream
            .get_tracks()
            .iter()
            .filter_map(|track| track.dyn_into::<MediaStreamTrack>().ok())
            .collect()
    }
}

impl VideoStream for BrowserStream {
    fn capture_frame(&mut self) -> Result<Frame, ScanError> {
        if self.stopped {
            return Err(ScanError::DecodeFailed("camera stream stopped".into()));
        }
        let (width, height) = (self.video.video_width(), self.video.video_height());
        if width == 0 || height == 0 {
            return Err(ScanError::CameraWarmingUp);
        }

        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.ctx
            .draw_image_with_html_video_element(&self.video, 0.0, 0.0)
            .map_err(|e| ScanError::DecodeFailed(js_error_message(&e)))?;
        let pixels = self
            .ctx
            .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
            .map_err(|e| ScanError::DecodeFailed(js_error_message(&e)))?;

        Ok(Frame::new(width, height, pixels.data().0)?)
    }

    fn track_count(&self) -> usize {
        self.tracks().len()
    }

    fn stop_tracks(&mut self) {
        for track in self.tracks() {
            track.stop();
        }
        self.video.set_src_object(None);
        self.stopped = true;
    }
}

impl Drop for BrowserStream {
    fn drop(&mut self) {
        if !self.stopped {
            self.stop_tracks();
        }
    }
}

/// `setTimeout` wrapped in a promise.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserTimer;

#[async_trait(?Send)]
impl Timer for BrowserTimer {
    async fn sleep(&self, duration: Duration) {
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let promise = Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
            });
            if !matches!(scheduled, Some(Ok(_))) {
                // No window (worker or test harness): resolve right away.
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        if let Err(err) = JsFuture::from(promise).await {
            tracing::warn!(error = %js_error_message(&err), "Timer promise rejected");
        }
    }
}
