//! # Impact Tagger WASM Application
//!
//! Runs the barcode scanner inside a web page or the native shell's webview.
//! The browser supplies the camera and timers; the page supplies a frame
//! decoder, UI callbacks and, inside the native shell, the barcode plugin.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web tagger-app
//! ```
//!
//! Then import in JavaScript:
//! ```javascript
//! import init, { ScannerApp } from './pkg/tagger_app.js';
//!
//! await init();
//! const app = new ScannerApp('{}', {
//!     onState: (state) => render(state),
//!     onNotice: (json) => toast(JSON.parse(json)),
//!     onProduct: (json) => showProduct(JSON.parse(json)),
//!     decode: (rgba, width, height) => decoder.decode(rgba, width, height),
//!     plugin: Capacitor.isNativePlatform() ? BarcodeScanner : undefined,
//!     preview: document.querySelector('video#camera'),
//! });
//!
//! await app.mount();
//! const step = JSON.parse(await app.startScan());
//! if (step.step === 'awaiting_capture') {
//!     captureButton.onclick = async () => JSON.parse(await app.captureFrame());
//! }
//! ```
//!
//! `startScan` and `captureFrame` resolve to a JSON `ScanStep`. Calling either
//! while another call is still pending rejects with `"scanner busy"`.
//!
//! `decode` must be synchronous: it returns the barcode text, or `null` when
//! the frame holds none. A returned `Promise` is logged and counts as no
//! barcode. Wrap an async decoder so it decodes ahead of time and hands back
//! its last result.
//!
//! `preview` is optional. When given, the camera stream plays in that
//! `<video>` element until the scan ends or the view unmounts; otherwise it
//! plays in a detached element the user never sees.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod bridge;
mod browser;

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use js_sys::{Function, Promise, Reflect};
use tagger_core::{
    ScanController, ScanDevices, ScanState, ScanStep, ScannerConfig, StaticCatalog,
};
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_futures::future_to_promise;
use web_sys::HtmlVideoElement;

pub use bridge::{Callbacks, CapacitorScanner, JsDecoder, JsObserver};
pub use browser::{BrowserCamera, BrowserStream, BrowserTimer};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Impact Tagger WASM initialized");
}

/// Where the controller is between calls.
#[derive(Default)]
struct Slot {
    controller: Option<ScanController>,
    /// A call has taken the controller and not yet returned it.
    in_flight: bool,
    /// Bumped by every `mount` and `unmount`.
    generation: u64,
}

type SlotHandle = Rc<RefCell<Slot>>;

/// A controller taken out of the slot for one call.
struct Loan {
    controller: ScanController,
    generation: u64,
}

fn take_controller(slot: &SlotHandle) -> Result<Loan, JsValue> {
    let mut slot = slot.borrow_mut();
    if slot.in_flight {
        return Err(JsValue::from_str("scanner busy"));
    }
    let controller = slot
        .controller
        .take()
        .ok_or_else(|| JsValue::from_str("scanner not mounted"))?;
    slot.in_flight = true;
    Ok(Loan {
        controller,
        generation: slot.generation,
    })
}

/// Put a loaned controller back, unless the view was unmounted or another
/// controller was mounted while it was out. Never overwrites the slot.
fn return_controller(slot: &SlotHandle, loan: Loan) {
    let stale = {
        let mut slot = slot.borrow_mut();
        slot.in_flight = false;
        if slot.generation == loan.generation && slot.controller.is_none() {
            slot.controller = Some(loan.controller);
            None
        } else {
            Some(loan.controller)
        }
    };
    // Observer callbacks run inside `unmount`, so no borrow is held here.
    if let Some(mut controller) = stale {
        tracing::debug!("Scanner replaced during a call, unmounting the old one");
        controller.unmount();
    }
}

fn step_json(step: &ScanStep) -> Result<JsValue, JsValue> {
    serde_json::to_string(step)
        .map(|json| JsValue::from_str(&json))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The scanner view for JavaScript.
#[wasm_bindgen]
pub struct ScannerApp {
    config: ScannerConfig,
    callbacks: Callbacks,
    decode: Function,
    plugin: Option<JsValue>,
    preview: Option<HtmlVideoElement>,
    state: Rc<Cell<ScanState>>,
    slot: SlotHandle,
}

impl ScannerApp {
    fn devices(&self) -> ScanDevices {
        ScanDevices {
            native: self
                .plugin
                .clone()
                .map(|plugin| Box::new(CapacitorScanner::new(plugin)) as _),
            media: Some(Box::new(BrowserCamera::new(self.preview.clone()))),
            decoder: Box::new(JsDecoder::new(self.decode.clone())),
            timer: Box::new(BrowserTimer),
        }
    }
}

#[wasm_bindgen]
impl ScannerApp {
    /// Create a scanner from a JSON config and a host object carrying
    /// `onState`, `onNotice`, `onProduct` and `decode`, plus an optional
    /// `plugin` and `preview` video element.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, a callback is missing or
    /// `preview` is not a video element.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, host: &JsValue) -> Result<ScannerApp, JsValue> {
        let config = ScannerConfig::from_json_str(config_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let callbacks = Callbacks::from_object(host)?;
        let decode = bridge::function_prop(host, "decode")?;
        let plugin = Reflect::get(host, &JsValue::from_str("plugin"))?;
        let plugin = (!plugin.is_undefined() && !plugin.is_null()).then_some(plugin);
        let preview = Reflect::get(host, &JsValue::from_str("preview"))?;
        let preview = if preview.is_undefined() || preview.is_null() {
            None
        } else {
            Some(
                preview
                    .dyn_into::<HtmlVideoElement>()
                    .map_err(|_| JsValue::from_str("'preview' is not a video element"))?,
            )
        };

        tracing::debug!(
            app = %config.app_name,
            native = plugin.is_some(),
            preview = preview.is_some(),
            "Scanner app created"
        );
        Ok(Self {
            config,
            callbacks,
            decode,
            plugin,
            preview,
            state: Rc::new(Cell::new(ScanState::Idle)),
            slot: Rc::new(RefCell::new(Slot::default())),
        })
    }

    /// Enter the scanner view. Resolves once platform support has been checked.
    ///
    /// Mounting again replaces the previous controller, releasing its camera.
    /// If `unmount` or another `mount` arrives before this one resolves, the
    /// later request wins and this controller is dropped unmounted.
    #[must_use]
    pub fn mount(&self) -> Promise {
        let devices = self.devices();
        let lookup = StaticCatalog::sample_catalog().with_miss_policy(self.config.miss_policy);
        let observer = JsObserver::new(self.callbacks.clone(), Rc::clone(&self.state));
        let config = self.config.clone();
        let slot = Rc::clone(&self.slot);

        future_to_promise(async move {
            let generation = {
                let mut slot = slot.borrow_mut();
                if slot.in_flight {
                    return Err(JsValue::from_str("scanner busy"));
                }
                slot.generation += 1;
                slot.generation
            };
            let controller =
                ScanController::mount(devices, Box::new(lookup), Box::new(observer), config).await;

            // Calls may have started or finished while platform support was checked.
            let superseded = {
                let mut slot = slot.borrow_mut();
                if slot.generation == generation {
                    slot.controller.replace(controller)
                } else {
                    Some(controller)
                }
            };
            if let Some(mut superseded) = superseded {
                superseded.unmount();
            }
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Begin a scan. Resolves to a JSON `ScanStep`.
    #[wasm_bindgen(js_name = startScan)]
    #[must_use]
    pub fn start_scan(&self) -> Promise {
        let slot = Rc::clone(&self.slot);
        future_to_promise(async move {
            let mut loan = take_controller(&slot)?;
            let step = loan.controller.start_scan().await;
            return_controller(&slot, loan);
            step_json(&step)
        })
    }

    /// Capture and decode one camera frame. Resolves to a JSON `ScanStep`.
    #[wasm_bindgen(js_name = captureFrame)]
    #[must_use]
    pub fn capture_frame(&self) -> Promise {
        let slot = Rc::clone(&self.slot);
        future_to_promise(async move {
            let mut loan = take_controller(&slot)?;
            let step = loan.controller.capture_frame().await;
            return_controller(&slot, loan);
            step_json(&step)
        })
    }

    /// Leave the result screen. Returns whether the state changed.
    #[must_use]
    pub fn reset(&self) -> bool {
        let Ok(mut loan) = take_controller(&self.slot) else {
            return false;
        };
        let changed = loan.controller.reset();
        return_controller(&self.slot, loan);
        changed
    }

    /// Leave the scanner view, releasing the camera.
    ///
    /// If a call is still pending, the controller is unmounted as soon as it
    /// returns.
    pub fn unmount(&self) {
        let controller = {
            let mut slot = self.slot.borrow_mut();
            slot.generation += 1;
            slot.controller.take()
        };
        if let Some(mut controller) = controller {
            controller.unmount();
        }
    }

    /// Current scan state: `idle`, `scanning` or `complete`.
    #[must_use]
    pub fn state(&self) -> String {
        self.state.get().to_string()
    }

    /// Headline for the current state.
    #[must_use]
    pub fn headline(&self) -> String {
        self.state.get().headline().to_string()
    }

    /// Instruction text for the current state.
    #[must_use]
    pub fn instructions(&self) -> String {
        self.state.get().instructions().to_string()
    }
}
