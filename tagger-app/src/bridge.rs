//! Collaborators backed by JavaScript objects handed in by the page.
//!
//! The native shell's barcode plugin, the frame decoder and the UI callbacks
//! all live on the JS side. Plugin responses are converted to JSON and read
//! with `serde_json`, which keeps the parsing testable off the browser.

use std::{cell::Cell, rc::Rc};

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect, Uint8Array};
use serde_json::Value;
use tagger_core::{
    Frame, FrameDecoder, NativeScanner, Notice, PermissionStatus, Product, ScanError,
    ScanObserver, ScanState,
};
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_futures::JsFuture;

/// Best-effort text for a thrown JS value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Read a function property off a JS object.
pub(crate) fn function_prop(target: &JsValue, name: &str) -> Result<Function, JsValue> {
    Reflect::get(target, &JsValue::from_str(name))?
        .dyn_into::<Function>()
        .map_err(|_| JsValue::from_str(&format!("'{name}' is not a function")))
}

fn to_json(value: &JsValue) -> Value {
    if value.is_undefined() || value.is_null() {
        return Value::Null;
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|text| text.as_string())
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or(Value::Null)
}

/// `isSupported()` answers `{ supported: bool }`; a bare boolean is accepted too.
pub(crate) fn parse_supported(response: &Value) -> bool {
    response
        .get("supported")
        .unwrap_or(response)
        .as_bool()
        .unwrap_or(false)
}

/// `requestPermissions()` answers `{ camera: "granted" | "limited" | ... }`.
pub(crate) fn parse_permission(response: &Value) -> PermissionStatus {
    response
        .get("camera")
        .and_then(Value::as_str)
        .map_or(PermissionStatus::Unknown, PermissionStatus::parse)
}

/// `scan()` answers `{ barcodes: [{ rawValue, displayValue, ... }] }`.
pub(crate) fn parse_barcodes(response: &Value) -> Vec<String> {
    response
        .get("barcodes")
        .and_then(Value::as_array)
        .map(|barcodes| {
            barcodes
                .iter()
                .filter_map(|barcode| {
                    barcode
                        .get("rawValue")
                        .or_else(|| barcode.get("displayValue"))
                        .and_then(Value::as_str)
                })
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A Capacitor-style barcode scanning plugin.
pub struct CapacitorScanner {
    plugin: JsValue,
}

impl CapacitorScanner {
    /// Wrap the plugin object.
    #[must_use]
    pub fn new(plugin: JsValue) -> Self {
        Self { plugin }
    }

    async fn call(&self, method: &str) -> Result<Value, ScanError> {
        let function =
            function_prop(&self.plugin, method).map_err(|e| ScanError::Unknown(js_error_message(&e)))?;
        let returned = function
            .call0(&self.plugin)
            .map_err(|e| ScanError::Unknown(js_error_message(&e)))?;
        let resolved = match returned.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .map_err(|e| ScanError::Unknown(js_error_message(&e)))?,
            Err(value) => value,
        };
        Ok(to_json(&resolved))
    }
}

#[async_trait(?Send)]
impl NativeScanner for CapacitorScanner {
    async fn is_supported(&self) -> bool {
        match self.call("isSupported").await {
            Ok(response) => parse_supported(&response),
            Err(err) => {
                tracing::warn!(error = %err, "Barcode support check failed");
                false
            }
        }
    }

    async fn request_permission(&self) -> Result<PermissionStatus, ScanError> {
        let response = self.call("requestPermissions").await?;
        Ok(parse_permission(&response))
    }

    async fn scan(&self) -> Result<Vec<String>, ScanError> {
        let response = self.call("scan").await?;
        Ok(parse_barcodes(&response))
    }
}

/// Frame decoder implemented in JS: `decode(rgba: Uint8Array, width, height)`
/// returns the barcode text or `null`.
///
/// The call is synchronous. Anything other than a string, `null` or
/// `undefined` is logged and treated as no barcode; an async decoder's
/// `Promise` never resolves into a result here.
pub struct JsDecoder {
    decode: Function,
}

impl JsDecoder {
    /// Wrap the decode function.
    #[must_use]
    pub fn new(decode: Function) -> Self {
        Self { decode }
    }
}

impl FrameDecoder for JsDecoder {
    fn decode(&self, frame: &Frame) -> Option<String> {
        let pixels = Uint8Array::from(frame.data.as_slice());
        match self.decode.call3(
            &JsValue::NULL,
            &pixels,
            &JsValue::from(frame.width),
            &JsValue::from(frame.height),
        ) {
            Ok(value) => {
                if let Some(text) = value.as_string() {
                    Some(text)
                } else if value.is_null() || value.is_undefined() {
                    None
                } else if value.is_instance_of::<Promise>() {
                    tracing::warn!("Frame decoder returned a Promise; decoders must be synchronous");
                    None
                } else {
                    tracing::warn!(
                        returned = %js_error_message(&value),
                        "Frame decoder returned neither a string nor null"
                    );
                    None
                }
            }
            Err(err) => {
                tracing::warn!(error = %js_error_message(&err), "Frame decoder threw");
                None
            }
        }
    }
}

/// Page callbacks, each receiving a JSON string.
#[derive(Clone)]
pub struct Callbacks {
    /// `onState(state)`.
    pub on_state: Function,
    /// `onNotice(noticeJson)`.
    pub on_notice: Function,
    /// `onProduct(productJson)`.
    pub on_product: Function,
}

impl Callbacks {
    /// Pull `onState`, `onNotice` and `onProduct` off a JS object.
    ///
    /// # Errors
    ///
    /// Returns a JS error string naming the first property that is missing
    /// or not a function.
    pub fn from_object(object: &JsValue) -> Result<Self, JsValue> {
        Ok(Self {
            on_state: function_prop(object, "onState")?,
            on_notice: function_prop(object, "onNotice")?,
            on_product: function_prop(object, "onProduct")?,
        })
    }
}

/// Forwards controller events to the page and mirrors the current state.
pub struct JsObserver {
    callbacks: Callbacks,
    state: Rc<Cell<ScanState>>,
}

impl JsObserver {
    /// Observer writing transitions into `state`.
    #[must_use]
    pub fn new(callbacks: Callbacks, state: Rc<Cell<ScanState>>) -> Self {
        Self { callbacks, state }
    }

    fn emit(function: &Function, payload: &str) {
        if let Err(err) = function.call1(&JsValue::NULL, &JsValue::from_str(payload)) {
            tracing::error!(error = %js_error_message(&err), "Page callback threw");
        }
    }
}

impl ScanObserver for JsObserver {
    fn on_state(&mut self, state: ScanState) {
        self.state.set(state);
        Self::emit(&self.callbacks.on_state, &state.to_string());
    }

    fn on_notice(&mut self, notice: &Notice) {
        match serde_json::to_string(notice) {
            Ok(json) => Self::emit(&self.callbacks.on_notice, &json),
            Err(err) => tracing::error!(error = %err, "Notice serialization failed"),
        }
    }

    fn on_product(&mut self, product: Product) {
        match serde_json::to_string(&product) {
            Ok(json) => Self::emit(&self.callbacks.on_product, &json),
            Err(err) => tracing::error!(error = %err, "Product serialization failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn supported_reads_object_or_bool() {
        assert!(parse_supported(&json!({ "supported": true })));
        assert!(!parse_supported(&json!({ "supported": false })));
        assert!(parse_supported(&json!(true)));
        assert!(!parse_supported(&Value::Null));
    }

    #[test]
    fn permission_reads_camera_field() {
        assert_eq!(
            parse_permission(&json!({ "camera": "granted" })),
            PermissionStatus::Granted
        );
        assert_eq!(
            parse_permission(&json!({ "camera": "limited" })),
            PermissionStatus::Limited
        );
        assert_eq!(
            parse_permission(&json!({ "camera": "prompt" })),
            PermissionStatus::Unknown
        );
        assert_eq!(parse_permission(&json!({})), PermissionStatus::Unknown);
    }

    #[test]
    fn barcodes_prefer_raw_value_and_skip_blanks() {
        let response = json!({
            "barcodes": [
                { "rawValue": " 123456789012 ", "format": "EAN_13" },
                { "displayValue": "987654321098" },
                { "rawValue": "" },
                { "format": "QR_CODE" }
            ]
        });
        assert_eq!(
            parse_barcodes(&response),
            vec!["123456789012".to_string(), "987654321098".to_string()]
        );
    }

    #[test]
    fn missing_barcodes_is_empty() {
        assert!(parse_barcodes(&json!({})).is_empty());
        assert!(parse_barcodes(&json!({ "barcodes": [] })).is_empty());
    }
}
