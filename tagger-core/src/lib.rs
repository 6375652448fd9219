//! # Impact Tagger Core
//!
//! Scan a product barcode, look up its carbon footprint, keep a journal.
//! Compiles to WASM for the browser host.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              tagger-core                    │
//! ├─────────────────────────────────────────────┤
//! │  Scan Controller   │  Platform seams        │
//! │  - ScanState       │  - NativeScanner       │
//! │  - Strategy select │  - MediaCapture        │
//! │  - CameraSession   │  - FrameDecoder, Timer │
//! ├─────────────────────────────────────────────┤
//! │  ProductLookup     │  Presentation model    │
//! │  - StaticCatalog   │  - Journal, Navigator  │
//! │  - MissPolicy      │  - ImpactLevel         │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod camera;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod frame;
pub mod journal;
pub mod navigation;
pub mod platform;
pub mod product;
pub mod state;
pub mod strategy;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use camera::CameraSession;
pub use catalog::{sample_products, MissPolicy, ProductLookup, StaticCatalog};
pub use config::ScannerConfig;
pub use controller::{Notice, NoticeLevel, ScanController, ScanStep};
pub use error::{ScanError, TaggerError, TaggerResult};
pub use frame::{Frame, FrameError};
pub use journal::{DailyTotal, Goal, Journal, JournalEntry, JournalSummary, WeeklyChart};
pub use navigation::{NavEvent, Navigator, View};
#[cfg(not(target_arch = "wasm32"))]
pub use platform::TokioTimer;
pub use platform::{
    CameraFacing, Capabilities, FrameDecoder, MediaCapture, NativeScanner, PermissionStatus,
    ScanDevices, ScanObserver, Timer, VideoStream,
};
pub use product::{
    Breakdown, ImpactLevel, ImpactScale, LifecycleStage, Product, ScanResult,
};
pub use state::ScanState;
pub use strategy::ScanStrategy;

/// Tagger core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
