//! Scan strategy selection.

use serde::{Deserialize, Serialize};

use crate::Capabilities;

/// The mechanism used to obtain a barcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStrategy {
    /// The native shell's one-shot scanner plugin.
    Native,
    /// Live camera preview with per-tap frame decoding.
    BrowserCamera,
    /// No sensor at all; a timed demo scan.
    Simulated,
}

impl ScanStrategy {
    /// Pick the best strategy the runtime supports.
    ///
    /// Native wins when the shell reports scanning support, then any
    /// media-capture API, then the simulation.
    #[must_use]
    pub const fn select(caps: Capabilities) -> Self {
        if caps.native_shell && caps.scanning_supported {
            Self::Native
        } else if caps.media_capture {
            Self::BrowserCamera
        } else {
            Self::Simulated
        }
    }

    /// Name used in logs and the CLI.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::BrowserCamera => "browser-camera",
            Self::Simulated => "simulated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(native_shell: bool, scanning_supported: bool, media_capture: bool) -> Capabilities {
        Capabilities {
            native_shell,
            scanning_supported,
            media_capture,
        }
    }

    #[test]
    fn native_needs_shell_and_support() {
        assert_eq!(ScanStrategy::select(caps(true, true, true)), ScanStrategy::Native);
        assert_eq!(ScanStrategy::select(caps(true, true, false)), ScanStrategy::Native);
    }

    #[test]
    fn unsupported_native_falls_back_to_camera() {
        assert_eq!(
            ScanStrategy::select(caps(true, false, true)),
            ScanStrategy::BrowserCamera
        );
        assert_eq!(
            ScanStrategy::select(caps(false, true, true)),
            ScanStrategy::BrowserCamera
        );
    }

    #[test]
    fn nothing_available_simulates() {
        assert_eq!(ScanStrategy::select(caps(false, false, false)), ScanStrategy::Simulated);
        assert_eq!(ScanStrategy::select(caps(true, false, false)), ScanStrategy::Simulated);
    }
}
