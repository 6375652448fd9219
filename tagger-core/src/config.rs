//! Scanner configuration.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{CameraFacing, MissPolicy, TaggerError, TaggerResult};

/// Longest delay the simulated scan may be configured with.
pub const MAX_DELAY_MS: u64 = 60_000;

/// Scanner settings, loadable from JSON.
///
/// Missing fields take their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Name shown in window titles and logs.
    pub app_name: String,
    /// Camera the browser strategy opens.
    pub camera_facing: CameraFacing,
    /// How long the simulated scan stays in `Scanning`.
    pub scan_delay_ms: u64,
    /// How long the simulated scan stays in `Complete` before delivering.
    pub compute_delay_ms: u64,
    /// Behaviour on a catalog miss.
    pub miss_policy: MissPolicy,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            app_name: "impact-tagger".to_string(),
            camera_facing: CameraFacing::Back,
            scan_delay_ms: 3000,
            compute_delay_ms: 1000,
            miss_policy: MissPolicy::Substitute,
        }
    }
}

impl ScannerConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or out-of-range values.
    pub fn from_json_str(json: &str) -> TaggerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be read or [`ScannerConfig::from_json_str`]
    /// rejects it.
    pub fn from_file(path: impl AsRef<Path>) -> TaggerResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`TaggerError::InvalidConfig`] for the first bad field.
    pub fn validate(&self) -> TaggerResult<()> {
        for (field, value) in [
            ("scan_delay_ms", self.scan_delay_ms),
            ("compute_delay_ms", self.compute_delay_ms),
        ] {
            if value > MAX_DELAY_MS {
                return Err(TaggerError::InvalidConfig {
                    field,
                    reason: format!("{value} ms exceeds the {MAX_DELAY_MS} ms limit"),
                });
            }
        }
        if self.app_name.trim().is_empty() {
            return Err(TaggerError::InvalidConfig {
                field: "app_name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Simulated scanning delay.
    #[must_use]
    pub const fn scan_delay(&self) -> Duration {
        Duration::from_millis(self.scan_delay_ms)
    }

    /// Simulated impact computation delay.
    #[must_use]
    pub const fn compute_delay(&self) -> Duration {
        Duration::from_millis(self.compute_delay_ms)
    }
}
