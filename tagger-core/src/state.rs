//! Scanner view state.

use serde::{Deserialize, Serialize};

/// Where the scanner view is in its cycle.
///
/// Transitions only move forward, `Idle → Scanning → Complete → Idle`, with
/// one shortcut: a failed attempt drops straight back to `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    /// Waiting for the user to tap scan.
    #[default]
    Idle,
    /// A scan is in flight.
    Scanning,
    /// A barcode was read; the result is being shown.
    Complete,
}

impl ScanState {
    /// Whether a new scan may start.
    #[must_use]
    pub const fn can_start(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Scanning)
                | (Self::Scanning, Self::Complete)
                | (Self::Scanning | Self::Complete, Self::Idle)
        )
    }

    /// Large heading under the viewfinder.
    #[must_use]
    pub const fn headline(self) -> &'static str {
        match self {
            Self::Idle => "Position Barcode",
            Self::Scanning => "Scanning...",
            Self::Complete => "Scan Complete!",
        }
    }

    /// Hint text under the heading.
    #[must_use]
    pub const fn instructions(self) -> &'static str {
        match self {
            Self::Idle => "Center the barcode within the frame and tap scan",
            Self::Scanning => "Analyzing carbon footprint...",
            Self::Complete => "Calculating environmental impact",
        }
    }
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_can_start() {
        assert!(ScanState::Idle.can_start());
        assert!(!ScanState::Scanning.can_start());
        assert!(!ScanState::Complete.can_start());
    }

    #[test]
    fn transitions_only_move_forward() {
        use ScanState::{Complete, Idle, Scanning};
        assert!(Idle.can_transition_to(Scanning));
        assert!(Scanning.can_transition_to(Complete));
        assert!(Scanning.can_transition_to(Idle));
        assert!(Complete.can_transition_to(Idle));

        assert!(!Complete.can_transition_to(Scanning));
        assert!(!Idle.can_transition_to(Complete));
        assert!(!Idle.can_transition_to(Idle));
        assert!(!Scanning.can_transition_to(Scanning));
    }

    #[test]
    fn view_text_matches_state() {
        assert_eq!(ScanState::Idle.headline(), "Position Barcode");
        assert_eq!(ScanState::Scanning.headline(), "Scanning...");
        assert_eq!(
            ScanState::Complete.instructions(),
            "Calculating environmental impact"
        );
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ScanState::Scanning).expect("serialize");
        assert_eq!(json, "\"scanning\"");
        assert_eq!(ScanState::Complete.to_string(), "complete");
    }
}
