//! # Impact Tagger CLI
//!
//! Terminal host for the Impact Tagger scanner.
//!
//! The terminal has no camera, so the devices are scripted from the command
//! line: `--barcode` plays the native scanner plugin, `--frames` plays a
//! browser camera where each value is what one captured frame shows, and
//! with neither the simulated scan runs.
//!
//! ## Usage
//!
//! ```bash
//! impact-tagger scan
//! impact-tagger scan --barcode 123456789012 --permission granted
//! impact-tagger scan --frames - --frames 987654321098 --save
//! impact-tagger lookup 000000000000 --json
//! impact-tagger journal
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `TerminalConfig` - Scanner config file layered with flags
//! - `devices` - Scripted native scanner, camera and decoder
//! - `render` - Plain-text product and journal views

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod devices;
pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tagger_core::{MissPolicy, PermissionStatus, ScannerConfig, TaggerResult};

/// Command-line arguments for impact-tagger.
#[derive(Debug, Clone, Parser)]
#[command(name = "impact-tagger")]
#[command(about = "Scan a product barcode and see its carbon footprint")]
#[command(version)]
pub struct CliArgs {
    /// Scanner config file (JSON)
    #[arg(long, global = true, env = "IMPACT_TAGGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Fail lookups for unknown barcodes instead of substituting a sample product
    #[arg(long, global = true)]
    pub report_misses: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run one scan and show the product
    Scan(ScanArgs),

    /// Look up a barcode without scanning
    Lookup {
        /// Barcode to look up
        barcode: String,
    },

    /// Show the carbon journal
    Journal {
        /// Number of recent scans to list
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

/// Arguments for `scan`.
#[derive(Debug, Clone, clap::Args)]
pub struct ScanArgs {
    /// Values the native scanner returns (enables the native path)
    #[arg(long = "barcode", value_name = "CODE")]
    pub barcodes: Vec<String>,

    /// Camera permission the native shell reports
    #[arg(long, default_value = "granted", value_parser = parse_permission)]
    pub permission: PermissionStatus,

    /// What each captured camera frame shows, `-` for no barcode (enables the camera path)
    #[arg(long = "frames", value_name = "CODE")]
    pub frames: Vec<String>,

    /// Simulated scanning delay in milliseconds
    #[arg(long)]
    pub scan_delay_ms: Option<u64>,

    /// Simulated impact computation delay in milliseconds
    #[arg(long)]
    pub compute_delay_ms: Option<u64>,

    /// Save the scanned product to the journal and show the summary
    #[arg(long)]
    pub save: bool,
}

fn parse_permission(value: &str) -> Result<PermissionStatus, String> {
    match PermissionStatus::parse(value) {
        PermissionStatus::Unknown if value != "unknown" => Err(format!(
            "unknown permission '{value}' (expected granted, limited, denied or unknown)"
        )),
        status => Ok(status),
    }
}

/// Effective configuration: the config file with command-line overrides.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Scanner settings.
    pub scanner: ScannerConfig,
    /// Emit JSON.
    pub json: bool,
}

impl TerminalConfig {
    /// Build the config from parsed arguments.
    ///
    /// # Errors
    ///
    /// Fails if the config file can't be loaded or the merged values are
    /// out of range.
    pub fn from_args(args: &CliArgs) -> TaggerResult<Self> {
        let mut scanner = match &args.config {
            Some(path) => ScannerConfig::from_file(path)?,
            None => ScannerConfig::default(),
        };

        if args.report_misses {
            scanner.miss_policy = MissPolicy::Report;
        }
        if let Command::Scan(scan) = &args.command {
            if let Some(ms) = scan.scan_delay_ms {
                scanner.scan_delay_ms = ms;
            }
            if let Some(ms) = scan.compute_delay_ms {
                scanner.compute_delay_ms = ms;
            }
        }
        scanner.validate()?;

        Ok(Self {
            scanner,
            json: args.json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).expect("valid arguments")
    }

    #[test]
    fn scan_defaults_to_granted_permission() {
        let args = parse(&["impact-tagger", "scan"]);
        let Command::Scan(scan) = args.command else {
            panic!("expected scan command");
        };
        assert_eq!(scan.permission, PermissionStatus::Granted);
        assert!(scan.barcodes.is_empty());
        assert!(scan.frames.is_empty());
    }

    #[test]
    fn repeated_frames_are_collected() {
        let args = parse(&["impact-tagger", "scan", "--frames", "-", "--frames", "123"]);
        let Command::Scan(scan) = args.command else {
            panic!("expected scan command");
        };
        assert_eq!(scan.frames, vec!["-", "123"]);
    }

    #[test]
    fn bad_permission_is_rejected() {
        assert!(CliArgs::try_parse_from(["impact-tagger", "scan", "--permission", "maybe"]).is_err());
        let args = parse(&["impact-tagger", "scan", "--permission", "denied"]);
        let Command::Scan(scan) = args.command else {
            panic!("expected scan command");
        };
        assert_eq!(scan.permission, PermissionStatus::Denied);
    }

    #[test]
    fn flags_override_config() {
        let args = parse(&[
            "impact-tagger",
            "--report-misses",
            "scan",
            "--scan-delay-ms",
            "5",
        ]);
        let config = TerminalConfig::from_args(&args).expect("valid config");
        assert_eq!(config.scanner.scan_delay_ms, 5);
        assert_eq!(config.scanner.compute_delay_ms, 1000);
        assert_eq!(config.scanner.miss_policy, MissPolicy::Report);
    }

    #[test]
    fn out_of_range_override_is_rejected() {
        let args = parse(&["impact-tagger", "scan", "--compute-delay-ms", "999999"]);
        assert!(TerminalConfig::from_args(&args).is_err());
    }

    #[test]
    fn global_json_flag_after_subcommand() {
        let args = parse(&["impact-tagger", "lookup", "123456789012", "--json"]);
        assert!(args.json);
        assert!(matches!(args.command, Command::Lookup { ref barcode } if barcode == "123456789012"));
    }
}
