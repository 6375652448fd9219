//! Scripted device integration tests
//!
//! Runs the scanner end to end with the terminal's scripted devices.

use tagger_cli::devices::{scripted_devices, TerminalObserver};
use tagger_core::{
    PermissionStatus, ScanController, ScanState, ScanStep, ScanStrategy, ScannerConfig,
    StaticCatalog,
};

async fn controller(
    barcodes: &[&str],
    permission: PermissionStatus,
    frames: &[&str],
) -> ScanController {
    let to_vec = |values: &[&str]| values.iter().map(|v| (*v).to_string()).collect::<Vec<_>>();
    let config = ScannerConfig {
        scan_delay_ms: 1,
        compute_delay_ms: 1,
        ..ScannerConfig::default()
    };
    ScanController::mount(
        scripted_devices(to_vec(barcodes), permission, to_vec(frames)),
        Box::new(StaticCatalog::sample_catalog()),
        Box::new(TerminalObserver),
        config,
    )
    .await
}

#[tokio::test]
async fn test_camera_frames_are_captured_until_a_barcode_shows() {
    let mut scanner = controller(&[], PermissionStatus::Granted, &["-", "-", "987654321098"]).await;
    assert_eq!(scanner.select_strategy(), ScanStrategy::BrowserCamera);

    assert_eq!(scanner.start_scan().await, ScanStep::AwaitingCapture);
    assert!(matches!(scanner.capture_frame().await, ScanStep::Retry(_)));
    assert!(matches!(scanner.capture_frame().await, ScanStep::Retry(_)));

    let step = scanner.capture_frame().await;
    let ScanStep::Completed(product) = step else {
        panic!("Expected Completed, got {step:?}");
    };
    assert_eq!(product.name, "Plastic Water Bottle (500ml)");
    assert!(!scanner.camera_live());
}

#[tokio::test]
async fn test_camera_feed_running_out_fails_cleanly() {
    let mut scanner = controller(&[], PermissionStatus::Granted, &["-"]).await;
    assert_eq!(scanner.start_scan().await, ScanStep::AwaitingCapture);
    assert!(matches!(scanner.capture_frame().await, ScanStep::Retry(_)));
    assert!(matches!(scanner.capture_frame().await, ScanStep::Failed(_)));
    assert_eq!(scanner.state(), ScanState::Idle);
    assert!(!scanner.camera_live());
}

#[tokio::test]
async fn test_native_barcode_wins_over_camera() {
    let mut scanner =
        controller(&["123456789012"], PermissionStatus::Granted, &["987654321098"]).await;
    assert_eq!(scanner.select_strategy(), ScanStrategy::Native);
    let step = scanner.start_scan().await;
    assert!(matches!(step, ScanStep::Completed(ref p) if p.barcode == "123456789012"));
}

#[tokio::test]
async fn test_denied_native_permission_fails() {
    let mut scanner = controller(&["123456789012"], PermissionStatus::Denied, &[]).await;
    assert!(matches!(scanner.start_scan().await, ScanStep::Failed(ref n) if n.title == "Permission denied"));
}

#[tokio::test(start_paused = true)]
async fn test_no_devices_runs_simulation() {
    let mut scanner = controller(&[], PermissionStatus::Granted, &[]).await;
    assert_eq!(scanner.select_strategy(), ScanStrategy::Simulated);
    assert!(matches!(scanner.start_scan().await, ScanStep::Completed(_)));
    assert_eq!(scanner.state(), ScanState::Complete);
}
