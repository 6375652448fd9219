//! # Impact Tagger CLI
//!
//! Scan products and browse the carbon journal from a terminal.

use anyhow::Context;
use clap::Parser;
use tagger_cli::{devices, render, CliArgs, Command, ScanArgs, TerminalConfig};
use tagger_core::{Journal, NavEvent, Navigator, ScanController, ScanStep, StaticCatalog, View};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for --json.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "impact_tagger=info,tagger_cli=info,tagger_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let config = TerminalConfig::from_args(&args).context("invalid configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    let catalog = StaticCatalog::sample_catalog().with_miss_policy(config.scanner.miss_policy);

    match args.command {
        Command::Scan(scan) => {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            rt.block_on(run_scan(scan, catalog, &config))
        }
        Command::Lookup { barcode } => {
            let product = catalog
                .resolve(&barcode)
                .map_err(|e| anyhow::anyhow!("{}", e.user_message()))?;
            if config.json {
                println!("{}", serde_json::to_string_pretty(&product)?);
            } else {
                print!("{}", render::product(&product));
            }
            Ok(())
        }
        Command::Journal { limit } => {
            let now = chrono::Local::now().naive_local();
            let journal = Journal::sample(now);
            if config.json {
                let summary = journal.summary(now.date());
                let body = serde_json::json!({
                    "summary": summary,
                    "weekly": journal.weekly(now.date()),
                    "recent": journal.recent(limit),
                    "goals": journal.goals(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print!("{}", render::journal(&journal, now.date(), limit));
            }
            Ok(())
        }
    }
}

/// Run one scan with scripted devices and show the result.
async fn run_scan(
    scan: ScanArgs,
    catalog: StaticCatalog,
    config: &TerminalConfig,
) -> anyhow::Result<()> {
    let mut nav = Navigator::new();
    nav.dispatch(NavEvent::StartScanning);

    let devices = devices::scripted_devices(scan.barcodes, scan.permission, scan.frames);
    let mut controller = ScanController::mount(
        devices,
        Box::new(catalog),
        Box::new(devices::TerminalObserver),
        config.scanner.clone(),
    )
    .await;
    tracing::info!(
        strategy = controller.select_strategy().label(),
        app = %config.scanner.app_name,
        "Scanner ready"
    );

    let mut step = controller.start_scan().await;
    while matches!(step, ScanStep::AwaitingCapture | ScanStep::Retry(_)) {
        step = controller.capture_frame().await;
    }
    controller.unmount();

    let product = match step {
        ScanStep::Completed(product) => product,
        ScanStep::Failed(notice) => anyhow::bail!("{}", notice.message),
        other => anyhow::bail!("scan ended unexpectedly: {other:?}"),
    };

    let View::Product(shown) = nav.dispatch(NavEvent::ProductScanned(product)) else {
        anyhow::bail!("navigation did not reach the product view");
    };

    if config.json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        print!("{}", render::product(&shown));
    }

    if scan.save {
        let now = chrono::Local::now().naive_local();
        let mut journal = Journal::sample(now);
        journal.record(&shown, now);
        if !config.json {
            println!();
            print!("{}", render::journal(&journal, now.date(), 5));
        }
    }
    Ok(())
}
