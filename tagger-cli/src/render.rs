//! Plain-text views of products and the journal.

use std::fmt::Write;

use chrono::NaiveDate;
use tagger_core::{Journal, Product};

const BAR_WIDTH: usize = 20;

fn bar(percent: f64) -> String {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// The product impact screen.
#[must_use]
pub fn product(product: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", product.name);
    let _ = writeln!(out, "Barcode: {}  [{}]", product.barcode, product.category);
    let _ = writeln!(
        out,
        "{:.1} kg CO₂e per item  ({})",
        product.co2_impact,
        product.impact_level().label()
    );
    let _ = writeln!(out, "Equivalent to {}", product.equivalent);

    let _ = writeln!(out, "\nImpact Breakdown");
    for (stage, share) in product.breakdown.stages() {
        let _ = writeln!(
            out,
            "  {:<14} {} {:>3}%  {:.2} kg",
            stage.label(),
            bar(f64::from(share)),
            share,
            product.stage_co2(stage)
        );
    }

    if !product.alternatives.is_empty() {
        let _ = writeln!(out, "\nGreen Alternatives");
        for alternative in &product.alternatives {
            let _ = writeln!(out, "  • {alternative}  (Lower CO₂)");
        }
    }
    out
}

/// The carbon journal screen.
#[must_use]
pub fn journal(journal: &Journal, today: NaiveDate, limit: usize) -> String {
    let mut out = String::new();
    let summary = journal.summary(today);

    let _ = writeln!(out, "Carbon Journal");
    let _ = writeln!(
        out,
        "  {} products scanned, {:.1} kg CO₂ tracked",
        summary.total_scanned, summary.total_co2
    );
    let _ = writeln!(out, "  {} day streak", summary.streak_days);
    match summary.weekly_reduction_pct {
        Some(pct) if pct > 0.0 => {
            let _ = writeln!(out, "  Down {pct:.0}% on last week");
        }
        Some(pct) => {
            let _ = writeln!(out, "  Up {:.0}% on last week", -pct);
        }
        None => {
            let _ = writeln!(out, "  No data for last week yet");
        }
    }

    let chart = journal.weekly(today);
    let _ = writeln!(out, "\nThis Week");
    for (day, height) in chart.days.iter().zip(chart.bar_heights()) {
        let _ = writeln!(out, "  {:<6} {} {:.1}kg", day.label, bar(height), day.co2);
    }

    let _ = writeln!(out, "\nRecent Scans");
    for entry in journal.recent(limit) {
        let _ = writeln!(
            out,
            "  {:<24} {} at {:<9} {:.1}kg CO₂ ({})",
            entry.name,
            entry.day_label(today),
            entry.time_label(),
            entry.co2,
            entry.impact_level().label()
        );
    }

    if !journal.goals().is_empty() {
        let _ = writeln!(out, "\nThis Week's Goals");
        for goal in journal.goals() {
            let mark = if goal.is_met() { "x" } else { " " };
            let _ = writeln!(out, "  [{mark}] {:<32} {}", goal.description, goal.label());
        }
    }
    out
}
