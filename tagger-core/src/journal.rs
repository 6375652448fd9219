//! # Carbon Journal
//!
//! History of saved scans with the numbers the journal screen shows:
//! totals, a day streak, the week-over-week change, a seven day chart
//! and the weekly goals.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ImpactLevel, ImpactScale, Product};

/// Demo scans: days before today, (hour, minute), name, kg CO₂e, category.
const SAMPLE_SCANS: &[(i64, (u32, u32), &str, f64, &str)] = &[
    // This week
    (0, (14, 30), "Organic Banana", 0.3, "Fruit"),
    (0, (13, 15), "Local Apples", 0.2, "Fruit"),
    (1, (16, 45), "Whole Grain Bread", 0.6, "Bakery"),
    (1, (12, 20), "Oat Milk", 0.6, "Dairy Alternative"),
    (2, (19, 10), "Cheddar Cheese", 1.0, "Dairy"),
    (2, (11, 5), "Seasonal Vegetables", 0.4, "Vegetables"),
    (3, (18, 30), "Red Lentils", 0.4, "Pantry"),
    (3, (13, 15), "Plastic Water Bottle", 2.1, "Beverage"),
    (4, (12, 20), "Imported Avocado", 1.8, "Fruit"),
    (5, (19, 40), "Dried Pasta", 0.6, "Pantry"),
    (5, (8, 50), "Coffee Beans", 1.5, "Beverage"),
    (6, (18, 15), "Beef Mince", 2.7, "Meat"),
    (6, (10, 35), "Local Apples", 0.2, "Fruit"),
    (6, (10, 30), "Organic Banana", 0.3, "Fruit"),
    // Previous week
    (8, (18, 0), "Beef Mince", 2.7, "Meat"),
    (9, (13, 0), "Plastic Water Bottle", 2.1, "Beverage"),
    (9, (8, 15), "Oat Milk", 0.6, "Dairy Alternative"),
    (10, (19, 20), "Cheddar Cheese", 1.0, "Dairy"),
    (10, (12, 45), "Imported Avocado", 1.8, "Fruit"),
    (11, (15, 30), "Plastic Water Bottle", 2.1, "Beverage"),
    (11, (9, 0), "Coffee Beans", 1.5, "Beverage"),
    (12, (18, 45), "Beef Mince", 2.7, "Meat"),
    (13, (17, 0), "Red Lentils", 0.4, "Pantry"),
];

/// One saved scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique entry ID.
    pub id: Uuid,
    /// Product name.
    pub name: String,
    /// kg CO₂e.
    pub co2: f64,
    /// Product category.
    pub category: String,
    /// Local wall-clock time the scan was saved.
    pub recorded_at: NaiveDateTime,
}

impl JournalEntry {
    /// Entry for a product saved at `at`.
    #[must_use]
    pub fn from_product(product: &Product, at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: product.name.clone(),
            co2: product.co2_impact,
            category: product.category.clone(),
            recorded_at: at,
        }
    }

    /// "Today", "Yesterday" or a short date.
    #[must_use]
    pub fn day_label(&self, today: NaiveDate) -> String {
        let date = self.recorded_at.date();
        if date == today {
            "Today".to_string()
        } else if Some(date) == today.pred_opt() {
            "Yesterday".to_string()
        } else {
            date.format("%b %-d").to_string()
        }
    }

    /// 12-hour clock time, e.g. "2:30 PM".
    #[must_use]
    pub fn time_label(&self) -> String {
        self.recorded_at.format("%-I:%M %p").to_string()
    }

    /// Colour bucket on the journal scale.
    #[must_use]
    pub fn impact_level(&self) -> ImpactLevel {
        ImpactScale::JOURNAL.classify(self.co2)
    }
}

/// A weekly goal with progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// What to do.
    pub description: String,
    /// Progress so far.
    pub progress: u32,
    /// Target value.
    pub target: u32,
    /// Unit appended to the target, e.g. "%".
    #[serde(default)]
    pub unit: String,
}

impl Goal {
    /// A goal without a unit.
    #[must_use]
    pub fn new(description: impl Into<String>, progress: u32, target: u32) -> Self {
        Self {
            description: description.into(),
            progress,
            target,
            unit: String::new(),
        }
    }

    /// Set the unit.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Badge text, e.g. "3/5" or "15/20%".
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{}{}", self.progress, self.target, self.unit)
    }

    /// Progress in `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.target == 0 {
            return 1.0;
        }
        (f64::from(self.progress) / f64::from(self.target)).min(1.0)
    }

    /// Whether the target was reached.
    #[must_use]
    pub fn is_met(&self) -> bool {
        self.progress >= self.target
    }
}

/// CO₂ total for one day of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    /// The day.
    pub date: NaiveDate,
    /// Weekday abbreviation, or "Today".
    pub label: String,
    /// kg CO₂e saved that day.
    pub co2: f64,
}

/// The last seven days, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyChart {
    /// Seven daily totals ending today.
    pub days: Vec<DailyTotal>,
}

impl WeeklyChart {
    /// Largest daily total.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.days.iter().map(|d| d.co2).fold(0.0, f64::max)
    }

    /// Bar heights as a percentage of the largest day.
    #[must_use]
    pub fn bar_heights(&self) -> Vec<f64> {
        let max = self.max();
        self.days
            .iter()
            .map(|d| if max > 0.0 { d.co2 / max * 100.0 } else { 0.0 })
            .collect()
    }

    /// Sum over the week.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.days.iter().map(|d| d.co2).sum()
    }
}

/// Headline numbers of the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalSummary {
    /// Number of saved scans.
    pub total_scanned: usize,
    /// kg CO₂e across all saved scans.
    pub total_co2: f64,
    /// Percent drop from the previous seven days; `None` without history.
    pub weekly_reduction_pct: Option<f64>,
    /// Consecutive days with at least one scan.
    pub streak_days: u32,
}

/// Saved scans, newest first, plus weekly goals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    entries: Vec<JournalEntry>,
    goals: Vec<Goal>,
}

impl Journal {
    /// Empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The demo journal: two weeks of scans and three weekly goals.
    ///
    /// 23 scans in all. The last seven days chart as 3.2, 2.1, 1.8, 2.5, 1.4,
    /// 1.2 and 0.5 kg (12.7 kg), the week before totals 14.9 kg so the
    /// journal reads 15% down, and nothing was saved seven days back, which
    /// caps the streak at seven days.
    #[must_use]
    pub fn sample(now: NaiveDateTime) -> Self {
        let today = now.date();
        let entries = SAMPLE_SCANS
            .iter()
            .map(|&(days_back, (h, m), name, co2, category)| JournalEntry {
                id: Uuid::new_v4(),
                name: name.to_string(),
                co2,
                category: category.to_string(),
                recorded_at: (today - Duration::days(days_back))
                    .and_hms_opt(h, m, 0)
                    .unwrap_or(now),
            })
            .collect();

        let mut journal = Self {
            entries,
            goals: vec![
                Goal::new("Scan 5 eco-friendly products", 3, 5),
                Goal::new("Reduce weekly CO₂ by 20%", 15, 20).with_unit("%"),
                Goal::new("Try 2 green alternatives", 1, 2),
            ],
        };
        journal.sort();
        journal
    }

    /// Save a scanned product.
    pub fn record(&mut self, product: &Product, at: NaiveDateTime) -> &JournalEntry {
        let entry = JournalEntry::from_product(product, at);
        let id = entry.id;
        tracing::debug!(product = %entry.name, co2 = entry.co2, "Saved to journal");
        self.entries.push(entry);
        self.sort();
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .unwrap_or_default();
        &self.entries[index]
    }

    /// All entries, newest first.
    #[must_use]
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// The `limit` most recent entries.
    #[must_use]
    pub fn recent(&self, limit: usize) -> &[JournalEntry] {
        &self.entries[..limit.min(self.entries.len())]
    }

    /// Weekly goals.
    #[must_use]
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Replace the weekly goals.
    pub fn set_goals(&mut self, goals: Vec<Goal>) {
        self.goals = goals;
    }

    /// kg CO₂e saved on one day.
    #[must_use]
    pub fn daily_total(&self, date: NaiveDate) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.recorded_at.date() == date)
            .map(|e| e.co2)
            .sum()
    }

    /// Chart data for the seven days ending `today`.
    #[must_use]
    pub fn weekly(&self, today: NaiveDate) -> WeeklyChart {
        let days = (0..7)
            .rev()
            .map(|back| {
                let date = today - Duration::days(back);
                let label = if back == 0 {
                    "Today".to_string()
                } else {
                    date.format("%a").to_string()
                };
                DailyTotal {
                    date,
                    label,
                    co2: self.daily_total(date),
                }
            })
            .collect();
        WeeklyChart { days }
    }

    /// Consecutive days with a scan, counted back from `today`.
    ///
    /// A streak that ended yesterday is still alive until today is over.
    #[must_use]
    pub fn streak(&self, today: NaiveDate) -> u32 {
        let has_scan = |date: NaiveDate| self.entries.iter().any(|e| e.recorded_at.date() == date);

        let mut day = if has_scan(today) {
            today
        } else {
            match today.pred_opt() {
                Some(yesterday) if has_scan(yesterday) => yesterday,
                _ => return 0,
            }
        };

        let mut streak = 0;
        while has_scan(day) {
            streak += 1;
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
        streak
    }

    /// Percent drop of this week's CO₂ against the previous seven days.
    #[must_use]
    pub fn weekly_reduction_pct(&self, today: NaiveDate) -> Option<f64> {
        let this_week = self.weekly(today).total();
        let previous = self.weekly(today - Duration::days(7)).total();
        if previous <= 0.0 {
            return None;
        }
        Some((previous - this_week) / previous * 100.0)
    }

    /// Headline numbers as of `today`.
    #[must_use]
    pub fn summary(&self, today: NaiveDate) -> JournalSummary {
        JournalSummary {
            total_scanned: self.entries.len(),
            total_co2: self.entries.iter().map(|e| e.co2).sum(),
            weekly_reduction_pct: self.weekly_reduction_pct(today),
            streak_days: self.streak(today),
        }
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_products;

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn sample_matches_journal_screen() {
        let now = noon(2026, 10, 19);
        let journal = Journal::sample(now);
        let today = now.date();

        let names: Vec<_> = journal.recent(4).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            ["Organic Banana", "Local Apples", "Whole Grain Bread", "Oat Milk"]
        );
        assert_eq!(journal.entries()[0].day_label(today), "Today");
        assert_eq!(journal.entries()[0].time_label(), "2:30 PM");
        assert_eq!(journal.entries()[3].day_label(today), "Yesterday");
        assert_eq!(journal.entries()[3].time_label(), "12:20 PM");
        assert_eq!(journal.entries().len(), 23);

        let labels: Vec<_> = journal.goals().iter().map(Goal::label).collect();
        assert_eq!(labels, ["3/5", "15/20%", "1/2"]);
    }

    #[test]
    fn older_entries_get_a_date_label() {
        let entry = JournalEntry::from_product(&sample_products()[0], noon(2026, 10, 1));
        assert_eq!(entry.day_label(noon(2026, 10, 19).date()), "Oct 1");
    }

    #[test]
    fn record_keeps_newest_first() {
        let mut journal = Journal::new();
        let products = sample_products();
        journal.record(&products[0], noon(2026, 10, 18));
        let saved = journal.record(&products[1], noon(2026, 10, 19));
        assert_eq!(saved.name, "Plastic Water Bottle (500ml)");
        journal.record(&products[0], noon(2026, 10, 17));

        let dates: Vec<_> = journal.entries().iter().map(|e| e.recorded_at.date()).collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(journal.recent(2).len(), 2);
        assert_eq!(journal.recent(10).len(), 3);
    }

    #[test]
    fn summary_totals_and_streak() {
        let now = noon(2026, 10, 19);
        let summary = Journal::sample(now).summary(now.date());
        assert_eq!(summary.total_scanned, 23);
        assert!((summary.total_co2 - 27.6).abs() < 1e-9);
        assert_eq!(summary.streak_days, 7);
        let pct = summary.weekly_reduction_pct.expect("previous week exists");
        assert_eq!(format!("{pct:.0}"), "15");
    }

    #[test]
    fn streak_survives_until_end_of_today() {
        let mut journal = Journal::new();
        let banana = &sample_products()[0];
        journal.record(banana, noon(2026, 10, 17));
        journal.record(banana, noon(2026, 10, 18));
        assert_eq!(journal.streak(noon(2026, 10, 19).date()), 2);
        assert_eq!(journal.streak(noon(2026, 10, 20).date()), 0);
    }

    #[test]
    fn weekly_chart_ends_today() {
        let now = noon(2026, 10, 19);
        let chart = Journal::sample(now).weekly(now.date());
        assert_eq!(chart.days.len(), 7);
        assert_eq!(chart.days[6].label, "Today");
        assert_eq!(chart.days[0].label, "Tue");

        let totals: Vec<f64> = chart.days.iter().map(|d| d.co2).collect();
        for (total, expected) in totals.iter().zip([3.2, 2.1, 1.8, 2.5, 1.4, 1.2, 0.5]) {
            assert!((total - expected).abs() < 1e-9, "{totals:?}");
        }
        assert!((chart.total() - 12.7).abs() < 1e-9);

        let heights = chart.bar_heights();
        assert!((heights[0] - 100.0).abs() < 1e-9);
        assert!((heights[6] - 0.5 / 3.2 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_chart_has_flat_bars() {
        let chart = Journal::new().weekly(noon(2026, 10, 19).date());
        assert!(chart.bar_heights().iter().all(|h| h.abs() < f64::EPSILON));
    }

    #[test]
    fn weekly_reduction_compares_with_previous_week() {
        let mut journal = Journal::new();
        let products = sample_products();
        // 2.1 kg last week, 0.3 kg this week.
        journal.record(&products[1], noon(2026, 10, 10));
        journal.record(&products[0], noon(2026, 10, 18));
        let pct = journal
            .weekly_reduction_pct(noon(2026, 10, 19).date())
            .expect("history exists");
        assert!((pct - (1.8 / 2.1 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn journal_entries_use_tighter_scale() {
        let entry = JournalEntry::from_product(&sample_products()[1], noon(2026, 10, 19));
        assert_eq!(entry.impact_level(), ImpactLevel::High);
    }

    #[test]
    fn goal_fraction_is_clamped() {
        let goal = Goal::new("Scan things", 7, 5);
        assert!(goal.is_met());
        assert!((goal.fraction() - 1.0).abs() < f64::EPSILON);
        assert!((Goal::new("x", 3, 5).fraction() - 0.6).abs() < 1e-9);
    }
}
