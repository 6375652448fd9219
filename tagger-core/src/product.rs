//! Products and their carbon impact.

use serde::{Deserialize, Serialize};

/// The decoded value produced by one scan attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Decoded barcode text.
    pub barcode: String,
}

impl ScanResult {
    /// Wrap a decoded barcode.
    #[must_use]
    pub fn new(barcode: impl Into<String>) -> Self {
        Self {
            barcode: barcode.into(),
        }
    }
}

/// A lifecycle stage in the impact breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStage {
    /// Raw materials and production.
    Manufacturing,
    /// Transport to the shelf.
    Shipping,
    /// Wrapping and containers.
    Packaging,
}

impl LifecycleStage {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Manufacturing => "Manufacturing",
            Self::Shipping => "Shipping",
            Self::Packaging => "Packaging",
        }
    }
}

/// Share of a product's footprint per lifecycle stage, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Manufacturing share.
    pub manufacturing: u8,
    /// Shipping share.
    pub shipping: u8,
    /// Packaging share.
    pub packaging: u8,
}

impl Breakdown {
    /// Stages in display order with their percentage.
    #[must_use]
    pub const fn stages(self) -> [(LifecycleStage, u8); 3] {
        [
            (LifecycleStage::Manufacturing, self.manufacturing),
            (LifecycleStage::Shipping, self.shipping),
            (LifecycleStage::Packaging, self.packaging),
        ]
    }

    /// Sum of all stages. 100 for well-formed data.
    #[must_use]
    pub fn total(self) -> u16 {
        u16::from(self.manufacturing) + u16::from(self.shipping) + u16::from(self.packaging)
    }

    /// Percentage for one stage.
    #[must_use]
    pub const fn share(self, stage: LifecycleStage) -> u8 {
        match stage {
            LifecycleStage::Manufacturing => self.manufacturing,
            LifecycleStage::Shipping => self.shipping,
            LifecycleStage::Packaging => self.packaging,
        }
    }
}

/// Impact bucket shown as a badge next to the CO₂ figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    /// Below the medium threshold.
    Low,
    /// Between the thresholds.
    Medium,
    /// At or above the high threshold.
    High,
}

impl ImpactLevel {
    /// Badge text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Impact",
            Self::Medium => "Medium Impact",
            Self::High => "High Impact",
        }
    }
}

/// Thresholds (kg CO₂e) separating impact levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactScale {
    /// Values from here up are at least medium.
    pub medium_from: f64,
    /// Values from here up are high.
    pub high_from: f64,
}

impl ImpactScale {
    /// Scale used on the product page.
    pub const PRODUCT: Self = Self {
        medium_from: 1.0,
        high_from: 3.0,
    };

    /// Tighter scale used to colour journal entries.
    pub const JOURNAL: Self = Self {
        medium_from: 1.0,
        high_from: 2.0,
    };

    /// Bucket a CO₂ value.
    #[must_use]
    pub fn classify(&self, co2_kg: f64) -> ImpactLevel {
        if co2_kg < self.medium_from {
            ImpactLevel::Low
        } else if co2_kg < self.high_from {
            ImpactLevel::Medium
        } else {
            ImpactLevel::High
        }
    }
}

/// A product with its (mocked) carbon footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Barcode that was scanned for this product.
    pub barcode: String,
    /// Footprint per item in kg CO₂e.
    pub co2_impact: f64,
    /// Shelf category.
    pub category: String,
    /// Share per lifecycle stage.
    pub breakdown: Breakdown,
    /// Real-world equivalent, e.g. "0.2 miles driven".
    pub equivalent: String,
    /// Lower-impact swaps.
    pub alternatives: Vec<String>,
}

impl Product {
    /// Impact level on the product page scale.
    #[must_use]
    pub fn impact_level(&self) -> ImpactLevel {
        ImpactScale::PRODUCT.classify(self.co2_impact)
    }

    /// kg CO₂e attributable to one lifecycle stage.
    #[must_use]
    pub fn stage_co2(&self, stage: LifecycleStage) -> f64 {
        self.co2_impact * f64::from(self.breakdown.share(stage)) / 100.0
    }

    /// Copy of this product stamped with the barcode that was actually scanned.
    #[must_use]
    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = barcode.into();
        self
    }
}
