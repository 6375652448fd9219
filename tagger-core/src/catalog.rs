//! Product lookup.
//!
//! The scanner only depends on [`ProductLookup`]. [`StaticCatalog`] is the
//! built-in implementation over a fixed list of sample products; a real
//! lookup backend can replace it without touching the controller.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{Breakdown, Product, ScanError, TaggerError, TaggerResult};

/// Resolves decoded barcodes to products.
#[async_trait(?Send)]
pub trait ProductLookup {
    /// Find the product for a barcode. The returned product carries
    /// `barcode` as its barcode.
    async fn lookup(&self, barcode: &str) -> Result<Product, ScanError>;

    /// Any representative product, used by the simulated scanner.
    async fn sample(&self) -> Result<Product, ScanError>;
}

/// What to do when no catalog entry matches a barcode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Show a pseudo-random catalog entry (demo behaviour).
    #[default]
    Substitute,
    /// Fail with [`ScanError::ProductNotFound`].
    Report,
}

/// In-memory catalog with a pseudo-random fallback.
#[derive(Debug)]
pub struct StaticCatalog {
    products: Vec<Product>,
    miss_policy: MissPolicy,
    rng: Mutex<StdRng>,
}

impl StaticCatalog {
    /// Build a catalog from a product list.
    ///
    /// # Errors
    ///
    /// Returns [`TaggerError::EmptyCatalog`] for an empty list.
    pub fn new(products: Vec<Product>) -> TaggerResult<Self> {
        if products.is_empty() {
            return Err(TaggerError::EmptyCatalog);
        }
        Ok(Self {
            products,
            miss_policy: MissPolicy::default(),
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// Load a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or an empty array.
    pub fn from_json(json: &str) -> TaggerResult<Self> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// The two sample products the app ships with.
    #[must_use]
    pub fn sample_catalog() -> Self {
        Self {
            products: sample_products(),
            miss_policy: MissPolicy::default(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Use a fixed seed for the fallback selection.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Set the miss policy.
    #[must_use]
    pub fn with_miss_policy(mut self, policy: MissPolicy) -> Self {
        self.miss_policy = policy;
        self
    }

    /// All products.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Exact barcode match.
    #[must_use]
    pub fn find(&self, barcode: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.barcode == barcode)
    }

    /// A pseudo-random product.
    #[must_use]
    pub fn random(&self) -> Product {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        // new() rejects empty lists, so there is always something to choose.
        self.products
            .choose(&mut *rng)
            .unwrap_or(&self.products[0])
            .clone()
    }

    /// Synchronous lookup used by the trait impl and the CLI.
    ///
    /// # Errors
    ///
    /// [`ScanError::ProductNotFound`] on a miss under [`MissPolicy::Report`].
    pub fn resolve(&self, barcode: &str) -> Result<Product, ScanError> {
        let product = match self.find(barcode) {
            Some(product) => product.clone(),
            None => match self.miss_policy {
                MissPolicy::Substitute => {
                    let substitute = self.random();
                    tracing::debug!(
                        barcode,
                        substitute = %substitute.name,
                        "No catalog match, substituting"
                    );
                    substitute
                }
                MissPolicy::Report => {
                    return Err(ScanError::ProductNotFound(barcode.to_string()));
                }
            },
        };
        Ok(product.with_barcode(barcode))
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::sample_catalog()
    }
}

#[async_trait(?Send)]
impl ProductLookup for StaticCatalog {
    async fn lookup(&self, barcode: &str) -> Result<Product, ScanError> {
        self.resolve(barcode)
    }

    async fn sample(&self) -> Result<Product, ScanError> {
        Ok(self.random())
    }
}

/// The sample products: an organic banana and a plastic water bottle.
#[must_use]
pub fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: "1".into(),
            name: "Organic Banana (1 lb)".into(),
            barcode: "123456789012".into(),
            co2_impact: 0.3,
            category: "Fruit".into(),
            breakdown: Breakdown {
                manufacturing: 15,
                shipping: 25,
                packaging: 60,
            },
            equivalent: "0.2 miles driven".into(),
            alternatives: vec!["Local Banana".into(), "Seasonal Apple".into()],
        },
        Product {
            id: "2".into(),
            name: "Plastic Water Bottle (500ml)".into(),
            barcode: "987654321098".into(),
            co2_impact: 2.1,
            category: "Beverage".into(),
            breakdown: Breakdown {
                manufacturing: 70,
                shipping: 20,
                packaging: 10,
            },
            equivalent: "1.6 miles driven".into(),
            alternatives: vec!["Reusable Water Bottle".into(), "Glass Bottle".into()],
        },
    ]
}
