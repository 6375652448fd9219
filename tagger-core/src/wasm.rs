//! WebAssembly bindings for tagger-core.
//!
//! Exposes the sample catalog and impact classification to JavaScript for
//! pages that only need lookups. The full scanner lives in `tagger-app`.

use wasm_bindgen::prelude::*;

use crate::{ImpactScale, StaticCatalog};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// The sample product catalog, for JavaScript.
#[wasm_bindgen]
pub struct WasmCatalog {
    catalog: StaticCatalog,
}

#[wasm_bindgen]
impl WasmCatalog {
    /// Create a catalog with the sample products.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: StaticCatalog::sample_catalog(),
        }
    }

    /// Load a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns an error string if the JSON is invalid or empty.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<WasmCatalog, String> {
        let catalog = StaticCatalog::from_json(json).map_err(|e| e.to_string())?;
        Ok(Self { catalog })
    }

    /// Look up a barcode; returns the product as JSON.
    ///
    /// # Errors
    ///
    /// Returns the user-facing message if the lookup reports a miss.
    #[wasm_bindgen(js_name = lookupJson)]
    pub fn lookup_json(&self, barcode: &str) -> Result<String, String> {
        let product = self
            .catalog
            .resolve(barcode)
            .map_err(|e| e.user_message().to_string())?;
        serde_json::to_string(&product).map_err(|e| e.to_string())
    }

    /// Number of products in the catalog.
    #[wasm_bindgen(js_name = productCount)]
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.catalog.products().len()
    }
}

impl Default for WasmCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Badge text for a CO₂ value on the product page scale.
#[wasm_bindgen(js_name = impactLabel)]
#[must_use]
pub fn impact_label(co2_kg: f64) -> String {
    ImpactScale::PRODUCT.classify(co2_kg).label().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasm_catalog_default_has_sample_products() {
        assert_eq!(WasmCatalog::default().product_count(), 2);
    }

    #[test]
    fn lookup_json_returns_camel_case_product() {
        let catalog = WasmCatalog::new();
        let json = catalog.lookup_json("123456789012").expect("banana");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(parsed["name"], "Organic Banana (1 lb)");
        assert_eq!(parsed["co2Impact"], 0.3);
    }

    #[test]
    fn lookup_json_keeps_unknown_barcode() {
        let catalog = WasmCatalog::new();
        let json = catalog.lookup_json("000000000000").expect("substitute");
        assert!(json.contains("\"barcode\":\"000000000000\""));
    }

    #[test]
    fn from_json_rejects_empty_catalog() {
        assert!(WasmCatalog::from_json("[]").is_err());
    }

    #[test]
    fn impact_label_uses_product_scale() {
        assert_eq!(impact_label(0.3), "Low Impact");
        assert_eq!(impact_label(2.1), "Medium Impact");
        assert_eq!(impact_label(4.0), "High Impact");
    }
}
