//! View routing between home, scanner, journal and product screens.

use serde::{Deserialize, Serialize};

use crate::Product;

/// Which screen is on display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", content = "product", rename_all = "lowercase")]
pub enum View {
    /// Landing page.
    Home,
    /// Barcode scanner.
    Scanner,
    /// Carbon journal.
    Journal,
    /// Impact details for the last scanned product.
    Product(Box<Product>),
}

impl View {
    /// Short screen name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Scanner => "scanner",
            Self::Journal => "journal",
            Self::Product(_) => "product",
        }
    }
}

/// User actions that move between screens.
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    /// "Start Scanning" on the home page.
    StartScanning,
    /// "View Journal" on the home page.
    OpenJournal,
    /// The scanner delivered a product.
    ProductScanned(Product),
    /// Back button on any screen.
    Back,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ActiveView {
    #[default]
    Home,
    Scan,
    Journal,
}

/// Screen state machine.
///
/// The scanner and journal take precedence; otherwise a held product shows
/// its details, and with nothing held the home page is shown.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    active: ActiveView,
    scanned: Option<Product>,
}

impl Navigator {
    /// Start on the home page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The screen to render.
    #[must_use]
    pub fn current(&self) -> View {
        match (self.active, &self.scanned) {
            (ActiveView::Scan, _) => View::Scanner,
            (ActiveView::Journal, _) => View::Journal,
            (ActiveView::Home, Some(product)) => View::Product(Box::new(product.clone())),
            (ActiveView::Home, None) => View::Home,
        }
    }

    /// The product held for the details screen.
    #[must_use]
    pub fn scanned_product(&self) -> Option<&Product> {
        self.scanned.as_ref()
    }

    /// Apply a user action and return the new screen.
    pub fn dispatch(&mut self, event: NavEvent) -> View {
        match event {
            NavEvent::StartScanning => self.active = ActiveView::Scan,
            NavEvent::OpenJournal => self.active = ActiveView::Journal,
            NavEvent::ProductScanned(product) => {
                self.scanned = Some(product);
                self.active = ActiveView::Home;
            }
            NavEvent::Back => {
                if self.active == ActiveView::Home {
                    self.scanned = None;
                } else {
                    self.active = ActiveView::Home;
                }
            }
        }
        let view = self.current();
        tracing::debug!(view = view.name(), "Navigated");
        view
    }
}
