/// Catalog store
///
/// Holds the immutable product list behind an `Arc` so clones are cheap and share data.
/// Also owns the fake network latency every lookup pays.

use crate::catalog::fixtures;
use crate::catalog::models::{Product, ProductCategory};
use crate::catalog::recommender::{RandomSampler, Recommender};
use crate::error::{Result, TryOnError};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Simulated round-trip delays for each catalog operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Latency {
    pub query: Duration,
    pub lookup: Duration,
    pub recommend: Duration,
}

impl Latency {
    /// No delay at all. Handy in tests.
    pub fn none() -> Self {
        Self {
            query: Duration::ZERO,
            lookup: Duration::ZERO,
            recommend: Duration::ZERO,
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            query: Duration::from_millis(500),
            lookup: Duration::from_millis(300),
            recommend: Duration::from_millis(400),
        }
    }
}

/// In-memory product catalog
#[derive(Clone)]
pub struct Catalog {
    products: Arc<Vec<Product>>,
    categories: Arc<Vec<ProductCategory>>,
    recommender: Arc<dyn Recommender>,
    pub(crate) latency: Latency,
}

impl Catalog {
    /// Build a catalog from explicit data
    ///
    /// # Returns
    /// * `Ok(Catalog)` - Data passed validation
    /// * `Err(TryOnError::InvalidCatalog)` - Some invariant is broken
    pub fn new(
        products: Vec<Product>,
        categories: Vec<ProductCategory>,
        latency: Latency,
    ) -> Result<Self> {
        let catalog = Self {
            products: Arc::new(products),
            categories: Arc::new(categories),
            recommender: Arc::new(RandomSampler::default()),
            latency,
        };

        catalog.validate()?;

        log::debug!(
            "catalog loaded: {} products, {} top-level categories",
            catalog.products.len(),
            catalog.categories.len()
        );

        Ok(catalog)
    }

    /// The built-in storefront catalog
    pub fn with_fixtures(latency: Latency) -> Result<Self> {
        Self::new(fixtures::products(), fixtures::categories(), latency)
    }

    /// Fixture catalog with zero latency
    #[cfg(test)]
    pub fn new_test() -> Self {
        Self::with_fixtures(Latency::none()).expect("fixtures are valid")
    }

    /// Replace the recommendation strategy
    pub fn with_recommender(mut self, recommender: Arc<dyn Recommender>) -> Self {
        self.recommender = recommender;
        self
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[ProductCategory] {
        &self.categories
    }

    pub(crate) fn recommender(&self) -> &dyn Recommender {
        self.recommender.as_ref()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Check catalog invariants
    ///
    /// - product ids are unique
    /// - category parents point at an existing top-level category
    /// - colour hex codes look like `#RRGGBB`
    /// - prices are non-negative, ratings sit in 0..=5
    pub fn validate(&self) -> Result<()> {
        let hex = Regex::new(r"^#[0-9A-Fa-f]{6}$")
            .map_err(|e| TryOnError::Generic(e.to_string()))?;

        let top_level: HashSet<&str> = self
            .categories
            .iter()
            .filter(|c| c.is_top_level())
            .map(|c| c.id.as_str())
            .collect();

        for category in self.categories.iter() {
            for child in category.subcategories.iter().flatten() {
                check_parent(child, &top_level)?;
            }
        }

        let mut seen = HashSet::new();
        for product in self.products.iter() {
            if !seen.insert(product.id.as_str()) {
                return Err(TryOnError::InvalidCatalog(format!(
                    "duplicate product id '{}'",
                    product.id
                )));
            }

            check_parent(&product.category, &top_level)?;

            if product.price < 0.0 {
                return Err(TryOnError::InvalidCatalog(format!(
                    "product '{}' has a negative price",
                    product.id
                )));
            }

            if !(0.0..=5.0).contains(&product.rating) {
                return Err(TryOnError::InvalidCatalog(format!(
                    "product '{}' rating {} is outside 0-5",
                    product.id, product.rating
                )));
            }

            if let Some(bad) = product.colors.iter().find(|c| !hex.is_match(&c.hex)) {
                return Err(TryOnError::InvalidCatalog(format!(
                    "product '{}' colour '{}' has bad hex '{}'",
                    product.id, bad.name, bad.hex
                )));
            }
        }

        Ok(())
    }
}

fn check_parent(category: &ProductCategory, top_level: &HashSet<&str>) -> Result<()> {
    match category.parent_id.as_deref() {
        Some(parent) if !top_level.contains(parent) => Err(TryOnError::InvalidCatalog(format!(
            "category '{}' points at unknown parent '{}'",
            category.id, parent
        ))),
        _ => Ok(()),
    }
}
