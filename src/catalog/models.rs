/// Data models for catalog entities
///
/// Reference data only. Products are never mutated at runtime, just filtered and cloned.
/// Field names serialize in camelCase to match the storefront's JSON shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product that can be browsed and (maybe) tried on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub images: Vec<String>,
    #[serde(rename = "model3D", skip_serializing_if = "Option::is_none", default)]
    pub model_3d: Option<String>,
    pub category: ProductCategory,
    pub tags: Vec<String>,
    pub colors: Vec<ProductColor>,
    pub sizes: Vec<ProductSize>,
    pub brand: String,
    pub rating: f64,
    pub review_count: u32,
    pub is_available_for_try_on: bool,
    pub metadata: ProductMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// True if the category or its parent is `category_id`.
    ///
    /// Only one level up is checked. The tree is two levels deep anyway.
    pub fn in_category(&self, category_id: &str) -> bool {
        self.category.id == category_id
            || self.category.parent_id.as_deref() == Some(category_id)
    }

    /// Case-insensitive substring match on name, description and tags.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }

    /// Does any colour carry one of these names (case-insensitive)
    pub fn has_any_color(&self, names: &[String]) -> bool {
        self.colors
            .iter()
            .any(|color| names.iter().any(|n| n.eq_ignore_ascii_case(&color.name)))
    }

    /// Does any size carry one of these names (case-insensitive)
    pub fn has_any_size(&self, names: &[String]) -> bool {
        self.sizes
            .iter()
            .any(|size| names.iter().any(|n| n.eq_ignore_ascii_case(&size.name)))
    }
}

/// Category node. Top-level categories own their subcategories;
/// subcategories only point back through `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subcategories: Option<Vec<ProductCategory>>,
}

impl ProductCategory {
    pub fn top_level(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            slug: id.to_string(),
            parent_id: None,
            subcategories: None,
        }
    }

    pub fn child_of(parent: &str, id: &str, name: &str) -> Self {
        Self {
            parent_id: Some(parent.to_string()),
            ..Self::top_level(id, name)
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductColor {
    pub name: String,
    pub hex: String,
    pub rgb: [u8; 3],
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSize {
    pub name: String,
    pub measurements: Measurements,
    pub is_available: bool,
}

/// Garment measurements in inches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chest: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub waist: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hips: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub length: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMetadata {
    pub material: String,
    pub care_instructions: Vec<String>,
    pub country_of_origin: String,
}

/// Optional constraints for a catalog query. Everything supplied is ANDed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category: Option<String>,
    /// Inclusive (min, max)
    pub price_range: Option<(f64, f64)>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = Some((min, max));
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn colors(mut self, colors: Vec<String>) -> Self {
        self.colors = colors;
        self
    }

    pub fn sizes(mut self, sizes: Vec<String>) -> Self {
        self.sizes = sizes;
        self
    }

    /// Check one product against every supplied predicate
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if !product.in_category(category) {
                return false;
            }
        }

        if let Some((min, max)) = self.price_range {
            if product.price < min || product.price > max {
                return false;
            }
        }

        if let Some(term) = &self.search {
            if !product.matches_search(&term.to_lowercase()) {
                return false;
            }
        }

        if !self.colors.is_empty() && !product.has_any_color(&self.colors) {
            return false;
        }

        if !self.sizes.is_empty() && !product.has_any_size(&self.sizes) {
            return false;
        }

        true
    }
}

/// Whatever the caller knows about the shopper right now.
///
/// The random sampler ignores all of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationContext {
    #[serde(default)]
    pub current_outfit: Vec<String>,
    pub occasion: Option<String>,
    pub weather: Option<String>,
    pub budget: Option<f64>,
}
