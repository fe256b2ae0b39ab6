// The built-in storefront catalog
//
// Five products across three top-level categories. Small on purpose; it's a demo shop.

use crate::catalog::models::*;
use chrono::{DateTime, TimeZone, Utc};

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn color(name: &str, hex: &str, rgb: [u8; 3], is_available: bool) -> ProductColor {
    ProductColor {
        name: name.to_string(),
        hex: hex.to_string(),
        rgb,
        is_available,
    }
}

fn size(name: &str, measurements: Measurements, is_available: bool) -> ProductSize {
    ProductSize {
        name: name.to_string(),
        measurements,
        is_available,
    }
}

// Tops, dresses, coats
fn upper(chest: f32, waist: f32, length: f32) -> Measurements {
    Measurements {
        chest: Some(chest),
        waist: Some(waist),
        length: Some(length),
        ..Default::default()
    }
}

// Jeans
fn lower(waist: f32, hips: f32, length: f32) -> Measurements {
    Measurements {
        waist: Some(waist),
        hips: Some(hips),
        length: Some(length),
        ..Default::default()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn unsplash(photo: &str) -> String {
    format!(
        "https://images.unsplash.com/photo-{}?w=400&h=600&fit=crop",
        photo
    )
}

/// Category tree: clothing and accessories have children, shoes doesn't
pub fn categories() -> Vec<ProductCategory> {
    vec![
        ProductCategory {
            subcategories: Some(vec![
                ProductCategory::child_of("clothing", "tops", "Tops"),
                ProductCategory::child_of("clothing", "bottoms", "Bottoms"),
                ProductCategory::child_of("clothing", "dresses", "Dresses"),
                ProductCategory::child_of("clothing", "outerwear", "Outerwear"),
            ]),
            ..ProductCategory::top_level("clothing", "Clothing")
        },
        ProductCategory {
            subcategories: Some(vec![
                ProductCategory::child_of("accessories", "jewelry", "Jewelry"),
                ProductCategory::child_of("accessories", "bags", "Bags"),
                ProductCategory::child_of("accessories", "hats", "Hats"),
            ]),
            ..ProductCategory::top_level("accessories", "Accessories")
        },
        ProductCategory::top_level("shoes", "Shoes"),
    ]
}

/// The five products the shop sells
pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: "1".to_string(),
            name: "Classic White Button-Up Shirt".to_string(),
            description: "A timeless white button-up shirt made from premium cotton. Perfect for both professional and casual settings.".to_string(),
            price: 89.99,
            images: vec![
                unsplash("1621072156002-e2fccdc0b176"),
                unsplash("1618932260643-eee4a2f652a6"),
            ],
            model_3d: Some("/models/white-shirt.glb".to_string()),
            category: ProductCategory::child_of("clothing", "tops", "Tops"),
            tags: strings(&["classic", "professional", "cotton", "versatile"]),
            colors: vec![
                color("White", "#FFFFFF", [255, 255, 255], true),
                color("Light Blue", "#E6F3FF", [230, 243, 255], true),
                color("Cream", "#F5F5DC", [245, 245, 220], false),
            ],
            sizes: vec![
                size("XS", upper(32.0, 26.0, 24.0), true),
                size("S", upper(34.0, 28.0, 25.0), true),
                size("M", upper(36.0, 30.0, 26.0), true),
                size("L", upper(38.0, 32.0, 27.0), true),
                size("XL", upper(40.0, 34.0, 28.0), false),
            ],
            brand: "StyleCo".to_string(),
            rating: 4.5,
            review_count: 234,
            is_available_for_try_on: true,
            metadata: ProductMetadata {
                material: "100% Cotton".to_string(),
                care_instructions: strings(&[
                    "Machine wash cold",
                    "Tumble dry low",
                    "Iron on medium heat",
                ]),
                country_of_origin: "Turkey".to_string(),
            },
            created_at: date(2024, 1, 15),
            updated_at: date(2024, 2, 20),
        },
        Product {
            id: "2".to_string(),
            name: "High-Waisted Denim Jeans".to_string(),
            description: "Comfortable high-waisted jeans with a flattering fit. Made from sustainable denim with stretch.".to_string(),
            price: 129.99,
            images: vec![
                unsplash("1541099649105-f69ad21f3246"),
                unsplash("1582418702059-97ebafb35d09"),
            ],
            model_3d: Some("/models/denim-jeans.glb".to_string()),
            category: ProductCategory::child_of("clothing", "bottoms", "Bottoms"),
            tags: strings(&["denim", "high-waisted", "sustainable", "stretch"]),
            colors: vec![
                color("Dark Wash", "#1E3A8A", [30, 58, 138], true),
                color("Medium Wash", "#3B82F6", [59, 130, 246], true),
                color("Light Wash", "#93C5FD", [147, 197, 253], true),
            ],
            sizes: vec![
                size("24", lower(24.0, 34.0, 32.0), true),
                size("26", lower(26.0, 36.0, 32.0), true),
                size("28", lower(28.0, 38.0, 32.0), true),
                size("30", lower(30.0, 40.0, 32.0), true),
                size("32", lower(32.0, 42.0, 32.0), true),
            ],
            brand: "EcoFashion".to_string(),
            rating: 4.7,
            review_count: 456,
            is_available_for_try_on: true,
            metadata: ProductMetadata {
                material: "92% Cotton, 6% Polyester, 2% Elastane".to_string(),
                care_instructions: strings(&[
                    "Machine wash cold",
                    "Turn inside out",
                    "Hang to dry",
                ]),
                country_of_origin: "Mexico".to_string(),
            },
            created_at: date(2024, 1, 20),
            updated_at: date(2024, 2, 25),
        },
        Product {
            id: "3".to_string(),
            name: "Flowing Maxi Dress".to_string(),
            description: "Elegant flowing maxi dress perfect for summer occasions. Features a flattering A-line silhouette.".to_string(),
            price: 159.99,
            images: vec![
                unsplash("1595777457583-95e059d581b8"),
                unsplash("1566479179817-0e060e4b3893"),
            ],
            model_3d: Some("/models/maxi-dress.glb".to_string()),
            category: ProductCategory::child_of("clothing", "dresses", "Dresses"),
            tags: strings(&["maxi", "elegant", "summer", "flowy"]),
            colors: vec![
                color("Navy Blue", "#1E3A8A", [30, 58, 138], true),
                color("Sage Green", "#84CC16", [132, 204, 22], true),
                color("Rose Pink", "#F472B6", [244, 114, 182], true),
            ],
            sizes: vec![
                size("XS", upper(32.0, 26.0, 58.0), true),
                size("S", upper(34.0, 28.0, 58.0), true),
                size("M", upper(36.0, 30.0, 59.0), true),
                size("L", upper(38.0, 32.0, 59.0), true),
                size("XL", upper(40.0, 34.0, 60.0), true),
            ],
            brand: "FlowStyle".to_string(),
            rating: 4.3,
            review_count: 189,
            is_available_for_try_on: true,
            metadata: ProductMetadata {
                material: "100% Viscose".to_string(),
                care_instructions: strings(&[
                    "Hand wash only",
                    "Lay flat to dry",
                    "Cool iron if needed",
                ]),
                country_of_origin: "India".to_string(),
            },
            created_at: date(2024, 2, 1),
            updated_at: date(2024, 2, 28),
        },
        Product {
            id: "4".to_string(),
            name: "Wool Blend Coat".to_string(),
            description: "Sophisticated wool blend coat perfect for colder weather. Features a classic tailored fit.".to_string(),
            price: 299.99,
            images: vec![
                unsplash("1551698618-1dfe5d97d256"),
                unsplash("1578662996442-48f60103fc96"),
            ],
            model_3d: Some("/models/wool-coat.glb".to_string()),
            category: ProductCategory::child_of("clothing", "outerwear", "Outerwear"),
            tags: strings(&["wool", "winter", "tailored", "sophisticated"]),
            colors: vec![
                color("Black", "#000000", [0, 0, 0], true),
                color("Camel", "#C19A6B", [193, 154, 107], true),
                color("Grey", "#6B7280", [107, 114, 128], false),
            ],
            sizes: vec![
                size("XS", upper(34.0, 28.0, 32.0), true),
                size("S", upper(36.0, 30.0, 33.0), true),
                size("M", upper(38.0, 32.0, 34.0), true),
                size("L", upper(40.0, 34.0, 35.0), true),
            ],
            brand: "LuxWear".to_string(),
            rating: 4.8,
            review_count: 67,
            is_available_for_try_on: true,
            metadata: ProductMetadata {
                material: "70% Wool, 30% Polyester".to_string(),
                care_instructions: strings(&["Dry clean only", "Store on hanger"]),
                country_of_origin: "Italy".to_string(),
            },
            created_at: date(2024, 1, 10),
            updated_at: date(2024, 2, 15),
        },
        Product {
            id: "5".to_string(),
            name: "Silk Scarf".to_string(),
            description: "Luxurious silk scarf with intricate patterns. Perfect accessory for any outfit.".to_string(),
            price: 79.99,
            images: vec![
                unsplash("1590736969955-71cc94901144"),
                unsplash("1596364104097-e5c4b7b7b6a7"),
            ],
            model_3d: None,
            category: ProductCategory::top_level("accessories", "Accessories"),
            tags: strings(&["silk", "luxury", "pattern", "versatile"]),
            colors: vec![
                color("Burgundy", "#7C2D12", [124, 45, 18], true),
                color("Emerald", "#059669", [5, 150, 105], true),
                color("Royal Blue", "#1D4ED8", [29, 78, 216], true),
            ],
            sizes: vec![size(
                "Standard",
                Measurements {
                    waist: Some(36.0),
                    length: Some(36.0),
                    ..Default::default()
                },
                true,
            )],
            brand: "SilkLux".to_string(),
            rating: 4.6,
            review_count: 143,
            is_available_for_try_on: false,
            metadata: ProductMetadata {
                material: "100% Silk".to_string(),
                care_instructions: strings(&["Dry clean only", "Store flat"]),
                country_of_origin: "France".to_string(),
            },
            created_at: date(2024, 2, 5),
            updated_at: date(2024, 2, 22),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_counts() {
        assert_eq!(products().len(), 5);
        assert_eq!(categories().len(), 3);
    }

    #[test]
    fn test_dates_are_real() {
        let shirt = &products()[0];
        assert_eq!(shirt.created_at.to_rfc3339(), "2024-01-15T00:00:00+00:00");
    }
}
