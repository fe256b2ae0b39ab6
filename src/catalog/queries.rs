/// Catalog query operations
///
/// Every call sleeps for the configured latency first, standing in for a real
/// network or database round trip. Nothing here mutates the catalog.

use crate::catalog::models::{Product, ProductFilter, RecommendationContext};
use crate::catalog::Catalog;
use crate::error::Result;
use std::time::Duration;

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

impl Catalog {
    /// Filter the catalog
    ///
    /// # Arguments
    /// * `filter` - Optional constraints, ANDed together. `None` returns everything.
    ///
    /// # Returns
    /// * `Ok(Vec<Product>)` - Matching products in catalog order
    pub async fn query(&self, filter: Option<&ProductFilter>) -> Result<Vec<Product>> {
        simulate_latency(self.latency.query).await;

        let results: Vec<Product> = match filter {
            Some(filter) => self
                .products()
                .iter()
                .filter(|product| filter.matches(product))
                .cloned()
                .collect(),
            None => self.products().to_vec(),
        };

        log::debug!("catalog query {:?} -> {} products", filter, results.len());

        Ok(results)
    }

    /// Get product by ID
    ///
    /// A missing id is `Ok(None)`, not an error.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Product>> {
        simulate_latency(self.latency.lookup).await;

        Ok(self.products().iter().find(|p| p.id == id).cloned())
    }

    /// Products worth showing this shopper
    ///
    /// `user_id` and `context` are passed through to the recommender untouched.
    pub async fn recommend(
        &self,
        user_id: Option<&str>,
        context: &RecommendationContext,
    ) -> Result<Vec<Product>> {
        simulate_latency(self.latency.recommend).await;

        let recommender = self.recommender();
        let picks = recommender.recommend(self.products(), user_id, context);

        log::debug!(
            "{} recommender picked {} products",
            recommender.label(),
            picks.len()
        );

        Ok(picks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Latency, Recommender};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_query_without_filter_returns_all() {
        let catalog = Catalog::new_test();

        let all = catalog.query(None).await.unwrap();
        assert_eq!(ids(&all), vec!["1", "2", "3", "4", "5"]);

        let empty = catalog.query(Some(&ProductFilter::default())).await.unwrap();
        assert_eq!(empty.len(), 5);
    }

    #[tokio::test]
    async fn test_search_denim() {
        let catalog = Catalog::new_test();

        let filter = ProductFilter::default().search("denim");
        let results = catalog.query(Some(&filter)).await.unwrap();
        assert_eq!(ids(&results), vec!["2"]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let catalog = Catalog::new_test();

        let filter = ProductFilter::default().search("VERSATILE");
        let results = catalog.query(Some(&filter)).await.unwrap();
        assert_eq!(ids(&results), vec!["1", "5"]);
    }

    #[tokio::test]
    async fn test_category_matches_self_or_parent() {
        let catalog = Catalog::new_test();

        let tops = catalog
            .query(Some(&ProductFilter::default().category("tops")))
            .await
            .unwrap();
        assert_eq!(ids(&tops), vec!["1"]);
        assert!(tops.iter().all(|p| p.category.id == "tops"
            || p.category.parent_id.as_deref() == Some("tops")));

        let clothing = catalog
            .query(Some(&ProductFilter::default().category("clothing")))
            .await
            .unwrap();
        assert_eq!(ids(&clothing), vec!["1", "2", "3", "4"]);

        let accessories = catalog
            .query(Some(&ProductFilter::default().category("accessories")))
            .await
            .unwrap();
        assert_eq!(ids(&accessories), vec!["5"]);
    }

    #[tokio::test]
    async fn test_price_range_is_inclusive() {
        let catalog = Catalog::new_test();

        let filter = ProductFilter::default().price_range(89.99, 159.99);
        let results = catalog.query(Some(&filter)).await.unwrap();
        assert_eq!(ids(&results), vec!["1", "2", "3"]);
        assert!(results
            .iter()
            .all(|p| p.price >= 89.99 && p.price <= 159.99));
    }

    #[tokio::test]
    async fn test_filters_are_conjunctive() {
        let catalog = Catalog::new_test();

        let filter = ProductFilter::default()
            .category("clothing")
            .price_range(100.0, 200.0)
            .search("a");
        let results = catalog.query(Some(&filter)).await.unwrap();

        assert_eq!(ids(&results), vec!["2", "3"]);
        for product in &results {
            assert!(filter.matches(product));
            assert!(catalog.products().contains(product));
        }
    }

    #[tokio::test]
    async fn test_color_and_size_filters() {
        let catalog = Catalog::new_test();

        let by_color = ProductFilter::default().colors(vec!["Navy Blue".to_string()]);
        assert_eq!(ids(&catalog.query(Some(&by_color)).await.unwrap()), vec!["3"]);

        let by_size = ProductFilter::default().sizes(vec!["xl".to_string()]);
        assert_eq!(ids(&catalog.query(Some(&by_size)).await.unwrap()), vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_no_match_is_empty() {
        let catalog = Catalog::new_test();

        let filter = ProductFilter::default().category("shoes");
        assert!(catalog.query(Some(&filter)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_is_deterministic_and_non_mutating() {
        let catalog = Catalog::new_test();
        let before = catalog.products().to_vec();

        let filter = ProductFilter::default().search("wool");
        let first = catalog.query(Some(&filter)).await.unwrap();
        let second = catalog.query(Some(&filter)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(catalog.products(), before.as_slice());
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let catalog = Catalog::new_test();

        let found = catalog.get_by_id("4").await.unwrap();
        assert_eq!(found.map(|p| p.name), Some("Wool Blend Coat".to_string()));

        let missing = catalog.get_by_id("999").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_recommend_four_distinct() {
        let catalog = Catalog::new_test();

        for _ in 0..20 {
            let picks = catalog
                .recommend(None, &RecommendationContext::default())
                .await
                .unwrap();
            assert_eq!(picks.len(), 4);

            let unique: HashSet<_> = picks.iter().map(|p| p.id.as_str()).collect();
            assert_eq!(unique.len(), 4);
            assert!(picks.iter().all(|p| catalog.products().contains(p)));
        }
    }

    struct Cheapest;

    impl Recommender for Cheapest {
        fn label(&self) -> &'static str {
            "cheapest"
        }

        fn recommend(
            &self,
            catalog: &[Product],
            _user_id: Option<&str>,
            _context: &RecommendationContext,
        ) -> Vec<Product> {
            let mut sorted = catalog.to_vec();
            sorted.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap());
            sorted.truncate(1);
            sorted
        }
    }

    #[tokio::test]
    async fn test_custom_recommender() {
        let catalog = Catalog::new_test().with_recommender(Arc::new(Cheapest));

        let picks = catalog
            .recommend(Some("user-1"), &RecommendationContext::default())
            .await
            .unwrap();
        assert_eq!(ids(&picks), vec!["5"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let catalog = Catalog::with_fixtures(Latency::default()).unwrap();
        let started = tokio::time::Instant::now();

        catalog.get_by_id("1").await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}
