/// Recommendation strategies
///
/// The catalog hands its products to a `Recommender` and returns whatever it picks.
/// Swap in a real personalised recommender here without touching callers.

use crate::catalog::models::{Product, RecommendationContext};
use rand::seq::SliceRandom;

/// How many products a recommendation list holds
pub const DEFAULT_RECOMMENDATION_COUNT: usize = 4;

/// Picks products for a shopper
pub trait Recommender: Send + Sync {
    /// Short name of the strategy, for logs
    fn label(&self) -> &'static str;

    /// Choose products from `catalog`. Must only return catalog items, each at most once.
    fn recommend(
        &self,
        catalog: &[Product],
        user_id: Option<&str>,
        context: &RecommendationContext,
    ) -> Vec<Product>;
}

/// Uniform random sample. Ignores the shopper completely.
///
/// Shuffles the whole catalog and keeps the head, so order is random too.
pub struct RandomSampler {
    count: usize,
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self {
            count: DEFAULT_RECOMMENDATION_COUNT,
        }
    }
}

impl Recommender for RandomSampler {
    fn label(&self) -> &'static str {
        "random"
    }

    fn recommend(
        &self,
        catalog: &[Product],
        _user_id: Option<&str>,
        _context: &RecommendationContext,
    ) -> Vec<Product> {
        let mut shuffled = catalog.to_vec();
        shuffled.shuffle(&mut rand::thread_rng());
        shuffled.truncate(self.count);
        shuffled
    }
}
