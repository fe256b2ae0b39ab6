// GET /api/products and GET /api/products/{id}

use crate::api::{to_value, ApiRequest, ApiResponse};
use crate::catalog::{Catalog, ProductFilter};
use crate::error::{Result, TryOnError};
use serde_json::json;

/// Turn query parameters into a filter
///
/// `category=all` means no category filter. A price range needs both ends.
/// Colours and sizes are comma separated.
pub fn filter_from_query(request: &ApiRequest) -> Result<ProductFilter> {
    let mut filter = ProductFilter::default();

    if let Some(category) = request.param("category").filter(|c| *c != "all") {
        filter = filter.category(category);
    }

    if let Some(search) = request.param("search") {
        filter = filter.search(search);
    }

    if let (Some(min), Some(max)) = (request.param("minPrice"), request.param("maxPrice")) {
        filter = filter.price_range(parse_price(min)?, parse_price(max)?);
    }

    if let Some(colors) = request.param("colors") {
        filter = filter.colors(split_list(colors));
    }

    if let Some(sizes) = request.param("sizes") {
        filter = filter.sizes(split_list(sizes));
    }

    Ok(filter)
}

fn parse_price(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| TryOnError::InvalidRequest(format!("'{}' is not a price", raw)))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub async fn list(catalog: &Catalog, request: &ApiRequest) -> Result<ApiResponse> {
    let filter = filter_from_query(request)?;
    let products = catalog.query(Some(&filter)).await?;

    Ok(ApiResponse::ok(json!({
        "success": true,
        "count": products.len(),
        "data": to_value(&products)?,
    })))
}

pub async fn by_id(catalog: &Catalog, id: &str) -> Result<ApiResponse> {
    match catalog.get_by_id(id).await? {
        Some(product) => Ok(ApiResponse::ok(json!({
            "success": true,
            "data": to_value(&product)?,
        }))),
        None => Ok(ApiResponse::failure(404, "Product not found")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_all_is_ignored() {
        let filter = filter_from_query(&ApiRequest::get("/api/products?category=all")).unwrap();
        assert_eq!(filter, ProductFilter::default());
    }

    #[test]
    fn test_price_needs_both_ends() {
        let only_min = filter_from_query(&ApiRequest::get("/api/products?minPrice=10")).unwrap();
        assert_eq!(only_min.price_range, None);

        let both =
            filter_from_query(&ApiRequest::get("/api/products?minPrice=10&maxPrice=90.5")).unwrap();
        assert_eq!(both.price_range, Some((10.0, 90.5)));
    }

    #[test]
    fn test_bad_price_is_an_error() {
        let result = filter_from_query(&ApiRequest::get("/api/products?minPrice=cheap&maxPrice=9"));
        assert!(matches!(result, Err(TryOnError::InvalidRequest(_))));
    }

    #[test]
    fn test_lists_split_on_commas() {
        let filter =
            filter_from_query(&ApiRequest::get("/api/products?colors=Blue,%20Black,&sizes=M"))
                .unwrap();
        assert_eq!(filter.colors, vec!["Blue", "Black"]);
        assert_eq!(filter.sizes, vec!["M"]);
    }

    #[tokio::test]
    async fn test_by_id() {
        let catalog = Catalog::new_test();

        let found = by_id(&catalog, "3").await.unwrap();
        assert_eq!(found.status, 200);
        assert_eq!(found.body["data"]["id"], "3");

        let missing = by_id(&catalog, "999").await.unwrap();
        assert_eq!(missing.status, 404);
        assert_eq!(missing.body["error"], "Product not found");
    }
}
