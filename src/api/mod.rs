/// Mock storefront API
///
/// Handlers are plain async functions from `ApiRequest` to `ApiResponse`, so they
/// can be driven without a socket. `server` puts them behind a tiny HTTP/1.1 listener.

pub mod analytics;
pub mod ar_session;
pub mod products;
pub mod recommendations;
pub mod server;

pub use server::ApiServer;

use crate::catalog::Catalog;
use crate::error::{Result, TryOnError};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
}

impl ApiRequest {
    /// Build a request from a method and a raw target like `/api/products?search=denim`
    pub fn new(method: &str, target: &str, body: Option<String>) -> Self {
        let (path, raw_query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };

        let query = url::form_urlencoded::parse(raw_query.as_bytes())
            .into_owned()
            .collect();

        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            query,
            body,
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new("GET", target, None)
    }

    pub fn post(target: &str, body: impl Into<String>) -> Self {
        Self::new("POST", target, Some(body.into()))
    }

    pub fn put(target: &str, body: impl Into<String>) -> Self {
        Self::new("PUT", target, Some(body.into()))
    }

    /// Non-empty query parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Parse the body as JSON. Missing or malformed bodies are an error.
    pub fn json(&self) -> Result<Value> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| TryOnError::InvalidRequest("request body is empty".to_string()))?;
        Ok(serde_json::from_str(body)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// `{success: false, error}` with the given status
    pub fn failure(status: u16, error: &str) -> Self {
        Self {
            status,
            body: json!({ "success": false, "error": error }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

pub(crate) fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Routes requests to handlers
#[derive(Clone)]
pub struct Router {
    catalog: Catalog,
}

impl Router {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let path = request.path.trim_end_matches('/');
        let method = request.method.as_str();

        let response = match (path, method) {
            ("/api/products", "GET") => {
                guard(products::list(&self.catalog, request).await, "Failed to fetch products")
            }
            ("/api/products", _) => method_not_allowed(),

            ("/api/recommendations", "GET") => guard(
                recommendations::fetch(&self.catalog, request).await,
                "Failed to fetch recommendations",
            ),
            ("/api/recommendations", "POST") => guard(
                recommendations::generate(&self.catalog, request).await,
                "Failed to generate recommendations",
            ),
            ("/api/recommendations", _) => method_not_allowed(),

            ("/api/ar-session", "POST") => {
                guard(ar_session::create(request), "Failed to create AR session")
            }
            ("/api/ar-session", "PUT") => {
                guard(ar_session::update(request), "Failed to update AR session")
            }
            ("/api/ar-session", _) => method_not_allowed(),

            ("/api/analytics", "POST") => {
                guard(analytics::track(request), "Failed to track analytics")
            }
            ("/api/analytics", "GET") => {
                guard(analytics::stats(request), "Failed to fetch analytics")
            }
            ("/api/analytics", _) => method_not_allowed(),

            _ => match product_id(path) {
                Some(id) if method == "GET" => guard(
                    products::by_id(&self.catalog, id).await,
                    "Failed to fetch product",
                ),
                Some(_) => method_not_allowed(),
                None => ApiResponse::failure(404, "Not found"),
            },
        };

        log::info!("{} {} -> {}", method, request.path, response.status);
        response
    }
}

fn product_id(path: &str) -> Option<&str> {
    path.strip_prefix("/api/products/")
        .filter(|id| !id.is_empty() && !id.contains('/'))
}

fn method_not_allowed() -> ApiResponse {
    ApiResponse::failure(405, "Method not allowed")
}

/// Turn a handler error into the route's 500
fn guard(result: Result<ApiResponse>, message: &str) -> ApiResponse {
    match result {
        Ok(response) => response,
        Err(e) => {
            log::error!("{}: {}", message, e);
            ApiResponse::failure(500, message)
        }
    }
}
