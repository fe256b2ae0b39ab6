use serde_json::Value;
use std::collections::HashSet;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use virtual_tryon_lib::api::{ApiRequest, ApiServer, Router};
use virtual_tryon_lib::catalog::{Catalog, Latency};

fn router() -> Router {
    Router::new(Catalog::with_fixtures(Latency::none()).unwrap())
}

fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_search_denim_finds_jeans() {
    let response = router()
        .handle(&ApiRequest::get("/api/products?search=denim"))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["success"], true);
    assert_eq!(ids(&response.body), vec!["2"]);
    assert_eq!(response.body["count"], 1);
}

#[tokio::test]
async fn test_parent_category_includes_children() {
    let response = router()
        .handle(&ApiRequest::get("/api/products?category=clothing"))
        .await;
    assert_eq!(ids(&response.body), vec!["1", "2", "3", "4"]);

    let tops = router()
        .handle(&ApiRequest::get("/api/products?category=tops"))
        .await;
    assert_eq!(ids(&tops.body), vec!["1"]);

    let all = router()
        .handle(&ApiRequest::get("/api/products?category=all"))
        .await;
    assert_eq!(all.body["count"], 5);
}

#[tokio::test]
async fn test_price_range_is_inclusive() {
    let response = router()
        .handle(&ApiRequest::get("/api/products?minPrice=79.99&maxPrice=129.99"))
        .await;
    assert_eq!(ids(&response.body), vec!["1", "2", "5"]);

    // a lone bound is ignored
    let lone = router()
        .handle(&ApiRequest::get("/api/products?maxPrice=10"))
        .await;
    assert_eq!(lone.body["count"], 5);
}

#[tokio::test]
async fn test_unparseable_price_is_500() {
    let response = router()
        .handle(&ApiRequest::get("/api/products?minPrice=a&maxPrice=b"))
        .await;
    assert_eq!(response.status, 500);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"], "Failed to fetch products");
}

#[tokio::test]
async fn test_product_by_id() {
    let found = router().handle(&ApiRequest::get("/api/products/5")).await;
    assert_eq!(found.status, 200);
    assert_eq!(found.body["data"]["name"], "Silk Scarf");

    let missing = router().handle(&ApiRequest::get("/api/products/999")).await;
    assert_eq!(missing.status, 404);
    assert_eq!(missing.body["success"], false);
    assert_eq!(missing.body["error"], "Product not found");
}

#[tokio::test]
async fn test_recommendations_are_distinct_catalog_items() {
    let router = router();
    let catalog_ids: HashSet<String> = router
        .catalog()
        .products()
        .iter()
        .map(|p| p.id.clone())
        .collect();

    for request in [
        ApiRequest::get("/api/recommendations"),
        ApiRequest::post("/api/recommendations", r#"{"userId":"u1","context":{"occasion":"work"}}"#),
    ] {
        let response = router.handle(&request).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body["algorithm"], "hybrid");
        assert_eq!(response.body["confidence"], 0.85);

        let picked = ids(&response.body);
        assert_eq!(picked.len(), 4);
        let unique: HashSet<String> = picked.iter().cloned().collect();
        assert_eq!(unique.len(), 4);
        assert!(unique.is_subset(&catalog_ids));
    }
}

#[tokio::test]
async fn test_malformed_bodies_are_500() {
    let router = router();
    let cases = [
        (ApiRequest::post("/api/recommendations", "{oops"), "Failed to generate recommendations"),
        (ApiRequest::post("/api/ar-session", ""), "Failed to create AR session"),
        (ApiRequest::put("/api/ar-session", "]"), "Failed to update AR session"),
        (ApiRequest::post("/api/analytics", "not json"), "Failed to track analytics"),
    ];

    for (request, message) in cases {
        let response = router.handle(&request).await;
        assert_eq!(response.status, 500, "{}", request.path);
        assert_eq!(response.body["success"], false);
        assert_eq!(response.body["error"], message);
    }
}

#[tokio::test]
async fn test_session_and_analytics_routes() {
    let router = router();

    let session = router
        .handle(&ApiRequest::post("/api/ar-session", r#"{"userId":"shopper"}"#))
        .await;
    assert_eq!(session.status, 200);
    assert_eq!(session.body["data"]["userId"], "shopper");
    assert!(session.body["data"]["id"]
        .as_str()
        .unwrap()
        .starts_with("session_"));

    let stats = router.handle(&ApiRequest::get("/api/analytics")).await;
    assert_eq!(stats.body["data"]["timeframe"], "7d");

    let tracked = router
        .handle(&ApiRequest::post("/api/analytics", r#"{"sessionId":"s1"}"#))
        .await;
    assert_eq!(tracked.body["success"], true);
}

#[tokio::test]
async fn test_session_empty_ids_get_defaults() {
    let response = router()
        .handle(&ApiRequest::post("/api/ar-session", r#"{"sessionId":"","userId":""}"#))
        .await;

    assert_eq!(response.status, 200);
    let data = &response.body["data"];
    assert!(data["id"].as_str().unwrap().starts_with("session_"));
    assert!(data["userId"].as_str().unwrap().starts_with("guest_"));
}

#[tokio::test]
async fn test_session_numeric_id_is_echoed() {
    let router = router();
    let response = router
        .handle(&ApiRequest::post("/api/ar-session", r#"{"sessionId":42}"#))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["data"]["id"], 42);

    let tracked = router
        .handle(&ApiRequest::post("/api/analytics", r#"{"sessionId":42,"deviceInfo":1}"#))
        .await;
    assert_eq!(tracked.status, 200);
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    let router = router();
    assert_eq!(router.handle(&ApiRequest::get("/api/cart")).await.status, 404);
    assert_eq!(
        router
            .handle(&ApiRequest::new("PATCH", "/api/analytics", None))
            .await
            .status,
        405
    );
}

async fn roundtrip(addr: std::net::SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_server_over_tcp() {
    let server = ApiServer::bind("127.0.0.1:0", router()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let task = tokio::spawn(server.run_until(async {
        let _ = stop_rx.await;
    }));

    let response = roundtrip(
        addr,
        "GET /api/products?search=denim HTTP/1.1\r\nHost: localhost\r\n\r\n",
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 200 OK"));
    let body = response.split("\r\n\r\n").nth(1).unwrap();
    let json: Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["count"], 1);

    let body = r#"{"userId":"u1"}"#;
    let post = format!(
        "POST /api/recommendations HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let response = roundtrip(addr, &post).await;
    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(response.contains("\"algorithm\":\"hybrid\""));

    let response = roundtrip(addr, "GET /nowhere HTTP/1.1\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 404 Not Found"));

    stop_tx.send(()).unwrap();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_short_body_is_bad_request() {
    let server = ApiServer::bind("127.0.0.1:0", router()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let task = tokio::spawn(server.run_until(async {
        let _ = stop_rx.await;
    }));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"POST /api/ar-session HTTP/1.1\r\nContent-Length: 50\r\n\r\n{\"a\"")
        .await
        .unwrap();
    stream.shutdown().await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 400 Bad Request"), "{}", response);

    stop_tx.send(()).unwrap();
    task.await.unwrap().unwrap();
}
