// POST/GET /api/analytics
//
// Events are logged, never stored. Stats are a fixed mock.

use crate::api::ar_session::Fields;
use crate::api::{ApiRequest, ApiResponse};
use crate::error::{Result, TryOnError};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

const DEFAULT_TIMEFRAME: &str = "7d";

const PRODUCT_KEYS: [&str; 4] = ["id", "name", "category", "price"];
// only coarse face info is kept
const BIOMETRIC_KEYS: [&str; 2] = ["faceShape", "skinTone"];
const DEVICE_KEYS: [&str; 3] = ["userAgent", "screenResolution", "cameraResolution"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub session_id: Value,
    pub timestamp: String,
    pub products: Value,
    pub biometric_data: Value,
    pub device_info: Value,
}

/// Copy `keys` out of `source`, null where absent. Non-objects yield all nulls.
fn pick(source: Option<&Value>, keys: &[&str]) -> Value {
    let picked: Map<String, Value> = keys
        .iter()
        .map(|k| {
            let v = source.and_then(|s| s.get(*k)).cloned().unwrap_or(Value::Null);
            (k.to_string(), v)
        })
        .collect();
    Value::Object(picked)
}

fn summarize_products(products: Option<&Value>) -> Result<Value> {
    let Some(products) = products else {
        return Ok(Value::Null);
    };
    let items = products
        .as_array()
        .ok_or_else(|| TryOnError::InvalidRequest("products is not a list".to_string()))?;

    items
        .iter()
        .map(|p| {
            if p.is_null() {
                return Err(TryOnError::InvalidRequest("null product entry".to_string()));
            }
            Ok(pick(Some(p), &PRODUCT_KEYS))
        })
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

pub fn track(request: &ApiRequest) -> Result<ApiResponse> {
    let body = Fields::from_request(request)?;
    let now = Utc::now();

    let event = AnalyticsEvent {
        kind: "try_on_session",
        session_id: body.present("sessionId").cloned().unwrap_or(Value::Null),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        products: summarize_products(body.present("products"))?,
        biometric_data: pick(body.present("biometricData"), &BIOMETRIC_KEYS),
        device_info: pick(body.present("deviceInfo"), &DEVICE_KEYS),
    };

    log::info!("analytics event tracked: {}", serde_json::to_string(&event)?);

    Ok(ApiResponse::ok(json!({
        "success": true,
        "eventId": format!("event_{}", now.timestamp_millis()),
        "message": "Analytics event tracked successfully",
    })))
}

pub fn stats(request: &ApiRequest) -> Result<ApiResponse> {
    let user_id = request.param("userId");
    let timeframe = request.param("timeframe").unwrap_or(DEFAULT_TIMEFRAME);

    Ok(ApiResponse::ok(json!({
        "success": true,
        "data": {
            "userId": user_id,
            "timeframe": timeframe,
            "stats": {
                "totalTryOns": 45,
                "uniqueProducts": 23,
                "sessionDuration": 185,
                "conversionRate": 0.12,
                "topCategories": [
                    { "category": "tops", "count": 18 },
                    { "category": "dresses", "count": 12 },
                    { "category": "bottoms", "count": 8 },
                ],
                "deviceBreakdown": {
                    "mobile": 0.65,
                    "tablet": 0.15,
                    "desktop": 0.2,
                },
            },
            "recommendations": {
                "accuracy": 0.87,
                "clickThrough": 0.34,
                "conversion": 0.08,
            },
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_returns_event_id() {
        let body = r#"{
            "sessionId": "s1",
            "products": [{"id": "1", "name": "Classic White T-Shirt", "category": "tops", "price": 29.99, "rating": 4.5}],
            "biometricData": {"faceShape": "oval", "skinTone": "medium"}
        }"#;
        let response = track(&ApiRequest::post("/api/analytics", body)).unwrap();

        assert_eq!(response.status, 200);
        assert!(response.body["eventId"]
            .as_str()
            .unwrap()
            .starts_with("event_"));
        assert_eq!(response.body["message"], "Analytics event tracked successfully");
    }

    #[test]
    fn test_track_rejects_garbage() {
        assert!(track(&ApiRequest::post("/api/analytics", "{")).is_err());
        assert!(track(&ApiRequest::post("/api/analytics", r#"{"products":"1"}"#)).is_err());
    }

    #[test]
    fn test_track_accepts_loose_types() {
        let body = r#"{"sessionId":7,"products":[{"id":1,"price":"free"},"x"],"biometricData":"oval","deviceInfo":false}"#;
        let response = track(&ApiRequest::post("/api/analytics", body)).unwrap();
        assert_eq!(response.status, 200);
    }

    #[test]
    fn test_pick_keeps_only_named_keys() {
        let source = json!({"faceShape": "oval", "skinTone": "warm", "landmarks": [1, 2]});
        assert_eq!(
            pick(Some(&source), &BIOMETRIC_KEYS),
            json!({"faceShape": "oval", "skinTone": "warm"})
        );
        assert_eq!(
            pick(Some(&json!("oval")), &BIOMETRIC_KEYS),
            json!({"faceShape": null, "skinTone": null})
        );
        assert_eq!(
            summarize_products(Some(&json!([{"id": "1", "rating": 4.5}]))).unwrap(),
            json!([{"id": "1", "name": null, "category": null, "price": null}])
        );
    }

    #[test]
    fn test_stats_default_timeframe() {
        let response = stats(&ApiRequest::get("/api/analytics?userId=u1")).unwrap();
        assert_eq!(response.body["data"]["timeframe"], "7d");
        assert_eq!(response.body["data"]["userId"], "u1");
        assert_eq!(response.body["data"]["stats"]["totalTryOns"], 45);

        let anon = stats(&ApiRequest::get("/api/analytics?timeframe=30d")).unwrap();
        assert_eq!(anon.body["data"]["timeframe"], "30d");
        assert!(anon.body["data"]["userId"].is_null());
    }
}
