// POST/PUT /api/ar-session
//
// Nothing is stored. POST echoes a session object back with defaults filled
// in, PUT just acknowledges.

use crate::api::{to_value, ApiRequest, ApiResponse};
use crate::error::{Result, TryOnError};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub user_agent: Option<String>,
    pub screen_resolution: Option<String>,
    pub camera_resolution: Option<String>,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            user_agent: Some("Unknown".to_string()),
            screen_resolution: Some("1920x1080".to_string()),
            camera_resolution: Some("1280x720".to_string()),
        }
    }
}

/// Top-level body fields, kept as raw JSON so any type can be echoed back
pub(crate) struct Fields(serde_json::Map<String, Value>);

impl Fields {
    pub(crate) fn from_request(request: &ApiRequest) -> Result<Self> {
        match request.json()? {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(TryOnError::InvalidRequest("body is null".to_string())),
            // arrays and scalars carry no named fields
            _ => Ok(Self(serde_json::Map::new())),
        }
    }

    /// Any non-null value
    pub(crate) fn present(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Value unless it is null, false, 0 or an empty string
    pub(crate) fn given(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| is_given(v))
    }
}

pub(crate) fn is_given(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TryOnSessionRecord {
    pub id: Value,
    pub user_id: Value,
    pub products: Value,
    pub snapshots: Vec<String>,
    pub started_at: String,
    pub device_info: Value,
}

fn label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn create(request: &ApiRequest) -> Result<ApiResponse> {
    let body = Fields::from_request(request)?;
    let now = Utc::now();
    let millis = now.timestamp_millis();

    let session = TryOnSessionRecord {
        id: body
            .given("sessionId")
            .cloned()
            .unwrap_or_else(|| Value::String(format!("session_{}", millis))),
        user_id: body
            .given("userId")
            .cloned()
            .unwrap_or_else(|| Value::String(format!("guest_{}", millis))),
        products: body.given("products").cloned().unwrap_or_else(|| json!([])),
        snapshots: Vec::new(),
        started_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        device_info: match body.given("deviceInfo") {
            Some(info) => info.clone(),
            None => to_value(&DeviceInfo::default())?,
        },
    };

    log::info!(
        "created try-on session {} for {} with {} products",
        label(&session.id),
        label(&session.user_id),
        session.products.as_array().map_or(0, Vec::len)
    );

    Ok(ApiResponse::ok(json!({
        "success": true,
        "data": to_value(&session)?,
    })))
}

pub fn update(request: &ApiRequest) -> Result<ApiResponse> {
    let body = Fields::from_request(request)?;

    log::info!(
        "updated try-on session {}: {} products, snapshot {}",
        body.given("sessionId").map_or_else(|| "-".to_string(), label),
        body.given("products")
            .and_then(Value::as_array)
            .map_or(0, Vec::len),
        if body.given("snapshot").is_some() { "attached" } else { "none" }
    );

    Ok(ApiResponse::ok(json!({
        "success": true,
        "message": "Session updated successfully",
    })))
}
