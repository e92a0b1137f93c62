//! Response body conventions shared by every backend call

use crate::error::ApiError;
use serde_json::{Map, Value};

/// Upload response fields that may carry the stored file's URL, by priority
const UPLOAD_URL_FIELDS: [&str; 4] = ["imageUrl", "url", "path", "fileUrl"];

/// Parse a 2xx body; an empty body reads as `{}`
pub fn parse_body(text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    Ok(serde_json::from_str(text)?)
}

/// Unwrap a `{data: ...}` envelope; bare payloads pass through
#[must_use]
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Error message from a non-2xx body (`error`, then `message`)
#[must_use]
pub fn error_message(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    ["error", "message"]
        .into_iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

/// Drop client-supplied identifiers before a create
#[must_use]
pub fn strip_identifier(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) => {
            map.remove("_id");
            map.remove("id");
            Value::Object(map)
        }
        other => other,
    }
}

/// Server-assigned URL from an upload response
pub fn upload_url(value: &Value) -> Result<String, ApiError> {
    let body = value.get("data").filter(|d| d.is_object()).unwrap_or(value);
    UPLOAD_URL_FIELDS
        .into_iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Decode("upload response carries no file URL".to_string()))
}
