//! Response body decoding and error-message extraction.

use serde::de::DeserializeOwned;

use super::ApiError;

/// A decoded response body. The content type decides which variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    /// Decode `raw` according to `content_type`.
    ///
    /// Anything advertised as `application/json` must parse; everything
    /// else passes through as text. An empty JSON body decodes to `null`.
    pub fn decode(content_type: Option<&str>, raw: &str) -> Result<Self, serde_json::Error> {
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);
        if !is_json {
            return Ok(Self::Text(raw.to_string()));
        }
        if raw.trim().is_empty() {
            return Ok(Self::Json(serde_json::Value::Null));
        }
        serde_json::from_str(raw).map(Self::Json)
    }

    /// Human-readable failure message: the body's `message` field, then its
    /// `error` field, then `HTTP {status}`.
    pub fn error_message(&self, status: u16) -> String {
        if let Self::Json(value) = self {
            for key in ["message", "error"] {
                if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                    return msg.to_string();
                }
            }
        }
        format!("HTTP {status}")
    }

    /// Deserialize the body into `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            Self::Json(value) => {
                serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
            }
            Self::Text(text) => {
                serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
            }
        }
    }
}

/// The `{ "data": ... }` envelope most list endpoints use.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}
