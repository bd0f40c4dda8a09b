//! Per-request options.

use serde::Serialize;

use super::transport::Method;
use super::ApiError;

/// What the gateway does when the server answers 401.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnauthorizedPolicy {
    /// Treat 401 as an expired session: invalidate, log out, redirect.
    #[default]
    ExpireSession,
    /// Report 401 as an ordinary `RequestFailed`. Used where 401 carries
    /// a different meaning, e.g. wrong credentials on login.
    ReturnError,
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
    pub on_unauthorized: UnauthorizedPolicy,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    pub fn post() -> Self {
        Self::new(Method::Post)
    }

    /// Serialize `body` as the JSON request payload.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn on_unauthorized(mut self, policy: UnauthorizedPolicy) -> Self {
        self.on_unauthorized = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_to_get_with_session_expiry() {
        let opts = RequestOptions::default();
        assert_eq!(opts.method, Method::Get);
        assert!(opts.body.is_none());
        assert_eq!(opts.on_unauthorized, UnauthorizedPolicy::ExpireSession);
    }

    #[test]
    fn with_json_serializes_body() {
        #[derive(Serialize)]
        struct Body<'a> {
            receiver_id: i64,
            content: &'a str,
        }

        let opts = RequestOptions::post()
            .with_json(&Body {
                receiver_id: 7,
                content: "hi",
            })
            .unwrap();
        assert_eq!(opts.body, Some(json!({"receiver_id": 7, "content": "hi"})));
    }
}
