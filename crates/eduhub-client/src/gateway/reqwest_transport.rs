//! `reqwest`-backed transport with a cookie store.

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{trace, warn};

use super::credential::CredentialPolicy;
use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};

pub struct ReqwestTransport {
    http: reqwest::Client,
    policy: CredentialPolicy,
}

impl ReqwestTransport {
    /// Build a transport whose cookie jar carries the session credential.
    ///
    /// Only the connect phase gets an explicit timeout; everything else
    /// uses the client's defaults.
    pub fn new(policy: CredentialPolicy, connect_timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .cookie_provider(policy.jar())
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;
        Ok(Self { http, policy })
    }

    pub fn policy(&self) -> &CredentialPolicy {
        &self.policy
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        trace!(request = ?request, "sending");

        let mut builder = self.http.request(request.method.into(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.text().await;

        into_response(status, content_type, body)
    }
}

/// Pair a status line with its body.
///
/// A successful response is only useful with its body, so a failed read is
/// an error. An error status already says what happened, so the response is
/// kept with an empty body and the status still gets classified.
fn into_response<E: Display>(
    status: u16,
    content_type: Option<String>,
    body: Result<String, E>,
) -> Result<HttpResponse, TransportError> {
    let body = match body {
        Ok(body) => body,
        Err(e) if (200..300).contains(&status) => return Err(TransportError::Body(e.to_string())),
        Err(e) => {
            warn!(status, error = %e, "failed to read error response body");
            String::new()
        }
    };
    Ok(HttpResponse {
        status,
        content_type,
        body,
    })
}
