use std::sync::Arc;

use eduhub_common::{Event, EventBus};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::credential::is_sensitive_header;
use super::request::{RequestOptions, UnauthorizedPolicy};
use super::response::ResponseBody;
use super::transport::{HttpRequest, Method, Transport};
use super::ApiError;
use crate::endpoints;
use crate::session::SessionStore;

pub struct Gateway {
    transport: Arc<dyn Transport>,
    base_url: String,
    login_route: String,
    store: Arc<SessionStore>,
    events: Arc<EventBus>,
}

impl Gateway {
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        login_route: impl Into<String>,
        store: Arc<SessionStore>,
        events: Arc<EventBus>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
            login_route: login_route.into(),
            store,
            events,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Resolve `path` against the base URL. Absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send one request and classify the outcome.
    ///
    /// - 2xx: the decoded body.
    /// - 401 (unless the options opt out): the session is expired. The
    ///   store is invalidated, a best-effort logout call is started in the
    ///   background, a navigation to the login route is published, and
    ///   `AuthExpired` is returned.
    /// - any other status: `RequestFailed` with the server's message.
    /// - no response: `ConnectivityFailed`.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseBody, ApiError> {
        let method = options.method;
        let url = self.url(path);

        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        for (name, value) in options.headers {
            if is_sensitive_header(&name) {
                warn!(header = %name, "dropping caller-supplied credential header");
                continue;
            }
            headers.push((name, value));
        }

        let body = match options.body {
            Some(value) => {
                if !headers
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
                {
                    headers.push(("Content-Type".into(), "application/json".into()));
                }
                Some(serde_json::to_string(&value).map_err(|e| ApiError::Encode(e.to_string()))?)
            }
            None => None,
        };

        let generation = self.store.generation();
        let request = HttpRequest {
            method,
            url,
            headers,
            body,
        };
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%method, path, error = %e, "no response from server");
                return Err(e.into());
            }
        };

        let status = response.status;
        if status == 401 && options.on_unauthorized == UnauthorizedPolicy::ExpireSession {
            self.expire_session(generation);
            return Err(ApiError::AuthExpired);
        }

        let decoded = ResponseBody::decode(response.content_type.as_deref(), &response.body);
        if response.is_success() {
            debug!(%method, path, status, "request succeeded");
            return decoded.map_err(|e| ApiError::Decode(e.to_string()));
        }

        let body = decoded.unwrap_or(ResponseBody::Text(response.body));
        let message = body.error_message(status);
        debug!(%method, path, status, %message, "request failed");
        Err(ApiError::RequestFailed {
            status,
            message,
            body,
        })
    }

    /// `request` followed by typed decoding of the body.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(path, options).await?.into_json()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_json(path, RequestOptions::get()).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(path, RequestOptions::post().with_json(body)?)
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(path, RequestOptions::new(Method::Put).with_json(body)?)
            .await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(path, RequestOptions::new(Method::Patch).with_json(body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_json(path, RequestOptions::new(Method::Delete))
            .await
    }

    /// Runs without awaiting, so a caller being cancelled (a poll ticker
    /// aborted mid-tick) cannot leave the expiry half done.
    fn expire_session(&self, generation: u64) {
        if !self.store.expire(generation) {
            debug!("session already expired by a concurrent request");
            return;
        }
        warn!("server rejected the session credential, logging out");
        self.events.publish(Event::SessionExpired);

        let logout = HttpRequest {
            method: Method::Post,
            url: self.url(endpoints::AUTH_LOGOUT),
            headers: Vec::new(),
            body: None,
        };
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            if let Err(e) = transport.send(logout).await {
                debug!(error = %e, "best-effort logout failed");
            }
        });

        self.events.publish(Event::Navigate(self.login_route.clone()));
    }
}
