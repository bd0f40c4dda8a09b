//! The request gateway: the one path from the application to the backend.
//!
//! Every call goes through [`Gateway::request`], which serializes the body,
//! lets the transport attach the session cookie, sniffs the response
//! content type and classifies failures into [`ApiError`].

mod client;
pub mod credential;
pub mod request;
pub mod reqwest_transport;
pub mod response;
pub mod transport;

pub use client::Gateway;
pub use credential::CredentialPolicy;
pub use request::{RequestOptions, UnauthorizedPolicy};
pub use reqwest_transport::ReqwestTransport;
pub use response::{DataEnvelope, ResponseBody};
pub use transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered 401 and the session has been torn down.
    #[error("session expired, please log in again")]
    AuthExpired,

    #[error("{message}")]
    RequestFailed {
        status: u16,
        message: String,
        body: ResponseBody,
    },

    #[error("could not reach the server: {0}")]
    ConnectivityFailed(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl ApiError {
    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::AuthExpired => Some(401),
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::AuthExpired)
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::ConnectivityFailed(err.to_string())
    }
}
