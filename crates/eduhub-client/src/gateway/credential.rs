//! Transport-level credential policy.
//!
//! The session credential is an httpOnly cookie set by the backend. It is
//! held in a cookie jar owned by the transport and attached to every
//! request automatically. Application code never reads or writes it, and
//! any header that could carry it is redacted before logging.

use std::fmt;
use std::sync::Arc;

use reqwest::cookie::Jar;

pub const REDACTED: &str = "[REDACTED]";

const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "proxy-authorization",
    "set-cookie",
];

/// Whether a header may carry the session credential.
pub fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|sensitive| name.eq_ignore_ascii_case(sensitive))
}

/// Value safe to log for the given header.
pub fn redact_header<'a>(name: &str, value: &'a str) -> &'a str {
    if is_sensitive_header(name) {
        REDACTED
    } else {
        value
    }
}

/// Owns the cookie jar the credential lives in.
#[derive(Clone, Default)]
pub struct CredentialPolicy {
    jar: Arc<Jar>,
}

impl CredentialPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }
}

impl fmt::Debug for CredentialPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPolicy")
            .field("jar", &REDACTED)
            .finish()
    }
}
