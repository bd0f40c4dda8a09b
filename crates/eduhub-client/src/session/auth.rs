//! Login and registration.

use std::fmt;

use eduhub_common::{Event, Identity};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::Session;
use crate::endpoints;
use crate::gateway::{ApiError, RequestOptions, UnauthorizedPolicy};

const REDACTED: &str = "[REDACTED]";
const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 30;
const PASSWORD_MIN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFormError {
    #[error("username and password are required")]
    MissingCredentials,
    #[error("username must be 3-30 characters")]
    UsernameLength,
    #[error("password must be at least 6 characters")]
    PasswordTooShort,
    #[error("invalid email address")]
    InvalidEmail,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Form(#[from] AuthFormError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Clone, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Trimmed copy, rejected if either field ends up empty.
    pub fn normalized(&self) -> Result<Self, AuthFormError> {
        let username = self.username.trim();
        let password = self.password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthFormError::MissingCredentials);
        }
        Ok(Self::new(username, password))
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &REDACTED)
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl RegisterForm {
    /// Trimmed copy that passes the same checks the server applies.
    /// An empty display name becomes the username.
    pub fn normalized(&self) -> Result<Self, AuthFormError> {
        let username = self.username.trim();
        let email = self.email.trim();
        let password = self.password.trim();
        let display_name = self.display_name.trim();

        let username_len = username.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&username_len) {
            return Err(AuthFormError::UsernameLength);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(AuthFormError::PasswordTooShort);
        }
        if !email.contains('@') {
            return Err(AuthFormError::InvalidEmail);
        }

        Ok(Self {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            display_name: if display_name.is_empty() {
                username.to_string()
            } else {
                display_name.to_string()
            },
        })
    }
}

impl fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &REDACTED)
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// `{user, token}`. The token duplicates the cookie and is not kept.
#[derive(Deserialize)]
struct AuthResponse {
    user: Identity,
}

impl Session {
    /// Log in. A 401 here means bad credentials and is returned as a
    /// plain `RequestFailed`; it does not expire anything.
    pub async fn login(&self, form: &LoginForm) -> Result<Identity, AuthError> {
        let form = form.normalized()?;
        self.authenticate(endpoints::AUTH_LOGIN, &form).await
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<Identity, AuthError> {
        let form = form.normalized()?;
        self.authenticate(endpoints::AUTH_REGISTER, &form).await
    }

    async fn authenticate<B: Serialize>(&self, path: &str, form: &B) -> Result<Identity, AuthError> {
        let options = RequestOptions::post()
            .with_json(form)?
            .on_unauthorized(UnauthorizedPolicy::ReturnError);
        let AuthResponse { user } = self.gateway.request_json(path, options).await?;

        self.store.establish(&user);
        info!(user = %user.id, username = %user.username, "session established");
        self.events
            .publish(Event::SessionEstablished { user_id: user.id });
        Ok(user)
    }
}
