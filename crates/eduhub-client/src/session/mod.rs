//! Session state: the identity cache, reconciliation against the server,
//! login, registration and logout.

pub mod auth;
pub mod cache;
mod reconciler;
pub mod store;

pub use auth::{AuthError, AuthFormError, LoginForm, RegisterForm};
pub use cache::{CacheBackend, FileCache, MemoryCache};
pub use reconciler::Session;
pub use store::SessionStore;
