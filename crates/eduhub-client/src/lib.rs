//! EduHub client core.
//!
//! Provides:
//! - A request gateway that classifies every backend response and turns a
//!   401 into a global logout
//! - A session store and reconciler that keep the cached identity honest
//! - A polling conversation view with race-free partner switching
//! - The user directory

pub mod client;
pub mod conversation;
pub mod directory;
pub mod endpoints;
pub mod gateway;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::EduhubClient;
pub use conversation::{ConversationError, ConversationPoller, ConversationView};
pub use directory::UserDirectory;
pub use gateway::{ApiError, Gateway, RequestOptions, ResponseBody};
pub use session::{AuthError, LoginForm, RegisterForm, Session, SessionStore};
