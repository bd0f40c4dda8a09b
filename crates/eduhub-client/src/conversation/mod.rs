//! Live direct-message conversation driven by polling.

mod poller;
mod types;

pub use poller::ConversationPoller;
pub use types::{ConversationError, ConversationView};

/// Interval between background fetches.
pub const DEFAULT_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(2);
