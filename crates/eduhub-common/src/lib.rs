pub mod errors;
pub mod events;
pub mod types;

pub use errors::{CacheError, ConfigError, EduhubError};
pub use events::{Event, EventBus};
pub use types::{Identity, Message, UserId};

pub type Result<T> = std::result::Result<T, EduhubError>;
