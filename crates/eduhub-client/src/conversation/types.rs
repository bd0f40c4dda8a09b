use eduhub_common::{Message, UserId};
use serde::Serialize;

use crate::gateway::ApiError;

/// What the conversation pane shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationView {
    pub partner: Option<UserId>,
    /// Full, ordered snapshot from the last successful fetch.
    pub messages: Vec<Message>,
    pub(crate) generation: u64,
}

impl ConversationView {
    /// Bumped on every `select` and `teardown`.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("no conversation selected")]
    NoActiveConversation,
    #[error("message is empty")]
    EmptyMessage,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Serialize)]
pub(crate) struct OutgoingMessage<'a> {
    pub receiver_id: UserId,
    pub content: &'a str,
}
