use tokio::sync::broadcast;

use crate::types::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SessionEstablished { user_id: UserId },
    SessionExpired,
    LoggedOut,
    /// Hard navigation request for the UI layer (e.g. to the login page).
    Navigate(String),
}

pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
