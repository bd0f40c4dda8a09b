use std::sync::Arc;
use std::time::Duration;

use eduhub_common::{EduhubError, EventBus};
use eduhub_config::{paths, EduhubConfig};
use tracing::info;

use crate::conversation::ConversationPoller;
use crate::directory::UserDirectory;
use crate::gateway::{CredentialPolicy, Gateway, ReqwestTransport, Transport};
use crate::session::{CacheBackend, FileCache, Session, SessionStore};

/// The wired-up client: one store, one gateway, one event bus.
pub struct EduhubClient {
    gateway: Arc<Gateway>,
    session: Session,
    events: Arc<EventBus>,
    poll_interval: Duration,
}

impl EduhubClient {
    /// Build a client that talks to `config.api.base_url` over HTTP and
    /// persists the identity cache to disk.
    pub fn from_config(config: &EduhubConfig) -> Result<Self, EduhubError> {
        let cache_path = match &config.session.cache_file {
            Some(path) => path.clone(),
            None => paths::identity_file()?,
        };
        let transport = ReqwestTransport::new(
            CredentialPolicy::new(),
            Duration::from_secs(config.api.connect_timeout_secs),
        )
        .map_err(|e| EduhubError::Network(e.to_string()))?;

        info!(base_url = %config.api.base_url, cache = %cache_path.display(), "client configured");
        Ok(Self::with_transport(
            config,
            Arc::new(transport),
            FileCache::new(cache_path),
        ))
    }

    /// Build a client over any transport and cache backend.
    pub fn with_transport(
        config: &EduhubConfig,
        transport: Arc<dyn Transport>,
        cache: impl CacheBackend + 'static,
    ) -> Self {
        let events = Arc::new(EventBus::default());
        let store = Arc::new(SessionStore::new(cache));
        let gateway = Arc::new(Gateway::new(
            transport,
            config.api.base_url.clone(),
            config.api.login_route.clone(),
            store,
            Arc::clone(&events),
        ));
        let session = Session::new(Arc::clone(&gateway), Arc::clone(&events));
        Self {
            gateway,
            session,
            events,
            poll_interval: Duration::from_millis(config.messages.poll_interval_ms),
        }
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn directory(&self) -> UserDirectory {
        UserDirectory::new(Arc::clone(&self.gateway))
    }

    /// A new poller bound to this client's gateway. Drop it (or call
    /// `teardown`) when the conversation view goes away.
    pub fn conversation(&self) -> ConversationPoller {
        ConversationPoller::new(Arc::clone(&self.gateway), self.poll_interval)
    }
}
