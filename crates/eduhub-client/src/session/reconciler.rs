use std::sync::Arc;

use eduhub_common::{Event, EventBus, Identity};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::SessionStore;
use crate::endpoints;
use crate::gateway::{ApiError, Gateway, RequestOptions, UnauthorizedPolicy};

#[derive(Deserialize)]
struct MeResponse {
    user: Identity,
}

/// The client's belief about who is logged in.
///
/// The cache behind it is only a fast path for first paint. Anything that
/// needs a trust decision goes through [`Session::require_identity`], which
/// reconciles with the server unless the identity was already confirmed
/// during the current navigation.
pub struct Session {
    pub(super) gateway: Arc<Gateway>,
    pub(super) store: Arc<SessionStore>,
    pub(super) events: Arc<EventBus>,
}

impl Session {
    pub fn new(gateway: Arc<Gateway>, events: Arc<EventBus>) -> Self {
        let store = Arc::clone(gateway.store());
        Self {
            gateway,
            store,
            events,
        }
    }

    /// Cached identity, possibly stale. No network.
    pub fn cached_identity(&self) -> Option<Identity> {
        self.store.read()
    }

    pub fn is_logged_in(&self) -> bool {
        self.cached_identity().is_some()
    }

    /// Ask the server who we are and replace the cache with the answer.
    ///
    /// Any failure clears the cache. The error is returned for foreground
    /// callers that want to show it; a 401 is simply "not logged in" and
    /// comes back as `Ok(None)`. If the store was written by someone else
    /// while the request was in flight, this call's outcome is discarded
    /// and whatever the cache now holds is returned.
    pub async fn try_reconcile(&self) -> Result<Option<Identity>, ApiError> {
        let epoch = self.store.epoch();
        let options = RequestOptions::get().on_unauthorized(UnauthorizedPolicy::ReturnError);
        let result = self
            .gateway
            .request_json::<MeResponse>(endpoints::AUTH_ME, options)
            .await;

        match result {
            Ok(MeResponse { user }) => {
                if self.store.commit_reconciled(epoch, &user) {
                    debug!(user = %user.id, "identity reconciled");
                    Ok(Some(user))
                } else {
                    Ok(self.store.read())
                }
            }
            Err(err) => {
                if !self.store.discard(epoch) {
                    debug!(error = %err, "reconciliation failed after a concurrent session change");
                    return Ok(self.store.read());
                }
                match err.status() {
                    Some(401) => {
                        debug!("not authenticated");
                        Ok(None)
                    }
                    _ => {
                        warn!(error = %err, "reconciliation failed, cache cleared");
                        Err(err)
                    }
                }
            }
        }
    }

    /// [`try_reconcile`](Self::try_reconcile) with every failure folded
    /// into `None`.
    pub async fn reconcile(&self) -> Option<Identity> {
        self.try_reconcile().await.unwrap_or(None)
    }

    /// Clear the cache without contacting the server.
    pub fn invalidate(&self) {
        self.store.invalidate();
    }

    /// Tell the server to revoke the credential, then clear the cache no
    /// matter what the server said. Safe to call repeatedly.
    pub async fn logout(&self) {
        let options = RequestOptions::post().on_unauthorized(UnauthorizedPolicy::ReturnError);
        if let Err(e) = self.gateway.request(endpoints::AUTH_LOGOUT, options).await {
            debug!(error = %e, "logout request failed, clearing local session anyway");
        }
        self.invalidate();
        info!("logged out");
        self.events.publish(Event::LoggedOut);
    }

    /// Identity suitable for a trust decision.
    ///
    /// Returns the cached identity only if it was confirmed by the server
    /// since the last [`begin_navigation`](Self::begin_navigation);
    /// otherwise reconciles.
    pub async fn require_identity(&self) -> Option<Identity> {
        if let Some(identity) = self.store.verified_identity() {
            return Some(identity);
        }
        self.reconcile().await
    }

    /// Start a new navigation. The cached identity stays available for
    /// display but must be reconciled again before it is trusted.
    pub fn begin_navigation(&self) {
        self.store.mark_provisional();
    }
}
