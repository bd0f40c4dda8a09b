//! The identity store.
//!
//! One store is created at startup and shared by the gateway and the
//! session. It is never torn down; it is reset only through `invalidate`.
//!
//! Two counters guard late writers:
//!
//! - the epoch moves on every write. A reconciliation carries the epoch it
//!   started under and is discarded if anything wrote since, so a late
//!   `/auth/me` success cannot repopulate the cache after a 401 or logout.
//! - the session generation moves only when a session begins or ends
//!   (login, logout, expiry). A request that comes back 401 expires the
//!   session only if its generation still matches, which collapses a burst
//!   of concurrent 401s into one invalidation while a reconciliation that
//!   landed in between does not suppress it.

use std::sync::{Mutex, MutexGuard};

use eduhub_common::{CacheError, Identity};
use tracing::{debug, warn};

use super::cache::{CacheBackend, MemoryCache};

#[derive(Debug, Default)]
struct StoreState {
    epoch: u64,
    generation: u64,
    /// Whether the cached identity was confirmed by the server during the
    /// current navigation.
    verified: bool,
}

pub struct SessionStore {
    backend: Box<dyn CacheBackend>,
    state: Mutex<StoreState>,
}

impl SessionStore {
    pub fn new(backend: impl CacheBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryCache::new())
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn epoch(&self) -> u64 {
        self.state().epoch
    }

    /// The current session generation, for `expire`.
    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    /// Snapshot of the cached identity. No network.
    ///
    /// An unreadable or unparseable entry is cleared and reported as absent.
    pub fn read(&self) -> Option<Identity> {
        let raw = match self.backend.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "identity cache unreadable, clearing");
                self.clear_backend();
                return None;
            }
        };
        match serde_json::from_str::<Identity>(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                let err = CacheError::Malformed(e.to_string());
                warn!(error = %err, "clearing identity cache");
                self.clear_backend();
                None
            }
        }
    }

    /// The cached identity, but only if the server confirmed it during the
    /// current navigation.
    pub fn verified_identity(&self) -> Option<Identity> {
        let state = self.state();
        if state.verified {
            self.read()
        } else {
            None
        }
    }

    pub fn is_verified(&self) -> bool {
        self.state().verified
    }

    /// Store an identity the server just vouched for (login, registration).
    pub fn establish(&self, identity: &Identity) {
        let mut state = self.state();
        state.epoch += 1;
        state.generation += 1;
        state.verified = true;
        self.save_backend(identity);
    }

    /// Store a reconciled identity if nothing wrote the store since `epoch`.
    pub fn commit_reconciled(&self, epoch: u64, identity: &Identity) -> bool {
        let mut state = self.state();
        if state.epoch != epoch {
            debug!(seen = epoch, current = state.epoch, "discarding stale reconciliation");
            return false;
        }
        state.epoch += 1;
        state.verified = true;
        self.save_backend(identity);
        true
    }

    /// Drop the cached identity unconditionally and end the session.
    pub fn invalidate(&self) {
        let mut state = self.state();
        state.epoch += 1;
        state.generation += 1;
        state.verified = false;
        self.clear_backend();
    }

    /// Drop the cached identity if nothing wrote the store since `epoch`.
    /// The session generation is left alone.
    pub fn discard(&self, epoch: u64) -> bool {
        let mut state = self.state();
        if state.epoch != epoch {
            debug!(seen = epoch, current = state.epoch, "discarding stale reconciliation failure");
            return false;
        }
        state.epoch += 1;
        state.verified = false;
        self.clear_backend();
        true
    }

    /// End the session that was current at `generation`.
    ///
    /// Returns `true` for the caller that actually performed the
    /// invalidation. Callers whose session already ended (an earlier 401,
    /// a logout, a fresh login) get `false`.
    pub fn expire(&self, generation: u64) -> bool {
        let mut state = self.state();
        if state.generation != generation {
            return false;
        }
        state.epoch += 1;
        state.generation += 1;
        state.verified = false;
        self.clear_backend();
        true
    }

    /// Treat the cached identity as unconfirmed again. Called when a new
    /// navigation starts.
    pub fn mark_provisional(&self) {
        self.state().verified = false;
    }

    fn save_backend(&self, identity: &Identity) {
        let contents = match serde_json::to_string(identity) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(error = %e, "failed to serialize identity");
                return;
            }
        };
        if let Err(e) = self.backend.save(&contents) {
            warn!(error = %e, "failed to write identity cache");
        }
    }

    fn clear_backend(&self) {
        if let Err(e) = self.backend.clear() {
            warn!(error = %e, "failed to clear identity cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eduhub_common::UserId;

    fn an() -> Identity {
        Identity {
            id: UserId(1),
            username: "an".into(),
            email: "an@eduhub.vn".into(),
            display_name: "An".into(),
        }
    }

    #[test]
    fn establish_then_read() {
        let store = SessionStore::in_memory();
        store.establish(&an());
        assert_eq!(store.read(), Some(an()));
        assert!(store.is_verified());
        assert_eq!(store.verified_identity(), Some(an()));
    }

    #[test]
    fn malformed_entry_is_cleared() {
        let store = SessionStore::new(MemoryCache::with_entry("{not json"));
        assert!(store.read().is_none());
        assert!(store.backend.load().unwrap().is_none());
    }

    #[test]
    fn cached_identity_starts_provisional() {
        let store = SessionStore::new(MemoryCache::with_entry(r#"{"id":1,"username":"an"}"#));
        assert!(store.read().is_some());
        assert!(!store.is_verified());
        assert!(store.verified_identity().is_none());
    }

    #[test]
    fn expire_wins_once_per_generation() {
        let store = SessionStore::in_memory();
        store.establish(&an());
        let generation = store.generation();

        assert!(store.expire(generation));
        assert!(!store.expire(generation));
        assert!(store.read().is_none());
    }

    #[test]
    fn reconciliation_does_not_block_expiry() {
        let store = SessionStore::in_memory();
        store.establish(&an());
        let generation = store.generation();

        assert!(store.commit_reconciled(store.epoch(), &an()));
        assert!(store.expire(generation));
        assert!(store.read().is_none());
        assert!(!store.is_verified());
    }

    #[test]
    fn expiry_after_new_login_is_ignored() {
        let store = SessionStore::in_memory();
        let generation = store.generation();
        store.establish(&an());

        assert!(!store.expire(generation));
        assert_eq!(store.read(), Some(an()));
    }

    #[test]
    fn stale_discard_keeps_entry() {
        let store = SessionStore::in_memory();
        let epoch = store.epoch();
        store.establish(&an());

        assert!(!store.discard(epoch));
        assert_eq!(store.read(), Some(an()));
    }

    #[test]
    fn stale_reconciliation_is_discarded() {
        let store = SessionStore::in_memory();
        let epoch = store.epoch();
        store.invalidate();

        assert!(!store.commit_reconciled(epoch, &an()));
        assert!(store.read().is_none());
    }

    #[test]
    fn mark_provisional_keeps_entry() {
        let store = SessionStore::in_memory();
        store.establish(&an());
        store.mark_provisional();
        assert_eq!(store.read(), Some(an()));
        assert!(store.verified_identity().is_none());
    }
}
