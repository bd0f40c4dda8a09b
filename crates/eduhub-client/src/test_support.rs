//! Scripted transport and wiring shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use eduhub_common::{CacheError, Event, EventBus, Identity, UserId};
use tokio::sync::broadcast;

use crate::gateway::{Gateway, HttpRequest, HttpResponse, Method, Transport, TransportError};
use crate::session::{CacheBackend, MemoryCache, SessionStore};

pub(crate) const BASE_URL: &str = "http://test.local/api/v1";
pub(crate) const LOGIN_ROUTE: &str = "/login";

pub(crate) struct Reply {
    outcome: Result<HttpResponse, TransportError>,
    delay: Option<Duration>,
}

impl Reply {
    pub(crate) fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            outcome: Ok(HttpResponse {
                status,
                content_type: Some("application/json; charset=utf-8".into()),
                body: body.to_string(),
            }),
            delay: None,
        }
    }

    pub(crate) fn text(status: u16, body: &str) -> Self {
        Self {
            outcome: Ok(HttpResponse {
                status,
                content_type: Some("text/plain".into()),
                body: body.to_string(),
            }),
            delay: None,
        }
    }

    pub(crate) fn offline() -> Self {
        Self {
            outcome: Err(TransportError::Connect("connection refused".into())),
            delay: None,
        }
    }

    pub(crate) fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Handler = dyn Fn(&HttpRequest) -> Reply + Send + Sync;

/// Answers each request with whatever the handler returns and records it.
pub(crate) struct FakeTransport {
    handler: Box<Handler>,
    log: Mutex<Vec<HttpRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeTransport {
    pub(crate) fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> Reply + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    /// Requests with `method` whose URL ends with `suffix`.
    pub(crate) fn count(&self, method: Method, suffix: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url.ends_with(suffix))
            .count()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let reply = (self.handler)(&request);
        self.log.lock().unwrap().push(request);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        reply.outcome
    }
}

/// Memory cache that counts writes and clears.
#[derive(Default)]
pub(crate) struct CountingCache {
    inner: MemoryCache,
    pub(crate) saves: AtomicUsize,
    pub(crate) clears: AtomicUsize,
}

impl CountingCache {
    pub(crate) fn with_identity(identity: &Identity) -> Self {
        Self {
            inner: MemoryCache::with_entry(serde_json::to_string(identity).unwrap()),
            ..Default::default()
        }
    }

    pub(crate) fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl CacheBackend for CountingCache {
    fn load(&self) -> Result<Option<String>, CacheError> {
        self.inner.load()
    }

    fn save(&self, contents: &str) -> Result<(), CacheError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(contents)
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear()
    }
}

/// Gateway, store and bus wired to a fake transport.
pub(crate) struct Harness {
    pub(crate) transport: Arc<FakeTransport>,
    pub(crate) cache: Arc<CountingCache>,
    pub(crate) store: Arc<SessionStore>,
    pub(crate) events: Arc<EventBus>,
    pub(crate) gateway: Arc<Gateway>,
}

impl Harness {
    pub(crate) fn new(transport: Arc<FakeTransport>) -> Self {
        Self::with_cache(transport, CountingCache::default())
    }

    pub(crate) fn with_cached(transport: Arc<FakeTransport>, identity: &Identity) -> Self {
        Self::with_cache(transport, CountingCache::with_identity(identity))
    }

    fn with_cache(transport: Arc<FakeTransport>, cache: CountingCache) -> Self {
        let cache = Arc::new(cache);
        let store = Arc::new(SessionStore::new(Arc::clone(&cache)));
        let events = Arc::new(EventBus::default());
        let gateway = Arc::new(Gateway::new(
            transport.clone(),
            BASE_URL,
            LOGIN_ROUTE,
            Arc::clone(&store),
            Arc::clone(&events),
        ));
        Self {
            transport,
            cache,
            store,
            events,
            gateway,
        }
    }
}

pub(crate) fn identity(id: i64, username: &str) -> Identity {
    Identity {
        id: UserId(id),
        username: username.into(),
        email: format!("{username}@eduhub.vn"),
        display_name: String::new(),
    }
}

pub(crate) fn message(id: i64, from: i64, to: i64, content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "sender_id": from,
        "receiver_id": to,
        "content": content,
        "created_at": "2026-03-01T08:00:00Z",
    })
}

/// Path component of a fake request URL, with the base stripped.
pub(crate) fn path_of(request: &HttpRequest) -> &str {
    request.url.strip_prefix(BASE_URL).unwrap_or(&request.url)
}

/// Everything published so far.
pub(crate) fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Let detached tasks (the best-effort logout) run to completion.
pub(crate) async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
