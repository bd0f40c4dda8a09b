use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use eduhub_common::{Message, UserId};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

use super::types::{ConversationError, ConversationView, OutgoingMessage};
use crate::endpoints;
use crate::gateway::{ApiError, DataEnvelope, Gateway, RequestOptions};

/// Keeps one conversation's message list fresh.
///
/// Exactly one conversation is active at a time. Selecting a partner bumps
/// the view generation and aborts the previous ticker before the new
/// conversation's first fetch goes out; any response that arrives for an
/// older generation is dropped. Fetches for the active conversation are
/// serialized by a per-conversation lock, so a slow response never has a
/// second request stacked behind it.
pub struct ConversationPoller {
    gateway: Arc<Gateway>,
    interval: Duration,
    view: Arc<watch::Sender<ConversationView>>,
    active: Mutex<Option<ActiveConversation>>,
}

struct ActiveConversation {
    ctx: FetchContext,
    ticker: JoinHandle<()>,
}

/// Everything a fetch needs, captured at selection time.
#[derive(Clone)]
struct FetchContext {
    gateway: Arc<Gateway>,
    view: Arc<watch::Sender<ConversationView>>,
    partner: UserId,
    generation: u64,
    fetch_lock: Arc<tokio::sync::Mutex<()>>,
}

impl FetchContext {
    fn is_current(&self) -> bool {
        self.view.borrow().generation == self.generation
    }

    /// Fetch and apply. Callers hold `fetch_lock`.
    async fn fetch(&self) -> Result<(), ApiError> {
        if !self.is_current() {
            return Ok(());
        }
        let envelope: DataEnvelope<Vec<Message>> = self
            .gateway
            .get(&endpoints::conversation(self.partner))
            .await?;
        self.apply(envelope.data);
        Ok(())
    }

    /// Replace the message list wholesale, unless the conversation changed
    /// while the fetch was in flight.
    fn apply(&self, messages: Vec<Message>) {
        let generation = self.generation;
        let partner = self.partner;
        self.view.send_if_modified(|view| {
            if view.generation != generation {
                debug!(%partner, "discarding messages for a stale conversation");
                return false;
            }
            if view.messages == messages {
                return false;
            }
            view.messages = messages;
            true
        });
    }

    /// Foreground fetch: waits for any in-flight fetch, then fetches again.
    async fn fetch_now(&self) -> Result<(), ApiError> {
        let _guard = self.fetch_lock.lock().await;
        self.fetch().await
    }

    /// Background fetch: skipped if one is already running, errors logged
    /// and dropped.
    async fn poll_once(&self) {
        let Ok(_guard) = self.fetch_lock.try_lock() else {
            trace!(partner = %self.partner, "fetch still in flight, skipping tick");
            return;
        };
        if let Err(e) = self.fetch().await {
            debug!(partner = %self.partner, error = %e, "background poll failed");
        }
    }
}

fn spawn_ticker(ctx: FetchContext, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticks.tick().await;
            if !ctx.is_current() {
                break;
            }
            ctx.poll_once().await;
        }
    })
}

impl ConversationPoller {
    pub fn new(gateway: Arc<Gateway>, interval: Duration) -> Self {
        let (view, _) = watch::channel(ConversationView::default());
        Self {
            gateway,
            interval,
            view: Arc::new(view),
            active: Mutex::new(None),
        }
    }

    fn active(&self) -> MutexGuard<'_, Option<ActiveConversation>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn current(&self) -> Option<FetchContext> {
        self.active().as_ref().map(|active| active.ctx.clone())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Make `partner` the active conversation.
    ///
    /// The previous ticker is cancelled and the list reset to empty before
    /// the first fetch for `partner` is issued. Returns once that first
    /// fetch has completed; its failure is treated like any background
    /// poll failure.
    pub async fn select(&self, partner: UserId) {
        let ctx = {
            let mut active = self.active();
            if let Some(previous) = active.take() {
                previous.ticker.abort();
            }

            let mut generation = 0;
            self.view.send_modify(|view| {
                view.generation += 1;
                view.partner = Some(partner);
                view.messages.clear();
                generation = view.generation;
            });

            let ctx = FetchContext {
                gateway: Arc::clone(&self.gateway),
                view: Arc::clone(&self.view),
                partner,
                generation,
                fetch_lock: Arc::new(tokio::sync::Mutex::new(())),
            };
            let ticker = spawn_ticker(ctx.clone(), self.interval);
            *active = Some(ActiveConversation {
                ctx: ctx.clone(),
                ticker,
            });
            ctx
        };
        debug!(%partner, generation = ctx.generation, "conversation selected");

        if let Err(e) = ctx.fetch_now().await {
            debug!(%partner, error = %e, "initial fetch failed");
        }
    }

    /// Send `content` to the active partner, then refresh the list at once.
    ///
    /// Unlike polling, a failed send is returned to the caller.
    pub async fn send(&self, content: &str) -> Result<(), ConversationError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ConversationError::EmptyMessage);
        }
        let ctx = self.current().ok_or(ConversationError::NoActiveConversation)?;

        let options = RequestOptions::post().with_json(&OutgoingMessage {
            receiver_id: ctx.partner,
            content,
        })?;
        self.gateway.request(endpoints::MESSAGES, options).await?;

        if let Err(e) = ctx.fetch_now().await {
            debug!(partner = %ctx.partner, error = %e, "refresh after send failed");
        }
        Ok(())
    }

    /// Stop polling and clear the view. Safe to call repeatedly.
    pub fn teardown(&self) {
        let Some(previous) = self.active().take() else {
            return;
        };
        previous.ticker.abort();
        self.view.send_modify(|view| {
            view.generation += 1;
            view.partner = None;
            view.messages.clear();
        });
        debug!(partner = %previous.ctx.partner, "conversation torn down");
    }

    pub fn partner(&self) -> Option<UserId> {
        self.view.borrow().partner
    }

    pub fn snapshot(&self) -> ConversationView {
        self.view.borrow().clone()
    }

    /// Receiver notified whenever the view changes.
    pub fn subscribe(&self) -> watch::Receiver<ConversationView> {
        self.view.subscribe()
    }
}

impl Drop for ConversationPoller {
    fn drop(&mut self) {
        let active = self.active.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = active.take() {
            previous.ticker.abort();
        }
    }
}
