//! Realtime bridge
//!
//! Receives `(event name, payload)` pairs from the gateway transport,
//! translates them into typed events, and dispatches them into the store.
//! Typing indicators have no end event on the wire; the bridge derives one by
//! arming a timer per `(channel, user)` pair and re-arming it on every
//! repeated typing event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use parlor_core::{Action, EntityId, ServerEvent, ServerEventError};
use parlor_store::SharedStore;

/// How long a typing indicator stays up after the last typing event
const TYPING_ENDED_TIMEOUT: Duration = Duration::from_secs(6);

type TypingKey = (EntityId, EntityId);

/// A pending typing-ended countdown. The generation ties the spawned task to
/// the map entry it armed: a task whose generation no longer matches lost a
/// race against a re-arm and must not dispatch.
struct TypingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Translates gateway events into store dispatches
pub struct RealtimeBridge {
    store: SharedStore,
    typing_timers: DashMap<TypingKey, TypingTimer>,
    timer_generation: AtomicU64,
}

impl RealtimeBridge {
    pub fn new(store: SharedStore) -> Arc<Self> {
        Arc::new(Self {
            store,
            typing_timers: DashMap::new(),
            timer_generation: AtomicU64::new(0),
        })
    }

    /// Handle one wire event
    pub fn receive(self: &Arc<Self>, name: &str, payload: Value) -> Result<(), ServerEventError> {
        let event = ServerEvent::from_wire(name, payload)?;
        debug!(event = event.kind(), "realtime event");

        match &event {
            ServerEvent::UserTyped {
                channel_id,
                user_id,
            } => {
                self.arm_typing_timer(channel_id.clone(), user_id.clone());
            }
            ServerEvent::MessageCreated { message } => {
                // The reducer clears the author's indicator; the timer must
                // not fire later and dispatch a stale typing-ended action
                self.cancel_typing_timer(&(message.channel_id.clone(), message.author_id.clone()));
            }
            _ => {}
        }

        self.store.dispatch(&Action::ServerEvent { event });
        Ok(())
    }

    /// Start (or restart) the typing-ended countdown for one pair
    fn arm_typing_timer(self: &Arc<Self>, channel_id: EntityId, user_id: EntityId) {
        let key = (channel_id.clone(), user_id.clone());
        let generation = self.timer_generation.fetch_add(1, Ordering::Relaxed);
        let bridge = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(TYPING_ENDED_TIMEOUT).await;
            // A task already past its sleep can race the re-arm that replaces
            // it; only the task whose entry is still in the map may end the
            // indicator
            let key = (channel_id.clone(), user_id.clone());
            let won = bridge
                .typing_timers
                .remove_if(&key, |_, timer| timer.generation == generation)
                .is_some();
            if won {
                bridge.store.dispatch(&Action::UserTypingEnded {
                    channel_id,
                    user_id,
                });
            }
        });
        let timer = TypingTimer { generation, handle };
        if let Some(previous) = self.typing_timers.insert(key, timer) {
            previous.handle.abort();
        }
    }

    fn cancel_typing_timer(&self, key: &TypingKey) {
        if let Some((_, timer)) = self.typing_timers.remove(key) {
            timer.handle.abort();
        }
    }

    /// Abort every pending timer; used when the gateway disconnects
    pub fn shutdown(&self) {
        self.typing_timers.retain(|_, timer| {
            timer.handle.abort();
            false
        });
    }
}

impl Drop for RealtimeBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}
