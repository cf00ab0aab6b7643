//! Dispatch listener registry
//!
//! Before-listeners observe `(action, state-before)`, after-listeners observe
//! `(action, state-after)`. Listeners run in registration order and a
//! panicking listener never takes down dispatch or the listeners behind it.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use parlor_core::Action;
use tracing::warn;

use crate::state::AppState;

/// Callback invoked around every dispatch
pub type Listener = Arc<dyn Fn(&Action, &AppState) + Send + Sync>;

/// Handle returned by registration, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Ids are monotonic, so iterating the map visits listeners in registration
/// order while removal stays a keyed delete instead of a scan
struct Slots {
    entries: BTreeMap<ListenerId, Listener>,
    next_id: u64,
}

impl Slots {
    const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }

    fn add(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, listener);
        id
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    fn snapshot(&self) -> Vec<(ListenerId, Listener)> {
        self.entries
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect()
    }
}

/// Registry of before/after dispatch listeners
pub struct ListenerRegistry {
    before: Mutex<Slots>,
    after: Mutex<Slots>,
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerRegistry {
    pub const fn new() -> Self {
        Self {
            before: Mutex::new(Slots::new()),
            after: Mutex::new(Slots::new()),
        }
    }

    pub fn add_before(&self, listener: Listener) -> ListenerId {
        self.before.lock().add(listener)
    }

    pub fn add_after(&self, listener: Listener) -> ListenerId {
        self.after.lock().add(listener)
    }

    pub fn remove_before(&self, id: ListenerId) -> bool {
        self.before.lock().remove(id)
    }

    pub fn remove_after(&self, id: ListenerId) -> bool {
        self.after.lock().remove(id)
    }

    /// Invoke every before-listener with the pre-dispatch state
    pub fn notify_before(&self, action: &Action, state: &AppState) {
        Self::notify(self.before.lock().snapshot(), action, state, "before");
    }

    /// Invoke every after-listener with the post-dispatch state
    pub fn notify_after(&self, action: &Action, state: &AppState) {
        Self::notify(self.after.lock().snapshot(), action, state, "after");
    }

    fn notify(
        listeners: Vec<(ListenerId, Listener)>,
        action: &Action,
        state: &AppState,
        phase: &'static str,
    ) {
        // The snapshot is taken under the lock but listeners run outside it,
        // so a listener may subscribe or unsubscribe without deadlocking.
        for (id, listener) in listeners {
            let result = catch_unwind(AssertUnwindSafe(|| listener(action, state)));
            if result.is_err() {
                warn!(
                    listener_id = id.0,
                    phase,
                    action = action.kind(),
                    "dispatch listener panicked"
                );
            }
        }
    }
}
