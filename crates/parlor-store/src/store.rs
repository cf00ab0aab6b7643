//! Store - dispatch loop, state handle, and listener wiring

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use parlor_core::Action;
use tracing::debug;

use crate::listeners::{Listener, ListenerId, ListenerRegistry};
use crate::selectors::Selectors;
use crate::state::AppState;

/// Single source of truth for client state
///
/// Dispatch is serialized: actions reduce one at a time against the latest
/// state and the result is swapped in atomically, so listeners and readers
/// always observe a complete snapshot, never a half-applied action.
pub struct Store {
    state: RwLock<AppState>,
    dispatch_lock: Mutex<()>,
    listeners: ListenerRegistry,
    selectors: Selectors,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(AppState::default()),
            dispatch_lock: Mutex::new(()),
            listeners: ListenerRegistry::new(),
            selectors: Selectors::new(),
        }
    }

    /// Current state snapshot; cheap, every table is behind an `Arc`
    pub fn state(&self) -> AppState {
        self.state.read().clone()
    }

    /// Memoized read-side queries
    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    /// Reduce `action` into the store and notify listeners
    pub fn dispatch(&self, action: &Action) {
        let _serialized = self.dispatch_lock.lock();

        let before = self.state.read().clone();
        self.listeners.notify_before(action, &before);

        let (after, changed) = before.reduce(action);
        if changed {
            *self.state.write() = after.clone();
        }
        debug!(action = action.kind(), changed, "dispatched");

        self.listeners.notify_after(action, &after);
    }

    /// Subscribe to `(action, state)` before the action is reduced
    pub fn add_before_dispatch_listener(&self, listener: Listener) -> ListenerId {
        self.listeners.add_before(listener)
    }

    /// Subscribe to `(action, state)` after the action is reduced
    pub fn add_after_dispatch_listener(&self, listener: Listener) -> ListenerId {
        self.listeners.add_after(listener)
    }

    /// Unsubscribe a before-listener; false if the id was already removed
    pub fn remove_before_dispatch_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove_before(id)
    }

    /// Unsubscribe an after-listener; false if the id was already removed
    pub fn remove_after_dispatch_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove_after(id)
    }
}

/// Shared store handle
pub type SharedStore = Arc<Store>;
