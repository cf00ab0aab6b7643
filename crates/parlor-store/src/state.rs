//! Composed application state
//!
//! `AppState` holds one `Arc` per table. Reducing an action rebuilds only the
//! tables whose reducers report a change; the rest keep their existing `Arc`,
//! so two states can be diffed table-by-table with `Arc::ptr_eq`.

use std::sync::Arc;

use parlor_core::Action;

use crate::tables::{
    ChannelTable, MeTable, MessageTable, Reduce, ServerTable, StarTable, UserTable,
};

/// Immutable snapshot of every table
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub me: Arc<MeTable>,
    pub users: Arc<UserTable>,
    pub messages: Arc<MessageTable>,
    pub channels: Arc<ChannelTable>,
    pub servers: Arc<ServerTable>,
    pub stars: Arc<StarTable>,
}

fn step<T: Reduce>(table: &Arc<T>, action: &Action) -> (Arc<T>, bool) {
    match table.reduce(action) {
        Some(next) => (Arc::new(next), true),
        None => (Arc::clone(table), false),
    }
}

impl AppState {
    /// Reduce `action` against every table; the returned flag is false when
    /// no table changed
    pub fn reduce(&self, action: &Action) -> (Self, bool) {
        let (me, c1) = step(&self.me, action);
        let (users, c2) = step(&self.users, action);
        let (messages, c3) = step(&self.messages, action);
        let (channels, c4) = step(&self.channels, action);
        let (servers, c5) = step(&self.servers, action);
        let (stars, c6) = step(&self.stars, action);
        let next = Self {
            me,
            users,
            messages,
            channels,
            servers,
            stars,
        };
        (next, c1 | c2 | c3 | c4 | c5 | c6)
    }
}
