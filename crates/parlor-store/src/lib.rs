//! # parlor-store
//!
//! Normalized client state: entity tables, pure per-table reducers, a
//! serialized dispatch loop with before/after listeners, and memoized
//! selectors. Change detection is structural at reduce time and pointer-based
//! everywhere after: a table that did not change keeps its `Arc`.

pub mod listeners;
pub mod selectors;
pub mod state;
pub mod store;
pub mod tables;

pub use listeners::{Listener, ListenerId};
pub use selectors::{MessageView, ReactionView, Selectors, UserView};
pub use state::AppState;
pub use store::{SharedStore, Store};
pub use tables::{ChannelTable, MeTable, MessageTable, Reduce, ServerTable, StarTable, UserTable};
