//! Entity and index tables
//!
//! Each table owns the normalized records for one entity type and reduces
//! every dispatched action with a pure function. A reducer that does not
//! recognize an action (or recognizes it as a no-op for its current contents)
//! returns `None`, letting the dispatcher reuse the existing `Arc` so that
//! downstream change detection is plain pointer equality.

mod channels;
mod me;
mod messages;
mod servers;
mod stars;
mod users;

pub use channels::ChannelTable;
pub use me::MeTable;
pub use messages::MessageTable;
pub use servers::ServerTable;
pub use stars::StarTable;
pub use users::UserTable;

use parlor_core::Action;

/// Pure state transition for one table
pub trait Reduce: Sized {
    /// Produce the next table for `action`, or `None` when nothing changed
    fn reduce(&self, action: &Action) -> Option<Self>;
}
