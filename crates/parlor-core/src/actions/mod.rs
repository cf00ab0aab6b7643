//! Store actions and realtime events

mod action;
mod server_event;

pub use action::Action;
pub use server_event::{ServerEvent, ServerEventError};
