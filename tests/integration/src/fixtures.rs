//! Test fixtures and data generators
//!
//! Reusable entity builders for store and session tests.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use parlor_core::{
    Channel, ChannelKind, EntityId, InitialData, Message, MessageStatus, OnlineStatus, Server,
    User,
};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Fixed base timestamp; message times offset from this by minutes
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn user(id: &str, name: &str) -> User {
    User {
        id: EntityId::from(id),
        display_name: Some(name.to_string()),
        wallet_address: format!("0x{id}"),
        description: None,
        status: OnlineStatus::Online,
        pfp: None,
    }
}

pub fn message(id: &str, channel_id: &str, author_id: &str, minute_offset: i64) -> Message {
    Message {
        id: EntityId::from(id),
        channel_id: EntityId::from(channel_id),
        server_id: None,
        author_id: EntityId::from(author_id),
        created_at: base_time() + chrono::Duration::minutes(minute_offset),
        edited_at: None,
        content: format!("message {id}"),
        blocks: Vec::new(),
        reply_to: None,
        reactions: Vec::new(),
        deleted: false,
        status: MessageStatus::Confirmed,
    }
}

pub fn channel(id: &str) -> Channel {
    Channel {
        id: EntityId::from(id),
        kind: ChannelKind::Topic,
        name: Some(format!("channel {id}")),
        description: None,
        owner_user_id: None,
        member_user_ids: Vec::new(),
        server_id: None,
        section_id: None,
    }
}

pub fn server(id: &str, owner_id: &str) -> Server {
    Server {
        id: EntityId::from(id),
        name: format!("server {id}"),
        description: None,
        avatar: None,
        owner_user_id: Some(EntityId::from(owner_id)),
        sections: Vec::new(),
        members: Vec::new(),
    }
}

/// Starting state with a signed-in user, one peer, and one channel
pub fn initial_data() -> InitialData {
    InitialData {
        user: user("u1", "alice"),
        users: vec![user("u2", "bob")],
        servers: Vec::new(),
        channels: vec![channel("c1")],
        read_states: Vec::new(),
    }
}
