//! Entity id - string identifier unique within an entity type
//!
//! Server-assigned ids arrive as JSON strings (numeric or UUID-shaped, the
//! backend does not promise either). Placeholder ids for optimistic entries
//! are allocated locally with a `local:` prefix, a per-session UUID, and a
//! monotonic counter, so they can never collide with a server-assigned id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Prefix marking locally allocated placeholder ids
const PLACEHOLDER_PREFIX: &str = "local:";

/// Identifier for an entity (user, message, channel, server, star)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create an EntityId from a raw string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this id is a locally allocated placeholder
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(PLACEHOLDER_PREFIX)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Allocator for placeholder ids used by optimistic entity creation
///
/// The session UUID makes ids collision-resistant across sessions and
/// processes; the counter keeps them unique and ordered within a session.
#[derive(Debug)]
pub struct PlaceholderIdAllocator {
    session: Uuid,
    counter: AtomicU64,
}

impl PlaceholderIdAllocator {
    /// Create a new allocator with a fresh session UUID
    pub fn new() -> Self {
        Self {
            session: Uuid::new_v4(),
            counter: AtomicU64::new(0),
        }
    }

    /// Allocate the next placeholder id
    pub fn allocate(&self) -> EntityId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        EntityId(format!("{PLACEHOLDER_PREFIX}{}:{n}", self.session))
    }
}

impl Default for PlaceholderIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
