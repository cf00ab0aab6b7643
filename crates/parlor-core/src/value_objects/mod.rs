//! Value objects

mod entity_id;

pub use entity_id::{EntityId, PlaceholderIdAllocator};
