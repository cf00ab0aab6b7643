//! Message entity - represents a chat message with reactions and rich content

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::EntityId;

/// Local delivery status of a message entry
///
/// `PendingSend` and `FailedSend` only ever apply to optimistic entries keyed
/// by a placeholder id; everything from the server is `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageStatus {
    #[default]
    Confirmed,
    PendingSend,
    FailedSend,
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: EntityId,
    #[serde(rename = "channel")]
    pub channel_id: EntityId,
    /// Absent on dm and topic messages
    #[serde(rename = "server", default)]
    pub server_id: Option<EntityId>,
    #[serde(rename = "author", default)]
    pub author_id: EntityId,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
    /// Plain-text rendering of the content
    #[serde(default)]
    pub content: String,
    /// Structured rich-text blocks; empty when the backend only has plain text
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
    #[serde(default)]
    pub reply_to: Option<EntityId>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(skip)]
    pub status: MessageStatus,
}

impl Message {
    /// Tombstone entry standing in for a reply target that no longer exists
    pub fn tombstone(id: EntityId, channel_id: EntityId) -> Self {
        Self {
            id,
            channel_id,
            server_id: None,
            author_id: EntityId::default(),
            created_at: Utc::now(),
            edited_at: None,
            content: String::new(),
            blocks: Vec::new(),
            reply_to: None,
            reactions: Vec::new(),
            deleted: true,
            status: MessageStatus::Confirmed,
        }
    }

    /// Check if the message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    /// Check if the message is a reply
    #[inline]
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    /// Content blocks, synthesizing a single paragraph from the plain text
    /// when the backend delivered no structured blocks
    pub fn content_blocks(&self) -> Vec<ContentBlock> {
        if self.blocks.is_empty() {
            vec![ContentBlock::Paragraph {
                children: vec![InlineNode::Text(TextNode {
                    text: self.content.clone(),
                    bold: false,
                    italic: false,
                })],
            }]
        } else {
            self.blocks.clone()
        }
    }

    /// Find a reaction entry by emoji
    pub fn reaction(&self, emoji: &str) -> Option<&Reaction> {
        self.reactions.iter().find(|r| r.emoji == emoji)
    }

    /// Record `user_id` as having reacted with `emoji`
    ///
    /// At most once per `(emoji, user)`: a user already present in the entry's
    /// user set is ignored, which is what keeps a confirmed realtime event
    /// from double-counting the optimistic dispatch it confirms. Returns
    /// whether anything changed.
    pub fn apply_reaction_added(&mut self, emoji: &str, user_id: &EntityId) -> bool {
        match self.reactions.iter_mut().find(|r| r.emoji == emoji) {
            Some(reaction) => reaction.add_user(user_id.clone()),
            None => {
                self.reactions.push(Reaction::single(emoji, user_id.clone()));
                true
            }
        }
    }

    /// Remove `user_id` from the `emoji` reaction entry
    ///
    /// Mirror of [`apply_reaction_added`](Self::apply_reaction_added); an
    /// entry whose count drops to zero is deleted rather than kept around.
    /// Returns whether anything changed.
    pub fn apply_reaction_removed(&mut self, emoji: &str, user_id: &EntityId) -> bool {
        let Some(index) = self.reactions.iter().position(|r| r.emoji == emoji) else {
            return false;
        };
        let changed = self.reactions[index].remove_user(user_id);
        if self.reactions[index].count == 0 {
            self.reactions.remove(index);
        }
        changed
    }
}

/// Aggregated emoji reaction on a message
///
/// `count` always equals `users.len()`; all mutation goes through
/// [`add_user`](Self::add_user) / [`remove_user`](Self::remove_user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: String,
    pub count: u32,
    pub users: Vec<EntityId>,
}

impl Reaction {
    /// Create an entry with a single reacting user
    pub fn single(emoji: impl Into<String>, user_id: EntityId) -> Self {
        Self {
            emoji: emoji.into(),
            count: 1,
            users: vec![user_id],
        }
    }

    /// Check whether `user_id` is part of this entry
    #[inline]
    pub fn has_user(&self, user_id: &EntityId) -> bool {
        self.users.contains(user_id)
    }

    /// Add a user, ignoring duplicates. Returns whether anything changed.
    pub fn add_user(&mut self, user_id: EntityId) -> bool {
        if self.has_user(&user_id) {
            return false;
        }
        self.users.push(user_id);
        self.count = self.users.len() as u32;
        true
    }

    /// Remove a user if present. Returns whether anything changed.
    pub fn remove_user(&mut self, user_id: &EntityId) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u != user_id);
        self.count = self.users.len() as u32;
        self.users.len() != before
    }
}

/// Block-level node of the structured rich-text content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentBlock {
    Paragraph { children: Vec<InlineNode> },
}

/// Inline node inside a content block
///
/// Text nodes have no `type` tag on the wire, so the enum is untagged and
/// the tagged variants are tried first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InlineNode {
    Mention(MentionNode),
    Link(LinkNode),
    Text(TextNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MentionKind {
    User,
}

/// Inline mention, e.g. `{"type":"user","ref":"<user-id>"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionNode {
    #[serde(rename = "type")]
    pub kind: MentionKind,
    #[serde(rename = "ref")]
    pub user_id: EntityId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    Link,
}

/// Inline link node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkNode {
    #[serde(rename = "type")]
    pub kind: LinkKind,
    pub url: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Plain text run with optional formatting marks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}
