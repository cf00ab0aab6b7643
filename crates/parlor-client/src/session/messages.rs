//! Message operations: pagination, optimistic sends, edits, reactions

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, instrument, warn};

use parlor_core::{Action, ContentBlock, EntityId, Message, MessageStatus};

use crate::api::HttpMethod;
use crate::emoji::is_valid_reaction_emoji;
use crate::error::ApiError;
use crate::session::{decode, log_followup_error, Session};

/// Cursor query for one page of channel history
#[derive(Debug, Clone)]
pub struct FetchMessagesQuery {
    /// Page size; required and non-zero
    pub limit: u32,
    /// Fetch messages older than this id
    pub before_message_id: Option<EntityId>,
    /// Fetch messages newer than this id
    pub after_message_id: Option<EntityId>,
}

/// Outgoing message content
#[derive(Debug, Clone, Default)]
pub struct MessageDraft {
    pub content: String,
    pub blocks: Vec<ContentBlock>,
    pub reply_to: Option<EntityId>,
}

impl Session {
    /// Fetch one page of a channel's history and resolve any reply targets
    /// the page references but the store does not hold yet
    #[instrument(skip(self, query), fields(channel = %channel_id, limit = query.limit))]
    pub async fn fetch_messages(
        self: &Arc<Self>,
        channel_id: &EntityId,
        query: &FetchMessagesQuery,
    ) -> Result<(), ApiError> {
        if query.limit == 0 {
            return Err(ApiError::MissingArgument("limit"));
        }

        let mut path = format!("/channels/{channel_id}/messages?limit={}", query.limit);
        if let Some(before) = &query.before_message_id {
            path.push_str(&format!("&before={before}"));
        }
        if let Some(after) = &query.after_message_id {
            path.push_str(&format!("&after={after}"));
        }

        let payload = self.api().request(HttpMethod::Get, &path, None).await?;
        let messages: Vec<Message> = decode(payload)?;
        debug!(count = messages.len(), "messages fetched");

        let missing_reply_targets = self.missing_reply_targets(&messages);
        self.dispatch(&Action::MessagesFetched {
            channel_id: channel_id.clone(),
            limit: query.limit,
            before_message_id: query.before_message_id.clone(),
            after_message_id: query.after_message_id.clone(),
            messages,
        });

        for (reply_id, reply_channel_id) in missing_reply_targets {
            let session = Arc::clone(self);
            tokio::spawn(async move {
                session.fetch_reply_target(&reply_id, &reply_channel_id).await;
            });
        }
        Ok(())
    }

    /// Reply targets referenced by `batch` that neither the batch nor the
    /// store can resolve
    fn missing_reply_targets(&self, batch: &[Message]) -> Vec<(EntityId, EntityId)> {
        let state = self.store().state();
        let mut targets: Vec<(EntityId, EntityId)> = Vec::new();
        for message in batch {
            let Some(reply_to) = &message.reply_to else {
                continue;
            };
            if state.messages.contains(reply_to)
                || batch.iter().any(|m| &m.id == reply_to)
                || targets.iter().any(|(id, _)| id == reply_to)
            {
                continue;
            }
            targets.push((reply_to.clone(), message.channel_id.clone()));
        }
        targets
    }

    /// Fetch a single message by id
    #[instrument(skip(self), fields(message = %message_id))]
    pub async fn fetch_message(&self, message_id: &EntityId) -> Result<(), ApiError> {
        let payload = self
            .api()
            .request(HttpMethod::Get, &format!("/messages/{message_id}"), None)
            .await?;
        let message: Message = decode(payload)?;
        self.dispatch(&Action::MessageFetched { message });
        Ok(())
    }

    /// Resolve a reply target, falling back to a tombstone when the target
    /// has been deleted on the backend
    async fn fetch_reply_target(&self, message_id: &EntityId, channel_id: &EntityId) {
        match self.fetch_message(message_id).await {
            Ok(()) => {}
            Err(error) if error.is_not_found() => {
                self.dispatch(&Action::MessageFetched {
                    message: Message::tombstone(message_id.clone(), channel_id.clone()),
                });
            }
            Err(error) => warn!(%error, message = %message_id, "reply target fetch failed"),
        }
    }

    /// Send a message, inserting an optimistic placeholder entry immediately
    ///
    /// On success the placeholder is atomically replaced by the confirmed
    /// entity; on failure it stays in the channel flagged as a failed send so
    /// the UI can offer a retry.
    #[instrument(skip(self, draft), fields(channel = %channel_id))]
    pub async fn create_message(
        &self,
        channel_id: &EntityId,
        draft: &MessageDraft,
    ) -> Result<EntityId, ApiError> {
        let me = self.me()?;
        let state = self.store().state();
        let server_id = state
            .channels
            .get(channel_id)
            .and_then(|c| c.server_id.clone());

        let optimistic_entry_id = self.placeholder_ids().allocate();
        let optimistic = Message {
            id: optimistic_entry_id.clone(),
            channel_id: channel_id.clone(),
            server_id,
            author_id: me.id,
            created_at: Utc::now(),
            edited_at: None,
            content: draft.content.clone(),
            blocks: draft.blocks.clone(),
            reply_to: draft.reply_to.clone(),
            reactions: Vec::new(),
            deleted: false,
            status: MessageStatus::PendingSend,
        };
        self.dispatch(&Action::MessageCreateRequestSent {
            message: optimistic,
        });

        let mut body = serde_json::Map::new();
        body.insert("content".to_string(), json!(draft.content));
        if !draft.blocks.is_empty() {
            body.insert("blocks".to_string(), json!(draft.blocks));
        }
        if let Some(reply_to) = &draft.reply_to {
            body.insert("reply_to".to_string(), json!(reply_to));
        }

        let result = self
            .api()
            .request(
                HttpMethod::Post,
                &format!("/channels/{channel_id}/messages"),
                Some(body.into()),
            )
            .await;

        // An undecodable success body leaves no confirmed entity to reconcile
        // against, so it fails the send the same way a rejected request does;
        // the placeholder must never stay pending
        match result.and_then(decode::<Message>) {
            Ok(message) => {
                let confirmed_id = message.id.clone();
                self.dispatch(&Action::MessageCreateRequestSucceeded {
                    message,
                    optimistic_entry_id,
                });
                // Sending implies having read everything up to the send
                log_followup_error("mark-channel-read", self.mark_channel_read(channel_id).await);
                Ok(confirmed_id)
            }
            Err(error) => {
                self.dispatch(&Action::MessageCreateRequestFailed {
                    channel_id: channel_id.clone(),
                    optimistic_entry_id,
                });
                Err(error)
            }
        }
    }

    /// Edit a message's content
    #[instrument(skip(self, draft), fields(message = %message_id))]
    pub async fn update_message(
        &self,
        message_id: &EntityId,
        draft: &MessageDraft,
    ) -> Result<(), ApiError> {
        let mut body = serde_json::Map::new();
        body.insert("content".to_string(), json!(draft.content));
        if !draft.blocks.is_empty() {
            body.insert("blocks".to_string(), json!(draft.blocks));
        }

        let payload = self
            .api()
            .request(
                HttpMethod::Patch,
                &format!("/messages/{message_id}"),
                Some(body.into()),
            )
            .await?;
        let message: Message = decode(payload)?;
        self.dispatch(&Action::MessageUpdateRequestSucceeded { message });
        Ok(())
    }

    /// Delete a message (it remains as a tombstone in the channel timeline)
    #[instrument(skip(self), fields(message = %message_id))]
    pub async fn remove_message(&self, message_id: &EntityId) -> Result<(), ApiError> {
        self.api()
            .request(HttpMethod::Delete, &format!("/messages/{message_id}"), None)
            .await?;
        self.dispatch(&Action::MessageDeleteRequestSucceeded {
            message_id: message_id.clone(),
        });
        Ok(())
    }

    /// Add the signed-in user's reaction, optimistically
    #[instrument(skip(self), fields(message = %message_id, emoji))]
    pub async fn add_message_reaction(
        &self,
        message_id: &EntityId,
        emoji: &str,
    ) -> Result<(), ApiError> {
        if !is_valid_reaction_emoji(emoji) {
            return Err(ApiError::InvalidEmoji(emoji.to_string()));
        }
        let me = self.me()?;

        self.dispatch(&Action::AddMessageReactionRequestSent {
            message_id: message_id.clone(),
            emoji: emoji.to_string(),
            user_id: me.id.clone(),
        });

        let result = self
            .api()
            .request(
                HttpMethod::Put,
                &format!("/messages/{message_id}/reactions/{emoji}"),
                None,
            )
            .await;

        if let Err(error) = result {
            self.dispatch(&Action::AddMessageReactionRequestFailed {
                message_id: message_id.clone(),
                emoji: emoji.to_string(),
                user_id: me.id,
            });
            return Err(error);
        }
        Ok(())
    }

    /// Remove the signed-in user's reaction, optimistically
    #[instrument(skip(self), fields(message = %message_id, emoji))]
    pub async fn remove_message_reaction(
        &self,
        message_id: &EntityId,
        emoji: &str,
    ) -> Result<(), ApiError> {
        if !is_valid_reaction_emoji(emoji) {
            return Err(ApiError::InvalidEmoji(emoji.to_string()));
        }
        let me = self.me()?;

        self.dispatch(&Action::RemoveMessageReactionRequestSent {
            message_id: message_id.clone(),
            emoji: emoji.to_string(),
            user_id: me.id.clone(),
        });

        let result = self
            .api()
            .request(
                HttpMethod::Delete,
                &format!("/messages/{message_id}/reactions/{emoji}"),
                None,
            )
            .await;

        if let Err(error) = result {
            self.dispatch(&Action::RemoveMessageReactionRequestFailed {
                message_id: message_id.clone(),
                emoji: emoji.to_string(),
                user_id: me.id,
            });
            return Err(error);
        }
        Ok(())
    }
}
