//! Starred-channel operations

use serde_json::json;
use tracing::instrument;

use parlor_core::{Action, EntityId, Star};

use crate::api::HttpMethod;
use crate::error::ApiError;
use crate::session::{decode, Session};

impl Session {
    /// Fetch the signed-in user's starred channels
    #[instrument(skip(self))]
    pub async fn fetch_starred_channels(&self) -> Result<(), ApiError> {
        let payload = self
            .api()
            .request(HttpMethod::Get, "/users/me/stars", None)
            .await?;
        let stars: Vec<Star> = decode(payload)?;
        self.dispatch(&Action::StarredChannelsFetched { stars });
        Ok(())
    }

    /// Star a channel
    #[instrument(skip(self), fields(channel = %channel_id))]
    pub async fn star_channel(&self, channel_id: &EntityId) -> Result<(), ApiError> {
        let payload = self
            .api()
            .request(
                HttpMethod::Post,
                "/users/me/stars",
                Some(json!({ "channel": channel_id })),
            )
            .await?;
        let star: Star = decode(payload)?;
        self.dispatch(&Action::ChannelStarred { star });
        Ok(())
    }

    /// Unstar a channel; unstarring a channel that is not starred is a no-op
    #[instrument(skip(self), fields(channel = %channel_id))]
    pub async fn unstar_channel(&self, channel_id: &EntityId) -> Result<(), ApiError> {
        let state = self.store().state();
        let Some(star_id) = state.stars.star_id_for_channel(channel_id).cloned() else {
            return Ok(());
        };

        self.api()
            .request(
                HttpMethod::Delete,
                &format!("/users/me/stars/{star_id}"),
                None,
            )
            .await?;
        self.dispatch(&Action::ChannelUnstarred {
            channel_id: channel_id.clone(),
        });
        Ok(())
    }
}
