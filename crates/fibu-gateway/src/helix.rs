//! Helix-style chat platform API client.

use async_trait::async_trait;
use fibu_core::{
    ChannelId, ChatPlatform, FollowInfo, GatewayError, GatewayResult, StreamStatus, ViewerInfo,
};
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::config::HelixConfig;
use crate::http::{build_client, endpoint, get_json, send};

const SERVICE: &str = "Twitch";

/// Every Helix response wraps its payload in a `data` array.
#[derive(Debug, Deserialize)]
struct Page<T> {
    data: Vec<T>,
}

impl<T> Page<T> {
    fn first(self, what: &str) -> GatewayResult<T> {
        self.data
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::not_found(what))
    }
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: String,
    login: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct WireStream {
    title: String,
    started_at: String,
}

#[derive(Debug, Deserialize)]
struct WireFollower {
    followed_at: String,
}

#[derive(Debug, Deserialize)]
struct WireChannel {
    title: String,
}

fn parse_timestamp(raw: &str) -> GatewayResult<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|e| GatewayError::unavailable(SERVICE, format!("bad timestamp {raw:?}: {e}")))
}

impl From<WireUser> for ViewerInfo {
    fn from(user: WireUser) -> Self {
        Self {
            id: user.id,
            login: user.login,
            display_name: user.display_name,
        }
    }
}

impl TryFrom<WireStream> for StreamStatus {
    type Error = GatewayError;

    fn try_from(stream: WireStream) -> GatewayResult<Self> {
        Ok(Self {
            started_at: parse_timestamp(&stream.started_at)?,
            title: stream.title,
        })
    }
}

/// [`ChatPlatform`] over the Helix REST API.
#[derive(Debug, Clone)]
pub struct HelixClient {
    http: reqwest::Client,
    config: HelixConfig,
    bot_login: String,
}

impl HelixClient {
    /// Creates a client acting as `bot_login`.
    pub fn new(config: &HelixConfig, bot_login: impl Into<String>) -> GatewayResult<Self> {
        Ok(Self {
            http: build_client(SERVICE, config.timeout())?,
            config: config.clone(),
            bot_login: bot_login.into(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Client-Id", &self.config.client_id)
            .bearer_auth(&self.config.access_token)
    }

    async fn get_page<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        what: &str,
    ) -> GatewayResult<Page<T>> {
        let url = endpoint(SERVICE, &self.config.base_url, path, params)?;
        get_json(SERVICE, what, self.authorize(self.http.get(url))).await
    }

    async fn user_id(&self, login: &str) -> GatewayResult<String> {
        Ok(self.viewer_info(login).await?.id)
    }
}

#[async_trait]
impl ChatPlatform for HelixClient {
    async fn viewer_info(&self, login: &str) -> GatewayResult<ViewerInfo> {
        let what = format!("user {login}");
        let page: Page<WireUser> = self.get_page("users", &[("login", login)], &what).await?;
        Ok(page.first(&what)?.into())
    }

    async fn stream_status(&self, channel: &ChannelId) -> GatewayResult<Option<StreamStatus>> {
        let what = format!("stream {channel}");
        let page: Page<WireStream> = self
            .get_page("streams", &[("user_login", channel.as_str())], &what)
            .await?;
        page.data.into_iter().next().map(StreamStatus::try_from).transpose()
    }

    async fn follow_info(&self, viewer: &str, channel: &ChannelId) -> GatewayResult<FollowInfo> {
        let broadcaster_id = self.user_id(channel.as_str()).await?;
        let user_id = self.user_id(viewer).await?;
        let what = format!("follow of {channel} by {viewer}");
        let page: Page<WireFollower> = self
            .get_page(
                "channels/followers",
                &[
                    ("broadcaster_id", broadcaster_id.as_str()),
                    ("user_id", user_id.as_str()),
                ],
                &what,
            )
            .await?;
        let follower = page.first(&what)?;
        Ok(FollowInfo {
            followed_at: parse_timestamp(&follower.followed_at)?,
        })
    }

    async fn title(&self, channel: &ChannelId) -> GatewayResult<String> {
        let broadcaster_id = self.user_id(channel.as_str()).await?;
        let what = format!("channel {channel}");
        let page: Page<WireChannel> = self
            .get_page("channels", &[("broadcaster_id", broadcaster_id.as_str())], &what)
            .await?;
        Ok(page.first(&what)?.title)
    }

    async fn set_title(&self, channel: &ChannelId, title: &str) -> GatewayResult<()> {
        let broadcaster_id = self.user_id(channel.as_str()).await?;
        let url = endpoint(
            SERVICE,
            &self.config.base_url,
            "channels",
            &[("broadcaster_id", broadcaster_id.as_str())],
        )?;
        let request = self
            .authorize(self.http.patch(url))
            .json(&json!({ "title": title }));
        send(SERVICE, &format!("channel {channel}"), request).await?;
        Ok(())
    }

    async fn follow_channel(&self, channel: &ChannelId) -> GatewayResult<()> {
        let from_id = self.user_id(&self.bot_login).await?;
        let to_id = self.user_id(channel.as_str()).await?;
        let url = endpoint(SERVICE, &self.config.base_url, "users/follows", &[])?;
        let request = self
            .authorize(self.http.post(url))
            .json(&json!({ "from_id": from_id, "to_id": to_id }));
        send(SERVICE, &format!("channel {channel}"), request).await?;
        Ok(())
    }
}
