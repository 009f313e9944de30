//! Chat transport and liveness feed contracts.
//!
//! Both are provided by the environment. The transport handles framing,
//! authentication and reconnects; the bot only needs the primitives below.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::foundation::{ChannelId, TransportResult};

/// Outbound chat primitives.
///
/// `send` must be safe to call concurrently: timers and command replies for
/// the same channel can race.
#[async_trait]
pub trait ChatTransport: Send + Sync + 'static {
    /// Joins the channel's chat.
    async fn join(&self, channel: &ChannelId) -> TransportResult<()>;

    /// Leaves the channel's chat.
    async fn part(&self, channel: &ChannelId) -> TransportResult<()>;

    /// Sends a chat message to the channel.
    async fn send(&self, channel: &ChannelId, text: &str) -> TransportResult<()>;

    /// Times a user out.
    ///
    /// The default issues the chat-command form of the timeout.
    async fn timeout(
        &self,
        channel: &ChannelId,
        user: &str,
        seconds: u32,
        reason: &str,
    ) -> TransportResult<()> {
        self.send(channel, &format!("/timeout {user} {seconds} {reason}"))
            .await
    }
}

/// A shared chat transport trait object.
pub type BoxedTransport = Arc<dyn ChatTransport>;

/// Callback invoked by the liveness feed with `(channel, is_live)`.
pub type LivenessSink = Arc<dyn Fn(ChannelId, bool) + Send + Sync>;

/// Opaque handle to one liveness subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: u64,
    channel: ChannelId,
}

impl SubscriptionHandle {
    /// Creates a handle; `id` is chosen by the feed.
    pub fn new(id: u64, channel: ChannelId) -> Self {
        Self { id, channel }
    }

    /// Feed-assigned identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The subscribed channel.
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.channel, self.id)
    }
}

/// External stream state-change notifications.
#[async_trait]
pub trait LivenessFeed: Send + Sync + 'static {
    /// Starts delivering state changes for `channel` to `sink`.
    async fn subscribe(
        &self,
        channel: &ChannelId,
        sink: LivenessSink,
    ) -> TransportResult<SubscriptionHandle>;

    /// Stops delivery for a subscription. Unknown handles are ignored.
    async fn unsubscribe(&self, handle: SubscriptionHandle);
}

/// A shared liveness feed trait object.
pub type BoxedLivenessFeed = Arc<dyn LivenessFeed>;
