//! Recording fakes for runtime tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use fibu_core::{
    ChannelId, ChatPlatform, ChatTransport, FollowInfo, Gateway, GatewayError, GatewayResult,
    LivenessFeed, LivenessSink, MapLeaderboard, MapOverview, RankClass, RankInfo, RankingService,
    ServerStatus, StreamStatus, SubscriptionHandle, TransportError, TransportResult, ViewerInfo,
};
use parking_lot::Mutex;

#[derive(Default)]
pub(crate) struct RecordingTransport {
    sent: Mutex<Vec<(String, String)>>,
    joined: Mutex<Vec<ChannelId>>,
    parted: Mutex<Vec<ChannelId>>,
    fail_sends: bool,
    failing_channels: Mutex<HashSet<ChannelId>>,
    attempts: Mutex<HashMap<ChannelId, usize>>,
}

impl RecordingTransport {
    pub(crate) fn failing_sends() -> Self {
        Self {
            fail_sends: true,
            ..Default::default()
        }
    }

    /// Fails every send to `channel`; other channels are unaffected.
    pub(crate) fn fail_sends_to(&self, channel: &str) {
        self.failing_channels.lock().insert(ChannelId::new(channel));
    }

    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }

    pub(crate) fn joined(&self) -> Vec<ChannelId> {
        self.joined.lock().clone()
    }

    pub(crate) fn parted(&self) -> Vec<ChannelId> {
        self.parted.lock().clone()
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.lock().values().sum()
    }

    pub(crate) fn attempts_to(&self, channel: &str) -> usize {
        self.attempts
            .lock()
            .get(&ChannelId::new(channel))
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn join(&self, channel: &ChannelId) -> TransportResult<()> {
        self.joined.lock().push(channel.clone());
        Ok(())
    }

    async fn part(&self, channel: &ChannelId) -> TransportResult<()> {
        self.parted.lock().push(channel.clone());
        Ok(())
    }

    async fn send(&self, channel: &ChannelId, text: &str) -> TransportResult<()> {
        *self.attempts.lock().entry(channel.clone()).or_default() += 1;
        if self.fail_sends || self.failing_channels.lock().contains(channel) {
            return Err(TransportError::NotConnected);
        }
        self.sent
            .lock()
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingFeed {
    next_id: AtomicU64,
    sinks: Mutex<HashMap<ChannelId, LivenessSink>>,
    subscribed: Mutex<Vec<ChannelId>>,
    unsubscribed: Mutex<Vec<SubscriptionHandle>>,
    failing: Mutex<HashSet<ChannelId>>,
}

impl RecordingFeed {
    pub(crate) fn fail_for(&self, channel: &str) {
        self.failing.lock().insert(ChannelId::new(channel));
    }

    /// Invokes the channel's sink the way a real feed would.
    pub(crate) fn emit(&self, channel: &ChannelId, is_live: bool) {
        let sink = self.sinks.lock().get(channel).cloned();
        if let Some(sink) = sink {
            sink(channel.clone(), is_live);
        }
    }

    pub(crate) fn subscribed(&self) -> Vec<ChannelId> {
        self.subscribed.lock().clone()
    }

    pub(crate) fn unsubscribed(&self) -> Vec<SubscriptionHandle> {
        self.unsubscribed.lock().clone()
    }
}

#[async_trait]
impl LivenessFeed for RecordingFeed {
    async fn subscribe(
        &self,
        channel: &ChannelId,
        sink: LivenessSink,
    ) -> TransportResult<SubscriptionHandle> {
        if self.failing.lock().contains(channel) {
            return Err(TransportError::Subscribe {
                channel: channel.clone(),
                reason: "feed rejected subscription".into(),
            });
        }
        self.sinks.lock().insert(channel.clone(), sink);
        self.subscribed.lock().push(channel.clone());
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(SubscriptionHandle::new(id, channel.clone()))
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.sinks.lock().remove(handle.channel());
        self.unsubscribed.lock().push(handle);
    }
}

/// Gateway that knows nothing and accepts every write.
pub(crate) struct EmptyGateway;

impl EmptyGateway {
    pub(crate) fn gateway() -> Gateway {
        Gateway::new(Arc::new(EmptyGateway), Arc::new(EmptyGateway))
    }
}

#[async_trait]
impl ChatPlatform for EmptyGateway {
    async fn viewer_info(&self, login: &str) -> GatewayResult<ViewerInfo> {
        Err(GatewayError::not_found(format!("user {login}")))
    }

    async fn stream_status(&self, _channel: &ChannelId) -> GatewayResult<Option<StreamStatus>> {
        Ok(None)
    }

    async fn follow_info(&self, viewer: &str, _channel: &ChannelId) -> GatewayResult<FollowInfo> {
        Err(GatewayError::not_found(format!("follow by {viewer}")))
    }

    async fn title(&self, channel: &ChannelId) -> GatewayResult<String> {
        Err(GatewayError::not_found(format!("channel {channel}")))
    }

    async fn set_title(&self, _channel: &ChannelId, _title: &str) -> GatewayResult<()> {
        Ok(())
    }

    async fn follow_channel(&self, _channel: &ChannelId) -> GatewayResult<()> {
        Ok(())
    }
}

#[async_trait]
impl RankingService for EmptyGateway {
    async fn player_rank(&self, tempus_id: &str, _class: RankClass) -> GatewayResult<RankInfo> {
        Err(GatewayError::not_found(format!("player {tempus_id}")))
    }

    async fn server_status(&self) -> GatewayResult<Vec<ServerStatus>> {
        Ok(Vec::new())
    }

    async fn map_overview(&self, map: &str) -> GatewayResult<MapOverview> {
        Err(GatewayError::not_found(format!("map {map}")))
    }

    async fn map_leaderboard(&self, map: &str) -> GatewayResult<MapLeaderboard> {
        Err(GatewayError::not_found(format!("records on {map}")))
    }
}
