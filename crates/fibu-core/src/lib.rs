//! # Fibu Core
//!
//! The data model and collaborator contracts of the fibubot chat bot.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! - **Channel records**: [`ChannelConfig`], [`ChannelSettings`], [`ChannelPatch`]
//! - **Chat input**: [`IncomingMessage`] with sender [`Capabilities`]
//! - **Errors**: per-layer enums plus the user-facing [`BotError`]
//!
//! ### Integration Layer
//!
//! Everything the bot talks to but does not implement:
//! - **Channel store**: [`ChannelStore`] (and the in-memory [`MemoryStore`])
//! - **Chat transport**: [`ChatTransport`]
//! - **Liveness feed**: [`LivenessFeed`]
//! - **External queries**: [`ChatPlatform`] and [`RankingService`], bundled as [`Gateway`]
//!
//! ```text
//! ┌──────────────┐   messages   ┌────────────┐   replies   ┌───────────────┐
//! │ ChatTransport│─────────────▶│ Dispatcher │────────────▶│ ChatTransport │
//! └──────────────┘              └────────────┘             └───────────────┘
//!                                 │        │
//!                      ChannelStore        Gateway
//! ```

pub mod foundation;
pub mod integration;

pub use foundation::{
    BotError, BotResult, Capabilities, ChannelConfig, ChannelId, ChannelPatch, ChannelSettings,
    GatewayError, GatewayResult, IncomingMessage, MIN_TIMED_INTERVAL_MS, MS_PER_MINUTE,
    STEAM_ID_PREFIX, StoreError, StoreResult, TRIGGER_SENTINEL, TimedMessage, TransportError,
    TransportResult, is_valid_steam_id, is_valid_tempus_id,
};

pub use integration::{
    ActiveServer, BoxedLivenessFeed, BoxedStore, BoxedTransport, ChannelStore, ChatPlatform,
    ChatTransport, FollowInfo, GameInfo, Gateway, LivenessFeed, LivenessSink, MapLeaderboard,
    MapOverview, MemoryStore, PlayerClass, RankClass, RankInfo, RankingService, RunRecord,
    ServerStatus, ServerUser, StreamStatus, SubscriptionHandle, ViewerInfo, find_active_server,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::integration::{
        ChannelStore, ChatPlatform, ChatTransport, Gateway, LivenessFeed, RankingService,
    };
}
