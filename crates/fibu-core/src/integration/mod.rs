//! Integration layer: contracts for the collaborators the bot depends on.

pub mod gateway;
pub mod store;
pub mod transport;

pub use gateway::{
    ActiveServer, ChatPlatform, FollowInfo, GameInfo, Gateway, MapLeaderboard, MapOverview,
    PlayerClass, RankClass, RankInfo, RankingService, RunRecord, ServerStatus, ServerUser,
    StreamStatus, ViewerInfo, find_active_server,
};
pub use store::{BoxedStore, ChannelStore, MemoryStore};
pub use transport::{
    BoxedLivenessFeed, BoxedTransport, ChatTransport, LivenessFeed, LivenessSink,
    SubscriptionHandle,
};
