//! Foundation layer: data model and error taxonomy.

pub mod channel;
pub mod error;
pub mod message;

pub use channel::{
    ChannelConfig, ChannelId, ChannelPatch, ChannelSettings, MIN_TIMED_INTERVAL_MS, MS_PER_MINUTE,
    STEAM_ID_PREFIX, TRIGGER_SENTINEL, TimedMessage, is_valid_steam_id, is_valid_tempus_id,
};
pub use error::{
    BotError, BotResult, GatewayError, GatewayResult, StoreError, StoreResult, TransportError,
    TransportResult,
};
pub use message::{Capabilities, IncomingMessage};
