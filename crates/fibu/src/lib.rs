//! # Fibu
//!
//! A multi-tenant chat bot for jump map streamers. Every registered channel
//! gets its own custom commands, timed announcements and word filter, plus
//! ranking lookups against the Tempus API.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐  messages  ┌────────────┐  actions  ┌───────────────┐
//! │ ChatTransport │───────────▶│ Dispatcher │──────────▶│  BotRuntime   │
//! └───────────────┘            └────────────┘           └───────────────┘
//! ┌───────────────┐  live/offline  ┌─────────────────┐         │
//! │ LivenessFeed  │───────────────▶│ ChannelRegistry │◀────────┘
//! └───────────────┘                │ (actor/channel) │──▶ Scheduler ──▶ ChatTransport
//!                                  └─────────────────┘
//! ```
//!
//! - **Core**: channel records, errors and collaborator traits
//! - **Storage**: the file-backed channel store
//! - **Gateway**: HTTP clients for Tempus and the chat platform
//! - **Framework**: the command dispatcher
//! - **Runtime**: config, logging, scheduler, liveness and the runtime itself
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fibu::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().with_current_dir().load()?;
//!     let store = FileStore::from_config(&config.storage).await?;
//!
//!     let runtime = BotRuntime::builder()
//!         .config(config)
//!         .store(Arc::new(store))
//!         .transport(my_transport)
//!         .liveness_feed(my_feed)
//!         .build()?;
//!
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use fibu_core as core;
pub use fibu_framework as framework;
pub use fibu_gateway as gateway;
pub use fibu_runtime as runtime;
pub use fibu_storage as storage;

/// Commonly used types for wiring and driving the bot.
pub mod prelude {
    // Runtime - main entry point
    pub use fibu_runtime::{BotRuntime, ConfigLoader, FibuConfig, LivenessState, RuntimeError};

    // Channel records and inbound messages
    pub use fibu_core::{
        Capabilities, ChannelConfig, ChannelId, ChannelSettings, IncomingMessage, TimedMessage,
    };

    // Collaborator contracts for custom implementations
    pub use fibu_core::{
        ChannelStore, ChatPlatform, ChatTransport, Gateway, LivenessFeed, LivenessSink,
        RankingService, SubscriptionHandle, TransportError, TransportResult,
    };

    // Bundled implementations
    pub use fibu_core::MemoryStore;
    pub use fibu_gateway::{HelixClient, TempusClient, http_gateway};
    pub use fibu_storage::FileStore;

    pub use fibu_framework::Action;
}
