//! # Fibu Runtime
//!
//! Orchestration layer of the fibubot chat bot:
//! - Configuration loading ([`ConfigLoader`]) and validation
//! - Logging setup ([`LoggingBuilder`])
//! - The per-channel liveness state machine and timed message [`Scheduler`]
//! - The [`ChannelRegistry`] of per-channel actors
//! - The process-wide [`BotRuntime`]
//!
//! ```ignore
//! use fibu_runtime::BotRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = BotRuntime::builder()
//!         .store(store)
//!         .transport(transport)
//!         .liveness_feed(feed)
//!         .build()?;
//!
//!     // Runs until Ctrl+C
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod liveness;
pub mod logging;
pub mod registry;
pub mod runtime;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, ConfigLoader, ConfigResult, FibuConfig, Profile};
pub use error::{RuntimeError, RuntimeResult};
pub use liveness::{Effect, LivenessEvent, LivenessState, transition};
pub use logging::{LoggingBuilder, SpanEvents};
pub use registry::{ChannelRegistry, RegistryStats};
pub use runtime::{BotRuntime, RuntimeBuilder, RuntimeStats};
pub use scheduler::{Scheduler, SchedulerHandle};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros and span helpers.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
