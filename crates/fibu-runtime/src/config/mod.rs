//! Configuration for the fibubot runtime.
//!
//! The schema lives in [`schema`]; [`ConfigLoader`] layers defaults, config
//! files and `FIBU_*` environment variables on top of it, and
//! [`validate_config`] rejects values the runtime cannot work with.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    BotConfig, FibuConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig,
};
pub use validation::validate_config;

pub use fibu_gateway::{HelixConfig, TempusConfig};
pub use fibu_storage::StorageConfig;
