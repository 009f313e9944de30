//! Runtime error types.

use fibu_core::{BotError, ChannelId, GatewayError, StoreError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The builder was not given a collaborator it needs.
    #[error("Runtime component not provided: {0}")]
    MissingComponent(&'static str),

    #[error("Channel store error: {0}")]
    Store(StoreError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Channel settings were rejected at the configuration boundary.
    #[error("Invalid channel settings: {0}")]
    InvalidSettings(BotError),

    #[error("Channel not registered: {0}")]
    ChannelNotFound(ChannelId),
}

impl From<StoreError> for RuntimeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(channel) => Self::ChannelNotFound(channel),
            other => Self::Store(other),
        }
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
