//! Unified error types for the fibubot core.
//!
//! Each collaborator layer has its own error enum ([`StoreError`],
//! [`GatewayError`], [`TransportError`]). Command handlers work in terms of
//! [`BotError`], the user-facing taxonomy that decides what (if anything) is
//! said back in chat.

use thiserror::Error;

use super::channel::ChannelId;

// =============================================================================
// Store Errors
// =============================================================================

/// Errors returned by a [`ChannelStore`](crate::ChannelStore).
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The channel is not registered.
    #[error("channel '{0}' is not registered")]
    NotFound(ChannelId),

    /// The channel is already registered.
    #[error("channel '{0}' is already registered")]
    AlreadyExists(ChannelId),

    /// Backing storage failed.
    #[error("storage I/O error: {0}")]
    Io(String),

    /// A record could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Gateway Errors
// =============================================================================

/// Errors returned by the external query gateway.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The service has no data for the requested key.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service could not be reached or answered with garbage.
    #[error("{service} unavailable: {reason}")]
    Unavailable {
        /// Human-readable service name (e.g. `"Tempus"`).
        service: &'static str,
        /// Reason for failure.
        reason: String,
    },
}

impl GatewayError {
    /// Creates an unavailable error for `service`.
    pub fn unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            reason: reason.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors from the chat transport or the liveness feed.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The transport is not connected.
    #[error("transport is not connected")]
    NotConnected,

    /// Message send failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// Joining or parting a channel failed.
    #[error("membership change for '{channel}' failed: {reason}")]
    Membership {
        /// The channel involved.
        channel: ChannelId,
        /// Reason for failure.
        reason: String,
    },

    /// Subscribing to the liveness feed failed.
    #[error("liveness subscription for '{channel}' failed: {reason}")]
    Subscribe {
        /// The channel involved.
        channel: ChannelId,
        /// Reason for failure.
        reason: String,
    },
}

// =============================================================================
// Bot Errors
// =============================================================================

/// User-facing error taxonomy for command handling.
///
/// Every variant carries the text that should be said in chat, except
/// [`PermissionDenied`](BotError::PermissionDenied) which is always silent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotError {
    /// Malformed command arguments; the payload is the corrective usage text.
    #[error("{0}")]
    Validation(String),

    /// Unknown channel, player or record; the payload is the reply text.
    #[error("{0}")]
    NotFound(String),

    /// A backing service failed; the payload names the service.
    #[error("{0} is unavailable right now, try again later")]
    Unavailable(String),

    /// The sender lacks the capability required by the command.
    #[error("permission denied")]
    PermissionDenied,
}

impl BotError {
    /// Returns the chat reply for this error, if one should be sent.
    pub fn reply(&self) -> Option<String> {
        match self {
            Self::PermissionDenied => None,
            other => Some(other.to_string()),
        }
    }
}

impl From<StoreError> for BotError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(channel) => {
                Self::NotFound(format!("{channel} isn't registered with fibubot"))
            }
            StoreError::AlreadyExists(channel) => {
                Self::Validation(format!("{channel} is already registered"))
            }
            StoreError::Io(_) | StoreError::Serialization(_) => {
                Self::Unavailable("storage".to_string())
            }
        }
    }
}

impl From<GatewayError> for BotError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(what) => Self::NotFound(format!("no data found for {what}")),
            GatewayError::Unavailable { service, .. } => Self::Unavailable(service.to_string()),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for gateway calls.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for command handlers.
pub type BotResult<T> = Result<T, BotError>;
