//! Inbound chat messages.

use super::channel::ChannelId;

/// Capability flags carried by the sender of a chat message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Sender is a channel moderator.
    pub moderator: bool,
    /// Sender owns the channel.
    pub broadcaster: bool,
}

impl Capabilities {
    /// Moderator flags.
    pub const MODERATOR: Self = Self {
        moderator: true,
        broadcaster: false,
    };

    /// Broadcaster flags.
    pub const BROADCASTER: Self = Self {
        moderator: false,
        broadcaster: true,
    };

    /// Whether the sender may run privileged commands.
    pub fn is_privileged(&self) -> bool {
        self.moderator || self.broadcaster
    }
}

/// One chat message, consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Channel the message was posted in.
    pub channel: ChannelId,
    /// Login name of the sender.
    pub sender: String,
    /// Raw message text.
    pub text: String,
    /// Sender capability flags.
    pub capabilities: Capabilities,
}

impl IncomingMessage {
    /// Creates a message from an unprivileged viewer.
    pub fn new(
        channel: impl Into<ChannelId>,
        sender: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            sender: sender.into(),
            text: text.into(),
            capabilities: Capabilities::default(),
        }
    }

    /// Sets the sender capability flags.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Whether the sender may run privileged commands.
    pub fn is_privileged(&self) -> bool {
        self.capabilities.is_privileged()
    }
}
