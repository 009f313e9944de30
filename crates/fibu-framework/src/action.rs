//! Outgoing actions produced by the dispatcher.

use fibu_core::ChannelId;

/// Seconds a spam-filter hit times the sender out for.
pub const SPAM_TIMEOUT_SECS: u32 = 30;

/// One effect of handling a chat message.
///
/// The dispatcher never talks to the transport or the registry itself; the
/// runtime applies actions in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send text to the channel the message came from.
    Say(String),
    /// Time a user out in the channel the message came from.
    Timeout {
        user: String,
        seconds: u32,
        reason: String,
    },
    /// A channel was newly registered; attach its runtime state.
    Registered(ChannelId),
    /// A channel was unregistered; release its runtime state.
    Unregistered(ChannelId),
}

impl Action {
    /// Shorthand for [`Action::Say`].
    pub fn say(text: impl Into<String>) -> Self {
        Self::Say(text.into())
    }

    /// Returns the text of a `Say` action.
    pub fn as_say(&self) -> Option<&str> {
        match self {
            Self::Say(text) => Some(text),
            _ => None,
        }
    }
}
