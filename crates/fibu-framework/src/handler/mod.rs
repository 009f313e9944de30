//! Command handlers.
//!
//! Every handler returns `BotResult<Vec<Action>>`; the dispatcher turns an
//! error into its chat reply.

pub(crate) mod admin;
pub(crate) mod stream;
pub(crate) mod tempus;

use fibu_core::{BoxedStore, ChannelConfig, Gateway, IncomingMessage};

use crate::command::CommandLine;

/// Everything a built-in handler can see while handling one message.
pub(crate) struct CommandContext<'a> {
    pub message: &'a IncomingMessage,
    pub line: CommandLine<'a>,
    pub config: &'a ChannelConfig,
    pub store: &'a BoxedStore,
    pub gateway: &'a Gateway,
}
