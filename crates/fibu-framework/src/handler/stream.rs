//! General-purpose built-ins: uptime, followage, title and custom commands.

use fibu_core::{BotError, BotResult, GatewayError, TRIGGER_SENTINEL};
use time::OffsetDateTime;
use tracing::debug;

use super::CommandContext;
use crate::action::Action;
use crate::format::humanize_duration;

const NEWCMD_USAGE: &str = r#"format the command like "!newcmd !<command name> <output text>""#;

pub(crate) async fn uptime(ctx: &CommandContext<'_>) -> BotResult<Vec<Action>> {
    let status = ctx
        .gateway
        .platform()
        .stream_status(&ctx.config.channel)
        .await?;
    let reply = match status {
        Some(stream) => {
            let elapsed = OffsetDateTime::now_utc() - stream.started_at;
            format!("live for {}", humanize_duration(elapsed))
        }
        None => "streamer is offline!".to_string(),
    };
    Ok(vec![Action::Say(reply)])
}

pub(crate) async fn followage(ctx: &CommandContext<'_>) -> BotResult<Vec<Action>> {
    let user = &ctx.message.sender;
    let channel = &ctx.config.channel;
    match ctx.gateway.platform().follow_info(user, channel).await {
        Ok(follow) => {
            let elapsed = OffsetDateTime::now_utc() - follow.followed_at;
            Ok(vec![Action::say(format!(
                "{user} has been following for {}",
                humanize_duration(elapsed)
            ))])
        }
        Err(GatewayError::NotFound(_)) => Err(BotError::NotFound(format!(
            "{user} is not following {channel}"
        ))),
        Err(err) => Err(err.into()),
    }
}

/// `!title [new title]`: privileged senders with an argument set the title,
/// everyone else reads it.
pub(crate) async fn title(ctx: &CommandContext<'_>) -> BotResult<Vec<Action>> {
    let platform = ctx.gateway.platform();
    let new_title = ctx.line.rest();
    if !new_title.is_empty() && ctx.message.is_privileged() {
        platform.set_title(&ctx.config.channel, new_title).await?;
        debug!(channel = %ctx.config.channel, "Title changed");
        return Ok(vec![Action::say(format!(
            "title changed to \"{new_title}\""
        ))]);
    }
    let current = platform.title(&ctx.config.channel).await?;
    Ok(vec![Action::Say(current)])
}

/// `!newcmd !<name> <text>`: stores a custom command.
pub(crate) async fn new_command(ctx: &CommandContext<'_>) -> BotResult<Vec<Action>> {
    if !ctx.message.is_privileged() {
        return Err(BotError::PermissionDenied);
    }
    let Some((trigger, text)) = ctx.line.split_first_arg() else {
        return Err(BotError::Validation(NEWCMD_USAGE.to_string()));
    };
    if !trigger.starts_with(TRIGGER_SENTINEL) || trigger.len() == 1 || text.is_empty() {
        return Err(BotError::Validation(NEWCMD_USAGE.to_string()));
    }

    ctx.store
        .upsert_command(&ctx.config.channel, trigger, text)
        .await?;
    debug!(channel = %ctx.config.channel, trigger, "Custom command stored");
    Ok(vec![Action::say(format!("added new command {trigger}"))])
}
