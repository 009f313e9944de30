//! Ranking and map commands backed by the Tempus service.

use fibu_core::{BotError, BotResult, ChannelConfig, GatewayError, PlayerClass, RankClass};

use super::CommandContext;
use crate::action::Action;
use crate::format::format_run_time;

fn tempus_id<'a>(config: &'a ChannelConfig) -> BotResult<&'a str> {
    config.tempus_id.as_deref().ok_or_else(|| {
        BotError::NotFound(format!("{} has no Tempus ID configured", config.channel))
    })
}

fn steam_id<'a>(config: &'a ChannelConfig) -> BotResult<&'a str> {
    config.steam_id.as_deref().ok_or_else(|| {
        BotError::NotFound(format!("{} has no Steam ID configured", config.channel))
    })
}

/// Map the channel owner is currently playing.
async fn current_map(ctx: &CommandContext<'_>) -> BotResult<String> {
    let steam_id = steam_id(ctx.config)?;
    match ctx
        .gateway
        .ranking()
        .active_server_for_player(steam_id)
        .await
    {
        Ok(server) => Ok(server.map),
        Err(GatewayError::NotFound(_)) => Err(BotError::NotFound(format!(
            "{} isn't in any Tempus server",
            ctx.config.channel
        ))),
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn rank(ctx: &CommandContext<'_>, class: RankClass) -> BotResult<Vec<Action>> {
    let tempus_id = tempus_id(ctx.config)?;
    let rank = ctx.gateway.ranking().player_rank(tempus_id, class).await?;
    Ok(vec![Action::say(format!(
        "({}) {} is ranked {}/{} with {} points",
        class.label(),
        ctx.config.channel,
        rank.rank,
        rank.total_ranked,
        rank.points
    ))])
}

pub(crate) async fn map(ctx: &CommandContext<'_>) -> BotResult<Vec<Action>> {
    let map = current_map(ctx).await?;
    let overview = ctx.gateway.ranking().map_overview(&map).await?;
    Ok(vec![Action::say(format!(
        "{map} | Solly T{} | Demo T{}",
        overview.tier(PlayerClass::Soldier),
        overview.tier(PlayerClass::Demoman)
    ))])
}

pub(crate) async fn world_record(
    ctx: &CommandContext<'_>,
    class: PlayerClass,
) -> BotResult<Vec<Action>> {
    let map = current_map(ctx).await?;
    let overview = ctx.gateway.ranking().map_overview(&map).await?;
    let label = class.short_label();
    let wr = overview
        .world_record(class)
        .ok_or_else(|| BotError::NotFound(format!("({label} WR) {map} :: no runs yet")))?;
    Ok(vec![Action::say(format!(
        "({label} WR) {map} :: {} :: {}",
        format_run_time(wr.duration),
        wr.player_name
    ))])
}

/// `!stime`/`!dtime`: the owner's own run, if it is on the leaderboard.
pub(crate) async fn personal_time(
    ctx: &CommandContext<'_>,
    class: PlayerClass,
) -> BotResult<Vec<Action>> {
    let steam_id = steam_id(ctx.config)?;
    let map = current_map(ctx).await?;
    let board = ctx.gateway.ranking().map_leaderboard(&map).await?;
    let run = board
        .run_for(steam_id, class)
        .ok_or_else(|| BotError::NotFound("No run found within top 50".to_string()))?;
    Ok(vec![Action::say(format!(
        "({}) {} is ranked {} on {map} with time: {}",
        class.short_label(),
        ctx.config.channel,
        run.rank,
        format_run_time(run.duration)
    ))])
}
