//! Control-channel registration commands.

use fibu_core::{
    BotError, BotResult, BoxedStore, ChannelConfig, ChannelId, ChannelPatch, Gateway,
    IncomingMessage, StoreError, is_valid_steam_id, is_valid_tempus_id,
};
use tracing::{info, warn};

use crate::action::Action;
use crate::command::CommandLine;

/// `!join <steamId> <tempusId>`: registers or updates the sender's channel.
pub(crate) async fn join(
    store: &BoxedStore,
    gateway: &Gateway,
    message: &IncomingMessage,
    line: &CommandLine<'_>,
) -> BotResult<Vec<Action>> {
    let user = &message.sender;
    let args = line.args();
    let &[steam_id, tempus_id] = args.as_slice() else {
        return Err(BotError::Validation(format!(
            "@{user} make sure to include your Steam ID and Tempus ID in the format !join <steamid> <tempusid>"
        )));
    };
    if !is_valid_steam_id(steam_id) {
        return Err(BotError::Validation(format!(
            "@{user} your Steam ID is not valid"
        )));
    }
    if !is_valid_tempus_id(tempus_id) {
        return Err(BotError::Validation(format!(
            "@{user} your Tempus ID is not valid"
        )));
    }

    let channel = ChannelId::new(user);
    if let Err(err) = gateway.platform().follow_channel(&channel).await {
        warn!(channel = %channel, error = %err, "Failed to follow channel");
    }

    let created = ChannelConfig::new(channel.clone()).with_ids(steam_id, tempus_id);
    match store.create(created).await {
        Ok(()) => {
            info!(channel = %channel, "Channel registered");
            Ok(vec![
                Action::say(format!("@{user} joined successfully")),
                Action::Registered(channel),
            ])
        }
        Err(StoreError::AlreadyExists(_)) => {
            store
                .update_fields(&channel, ChannelPatch::ids(steam_id, tempus_id))
                .await?;
            info!(channel = %channel, "Channel identifiers updated");
            Ok(vec![Action::say(format!("@{user} updated successfully"))])
        }
        Err(err) => Err(err.into()),
    }
}

/// `!unregister`: deletes the sender's channel.
pub(crate) async fn unregister(
    store: &BoxedStore,
    message: &IncomingMessage,
) -> BotResult<Vec<Action>> {
    let user = &message.sender;
    let channel = ChannelId::new(user);
    match store.delete(&channel).await {
        Ok(()) => {
            info!(channel = %channel, "Channel unregistered");
            Ok(vec![
                Action::say(format!("@{user} unregistered successfully")),
                Action::Unregistered(channel),
            ])
        }
        Err(StoreError::NotFound(_)) => Err(BotError::NotFound(format!(
            "@{user} you haven't registered yet"
        ))),
        Err(err) => Err(err.into()),
    }
}
