//! Chat message dispatcher.
//!
//! The [`Dispatcher`] turns one [`IncomingMessage`] into the list of
//! [`Action`]s the runtime should apply. Rules are tried in a fixed order and
//! the first one that matches ends dispatch:
//!
//! 1. Administrative commands, only in the control channel. Nothing else is
//!    processed there.
//! 2. Built-in commands. `!ping` answers everywhere; every other rule needs a
//!    registered channel. Tempus-only channels keep just the ranking commands.
//! 3. Custom commands, matched on the trimmed message text.
//! 4. The spam filter, for unprivileged senders.

use fibu_core::{
    BotError, BotResult, BoxedStore, ChannelId, Gateway, IncomingMessage, StoreError,
};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::action::{Action, SPAM_TIMEOUT_SECS};
use crate::command::{AdminCommand, Builtin, CommandLine};
use crate::handler::{CommandContext, admin, stream, tempus};

/// Routes chat messages to command handlers.
///
/// Cheap to clone; every message can be dispatched on its own task.
#[derive(Clone)]
pub struct Dispatcher {
    store: BoxedStore,
    gateway: Gateway,
    control_channel: ChannelId,
}

impl Dispatcher {
    /// Creates a dispatcher reading `store` and querying `gateway`.
    pub fn new(store: BoxedStore, gateway: Gateway, control_channel: impl Into<ChannelId>) -> Self {
        Self {
            store,
            gateway,
            control_channel: control_channel.into(),
        }
    }

    /// The channel where registration commands are accepted.
    pub fn control_channel(&self) -> &ChannelId {
        &self.control_channel
    }

    /// Handles one message and returns the actions to apply, in order.
    ///
    /// Handler errors become their chat reply; this never fails.
    pub async fn dispatch(&self, message: &IncomingMessage) -> Vec<Action> {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            channel = %message.channel,
            sender = %message.sender
        );

        async {
            match self.route(message).await {
                Ok(actions) => actions,
                Err(err) => {
                    match &err {
                        BotError::Unavailable(service) => {
                            warn!(service = %service, "Command failed, backing service unavailable")
                        }
                        BotError::PermissionDenied => debug!("Sender lacks capability, ignoring"),
                        other => debug!(reply = %other, "Command rejected"),
                    }
                    err.reply().map(Action::Say).into_iter().collect()
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn route(&self, message: &IncomingMessage) -> BotResult<Vec<Action>> {
        let line = CommandLine::parse(&message.text);

        if message.channel == self.control_channel {
            let Some(line) = line else {
                return Ok(Vec::new());
            };
            return match AdminCommand::recognize(&line) {
                Some(AdminCommand::Join) => {
                    admin::join(&self.store, &self.gateway, message, &line).await
                }
                Some(AdminCommand::Unregister) => admin::unregister(&self.store, message).await,
                None => Ok(Vec::new()),
            };
        }

        let builtin = line.and_then(|l| Builtin::recognize(&l).map(|b| (b, l)));
        if let Some((Builtin::Ping, _)) = builtin {
            return Ok(vec![Action::say("Pong!")]);
        }

        let config = match self.store.get(&message.channel).await {
            Ok(config) => config,
            Err(StoreError::NotFound(_)) => {
                debug!("Channel is not registered, ignoring");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        if let Some((builtin, line)) = builtin
            && (!config.tempus_only || builtin.is_tempus())
        {
            let ctx = CommandContext {
                message,
                line,
                config: &config,
                store: &self.store,
                gateway: &self.gateway,
            };
            return run_builtin(builtin, &ctx).await;
        }

        if !config.tempus_only
            && let Some(reply) = config.custom_commands.get(message.text.trim())
        {
            return Ok(vec![Action::say(reply.clone())]);
        }

        if !message.is_privileged()
            && let Some(word) = config.banned_word_in(&message.text)
        {
            info!(word, "Spam filter matched, timing sender out");
            return Ok(vec![
                Action::Timeout {
                    user: message.sender.clone(),
                    seconds: SPAM_TIMEOUT_SECS,
                    reason: "banned phrase".to_string(),
                },
                Action::say(format!(
                    "{}, you've been timed out for {SPAM_TIMEOUT_SECS} seconds, stop saying bad words",
                    message.sender
                )),
            ]);
        }

        Ok(Vec::new())
    }
}

async fn run_builtin(builtin: Builtin, ctx: &CommandContext<'_>) -> BotResult<Vec<Action>> {
    match builtin {
        Builtin::Ping => Ok(vec![Action::say("Pong!")]),
        Builtin::Uptime => stream::uptime(ctx).await,
        Builtin::Followage => stream::followage(ctx).await,
        Builtin::Title => stream::title(ctx).await,
        Builtin::NewCommand => stream::new_command(ctx).await,
        Builtin::Rank(class) => tempus::rank(ctx, class).await,
        Builtin::Map => tempus::map(ctx).await,
        Builtin::WorldRecord(class) => tempus::world_record(ctx, class).await,
        Builtin::PersonalTime(class) => tempus::personal_time(ctx, class).await,
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("control_channel", &self.control_channel)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use fibu_core::{
        ActiveServer, Capabilities, ChannelConfig, ChannelPatch, ChannelStore, ChatPlatform,
        FollowInfo, GameInfo, GatewayError, GatewayResult, MapLeaderboard, MapOverview,
        MemoryStore, RankClass, RankInfo, RankingService, RunRecord, ServerStatus, ServerUser,
        StoreResult, StreamStatus, ViewerInfo,
    };
    use parking_lot::Mutex;
    use time::{Duration, OffsetDateTime};

    const STEAM: &str = "STEAM_0:1:1234";

    #[derive(Default)]
    struct FakePlatform {
        live_since: Mutex<Option<OffsetDateTime>>,
        followed_at: Mutex<Option<OffsetDateTime>>,
        title: Mutex<String>,
        followed_channels: Mutex<Vec<ChannelId>>,
    }

    #[async_trait]
    impl ChatPlatform for FakePlatform {
        async fn viewer_info(&self, login: &str) -> GatewayResult<ViewerInfo> {
            Ok(ViewerInfo {
                id: "1".into(),
                login: login.into(),
                display_name: login.into(),
            })
        }

        async fn stream_status(&self, _channel: &ChannelId) -> GatewayResult<Option<StreamStatus>> {
            Ok(self.live_since.lock().map(|started_at| StreamStatus {
                title: self.title.lock().clone(),
                started_at,
            }))
        }

        async fn follow_info(&self, viewer: &str, _: &ChannelId) -> GatewayResult<FollowInfo> {
            self.followed_at
                .lock()
                .map(|followed_at| FollowInfo { followed_at })
                .ok_or_else(|| GatewayError::not_found(format!("follow by {viewer}")))
        }

        async fn title(&self, _channel: &ChannelId) -> GatewayResult<String> {
            Ok(self.title.lock().clone())
        }

        async fn set_title(&self, _channel: &ChannelId, title: &str) -> GatewayResult<()> {
            *self.title.lock() = title.to_string();
            Ok(())
        }

        async fn follow_channel(&self, channel: &ChannelId) -> GatewayResult<()> {
            self.followed_channels.lock().push(channel.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeRanking {
        down: Mutex<bool>,
        servers: Mutex<Vec<ServerStatus>>,
        overview: Mutex<Option<MapOverview>>,
        board: Mutex<MapLeaderboard>,
    }

    impl FakeRanking {
        fn check(&self) -> GatewayResult<()> {
            if *self.down.lock() {
                return Err(GatewayError::unavailable("Tempus", "connection refused"));
            }
            Ok(())
        }

        fn host(&self, steam_id: &str, map: &str) {
            self.servers.lock().push(ServerStatus {
                name: "jump.tf".into(),
                game_info: Some(GameInfo {
                    current_map: map.into(),
                    player_count: 1,
                    users: vec![ServerUser {
                        name: "fibu".into(),
                        steam_id: Some(steam_id.into()),
                    }],
                }),
            });
        }
    }

    #[async_trait]
    impl RankingService for FakeRanking {
        async fn player_rank(&self, _id: &str, class: RankClass) -> GatewayResult<RankInfo> {
            self.check()?;
            Ok(match class {
                RankClass::Overall => RankInfo {
                    rank: 315,
                    total_ranked: 75729,
                    points: 27493.0,
                },
                RankClass::Soldier => RankInfo {
                    rank: 186,
                    total_ranked: 56963,
                    points: 26458.0,
                },
                RankClass::Demoman => RankInfo {
                    rank: 1262,
                    total_ranked: 39099,
                    points: 1035.5,
                },
            })
        }

        async fn server_status(&self) -> GatewayResult<Vec<ServerStatus>> {
            self.check()?;
            Ok(self.servers.lock().clone())
        }

        async fn map_overview(&self, map: &str) -> GatewayResult<MapOverview> {
            self.check()?;
            self.overview
                .lock()
                .clone()
                .ok_or_else(|| GatewayError::not_found(format!("map {map}")))
        }

        async fn map_leaderboard(&self, _map: &str) -> GatewayResult<MapLeaderboard> {
            self.check()?;
            Ok(self.board.lock().clone())
        }
    }

    /// Store whose every operation fails with an I/O error.
    struct BrokenStore;

    #[async_trait]
    impl ChannelStore for BrokenStore {
        async fn get(&self, _: &ChannelId) -> StoreResult<ChannelConfig> {
            Err(StoreError::Io("disk on fire".into()))
        }
        async fn create(&self, _: ChannelConfig) -> StoreResult<()> {
            Err(StoreError::Io("disk on fire".into()))
        }
        async fn delete(&self, _: &ChannelId) -> StoreResult<()> {
            Err(StoreError::Io("disk on fire".into()))
        }
        async fn update_fields(&self, _: &ChannelId, _: ChannelPatch) -> StoreResult<ChannelConfig> {
            Err(StoreError::Io("disk on fire".into()))
        }
        async fn upsert_command(&self, _: &ChannelId, _: &str, _: &str) -> StoreResult<()> {
            Err(StoreError::Io("disk on fire".into()))
        }
        async fn list(&self) -> StoreResult<Vec<ChannelId>> {
            Err(StoreError::Io("disk on fire".into()))
        }
    }

    struct Harness {
        dispatcher: Dispatcher,
        store: Arc<MemoryStore>,
        platform: Arc<FakePlatform>,
        ranking: Arc<FakeRanking>,
    }

    impl Harness {
        fn new(configs: impl IntoIterator<Item = ChannelConfig>) -> Self {
            let store = Arc::new(MemoryStore::with_channels(configs));
            let platform = Arc::new(FakePlatform::default());
            let ranking = Arc::new(FakeRanking::default());
            let gateway = Gateway::new(platform.clone(), ranking.clone());
            let dispatcher = Dispatcher::new(store.clone(), gateway, "fibubot");
            Self {
                dispatcher,
                store,
                platform,
                ranking,
            }
        }

        fn registered() -> Self {
            Self::new([ChannelConfig::new("fibu".into()).with_ids(STEAM, "4821")])
        }

        async fn say(&self, channel: &str, text: &str) -> Vec<Action> {
            self.dispatcher
                .dispatch(&IncomingMessage::new(channel, "viewer", text))
                .await
        }

        async fn say_as(&self, channel: &str, sender: &str, caps: Capabilities, text: &str) -> Vec<Action> {
            let message = IncomingMessage::new(channel, sender, text).with_capabilities(caps);
            self.dispatcher.dispatch(&message).await
        }

        async fn config(&self, channel: &str) -> ChannelConfig {
            self.store.get(&ChannelId::new(channel)).await.unwrap()
        }
    }

    fn replies(actions: &[Action]) -> Vec<&str> {
        actions.iter().filter_map(Action::as_say).collect()
    }

    // =========================================================================
    // Control channel
    // =========================================================================

    #[tokio::test]
    async fn test_join_creates_channel_with_empty_collections() {
        let h = Harness::new([]);
        let actions = h
            .say_as("fibubot", "Fibu", Capabilities::default(), "!join STEAM_0:1:1234 4821")
            .await;

        assert_eq!(
            actions,
            vec![
                Action::say("@Fibu joined successfully"),
                Action::Registered(ChannelId::new("fibu")),
            ]
        );
        let config = h.config("fibu").await;
        assert_eq!(config, ChannelConfig::new("fibu".into()).with_ids(STEAM, "4821"));
        assert_eq!(*h.platform.followed_channels.lock(), vec![ChannelId::new("fibu")]);
    }

    #[tokio::test]
    async fn test_rejoin_updates_only_identifiers() {
        let mut existing = ChannelConfig::new("fibu".into()).with_ids(STEAM, "1");
        existing.spam_filter.push("spam".into());
        existing.custom_commands.insert("!discord".into(), "discord.gg/x".into());
        existing.timed_messages.push(fibu_core::TimedMessage::every_minutes(10, "hi"));
        let h = Harness::new([existing.clone()]);

        let actions = h.say_as("fibubot", "fibu", Capabilities::default(), "!join STEAM_0:0:9 77").await;

        assert_eq!(replies(&actions), vec!["@fibu updated successfully"]);
        let config = h.config("fibu").await;
        assert_eq!(config.steam_id.as_deref(), Some("STEAM_0:0:9"));
        assert_eq!(config.tempus_id.as_deref(), Some("77"));
        assert_eq!(config.spam_filter, existing.spam_filter);
        assert_eq!(config.custom_commands, existing.custom_commands);
        assert_eq!(config.timed_messages, existing.timed_messages);
    }

    #[tokio::test]
    async fn test_malformed_join_never_mutates() {
        let h = Harness::new([]);
        let cases = [
            ("!join STEAM_0:1:1", "@fibu make sure to include your Steam ID and Tempus ID in the format !join <steamid> <tempusid>"),
            ("!join a b c", "@fibu make sure to include your Steam ID and Tempus ID in the format !join <steamid> <tempusid>"),
            ("!join 12345 4821", "@fibu your Steam ID is not valid"),
            ("!join STEAM_0:1:1 48x", "@fibu your Tempus ID is not valid"),
        ];
        for (text, expected) in cases {
            let actions = h.say_as("fibubot", "fibu", Capabilities::default(), text).await;
            assert_eq!(replies(&actions), vec![expected], "input: {text}");
        }
        assert!(h.store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unregister() {
        let h = Harness::registered();
        let actions = h.say_as("fibubot", "fibu", Capabilities::default(), "!unregister").await;
        assert_eq!(
            actions,
            vec![
                Action::say("@fibu unregistered successfully"),
                Action::Unregistered(ChannelId::new("fibu")),
            ]
        );

        let again = h.say_as("fibubot", "fibu", Capabilities::default(), "!unregister").await;
        assert_eq!(replies(&again), vec!["@fibu you haven't registered yet"]);
    }

    #[tokio::test]
    async fn test_control_channel_ignores_everything_else() {
        let h = Harness::new([ChannelConfig::new("fibubot".into())]);
        assert!(h.say("fibubot", "!ping").await.is_empty());
        assert!(h.say("fibui", "!join STEAM_0:1:1 1").await.is_empty());
    }

    // =========================================================================
    // Built-ins
    // =========================================================================

    #[tokio::test]
    async fn test_ping_answers_even_when_unregistered() {
        let h = Harness::new([]);
        assert_eq!(h.say("stranger", "!ping").await, vec![Action::say("Pong!")]);
        assert!(h.say("stranger", "!rank").await.is_empty());
        assert!(h.say("stranger", "!uptime").await.is_empty());
    }

    #[tokio::test]
    async fn test_uptime() {
        let h = Harness::registered();
        assert_eq!(replies(&h.say("fibu", "!uptime").await), vec!["streamer is offline!"]);

        *h.platform.live_since.lock() =
            Some(OffsetDateTime::now_utc() - Duration::hours(3) - Duration::minutes(5));
        assert_eq!(replies(&h.say("fibu", "!uptime").await), vec!["live for 3 hours"]);
    }

    #[tokio::test]
    async fn test_followage() {
        let h = Harness::registered();
        assert_eq!(
            replies(&h.say("fibu", "!followage").await),
            vec!["viewer is not following fibu"]
        );

        *h.platform.followed_at.lock() = Some(OffsetDateTime::now_utc() - Duration::days(12));
        assert_eq!(
            replies(&h.say("fibu", "!followage").await),
            vec!["viewer has been following for 12 days"]
        );
    }

    #[tokio::test]
    async fn test_title_read_and_write() {
        let h = Harness::registered();
        *h.platform.title.lock() = "old title".into();

        let viewer = h.say("fibu", "!title hijacked").await;
        assert_eq!(replies(&viewer), vec!["old title"]);

        let moderator = h
            .say_as("fibu", "mod", Capabilities::MODERATOR, "!title  jump_it speedruns")
            .await;
        assert_eq!(replies(&moderator), vec![r#"title changed to "jump_it speedruns""#]);
        assert_eq!(*h.platform.title.lock(), "jump_it speedruns");
    }

    #[tokio::test]
    async fn test_newcmd_by_moderator_then_trigger() {
        let h = Harness::registered();
        let added = h
            .say_as("fibu", "mod", Capabilities::MODERATOR, "!newcmd !foo bar baz")
            .await;
        assert_eq!(replies(&added), vec!["added new command !foo"]);
        assert_eq!(h.say("fibu", "  !foo ").await, vec![Action::say("bar baz")]);
    }

    #[tokio::test]
    async fn test_newcmd_by_viewer_is_silent_noop() {
        let h = Harness::registered();
        assert!(h.say("fibu", "!newcmd !foo bar baz").await.is_empty());
        assert!(h.config("fibu").await.custom_commands.is_empty());
    }

    #[tokio::test]
    async fn test_newcmd_usage() {
        let h = Harness::registered();
        let usage = r#"format the command like "!newcmd !<command name> <output text>""#;
        for text in ["!newcmd", "!newcmd foo bar", "!newcmd !foo"] {
            let actions = h.say_as("fibu", "fibu", Capabilities::BROADCASTER, text).await;
            assert_eq!(replies(&actions), vec![usage], "input: {text}");
        }
        assert!(h.config("fibu").await.custom_commands.is_empty());
    }

    // =========================================================================
    // Tempus commands
    // =========================================================================

    #[tokio::test]
    async fn test_rank_replies() {
        let h = Harness::registered();
        assert_eq!(
            replies(&h.say("fibu", "!rank").await),
            vec!["(Overall) fibu is ranked 315/75729 with 27493 points"]
        );
        assert_eq!(
            replies(&h.say("fibu", "!srank").await),
            vec!["(Soldier) fibu is ranked 186/56963 with 26458 points"]
        );
        assert_eq!(
            replies(&h.say("fibu", "!drank").await),
            vec!["(Demoman) fibu is ranked 1262/39099 with 1035.5 points"]
        );
    }

    #[tokio::test]
    async fn test_rank_gateway_failure_degrades() {
        let h = Harness::registered();
        *h.ranking.down.lock() = true;
        let before = h.config("fibu").await;

        let actions = h.say("fibu", "!rank").await;

        assert_eq!(
            replies(&actions),
            vec!["Tempus is unavailable right now, try again later"]
        );
        assert_eq!(h.config("fibu").await, before);
    }

    #[tokio::test]
    async fn test_missing_identifiers() {
        let h = Harness::new([ChannelConfig::new("fibu".into())]);
        assert_eq!(
            replies(&h.say("fibu", "!rank").await),
            vec!["fibu has no Tempus ID configured"]
        );
        assert_eq!(
            replies(&h.say("fibu", "!map").await),
            vec!["fibu has no Steam ID configured"]
        );
    }

    #[tokio::test]
    async fn test_map_commands_need_active_server() {
        let h = Harness::registered();
        for text in ["!map", "!m", "!swr", "!dwr", "!stime", "!dtime"] {
            assert_eq!(
                replies(&h.say("fibu", text).await),
                vec!["fibu isn't in any Tempus server"],
                "input: {text}"
            );
        }
    }

    #[tokio::test]
    async fn test_map_and_world_records() {
        let h = Harness::registered();
        h.ranking.host(STEAM, "jump_it_final");
        *h.ranking.overview.lock() = Some(MapOverview {
            name: "jump_it_final".into(),
            soldier_tier: 6,
            demoman_tier: 4,
            soldier_runs: vec![RunRecord {
                rank: 1,
                player_name: "Boshy".into(),
                steam_id: None,
                duration: 235.04,
            }],
            demoman_runs: Vec::new(),
        });

        assert_eq!(
            replies(&h.say("fibu", "!m").await),
            vec!["jump_it_final | Solly T6 | Demo T4"]
        );
        assert_eq!(
            replies(&h.say("fibu", "!swr").await),
            vec!["(Solly WR) jump_it_final :: 03:55.04 :: Boshy"]
        );
        assert_eq!(
            replies(&h.say("fibu", "!dwr").await),
            vec!["(Demo WR) jump_it_final :: no runs yet"]
        );
    }

    #[tokio::test]
    async fn test_personal_time() {
        let h = Harness::registered();
        h.ranking.host(STEAM, "jump_finite_v2");
        h.ranking.board.lock().soldier = vec![
            RunRecord {
                rank: 1,
                player_name: "someone".into(),
                steam_id: Some("STEAM_0:0:1".into()),
                duration: 200.0,
            },
            RunRecord {
                rank: 10,
                player_name: "fibu".into(),
                steam_id: Some(STEAM.into()),
                duration: 251.6,
            },
        ];

        assert_eq!(
            replies(&h.say("fibu", "!stime").await),
            vec!["(Solly) fibu is ranked 10 on jump_finite_v2 with time: 04:11.60"]
        );
        assert_eq!(
            replies(&h.say("fibu", "!dtime").await),
            vec!["No run found within top 50"]
        );
    }

    #[tokio::test]
    async fn test_active_server_is_resolved_by_default_scan() {
        let ranking = FakeRanking::default();
        ranking.host("STEAM_0:0:5", "jump_a");
        ranking.host(STEAM, "jump_b");
        let found = ranking.active_server_for_player(STEAM).await.unwrap();
        assert_eq!(
            found,
            ActiveServer {
                server_name: "jump.tf".into(),
                map: "jump_b".into()
            }
        );
    }

    // =========================================================================
    // Custom commands, spam filter, gating
    // =========================================================================

    #[tokio::test]
    async fn test_spam_filter_single_moderation_reply() {
        let mut config = ChannelConfig::new("fibu".into());
        config.spam_filter = vec!["cheap".into(), "viewers".into()];
        let h = Harness::new([config]);

        let actions = h.say("fibu", "buy cheap viewers now").await;

        assert_eq!(
            actions,
            vec![
                Action::Timeout {
                    user: "viewer".into(),
                    seconds: 30,
                    reason: "banned phrase".into(),
                },
                Action::say("viewer, you've been timed out for 30 seconds, stop saying bad words"),
            ]
        );
    }

    #[tokio::test]
    async fn test_spam_filter_exempts_privileged() {
        let mut config = ChannelConfig::new("fibu".into());
        config.spam_filter = vec!["cheap".into()];
        let h = Harness::new([config]);
        let actions = h.say_as("fibu", "mod", Capabilities::MODERATOR, "cheap").await;
        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn test_tempus_only_gate() {
        let mut config = ChannelConfig::new("fibu".into()).with_ids(STEAM, "4821");
        config.tempus_only = true;
        config.custom_commands.insert("!discord".into(), "discord.gg/x".into());
        config.spam_filter = vec!["cheap".into()];
        let h = Harness::new([config]);

        assert!(h.say("fibu", "!uptime").await.is_empty());
        assert!(h.say("fibu", "!discord").await.is_empty());
        assert_eq!(h.say("fibu", "!ping").await, vec![Action::say("Pong!")]);
        assert_eq!(h.say("fibu", "!rank").await.len(), 1);
        assert_eq!(h.say("fibu", "cheap").await.len(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_is_unavailable_reply() {
        let gateway = Gateway::new(
            Arc::new(FakePlatform::default()),
            Arc::new(FakeRanking::default()),
        );
        let dispatcher = Dispatcher::new(Arc::new(BrokenStore), gateway, "fibubot");

        let actions = dispatcher
            .dispatch(&IncomingMessage::new("fibu", "viewer", "!rank"))
            .await;
        assert_eq!(
            replies(&actions),
            vec!["storage is unavailable right now, try again later"]
        );

        let ping = dispatcher
            .dispatch(&IncomingMessage::new("fibu", "viewer", "!ping"))
            .await;
        assert_eq!(ping, vec![Action::say("Pong!")]);
    }

    #[tokio::test]
    async fn test_plain_chat_produces_nothing() {
        let h = Harness::registered();
        assert!(h.say("fibu", "hello chat").await.is_empty());
        assert!(h.say("fibu", "!unknown").await.is_empty());
    }
}
