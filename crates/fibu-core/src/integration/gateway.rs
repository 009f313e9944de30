//! External query gateway contracts.
//!
//! Two services sit behind the gateway: the chat platform's metadata API
//! ([`ChatPlatform`]) and the Tempus ranking service ([`RankingService`]).
//! Every call may fail with [`GatewayError::NotFound`] or
//! [`GatewayError::Unavailable`]; callers degrade, they never abort.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::foundation::{ChannelId, GatewayError, GatewayResult};

// =============================================================================
// Chat platform types
// =============================================================================

/// A chat platform account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerInfo {
    /// Platform user id.
    pub id: String,
    /// Login name.
    pub login: String,
    /// Display name.
    pub display_name: String,
}

/// A live broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStatus {
    /// Current stream title.
    pub title: String,
    /// When the broadcast started.
    pub started_at: OffsetDateTime,
}

/// A viewer's follow relationship with a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowInfo {
    /// When the viewer followed.
    pub followed_at: OffsetDateTime,
}

// =============================================================================
// Ranking types
// =============================================================================

/// Which ranking table a rank lookup reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankClass {
    Overall,
    Soldier,
    Demoman,
}

impl RankClass {
    /// Label used in rank replies.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overall => "Overall",
            Self::Soldier => "Soldier",
            Self::Demoman => "Demoman",
        }
    }

    /// The player class, if this is a per-class table.
    pub fn class(&self) -> Option<PlayerClass> {
        match self {
            Self::Overall => None,
            Self::Soldier => Some(PlayerClass::Soldier),
            Self::Demoman => Some(PlayerClass::Demoman),
        }
    }
}

/// A playable class with its own runs and tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerClass {
    Soldier,
    Demoman,
}

impl PlayerClass {
    /// Numeric class id used by the ranking service.
    pub fn tempus_id(&self) -> u8 {
        match self {
            Self::Soldier => 3,
            Self::Demoman => 4,
        }
    }

    /// Short label used in map and time replies.
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::Soldier => "Solly",
            Self::Demoman => "Demo",
        }
    }
}

impl fmt::Display for PlayerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Soldier => "soldier",
            Self::Demoman => "demoman",
        })
    }
}

/// A player's position in one ranking table.
#[derive(Debug, Clone, PartialEq)]
pub struct RankInfo {
    pub rank: u64,
    pub total_ranked: u64,
    pub points: f64,
}

/// A player connected to a game server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUser {
    pub name: String,
    pub steam_id: Option<String>,
}

/// Live game state of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub current_map: String,
    pub player_count: u32,
    pub users: Vec<ServerUser>,
}

/// One entry of the server status listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatus {
    pub name: String,
    /// Absent when the server is down or not reporting.
    pub game_info: Option<GameInfo>,
}

/// The server a player was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveServer {
    pub server_name: String,
    pub map: String,
}

/// One completed run on a map.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub rank: u32,
    pub player_name: String,
    pub steam_id: Option<String>,
    /// Run time in seconds.
    pub duration: f64,
}

/// Tiers and best runs of a map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOverview {
    pub name: String,
    pub soldier_tier: u8,
    pub demoman_tier: u8,
    pub soldier_runs: Vec<RunRecord>,
    pub demoman_runs: Vec<RunRecord>,
}

impl MapOverview {
    /// The class's tier.
    pub fn tier(&self, class: PlayerClass) -> u8 {
        match class {
            PlayerClass::Soldier => self.soldier_tier,
            PlayerClass::Demoman => self.demoman_tier,
        }
    }

    /// The class's world record, if anyone has finished the map.
    pub fn world_record(&self, class: PlayerClass) -> Option<&RunRecord> {
        match class {
            PlayerClass::Soldier => self.soldier_runs.first(),
            PlayerClass::Demoman => self.demoman_runs.first(),
        }
    }
}

/// The top of a map's leaderboard (the service returns at most 50 per class).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapLeaderboard {
    pub soldier: Vec<RunRecord>,
    pub demoman: Vec<RunRecord>,
}

impl MapLeaderboard {
    /// The class's runs, best first.
    pub fn runs(&self, class: PlayerClass) -> &[RunRecord] {
        match class {
            PlayerClass::Soldier => &self.soldier,
            PlayerClass::Demoman => &self.demoman,
        }
    }

    /// The player's run for `class`, if it made the list.
    pub fn run_for(&self, steam_id: &str, class: PlayerClass) -> Option<&RunRecord> {
        self.runs(class)
            .iter()
            .find(|run| run.steam_id.as_deref() == Some(steam_id))
    }
}

/// Finds the first server hosting `steam_id`.
///
/// Servers are scanned in listing order, skipping any without game info or
/// with no players; within a server, users are scanned in order. The first
/// match ends the scan.
pub fn find_active_server(servers: &[ServerStatus], steam_id: &str) -> Option<ActiveServer> {
    servers.iter().find_map(|server| {
        let game = server.game_info.as_ref().filter(|g| g.player_count > 0)?;
        game.users
            .iter()
            .any(|user| user.steam_id.as_deref() == Some(steam_id))
            .then(|| ActiveServer {
                server_name: server.name.clone(),
                map: game.current_map.clone(),
            })
    })
}

// =============================================================================
// Service traits
// =============================================================================

/// Chat platform metadata API.
#[async_trait]
pub trait ChatPlatform: Send + Sync + 'static {
    /// Looks up an account by login name.
    async fn viewer_info(&self, login: &str) -> GatewayResult<ViewerInfo>;

    /// Returns the live broadcast, or `None` if the channel is offline.
    async fn stream_status(&self, channel: &ChannelId) -> GatewayResult<Option<StreamStatus>>;

    /// Returns when `viewer` followed `channel`; `NotFound` if they don't.
    async fn follow_info(&self, viewer: &str, channel: &ChannelId) -> GatewayResult<FollowInfo>;

    /// Returns the channel's title.
    async fn title(&self, channel: &ChannelId) -> GatewayResult<String>;

    /// Replaces the channel's title.
    async fn set_title(&self, channel: &ChannelId, title: &str) -> GatewayResult<()>;

    /// Makes the bot account follow the channel.
    async fn follow_channel(&self, channel: &ChannelId) -> GatewayResult<()>;
}

/// Tempus ranking service.
#[async_trait]
pub trait RankingService: Send + Sync + 'static {
    /// Returns the player's position in one ranking table.
    async fn player_rank(&self, tempus_id: &str, class: RankClass) -> GatewayResult<RankInfo>;

    /// Returns the status of every game server.
    async fn server_status(&self) -> GatewayResult<Vec<ServerStatus>>;

    /// Returns the first server the player is on.
    async fn active_server_for_player(&self, steam_id: &str) -> GatewayResult<ActiveServer> {
        let servers = self.server_status().await?;
        find_active_server(&servers, steam_id)
            .ok_or_else(|| GatewayError::not_found(format!("active server for {steam_id}")))
    }

    /// Returns tiers and best runs of a map.
    async fn map_overview(&self, map: &str) -> GatewayResult<MapOverview>;

    /// Returns the top of the map's leaderboard.
    async fn map_leaderboard(&self, map: &str) -> GatewayResult<MapLeaderboard>;
}

/// Both gateway services behind one cloneable handle.
#[derive(Clone)]
pub struct Gateway {
    platform: Arc<dyn ChatPlatform>,
    ranking: Arc<dyn RankingService>,
}

impl Gateway {
    /// Creates a gateway from its two services.
    pub fn new(platform: Arc<dyn ChatPlatform>, ranking: Arc<dyn RankingService>) -> Self {
        Self { platform, ranking }
    }

    /// Chat platform metadata API.
    pub fn platform(&self) -> &dyn ChatPlatform {
        self.platform.as_ref()
    }

    /// Tempus ranking service.
    pub fn ranking(&self) -> &dyn RankingService {
        self.ranking.as_ref()
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(name: &str, map: &str, players: &[&str]) -> ServerStatus {
        ServerStatus {
            name: name.to_string(),
            game_info: Some(GameInfo {
                current_map: map.to_string(),
                player_count: players.len() as u32,
                users: players
                    .iter()
                    .map(|id| ServerUser {
                        name: format!("player-{id}"),
                        steam_id: Some(id.to_string()),
                    })
                    .collect(),
            }),
        }
    }

    #[test]
    fn test_first_matching_server_wins() {
        let servers = vec![
            server("empty", "jump_a", &[]),
            server("first", "jump_b", &["STEAM_0:1:2", "STEAM_0:1:1"]),
            server("second", "jump_c", &["STEAM_0:1:1"]),
        ];
        let found = find_active_server(&servers, "STEAM_0:1:1").unwrap();
        assert_eq!(found.server_name, "first");
        assert_eq!(found.map, "jump_b");
    }

    #[test]
    fn test_servers_without_game_info_are_skipped() {
        let servers = vec![
            ServerStatus {
                name: "down".into(),
                game_info: None,
            },
            server("up", "jump_d", &["STEAM_0:0:9"]),
        ];
        assert_eq!(
            find_active_server(&servers, "STEAM_0:0:9").map(|s| s.map),
            Some("jump_d".to_string())
        );
        assert!(find_active_server(&servers, "STEAM_0:0:1").is_none());
    }

    #[test]
    fn test_zero_player_count_is_skipped() {
        let mut stale = server("stale", "jump_e", &["STEAM_0:0:9"]);
        if let Some(game) = stale.game_info.as_mut() {
            game.player_count = 0;
        }
        assert!(find_active_server(&[stale], "STEAM_0:0:9").is_none());
    }
}
