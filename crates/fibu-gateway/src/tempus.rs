//! Tempus ranking API client.

use std::collections::HashMap;

use async_trait::async_trait;
use fibu_core::{
    GameInfo, GatewayError, GatewayResult, MapLeaderboard, MapOverview, RankClass, RankInfo,
    RankingService, RunRecord, ServerStatus, ServerUser,
};
use serde::Deserialize;

use crate::config::TempusConfig;
use crate::http::{build_client, endpoint, get_json};

const SERVICE: &str = "Tempus";

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Deserialize)]
struct RankResponse {
    rank_info: RankEntry,
    #[serde(default)]
    class_rank_info: HashMap<String, RankEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct RankEntry {
    rank: u64,
    total_ranked: u64,
    points: f64,
}

#[derive(Debug, Deserialize)]
struct ServerEntry {
    server_info: ServerInfo,
    #[serde(default)]
    game_info: Option<WireGameInfo>,
}

#[derive(Debug, Deserialize)]
struct ServerInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGameInfo {
    current_map: String,
    player_count: u32,
    #[serde(default)]
    users: Vec<WireUser>,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    #[serde(default)]
    steamid: Option<String>,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct OverviewResponse {
    #[serde(default)]
    map_info: Option<MapInfo>,
    tier_info: TierInfo,
    #[serde(default)]
    soldier_runs: Vec<OverviewRun>,
    #[serde(default)]
    demoman_runs: Vec<OverviewRun>,
}

#[derive(Debug, Deserialize)]
struct MapInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TierInfo {
    soldier: u8,
    demoman: u8,
}

#[derive(Debug, Deserialize)]
struct OverviewRun {
    duration: f64,
    name: String,
    #[serde(default)]
    steamid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    results: RecordResults,
}

#[derive(Debug, Default, Deserialize)]
struct RecordResults {
    #[serde(default)]
    soldier: Vec<RecordEntry>,
    #[serde(default)]
    demoman: Vec<RecordEntry>,
}

#[derive(Debug, Deserialize)]
struct RecordEntry {
    duration: f64,
    rank: u32,
    player_info: PlayerInfo,
}

#[derive(Debug, Deserialize)]
struct PlayerInfo {
    #[serde(default)]
    steamid: Option<String>,
    name: String,
}

// =============================================================================
// Conversions
// =============================================================================

impl RankResponse {
    fn into_rank(mut self, tempus_id: &str, class: RankClass) -> GatewayResult<RankInfo> {
        let entry = match class.class() {
            None => self.rank_info,
            Some(class) => self
                .class_rank_info
                .remove(&class.tempus_id().to_string())
                .ok_or_else(|| GatewayError::not_found(format!("{class} rank of {tempus_id}")))?,
        };
        Ok(RankInfo {
            rank: entry.rank,
            total_ranked: entry.total_ranked,
            points: entry.points,
        })
    }
}

impl From<ServerEntry> for ServerStatus {
    fn from(entry: ServerEntry) -> Self {
        Self {
            name: entry.server_info.name,
            game_info: entry.game_info.map(|game| GameInfo {
                current_map: game.current_map,
                player_count: game.player_count,
                users: game
                    .users
                    .into_iter()
                    .map(|u| ServerUser {
                        name: u.name,
                        steam_id: u.steamid,
                    })
                    .collect(),
            }),
        }
    }
}

fn overview_runs(runs: Vec<OverviewRun>) -> Vec<RunRecord> {
    runs.into_iter()
        .zip(1..)
        .map(|(run, rank)| RunRecord {
            rank,
            player_name: run.name,
            steam_id: run.steamid,
            duration: run.duration,
        })
        .collect()
}

impl OverviewResponse {
    fn into_overview(self, requested: &str) -> MapOverview {
        MapOverview {
            name: self
                .map_info
                .map(|info| info.name)
                .unwrap_or_else(|| requested.to_string()),
            soldier_tier: self.tier_info.soldier,
            demoman_tier: self.tier_info.demoman,
            soldier_runs: overview_runs(self.soldier_runs),
            demoman_runs: overview_runs(self.demoman_runs),
        }
    }
}

impl From<RecordEntry> for RunRecord {
    fn from(entry: RecordEntry) -> Self {
        Self {
            rank: entry.rank,
            player_name: entry.player_info.name,
            steam_id: entry.player_info.steamid,
            duration: entry.duration,
        }
    }
}

impl From<RecordsResponse> for MapLeaderboard {
    fn from(resp: RecordsResponse) -> Self {
        Self {
            soldier: resp.results.soldier.into_iter().map(Into::into).collect(),
            demoman: resp.results.demoman.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// [`RankingService`] over the Tempus REST API.
#[derive(Debug, Clone)]
pub struct TempusClient {
    http: reqwest::Client,
    base_url: String,
}

impl TempusClient {
    /// Creates a client from its configuration section.
    pub fn new(config: &TempusConfig) -> GatewayResult<Self> {
        Ok(Self {
            http: build_client(SERVICE, config.timeout())?,
            base_url: config.base_url.clone(),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str, what: &str) -> GatewayResult<T> {
        let url = endpoint(SERVICE, &self.base_url, path, &[])?;
        get_json(SERVICE, what, self.http.get(url)).await
    }
}

#[async_trait]
impl RankingService for TempusClient {
    async fn player_rank(&self, tempus_id: &str, class: RankClass) -> GatewayResult<RankInfo> {
        let resp: RankResponse = self
            .get(
                &format!("players/id/{tempus_id}/rank"),
                &format!("player {tempus_id}"),
            )
            .await?;
        resp.into_rank(tempus_id, class)
    }

    async fn server_status(&self) -> GatewayResult<Vec<ServerStatus>> {
        let servers: Vec<ServerEntry> = self.get("servers/statusList", "server list").await?;
        Ok(servers.into_iter().map(Into::into).collect())
    }

    async fn map_overview(&self, map: &str) -> GatewayResult<MapOverview> {
        let resp: OverviewResponse = self
            .get(&format!("maps/name/{map}/fullOverview"), &format!("map {map}"))
            .await?;
        Ok(resp.into_overview(map))
    }

    async fn map_leaderboard(&self, map: &str) -> GatewayResult<MapLeaderboard> {
        let resp: RecordsResponse = self
            .get(
                &format!("maps/name/{map}/zones/typeindex/map/1/records/list"),
                &format!("records on {map}"),
            )
            .await?;
        Ok(resp.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibu_core::PlayerClass;
    use serde_json::json;

    #[test]
    fn test_rank_decoding_picks_class_table() {
        let body = json!({
            "rank_info": {"rank": 315, "total_ranked": 75729, "points": 27493.0},
            "class_rank_info": {
                "3": {"rank": 186, "total_ranked": 56963, "points": 26458.0},
                "4": {"rank": 1262, "total_ranked": 39099, "points": 1035.0}
            }
        });
        let resp: RankResponse = serde_json::from_value(body.clone()).unwrap();
        let soldier = resp.into_rank("4821", RankClass::Soldier).unwrap();
        assert_eq!(soldier.rank, 186);

        let resp: RankResponse = serde_json::from_value(body).unwrap();
        let overall = resp.into_rank("4821", RankClass::Overall).unwrap();
        assert_eq!(overall.total_ranked, 75729);
    }

    #[test]
    fn test_missing_class_table_is_not_found() {
        let resp: RankResponse = serde_json::from_value(json!({
            "rank_info": {"rank": 1, "total_ranked": 2, "points": 3.0}
        }))
        .unwrap();
        let err = resp.into_rank("1", RankClass::Demoman).unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[test]
    fn test_server_list_tolerates_offline_servers() {
        let servers: Vec<ServerEntry> = serde_json::from_value(json!([
            {"server_info": {"name": "jump.tf (Chicago)"}, "game_info": null},
            {
                "server_info": {"name": "jump.tf (Frankfurt)"},
                "game_info": {
                    "currentMap": "jump_vulc_a2",
                    "playerCount": 1,
                    "users": [{"steamid": "STEAM_0:1:1", "name": "fibu"}]
                }
            }
        ]))
        .unwrap();
        let servers: Vec<ServerStatus> = servers.into_iter().map(Into::into).collect();
        assert!(servers[0].game_info.is_none());
        let game = servers[1].game_info.as_ref().unwrap();
        assert_eq!(game.current_map, "jump_vulc_a2");
        assert_eq!(game.users[0].steam_id.as_deref(), Some("STEAM_0:1:1"));
    }

    #[test]
    fn test_overview_ranks_runs_in_order() {
        let resp: OverviewResponse = serde_json::from_value(json!({
            "map_info": {"name": "jump_it_final"},
            "tier_info": {"soldier": 6, "demoman": 4},
            "soldier_runs": [
                {"duration": 235.04, "name": "Boshy", "steamid": "STEAM_0:0:1"},
                {"duration": 240.0, "name": "Torii", "steamid": "STEAM_0:0:2"}
            ],
            "demoman_runs": []
        }))
        .unwrap();
        let overview = resp.into_overview("jump_it_final");
        assert_eq!(overview.tier(PlayerClass::Soldier), 6);
        assert_eq!(overview.soldier_runs[1].rank, 2);
        assert!(overview.world_record(PlayerClass::Demoman).is_none());
    }

    #[test]
    fn test_records_decoding() {
        let resp: RecordsResponse = serde_json::from_value(json!({
            "results": {
                "soldier": [{
                    "duration": 251.6,
                    "rank": 10,
                    "player_info": {"steamid": "STEAM_0:1:1", "name": "fibu"}
                }],
                "demoman": []
            }
        }))
        .unwrap();
        let board = MapLeaderboard::from(resp);
        let run = board.run_for("STEAM_0:1:1", PlayerClass::Soldier).unwrap();
        assert_eq!(run.rank, 10);
        assert!(board.run_for("STEAM_0:1:1", PlayerClass::Demoman).is_none());
    }
}
