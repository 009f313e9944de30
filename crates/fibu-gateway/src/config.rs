//! Client configuration sections.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tempus ranking API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TempusConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for TempusConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tempus2.xyz/api/v0".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl TempusConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Chat platform (Helix) API settings.
///
/// The access token is used as-is; refreshing it is up to whoever deploys
/// the bot.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelixConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Application client id.
    pub client_id: String,
    /// OAuth bearer token of the bot account.
    pub access_token: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for HelixConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitch.tv/helix".to_string(),
            client_id: String::new(),
            access_token: String::new(),
            timeout_ms: 10_000,
        }
    }
}

impl HelixConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl std::fmt::Debug for HelixConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelixConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("access_token", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}
