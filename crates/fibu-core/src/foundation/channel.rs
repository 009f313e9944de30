//! Per-channel configuration records.
//!
//! [`ChannelConfig`] is the durable record kept by the channel store. The
//! operator-editable subset is [`ChannelSettings`], which the configuration
//! API replaces as one unit; partial updates go through [`ChannelPatch`].

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{BotError, BotResult};

/// Character every custom command trigger must start with.
pub const TRIGGER_SENTINEL: char = '!';

/// Prefix every Steam ID must carry.
pub const STEAM_ID_PREFIX: &str = "STEAM_";

/// Timed messages with a shorter interval are stored but never armed.
pub const MIN_TIMED_INTERVAL_MS: u64 = 5 * MS_PER_MINUTE;

/// Milliseconds in one operator-facing minute.
pub const MS_PER_MINUTE: u64 = 60_000;

// =============================================================================
// ChannelId
// =============================================================================

/// Normalised channel identity: no leading `#`, ASCII lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a channel id, normalising `#Name` and `name` to the same key.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        let name = name.strip_prefix('#').unwrap_or(name);
        Self(name.to_ascii_lowercase())
    }

    /// Returns the bare channel name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ChannelId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<ChannelId> for String {
    fn from(id: ChannelId) -> Self {
        id.0
    }
}

// =============================================================================
// Identifier validation
// =============================================================================

/// Returns `true` if `steam_id` has the `STEAM_` prefix.
pub fn is_valid_steam_id(steam_id: &str) -> bool {
    steam_id.starts_with(STEAM_ID_PREFIX)
}

/// Returns `true` if `tempus_id` is a non-empty run of ASCII digits.
pub fn is_valid_tempus_id(tempus_id: &str) -> bool {
    !tempus_id.is_empty() && tempus_id.bytes().all(|b| b.is_ascii_digit())
}

// =============================================================================
// TimedMessage
// =============================================================================

/// A recurring announcement: `text` is sent every `interval_ms` while live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedMessage {
    /// Interval between announcements, in milliseconds.
    pub interval_ms: u64,
    /// Literal text to send.
    pub text: String,
}

impl TimedMessage {
    /// Creates a timed message.
    pub fn new(interval_ms: u64, text: impl Into<String>) -> Self {
        Self {
            interval_ms,
            text: text.into(),
        }
    }

    /// Creates a timed message from an operator-facing minute count.
    pub fn every_minutes(minutes: u64, text: impl Into<String>) -> Self {
        Self::new(minutes * MS_PER_MINUTE, text)
    }

    /// Whether the scheduler arms this entry.
    pub fn is_armable(&self) -> bool {
        self.interval_ms >= MIN_TIMED_INTERVAL_MS
    }

    /// The firing period.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// The interval as shown to operators, if it is a whole number of minutes.
    pub fn minutes(&self) -> Option<u64> {
        (self.interval_ms % MS_PER_MINUTE == 0).then_some(self.interval_ms / MS_PER_MINUTE)
    }
}

// =============================================================================
// ChannelConfig
// =============================================================================

/// Durable per-channel record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Identity; never changes after creation.
    pub channel: ChannelId,
    /// Steam ID of the broadcaster's game account.
    #[serde(default)]
    pub steam_id: Option<String>,
    /// Tempus player id of the broadcaster.
    #[serde(default)]
    pub tempus_id: Option<String>,
    /// Restricts the bot to ranking commands.
    #[serde(default)]
    pub tempus_only: bool,
    /// Banned substrings, scanned in order.
    #[serde(default)]
    pub spam_filter: Vec<String>,
    /// Trigger → literal reply.
    #[serde(default)]
    pub custom_commands: BTreeMap<String, String>,
    /// Recurring announcements.
    #[serde(default)]
    pub timed_messages: Vec<TimedMessage>,
}

impl ChannelConfig {
    /// Creates an empty record for `channel`.
    pub fn new(channel: ChannelId) -> Self {
        Self {
            channel,
            steam_id: None,
            tempus_id: None,
            tempus_only: false,
            spam_filter: Vec::new(),
            custom_commands: BTreeMap::new(),
            timed_messages: Vec::new(),
        }
    }

    /// Builder-style setter for both player identifiers.
    pub fn with_ids(mut self, steam_id: impl Into<String>, tempus_id: impl Into<String>) -> Self {
        self.steam_id = Some(steam_id.into());
        self.tempus_id = Some(tempus_id.into());
        self
    }

    /// Applies every field present in `patch`.
    pub fn apply(&mut self, patch: ChannelPatch) {
        if let Some(steam_id) = patch.steam_id {
            self.steam_id = steam_id;
        }
        if let Some(tempus_id) = patch.tempus_id {
            self.tempus_id = tempus_id;
        }
        if let Some(tempus_only) = patch.tempus_only {
            self.tempus_only = tempus_only;
        }
        if let Some(spam_filter) = patch.spam_filter {
            self.spam_filter = spam_filter;
        }
        if let Some(custom_commands) = patch.custom_commands {
            self.custom_commands = custom_commands;
        }
        if let Some(timed_messages) = patch.timed_messages {
            self.timed_messages = timed_messages;
        }
    }

    /// Returns the operator-editable subset of this record.
    pub fn settings(&self) -> ChannelSettings {
        ChannelSettings {
            steam_id: self.steam_id.clone(),
            tempus_id: self.tempus_id.clone(),
            tempus_only: self.tempus_only,
            spam_filter: self.spam_filter.clone(),
            custom_commands: self.custom_commands.clone(),
            timed_messages: self.timed_messages.clone(),
        }
    }

    /// Timed messages the scheduler will arm.
    pub fn armable_timers(&self) -> impl Iterator<Item = &TimedMessage> {
        self.timed_messages.iter().filter(|m| m.is_armable())
    }

    /// First configured banned substring contained in `text`.
    pub fn banned_word_in(&self, text: &str) -> Option<&str> {
        self.spam_filter
            .iter()
            .map(String::as_str)
            .filter(|word| !word.is_empty())
            .find(|word| text.contains(word))
    }
}

// =============================================================================
// ChannelPatch
// =============================================================================

/// A partial update; absent fields are left untouched.
///
/// The identifier fields are doubly optional so that a patch can clear them
/// (`Some(None)`) as well as leave them alone (`None`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelPatch {
    pub steam_id: Option<Option<String>>,
    pub tempus_id: Option<Option<String>>,
    pub tempus_only: Option<bool>,
    pub spam_filter: Option<Vec<String>>,
    pub custom_commands: Option<BTreeMap<String, String>>,
    pub timed_messages: Option<Vec<TimedMessage>>,
}

impl ChannelPatch {
    /// A patch that sets only the two player identifiers.
    pub fn ids(steam_id: impl Into<String>, tempus_id: impl Into<String>) -> Self {
        Self {
            steam_id: Some(Some(steam_id.into())),
            tempus_id: Some(Some(tempus_id.into())),
            ..Default::default()
        }
    }
}

// =============================================================================
// ChannelSettings
// =============================================================================

/// The operator-editable fields, replaced atomically by the configuration API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    pub steam_id: Option<String>,
    pub tempus_id: Option<String>,
    pub tempus_only: bool,
    pub spam_filter: Vec<String>,
    pub custom_commands: BTreeMap<String, String>,
    pub timed_messages: Vec<TimedMessage>,
}

impl ChannelSettings {
    /// Checks the settings at the configuration boundary.
    ///
    /// Intervals under the five minute floor are accepted; the scheduler
    /// simply never arms them.
    pub fn validate(&self) -> BotResult<()> {
        if let Some(steam_id) = &self.steam_id
            && !is_valid_steam_id(steam_id)
        {
            return Err(BotError::Validation(format!(
                "steam id '{steam_id}' must start with {STEAM_ID_PREFIX}"
            )));
        }

        if let Some(tempus_id) = &self.tempus_id
            && !is_valid_tempus_id(tempus_id)
        {
            return Err(BotError::Validation(format!(
                "tempus id '{tempus_id}' must be numeric"
            )));
        }

        for trigger in self.custom_commands.keys() {
            if !trigger.starts_with(TRIGGER_SENTINEL) || trigger.len() == 1 {
                return Err(BotError::Validation(format!(
                    "command '{trigger}' must start with {TRIGGER_SENTINEL}"
                )));
            }
        }

        for timed in &self.timed_messages {
            if timed.text.trim().is_empty() {
                return Err(BotError::Validation(
                    "timed message text cannot be empty".to_string(),
                ));
            }
            if timed.minutes().is_none() {
                return Err(BotError::Validation(format!(
                    "timed message interval {}ms is not a whole number of minutes",
                    timed.interval_ms
                )));
            }
        }

        Ok(())
    }
}

impl From<ChannelSettings> for ChannelPatch {
    fn from(settings: ChannelSettings) -> Self {
        Self {
            steam_id: Some(settings.steam_id),
            tempus_id: Some(settings.tempus_id),
            tempus_only: Some(settings.tempus_only),
            spam_filter: Some(settings.spam_filter),
            custom_commands: Some(settings.custom_commands),
            timed_messages: Some(settings.timed_messages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_id_normalises() {
        assert_eq!(ChannelId::new("#Fibu"), ChannelId::new("fibu"));
        assert_eq!(ChannelId::new("  #fibu ").as_str(), "fibu");
    }

    #[test]
    fn test_identifier_validation() {
        assert!(is_valid_steam_id("STEAM_0:1:12345"));
        assert!(!is_valid_steam_id("steam_0:1:12345"));
        assert!(is_valid_tempus_id("4821"));
        assert!(!is_valid_tempus_id("48a1"));
        assert!(!is_valid_tempus_id(""));
    }

    #[test]
    fn test_timed_message_floor() {
        assert!(TimedMessage::every_minutes(5, "hi").is_armable());
        assert!(!TimedMessage::new(299_999, "hi").is_armable());
        assert_eq!(TimedMessage::new(300_000, "hi").minutes(), Some(5));
        assert_eq!(TimedMessage::new(90_000, "hi").minutes(), None);
    }

    #[test]
    fn test_patch_touches_only_present_fields() {
        let mut config = ChannelConfig::new("fibu".into());
        config.spam_filter.push("badword".into());
        config
            .custom_commands
            .insert("!discord".into(), "discord.gg/x".into());

        config.apply(ChannelPatch::ids("STEAM_0:1:1", "42"));

        assert_eq!(config.steam_id.as_deref(), Some("STEAM_0:1:1"));
        assert_eq!(config.tempus_id.as_deref(), Some("42"));
        assert_eq!(config.spam_filter, vec!["badword".to_string()]);
        assert_eq!(config.custom_commands.len(), 1);
    }

    #[test]
    fn test_banned_word_first_match_wins() {
        let mut config = ChannelConfig::new("fibu".into());
        config.spam_filter = vec!["".into(), "spam".into(), "buy".into()];
        assert_eq!(config.banned_word_in("buy cheap spam"), Some("spam"));
        assert_eq!(config.banned_word_in("hello"), None);
    }

    #[test]
    fn test_settings_reject_fractional_minutes() {
        let settings = ChannelSettings {
            timed_messages: vec![TimedMessage::new(330_500, "hi")],
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(BotError::Validation(_))));
    }

    #[test]
    fn test_settings_accept_inert_short_interval() {
        let settings = ChannelSettings {
            steam_id: Some("STEAM_0:0:7".into()),
            tempus_id: Some("7".into()),
            timed_messages: vec![TimedMessage::every_minutes(1, "too often")],
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_reject_bad_trigger() {
        let mut settings = ChannelSettings::default();
        settings.custom_commands.insert("discord".into(), "x".into());
        assert!(settings.validate().is_err());
    }
}
