//! Chat command tokenizing and the built-in command table.

use fibu_core::{PlayerClass, RankClass, TRIGGER_SENTINEL};

/// A chat message split into its command token and the remainder.
///
/// ```rust,ignore
/// let line = CommandLine::parse("!title  speedrunning jump_it ").unwrap();
/// assert_eq!(line.head(), "!title");
/// assert_eq!(line.rest(), "speedrunning jump_it");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandLine<'a> {
    head: &'a str,
    rest: &'a str,
}

impl<'a> CommandLine<'a> {
    /// Parses `text`; returns `None` unless it starts with the trigger sentinel.
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with(TRIGGER_SENTINEL) {
            return None;
        }
        let (head, rest) = match text.find(char::is_whitespace) {
            Some(idx) => (&text[..idx], text[idx..].trim_start()),
            None => (text, ""),
        };
        Some(Self { head, rest })
    }

    /// The command token, including the sentinel.
    pub fn head(&self) -> &'a str {
        self.head
    }

    /// Everything after the command token, leading whitespace removed.
    pub fn rest(&self) -> &'a str {
        self.rest
    }

    /// Whitespace-separated arguments after the command token.
    pub fn args(&self) -> Vec<&'a str> {
        self.rest.split_whitespace().collect()
    }

    /// Whether the message is the bare command token.
    pub fn is_bare(&self) -> bool {
        self.rest.is_empty()
    }

    /// Splits the remainder into its first word and the text after it.
    pub fn split_first_arg(&self) -> Option<(&'a str, &'a str)> {
        if self.rest.is_empty() {
            return None;
        }
        Some(match self.rest.find(char::is_whitespace) {
            Some(idx) => (&self.rest[..idx], self.rest[idx..].trim_start()),
            None => (self.rest, ""),
        })
    }
}

/// Commands answered in every registered channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Ping,
    Uptime,
    Followage,
    Title,
    NewCommand,
    Rank(RankClass),
    Map,
    WorldRecord(PlayerClass),
    PersonalTime(PlayerClass),
}

impl Builtin {
    /// Looks up the built-in for a parsed line.
    ///
    /// `!title` and `!newcmd` take arguments; every other built-in only
    /// matches the bare token.
    pub fn recognize(line: &CommandLine<'_>) -> Option<Self> {
        let builtin = match line.head() {
            "!title" => return Some(Self::Title),
            "!newcmd" => return Some(Self::NewCommand),
            "!ping" => Self::Ping,
            "!uptime" => Self::Uptime,
            "!followage" => Self::Followage,
            "!rank" => Self::Rank(RankClass::Overall),
            "!srank" => Self::Rank(RankClass::Soldier),
            "!drank" => Self::Rank(RankClass::Demoman),
            "!map" | "!m" => Self::Map,
            "!swr" => Self::WorldRecord(PlayerClass::Soldier),
            "!dwr" => Self::WorldRecord(PlayerClass::Demoman),
            "!stime" => Self::PersonalTime(PlayerClass::Soldier),
            "!dtime" => Self::PersonalTime(PlayerClass::Demoman),
            _ => return None,
        };
        line.is_bare().then_some(builtin)
    }

    /// Whether the built-in stays active in a tempus-only channel.
    pub fn is_tempus(&self) -> bool {
        matches!(
            self,
            Self::Ping
                | Self::Rank(_)
                | Self::Map
                | Self::WorldRecord(_)
                | Self::PersonalTime(_)
        )
    }
}

/// Control-channel administrative commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Join,
    Unregister,
}

impl AdminCommand {
    pub fn recognize(line: &CommandLine<'_>) -> Option<Self> {
        match line.head() {
            "!join" => Some(Self::Join),
            "!unregister" if line.is_bare() => Some(Self::Unregister),
            _ => None,
        }
    }
}
