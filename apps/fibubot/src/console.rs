//! Stdin/stdout stand-ins for the chat transport and liveness feed.
//!
//! Input lines:
//!
//! ```text
//! <channel> <user>[@mod|@broadcaster] <text>   chat message
//! :live <channel>                              channel went live
//! :offline <channel>                           channel went offline
//! :stats                                       print runtime stats
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use fibu::prelude::*;
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Prints outgoing chat to stdout.
#[derive(Debug, Default)]
pub struct ConsoleTransport;

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn join(&self, channel: &ChannelId) -> TransportResult<()> {
        println!("* joined #{channel}");
        Ok(())
    }

    async fn part(&self, channel: &ChannelId) -> TransportResult<()> {
        println!("* parted #{channel}");
        Ok(())
    }

    async fn send(&self, channel: &ChannelId, text: &str) -> TransportResult<()> {
        println!("[#{channel}] {text}");
        Ok(())
    }
}

/// Liveness feed driven by `:live` / `:offline` lines.
#[derive(Default)]
pub struct ConsoleFeed {
    next_id: AtomicU64,
    sinks: Mutex<HashMap<ChannelId, (u64, LivenessSink)>>,
}

impl ConsoleFeed {
    /// Delivers a state change to the channel's subscriber, if any.
    pub fn emit(&self, channel: &ChannelId, is_live: bool) {
        let sink = self.sinks.lock().get(channel).map(|(_, sink)| sink.clone());
        match sink {
            Some(sink) => sink(channel.clone(), is_live),
            None => warn!(channel = %channel, "No subscription for channel"),
        }
    }
}

#[async_trait]
impl LivenessFeed for ConsoleFeed {
    async fn subscribe(
        &self,
        channel: &ChannelId,
        sink: LivenessSink,
    ) -> TransportResult<SubscriptionHandle> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sinks.lock().insert(channel.clone(), (id, sink));
        debug!(channel = %channel, id, "Console subscription added");
        Ok(SubscriptionHandle::new(id, channel.clone()))
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut sinks = self.sinks.lock();
        if sinks
            .get(handle.channel())
            .is_some_and(|(id, _)| *id == handle.id())
        {
            sinks.remove(handle.channel());
        }
    }
}

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleLine {
    Chat(IncomingMessage),
    Liveness { channel: ChannelId, is_live: bool },
    Stats,
    Blank,
}

impl ConsoleLine {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Blank);
        }

        if let Some(directive) = line.strip_prefix(':') {
            let mut words = directive.split_whitespace();
            return match (words.next(), words.next()) {
                (Some("live"), Some(channel)) => Ok(Self::Liveness {
                    channel: ChannelId::new(channel),
                    is_live: true,
                }),
                (Some("offline"), Some(channel)) => Ok(Self::Liveness {
                    channel: ChannelId::new(channel),
                    is_live: false,
                }),
                (Some("stats"), None) => Ok(Self::Stats),
                _ => Err(format!("unknown directive: {line}")),
            };
        }

        let mut parts = line.splitn(3, char::is_whitespace);
        let (Some(channel), Some(sender), Some(text)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err("expected: <channel> <user>[@mod|@broadcaster] <text>".to_string());
        };

        let (sender, capabilities) = match sender.split_once('@') {
            None => (sender, Capabilities::default()),
            Some((name, "mod")) => (name, Capabilities::MODERATOR),
            Some((name, "broadcaster")) => (name, Capabilities::BROADCASTER),
            Some((_, role)) => return Err(format!("unknown role: {role}")),
        };

        Ok(Self::Chat(
            IncomingMessage::new(channel, sender, text.trim_start()).with_capabilities(capabilities),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_line() {
        let line = ConsoleLine::parse("#Jumper modguy@mod !newcmd !foo bar baz").unwrap();
        assert_eq!(
            line,
            ConsoleLine::Chat(
                IncomingMessage::new("jumper", "modguy", "!newcmd !foo bar baz")
                    .with_capabilities(Capabilities::MODERATOR)
            )
        );
    }

    #[test]
    fn test_parse_directives() {
        assert_eq!(
            ConsoleLine::parse(":live jumper").unwrap(),
            ConsoleLine::Liveness {
                channel: ChannelId::new("jumper"),
                is_live: true
            }
        );
        assert_eq!(ConsoleLine::parse(":stats").unwrap(), ConsoleLine::Stats);
        assert_eq!(ConsoleLine::parse("   ").unwrap(), ConsoleLine::Blank);
        assert!(ConsoleLine::parse(":dance").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert!(ConsoleLine::parse("jumper viewer").is_err());
        assert!(ConsoleLine::parse("jumper viewer@vip hello").is_err());
    }

    #[tokio::test]
    async fn test_feed_routes_to_latest_subscription() {
        let feed = ConsoleFeed::default();
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let channel = ChannelId::new("jumper");

        let recorder = seen.clone();
        let handle = feed
            .subscribe(
                &channel,
                std::sync::Arc::new(move |ch: ChannelId, live: bool| recorder.lock().push((ch, live))),
            )
            .await
            .unwrap();

        feed.emit(&channel, true);
        feed.unsubscribe(handle).await;
        feed.emit(&channel, false);

        assert_eq!(*seen.lock(), vec![(channel, true)]);
    }
}
