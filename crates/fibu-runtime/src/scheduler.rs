//! Timed message scheduler.
//!
//! [`Scheduler::arm`] starts one recurring task per armable entry of a
//! channel's `timed_messages` and returns the [`SchedulerHandle`] owning them.
//! The first firing happens one full interval after arming. Dropping or
//! disarming the handle stops every task of that set.

use std::fmt;

use fibu_core::{BoxedTransport, ChannelConfig, ChannelId, TimedMessage};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Arms timed messages against a chat transport.
#[derive(Clone)]
pub struct Scheduler {
    transport: BoxedTransport,
}

impl Scheduler {
    pub fn new(transport: BoxedTransport) -> Self {
        Self { transport }
    }

    /// Arms every entry of `config` whose interval meets the minimum.
    ///
    /// The timers also stop when `parent` is cancelled.
    pub fn arm(&self, config: &ChannelConfig, parent: &CancellationToken) -> SchedulerHandle {
        let token = parent.child_token();
        let tasks: Vec<_> = config
            .armable_timers()
            .map(|timed| self.spawn_timer(config.channel.clone(), timed.clone(), token.clone()))
            .collect();

        debug!(
            channel = %config.channel,
            armed = tasks.len(),
            skipped = config.timed_messages.len() - tasks.len(),
            "Armed timed messages"
        );

        SchedulerHandle {
            channel: config.channel.clone(),
            token,
            tasks,
        }
    }

    fn spawn_timer(
        &self,
        channel: ChannelId,
        timed: TimedMessage,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        let transport = self.transport.clone();
        let period = timed.interval();
        // Measured from arming, not from the task's first poll.
        let first = Instant::now() + period;
        tokio::spawn(async move {
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = transport.send(&channel, &timed.text).await {
                            warn!(channel = %channel, error = %e, "Failed to deliver timed message");
                        }
                    }
                }
            }
        })
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler").finish_non_exhaustive()
    }
}

/// The timers armed for one live session of a channel.
pub struct SchedulerHandle {
    channel: ChannelId,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Number of armed timers.
    pub fn armed(&self) -> usize {
        self.tasks.len()
    }

    /// Stops every timer in the set.
    pub fn disarm(self) {
        debug!(channel = %self.channel, armed = self.tasks.len(), "Disarmed timed messages");
        drop(self);
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.token.cancel();
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("channel", &self.channel)
            .field("armed", &self.tasks.len())
            .finish()
    }
}
