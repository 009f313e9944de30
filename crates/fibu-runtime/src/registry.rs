//! Per-channel runtime state.
//!
//! Every attached channel gets one actor task that owns its liveness state,
//! feed subscription and scheduler handle. The actor is fed through an
//! unbounded queue, so start/stop of one channel's scheduler never
//! interleave, while different channels never wait on each other. The map
//! lock is only held to look up, insert or remove a slot.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use fibu_core::{
    BoxedLivenessFeed, BoxedStore, BoxedTransport, ChannelId, LivenessSink, SubscriptionHandle,
};
use futures::future::join_all;
use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::liveness::{Effect, LivenessEvent, LivenessState, transition};
use crate::scheduler::{Scheduler, SchedulerHandle};

/// State readable without going through the actor.
#[derive(Debug, Default)]
struct SlotStatus {
    state: AtomicU8,
    armed: AtomicUsize,
}

impl SlotStatus {
    fn state(&self) -> LivenessState {
        LivenessState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn armed(&self) -> usize {
        self.armed.load(Ordering::Acquire)
    }
}

enum SlotCommand {
    Subscribe {
        sink: LivenessSink,
        ack: oneshot::Sender<()>,
    },
    Liveness {
        is_live: bool,
        ack: Option<oneshot::Sender<()>>,
    },
    Release {
        ack: oneshot::Sender<()>,
    },
}

struct ChannelSlot {
    queue: mpsc::UnboundedSender<SlotCommand>,
    status: Arc<SlotStatus>,
    /// Cancelled on release; interrupts an in-flight scheduler start.
    token: CancellationToken,
}

/// Collaborators shared by every channel actor.
struct ActorDeps {
    store: BoxedStore,
    transport: BoxedTransport,
    feed: BoxedLivenessFeed,
    scheduler: Scheduler,
}

/// Registry of attached channels.
pub struct ChannelRegistry {
    slots: RwLock<HashMap<ChannelId, ChannelSlot>>,
    deps: Arc<ActorDeps>,
}

impl ChannelRegistry {
    pub fn new(store: BoxedStore, transport: BoxedTransport, feed: BoxedLivenessFeed) -> Self {
        let scheduler = Scheduler::new(transport.clone());
        Self {
            slots: RwLock::new(HashMap::new()),
            deps: Arc::new(ActorDeps {
                store,
                transport,
                feed,
                scheduler,
            }),
        }
    }

    /// Starts the channel's actor and subscribes it to the liveness feed.
    ///
    /// Attaching an attached channel does nothing. A failed subscription
    /// leaves the channel unsubscribed.
    pub async fn attach(&self, channel: &ChannelId) {
        let (queue, commands) = mpsc::unbounded_channel();
        let status = Arc::new(SlotStatus::default());
        let token = CancellationToken::new();

        {
            let mut slots = self.slots.write();
            if slots.contains_key(channel) {
                debug!(channel = %channel, "Channel already attached");
                return;
            }
            slots.insert(
                channel.clone(),
                ChannelSlot {
                    queue: queue.clone(),
                    status: status.clone(),
                    token: token.clone(),
                },
            );
        }

        let actor = ChannelActor {
            channel: channel.clone(),
            state: LivenessState::Unsubscribed,
            subscription: None,
            scheduler: None,
            status,
            token,
            deps: self.deps.clone(),
        };
        let span = span!(Level::DEBUG, "channel", channel = %channel);
        tokio::spawn(actor.run(commands).instrument(span));

        let (ack, done) = oneshot::channel();
        let sink = Self::sink_for(channel.clone(), queue.downgrade());
        if queue.send(SlotCommand::Subscribe { sink, ack }).is_ok() {
            let _ = done.await;
        }
    }

    /// Feed callback routing into the channel's queue.
    ///
    /// Holds the queue weakly; events after release are dropped.
    fn sink_for(channel: ChannelId, queue: mpsc::WeakUnboundedSender<SlotCommand>) -> LivenessSink {
        Arc::new(move |notified: ChannelId, is_live: bool| {
            if notified != channel {
                debug!(expected = %channel, got = %notified, "Ignoring liveness event for other channel");
                return;
            }
            if let Some(queue) = queue.upgrade() {
                let _ = queue.send(SlotCommand::Liveness { is_live, ack: None });
            }
        })
    }

    /// Applies a liveness notification and waits for its effects.
    ///
    /// Returns `false` if the channel is not attached.
    pub async fn notify(&self, channel: &ChannelId, is_live: bool) -> bool {
        let queue = match self.slots.read().get(channel) {
            Some(slot) => slot.queue.clone(),
            None => return false,
        };

        let (ack, done) = oneshot::channel();
        if queue
            .send(SlotCommand::Liveness {
                is_live,
                ack: Some(ack),
            })
            .is_err()
        {
            return false;
        }
        let _ = done.await;
        true
    }

    /// Tears down the channel's runtime state and waits for it to finish.
    ///
    /// Returns `false` if the channel was not attached.
    pub async fn release(&self, channel: &ChannelId) -> bool {
        let Some(slot) = self.slots.write().remove(channel) else {
            return false;
        };
        Self::release_slot(slot).await;
        true
    }

    async fn release_slot(slot: ChannelSlot) {
        slot.token.cancel();
        let (ack, done) = oneshot::channel();
        if slot.queue.send(SlotCommand::Release { ack }).is_ok() {
            let _ = done.await;
        }
    }

    /// Releases every attached channel.
    pub async fn release_all(&self) {
        let slots: Vec<_> = self.slots.write().drain().map(|(_, slot)| slot).collect();
        info!(channels = slots.len(), "Releasing all channels");
        join_all(slots.into_iter().map(Self::release_slot)).await;
    }

    /// Observed state; `Unsubscribed` for unattached channels.
    pub fn state(&self, channel: &ChannelId) -> LivenessState {
        self.slots
            .read()
            .get(channel)
            .map(|slot| slot.status.state())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> RegistryStats {
        let slots = self.slots.read();
        RegistryStats {
            channels: slots.len(),
            live: slots
                .values()
                .filter(|slot| slot.status.state() == LivenessState::Live)
                .count(),
            armed_timers: slots.values().map(|slot| slot.status.armed()).sum(),
        }
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("channels", &self.slots.read().len())
            .finish_non_exhaustive()
    }
}

/// Snapshot of the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Attached channels.
    pub channels: usize,
    /// Channels currently live.
    pub live: usize,
    /// Timed messages armed across all channels.
    pub armed_timers: usize,
}

impl std::fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Channels: {} registered ({} live), {} timed message(s) armed",
            self.channels, self.live, self.armed_timers
        )
    }
}

// =============================================================================
// ChannelActor
// =============================================================================

struct ChannelActor {
    channel: ChannelId,
    state: LivenessState,
    subscription: Option<SubscriptionHandle>,
    scheduler: Option<SchedulerHandle>,
    status: Arc<SlotStatus>,
    token: CancellationToken,
    deps: Arc<ActorDeps>,
}

impl ChannelActor {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<SlotCommand>) {
        while let Some(command) = commands.recv().await {
            match command {
                SlotCommand::Subscribe { sink, ack } => {
                    self.subscribe(sink).await;
                    let _ = ack.send(());
                }
                SlotCommand::Liveness { is_live, ack } => {
                    self.apply(LivenessEvent::from_live(is_live)).await;
                    if let Some(ack) = ack {
                        let _ = ack.send(());
                    }
                }
                SlotCommand::Release { ack } => {
                    self.apply(LivenessEvent::Released).await;
                    let _ = ack.send(());
                    break;
                }
            }
        }
        debug!("Channel actor stopped");
    }

    async fn subscribe(&mut self, sink: LivenessSink) {
        if self.subscription.is_some() {
            return;
        }
        match self.deps.feed.subscribe(&self.channel, sink).await {
            Ok(handle) => {
                debug!(subscription = %handle, "Subscribed to liveness feed");
                self.subscription = Some(handle);
                self.apply(LivenessEvent::Subscribed).await;
            }
            Err(e) => {
                warn!(error = %e, "Liveness subscription failed, channel stays unsubscribed");
            }
        }
    }

    async fn apply(&mut self, event: LivenessEvent) {
        let (next, effects) = transition(self.state, event);
        if next != self.state {
            info!(from = %self.state, to = %next, "Liveness changed");
        }
        self.state = next;
        self.status.state.store(next.to_u8(), Ordering::Release);

        for effect in effects {
            self.run_effect(*effect).await;
        }
    }

    async fn run_effect(&mut self, effect: Effect) {
        let deps = self.deps.clone();
        match effect {
            Effect::Join => {
                if let Err(e) = deps.transport.join(&self.channel).await {
                    warn!(error = %e, "Failed to join chat");
                }
            }
            Effect::Part => {
                if let Err(e) = deps.transport.part(&self.channel).await {
                    warn!(error = %e, "Failed to part chat");
                }
            }
            Effect::StartScheduler => self.start_scheduler().await,
            Effect::StopScheduler => self.stop_scheduler(),
            Effect::Unsubscribe => {
                if let Some(handle) = self.subscription.take() {
                    deps.feed.unsubscribe(handle).await;
                }
            }
        }
    }

    /// Arms from the store's current record; cancellation wins over the read.
    async fn start_scheduler(&mut self) {
        self.stop_scheduler();

        let config = tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!("Scheduler start interrupted by release");
                return;
            }
            config = self.deps.store.get(&self.channel) => config,
        };

        match config {
            Ok(config) => {
                let handle = self.deps.scheduler.arm(&config, &self.token);
                self.status.armed.store(handle.armed(), Ordering::Release);
                self.scheduler = Some(handle);
            }
            Err(e) => warn!(error = %e, "Could not read timed messages"),
        }
    }

    fn stop_scheduler(&mut self) {
        if let Some(handle) = self.scheduler.take() {
            handle.disarm();
        }
        self.status.armed.store(0, Ordering::Release);
    }
}
