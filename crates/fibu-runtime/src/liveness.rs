//! Per-channel liveness state machine.
//!
//! [`transition`] is pure: it maps the current state and one event to the
//! next state plus the side effects the channel's actor must carry out, in
//! order. Everything that talks to the transport, the feed or the scheduler
//! lives in the registry.
//!
//! ```text
//!                 Subscribed             WentLive
//! Unsubscribed ───────────────▶ Offline ──────────▶ Live
//!      ▲                          │  ◀──────────────  │
//!      │         Released         │    WentOffline    │
//!      └──────────────────────────┴───────────────────┘
//! ```

use std::fmt;

/// Observed state of one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LivenessState {
    /// No feed subscription; liveness events are ignored.
    #[default]
    Unsubscribed,
    Offline,
    Live,
}

impl LivenessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsubscribed => "unsubscribed",
            Self::Offline => "offline",
            Self::Live => "live",
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Self::Unsubscribed => 0,
            Self::Offline => 1,
            Self::Live => 2,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Offline,
            2 => Self::Live,
            _ => Self::Unsubscribed,
        }
    }
}

impl fmt::Display for LivenessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessEvent {
    /// The feed accepted a subscription.
    Subscribed,
    WentLive,
    WentOffline,
    /// The channel was unregistered or the runtime is shutting down.
    Released,
}

impl LivenessEvent {
    /// Event for a feed notification.
    pub fn from_live(is_live: bool) -> Self {
        if is_live { Self::WentLive } else { Self::WentOffline }
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Join,
    Part,
    StartScheduler,
    StopScheduler,
    Unsubscribe,
}

const NONE: &[Effect] = &[];
const GO_LIVE: &[Effect] = &[Effect::Join, Effect::StartScheduler];
const GO_OFFLINE: &[Effect] = &[Effect::Part, Effect::StopScheduler];
const RELEASE_LIVE: &[Effect] = &[Effect::Part, Effect::StopScheduler, Effect::Unsubscribe];
const RELEASE_OFFLINE: &[Effect] = &[Effect::Unsubscribe];

/// Computes the next state and the effects to run.
///
/// Repeated events of the same kind produce no effects; events for an
/// unsubscribed channel are ignored.
pub fn transition(
    state: LivenessState,
    event: LivenessEvent,
) -> (LivenessState, &'static [Effect]) {
    use LivenessEvent::*;
    use LivenessState::*;

    match (state, event) {
        (Unsubscribed, Subscribed) => (Offline, NONE),
        (Offline, WentLive) => (Live, GO_LIVE),
        (Live, WentOffline) => (Offline, GO_OFFLINE),
        (Live, Released) => (Unsubscribed, RELEASE_LIVE),
        (Offline, Released) => (Unsubscribed, RELEASE_OFFLINE),
        (Unsubscribed, _) => (Unsubscribed, NONE),
        (Offline | Live, Subscribed) | (Live, WentLive) | (Offline, WentOffline) => (state, NONE),
    }
}
