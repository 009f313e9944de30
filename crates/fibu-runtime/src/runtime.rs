//! Process-wide coordinator.
//!
//! [`BotRuntime`] owns the dispatcher and the channel registry. Chat messages
//! go through the dispatcher and the resulting actions are applied to the
//! transport and registry; liveness notifications go to the channel's actor.
//!
//! ```rust,ignore
//! let runtime = BotRuntime::builder()
//!     .config(config)
//!     .store(Arc::new(store))
//!     .transport(transport)
//!     .liveness_feed(feed)
//!     .build()?;
//! runtime.run().await?;
//! ```

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use fibu_core::{
    BoxedLivenessFeed, BoxedStore, BoxedTransport, ChannelConfig, ChannelId, ChannelSettings,
    Gateway, IncomingMessage,
};
use fibu_framework::{Action, Dispatcher};
use futures::future::join_all;
use tokio::signal;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{ConfigLoader, FibuConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::liveness::LivenessState;
use crate::logging;
use crate::registry::{ChannelRegistry, RegistryStats};

struct RuntimeInner {
    config: FibuConfig,
    store: BoxedStore,
    transport: BoxedTransport,
    dispatcher: Dispatcher,
    registry: ChannelRegistry,
    running: RwLock<bool>,
}

/// The fibubot runtime. Cheap to clone.
#[derive(Clone)]
pub struct BotRuntime {
    inner: Arc<RuntimeInner>,
}

impl BotRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &FibuConfig {
        &self.inner.config
    }

    pub async fn is_running(&self) -> bool {
        *self.inner.running.read().await
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Joins the control channel and subscribes every registered channel.
    pub async fn start(&self) -> RuntimeResult<()> {
        let mut running = self.inner.running.write().await;
        if *running {
            warn!("Runtime is already running");
            return Ok(());
        }

        let channels = self.inner.store.list().await?;
        info!(channels = channels.len(), "Starting fibubot runtime");

        let control_channel = self.inner.dispatcher.control_channel();
        if let Err(e) = self.inner.transport.join(control_channel).await {
            warn!(channel = %control_channel, error = %e, "Failed to join control channel");
        }
        join_all(channels.iter().map(|channel| self.inner.registry.attach(channel))).await;

        *running = true;
        info!("{}", self.inner.registry.stats());
        Ok(())
    }

    /// Releases every channel and leaves the control channel.
    ///
    /// Channel records stay in the store.
    pub async fn stop(&self) -> RuntimeResult<()> {
        let mut running = self.inner.running.write().await;
        if !*running {
            warn!("Runtime is not running");
            return Ok(());
        }

        info!("Stopping fibubot runtime");
        self.inner.registry.release_all().await;
        let control_channel = self.inner.dispatcher.control_channel();
        if let Err(e) = self.inner.transport.part(control_channel).await {
            warn!(channel = %control_channel, error = %e, "Failed to part control channel");
        }

        *running = false;
        info!("Runtime stopped");
        Ok(())
    }

    /// Runs until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> RuntimeResult<()> {
        self.run_until(wait_for_shutdown()).await
    }

    /// Runs until `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        self.start().await?;
        info!("fibubot is now running");
        shutdown.await;
        self.stop().await
    }

    // =========================================================================
    // Inbound events
    // =========================================================================

    /// Dispatches one chat message and applies the resulting actions.
    ///
    /// Returns the applied actions.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Vec<Action> {
        let actions = self.inner.dispatcher.dispatch(message).await;
        for action in &actions {
            self.apply(&message.channel, action).await;
        }
        actions
    }

    /// Handles a chat message on its own task.
    pub fn spawn_message(&self, message: IncomingMessage) -> JoinHandle<Vec<Action>> {
        let runtime = self.clone();
        tokio::spawn(async move { runtime.handle_message(&message).await })
    }

    async fn apply(&self, channel: &ChannelId, action: &Action) {
        let transport = &self.inner.transport;
        match action {
            Action::Say(text) => {
                if let Err(e) = transport.send(channel, text).await {
                    warn!(channel = %channel, error = %e, "Failed to send reply");
                }
            }
            Action::Timeout {
                user,
                seconds,
                reason,
            } => {
                if let Err(e) = transport.timeout(channel, user, *seconds, reason).await {
                    warn!(channel = %channel, user = %user, error = %e, "Failed to time out user");
                }
            }
            Action::Registered(registered) => self.inner.registry.attach(registered).await,
            Action::Unregistered(unregistered) => {
                self.inner.registry.release(unregistered).await;
            }
        }
    }

    /// Feeds a liveness notification to the channel's actor.
    ///
    /// Notifications for unregistered channels are dropped.
    pub async fn handle_liveness(&self, channel: &ChannelId, is_live: bool) {
        if !self.inner.registry.notify(channel, is_live).await {
            debug!(channel = %channel, is_live, "Liveness event for unknown channel ignored");
        }
    }

    // =========================================================================
    // Channel management
    // =========================================================================

    /// Creates the channel record and attaches its runtime state.
    pub async fn register_channel(&self, config: ChannelConfig) -> RuntimeResult<()> {
        config
            .settings()
            .validate()
            .map_err(RuntimeError::InvalidSettings)?;
        let channel = config.channel.clone();
        self.inner.store.create(config).await?;
        self.inner.registry.attach(&channel).await;
        info!(channel = %channel, "Channel registered");
        Ok(())
    }

    /// Deletes the channel record and tears down its runtime state.
    pub async fn unregister_channel(&self, channel: &ChannelId) -> RuntimeResult<()> {
        self.inner.store.delete(channel).await?;
        self.inner.registry.release(channel).await;
        info!(channel = %channel, "Channel unregistered");
        Ok(())
    }

    pub fn liveness_state(&self, channel: &ChannelId) -> LivenessState {
        self.inner.registry.state(channel)
    }

    pub async fn channel_config(&self, channel: &ChannelId) -> RuntimeResult<ChannelConfig> {
        Ok(self.inner.store.get(channel).await?)
    }

    /// Validates `settings` and replaces all operator-editable fields at once.
    ///
    /// Timed message changes apply from the channel's next live session.
    pub async fn replace_settings(
        &self,
        channel: &ChannelId,
        settings: ChannelSettings,
    ) -> RuntimeResult<ChannelConfig> {
        settings.validate().map_err(RuntimeError::InvalidSettings)?;
        let updated = self
            .inner
            .store
            .update_fields(channel, settings.into())
            .await?;
        info!(channel = %channel, "Channel settings replaced");
        Ok(updated)
    }

    pub async fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            running: self.is_running().await,
            registry: self.inner.registry.stats(),
        }
    }
}

impl fmt::Debug for BotRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotRuntime")
            .field("control_channel", self.inner.dispatcher.control_channel())
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}

/// Waits for Ctrl+C or, on unix, SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Cannot listen for SIGTERM"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => warn!(error = %e, "Cannot listen for Ctrl+C, shutting down"),
    }
}

/// Snapshot of the runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub running: bool,
    pub registry: RegistryStats,
}

impl fmt::Display for RuntimeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.running { "running" } else { "stopped" };
        write!(f, "Runtime {state}. {}", self.registry)
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for [`BotRuntime`].
///
/// The store, transport and liveness feed must be provided. Without an
/// explicit gateway the HTTP clients are built from the config.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    config: Option<FibuConfig>,
    store: Option<BoxedStore>,
    gateway: Option<Gateway>,
    transport: Option<BoxedTransport>,
    feed: Option<BoxedLivenessFeed>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            config: None,
            store: None,
            gateway: None,
            transport: None,
            feed: None,
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Uses an already loaded config instead of the loader.
    pub fn config(mut self, config: FibuConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn store(mut self, store: BoxedStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn gateway(mut self, gateway: Gateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn transport(mut self, transport: BoxedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn liveness_feed(mut self, feed: BoxedLivenessFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Loads and validates the config, initializes logging and wires the
    /// runtime.
    pub fn build(self) -> RuntimeResult<BotRuntime> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_loader.load()?,
        };
        validate_config(&config)?;
        logging::init_from_config(&config.logging);

        let store = self.store.ok_or(RuntimeError::MissingComponent("channel store"))?;
        let transport = self
            .transport
            .ok_or(RuntimeError::MissingComponent("chat transport"))?;
        let feed = self
            .feed
            .ok_or(RuntimeError::MissingComponent("liveness feed"))?;
        let gateway = match self.gateway {
            Some(gateway) => gateway,
            None => fibu_gateway::http_gateway(&config.tempus, &config.helix, &config.bot.username)?,
        };

        let control_channel = ChannelId::new(&config.bot.control_channel);
        let dispatcher = Dispatcher::new(store.clone(), gateway, control_channel);
        let registry = ChannelRegistry::new(store.clone(), transport.clone(), feed);

        info!(
            control_channel = %dispatcher.control_channel(),
            log_level = %config.logging.level,
            "Runtime initialized from configuration"
        );

        Ok(BotRuntime {
            inner: Arc::new(RuntimeInner {
                config,
                store,
                transport,
                dispatcher,
                registry,
                running: RwLock::new(false),
            }),
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
