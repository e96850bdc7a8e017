//! The Flex runtime: one owner for the resolution source, the configuration
//! store and the dispatcher.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use flex_runtime::{FlexRuntime, HostEvent};
//!
//! let runtime = FlexRuntime::builder()
//!     .config_file("flex.toml")
//!     .bridge(MyServerBridge::new())
//!     .build()?;
//!
//! runtime.register_extension(RankExtension::default())?;
//! runtime.start().await?;
//!
//! runtime.handle_event(HostEvent::PlayerJoin(player)).await;
//! ```
//!
//! Only one runtime may be alive per process. Building a second one while the
//! first still exists fails with [`RuntimeError::AlreadyInitialized`].

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use flex_core::{
    Extension, HandlerSource, RegistrationResult, Renderer, Resolution, ResolutionModel, Resolver,
};
use tracing::{debug, error, info, warn};

use crate::config::{ConfigLoader, FlexConfig, validate_config};
use crate::dispatcher::{HostBridge, HostEvent, LogBridge, SlotDispatcher};
use crate::error::{RuntimeError, RuntimeResult, StoreError, StoreResult};
use crate::logging;
use crate::store::{ConfigurationStore, Slot, SlotTarget};

// =============================================================================
// Instance Guard
// =============================================================================

static INSTANCE_ALIVE: AtomicBool = AtomicBool::new(false);

/// Marks the process-wide runtime slot as taken until dropped.
#[derive(Debug)]
struct InstanceGuard;

impl InstanceGuard {
    fn acquire() -> RuntimeResult<Self> {
        INSTANCE_ALIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self)
            .map_err(|_| RuntimeError::AlreadyInitialized)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        INSTANCE_ALIVE.store(false, Ordering::Release);
    }
}

// =============================================================================
// Runtime
// =============================================================================

/// Outcome of a reload or reset for one slot.
#[derive(Debug)]
pub struct SlotReport {
    pub slot: Slot,
    /// Number of active components on success.
    pub result: StoreResult<usize>,
}

/// Owns every Flex component for the lifetime of the host process.
pub struct FlexRuntime {
    config: FlexConfig,
    resolution: Arc<Resolution>,
    store: Arc<ConfigurationStore>,
    dispatcher: SlotDispatcher,
    started: AtomicBool,
    _guard: InstanceGuard,
}

impl FlexRuntime {
    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration.
    ///
    /// The configuration is validated first. Initializes logging from
    /// `config.logging` unless a subscriber is already installed.
    pub fn from_config(config: &FlexConfig, bridge: Arc<dyn HostBridge>) -> RuntimeResult<Self> {
        validate_config(config)?;
        let guard = InstanceGuard::acquire()?;
        logging::init_from_config(&config.logging);

        let resolution = Arc::new(Resolution::new(config.resolution));
        let store = Arc::new(ConfigurationStore::new(
            &config.storage.dir,
            &config.render.placeholder,
        ));
        let dispatcher = SlotDispatcher::new(
            Arc::clone(&store),
            Arc::clone(&resolution),
            Renderer::new(&config.render.placeholder),
            bridge,
        )
        .with_hooks(config.hooks.clone());

        info!(
            resolution = %config.resolution,
            storage = %config.storage.dir.display(),
            placeholder = %config.render.placeholder,
            "Flex runtime initialized"
        );

        Ok(Self {
            config: config.clone(),
            resolution,
            store,
            dispatcher,
            started: AtomicBool::new(false),
            _guard: guard,
        })
    }

    pub fn config(&self) -> &FlexConfig {
        &self.config
    }

    pub fn model(&self) -> ResolutionModel {
        self.resolution.model()
    }

    /// The active resolution source.
    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn store(&self) -> &ConfigurationStore {
        &self.store
    }

    pub fn dispatcher(&self) -> &SlotDispatcher {
        &self.dispatcher
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Adds an extension on top of the chain (chain model only).
    pub fn register_extension<E>(&self, extension: E) -> RegistrationResult<()>
    where
        E: Extension + 'static,
    {
        let name = extension.name().to_string();
        self.resolution.register_extension(extension)?;
        self.note_late_registration("extension", &name);
        Ok(())
    }

    /// Binds a resolver to a handler id (registry model only).
    pub fn register_handler<R>(&self, id: impl Into<String>, resolver: R) -> RegistrationResult<()>
    where
        R: Resolver + 'static,
    {
        let id = id.into();
        self.resolution.register_handler(id.clone(), resolver)?;
        self.note_late_registration("handler", &id);
        Ok(())
    }

    fn note_late_registration(&self, kind: &str, name: &str) {
        if self.is_started() {
            warn!(
                kind,
                name,
                "Registered after start; slots referencing it need a reload"
            );
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Creates the storage directory and loads every slot.
    ///
    /// A slot that fails to load keeps its defaults; the failure is logged.
    pub async fn start(&self) -> RuntimeResult<()> {
        if self.started.swap(true, Ordering::AcqRel) {
            warn!("Runtime is already started");
            return Ok(());
        }

        let dir = self.store.dir();
        info!(storage = %dir.display(), "Starting Flex runtime");
        create_dir(dir).await?;

        for slot in Slot::ALL {
            match self.store.initialize(slot, self.resolution.as_ref()).await {
                Ok(count) => debug!(slot = %slot, components = count, "Slot ready"),
                Err(err) => {
                    error!(slot = %slot, error = %err, "Failed to load slot, keeping defaults");
                }
            }
        }

        info!(
            extensions = ?self.resolution.extension_names(),
            handlers = self.resolution.handler_ids().len(),
            "Flex runtime started"
        );
        Ok(())
    }

    /// Forwards one host event to the dispatcher.
    pub async fn handle_event(&self, event: HostEvent) {
        self.dispatcher.dispatch(event).await;
    }

    // -------------------------------------------------------------------------
    // Operator actions
    // -------------------------------------------------------------------------

    /// Reloads the targeted slots from disk.
    ///
    /// A slot that fails keeps its previous configuration. Online players get
    /// their names re-rendered when the name slot changes.
    pub async fn reload(&self, target: SlotTarget) -> Vec<SlotReport> {
        let mut reports = Vec::new();
        for slot in target.slots() {
            let result = self.store.reload(slot, self.resolution.as_ref()).await;
            self.after_update(slot, "reload", &result).await;
            reports.push(SlotReport { slot, result });
        }
        reports
    }

    /// Restores the built-in defaults of the targeted slots.
    pub async fn reset(&self, target: SlotTarget) -> Vec<SlotReport> {
        let mut reports = Vec::new();
        for slot in target.slots() {
            let result = self
                .store
                .reset(slot)
                .await
                .map(|()| self.store.snapshot(slot).len());
            self.after_update(slot, "reset", &result).await;
            reports.push(SlotReport { slot, result });
        }
        reports
    }

    async fn after_update(&self, slot: Slot, action: &str, result: &StoreResult<usize>) {
        match result {
            Ok(_) if slot == Slot::Name => {
                let players = self.dispatcher.refresh_names().await;
                debug!(action, players, "Re-applied display names");
            }
            Ok(_) => {}
            Err(StoreError::Unresolved { ids, .. }) => {
                warn!(
                    slot = %slot,
                    action,
                    unresolved = ?ids,
                    "Rejected configuration with unknown handlers"
                );
            }
            Err(err) => error!(slot = %slot, action, error = %err, "Slot update failed"),
        }
    }

    /// Every handler id the active model can resolve, sorted.
    pub fn list_handlers(&self) -> Vec<String> {
        self.resolution.handler_ids().into_iter().collect()
    }

    /// Parses and runs one operator console line.
    #[cfg(feature = "command")]
    pub async fn execute(&self, line: &str) -> crate::command::CommandOutcome {
        use crate::command::{Action, CommandOutcome, OperatorCommand};

        let command = match OperatorCommand::parse_line(line) {
            Ok(command) => command,
            Err(err) => return CommandOutcome::from_clap(err),
        };

        debug!(command = ?command.action, "Executing operator command");
        match command.action {
            Action::Reload { target } => CommandOutcome::Reloaded(self.reload(target).await),
            Action::Reset { target } => CommandOutcome::Reset(self.reset(target).await),
            Action::ListHandlers => CommandOutcome::Handlers(self.list_handlers()),
        }
    }
}

async fn create_dir(dir: &Path) -> RuntimeResult<()> {
    tokio::fs::create_dir_all(dir).await.map_err(|source| {
        RuntimeError::Store(StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })
    })
}

impl std::fmt::Debug for FlexRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlexRuntime")
            .field("config", &self.config)
            .field("resolution", &self.resolution)
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`FlexRuntime`] with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = FlexRuntime::builder()
///     .config_file("config/flex.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    bridge: Option<Arc<dyn HostBridge>>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            bridge: None,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: FlexConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Where rendered text is sent. Defaults to [`LogBridge`].
    pub fn bridge<B>(mut self, bridge: B) -> Self
    where
        B: HostBridge + 'static,
    {
        self.bridge = Some(Arc::new(bridge));
        self
    }

    /// Like [`bridge`](Self::bridge), for a bridge the caller keeps a handle to.
    pub fn shared_bridge(mut self, bridge: Arc<dyn HostBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<FlexRuntime> {
        let config = self.config_loader.load()?;
        let bridge = self.bridge.unwrap_or_else(|| Arc::new(LogBridge));
        FlexRuntime::from_config(&config, bridge)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
