//! Slot dispatcher and host boundary.
//!
//! The host game server delivers [`HostEvent`]s; the dispatcher picks the
//! slot for each one, renders it against the active resolution source and
//! hands the text back through a [`HostBridge`].
//!
//! | event          | slots rendered | bridge call                     |
//! |----------------|----------------|---------------------------------|
//! | `PlayerJoin`   | name, join     | `set_display_name`, `broadcast` |
//! | `Chat`         | chat           | `broadcast`                     |
//! | `PlayerLeave`  | left           | `broadcast`                     |
//!
//! Join and leave announcements are only broadcast when they render to
//! something other than whitespace. Each event can be switched off through
//! [`HooksConfig`]; a switched-off event is left to the host.
//!
//! A rendered name is only applied when it is not blank. A name longer than
//! `hooks.name.max_length` is replaced by the player's raw name.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use flex_core::{Player, Renderer, Resolution, ResolutionContext, strip_colors};
use futures::future;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::HooksConfig;
use crate::store::{ConfigurationStore, Slot};

/// An inbound notification from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    PlayerJoin(Player),
    Chat { player: Player, message: String },
    PlayerLeave(Player),
}

/// Outbound side of the host: where rendered text goes.
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Sends `text` to every connected player.
    async fn broadcast(&self, text: &str);

    /// Replaces the display name of the player identified by `player_id`.
    async fn set_display_name(&self, player_id: &str, name: &str);
}

/// A bridge that only logs what it would send.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBridge;

#[async_trait]
impl HostBridge for LogBridge {
    async fn broadcast(&self, text: &str) {
        info!(text = %strip_colors(text), "Broadcast");
    }

    async fn set_display_name(&self, player_id: &str, name: &str) {
        info!(player = %player_id, name = %strip_colors(name), "Display name set");
    }
}

/// Routes host events to slot rendering.
pub struct SlotDispatcher {
    store: Arc<ConfigurationStore>,
    resolution: Arc<Resolution>,
    renderer: Renderer,
    bridge: Arc<dyn HostBridge>,
    hooks: HooksConfig,
    online: RwLock<HashMap<String, Arc<Player>>>,
}

impl SlotDispatcher {
    pub fn new(
        store: Arc<ConfigurationStore>,
        resolution: Arc<Resolution>,
        renderer: Renderer,
        bridge: Arc<dyn HostBridge>,
    ) -> Self {
        Self {
            store,
            resolution,
            renderer,
            bridge,
            hooks: HooksConfig::default(),
            online: RwLock::new(HashMap::new()),
        }
    }

    /// Replaces the event switches, all enabled by default.
    pub fn with_hooks(mut self, hooks: HooksConfig) -> Self {
        self.hooks = hooks;
        self
    }

    /// Renders the active components of `slot` for `ctx`.
    pub fn render(&self, slot: Slot, ctx: &ResolutionContext) -> String {
        let components = self.store.snapshot(slot);
        self.renderer.render(&components, self.resolution.as_ref(), ctx)
    }

    /// Handles one host event.
    pub async fn dispatch(&self, event: HostEvent) {
        match event {
            HostEvent::PlayerJoin(player) => self.on_join(player).await,
            HostEvent::Chat { player, message } => self.on_chat(player, message).await,
            HostEvent::PlayerLeave(player) => self.on_leave(player).await,
        }
    }

    async fn on_join(&self, player: Player) {
        let player = Arc::new(player);
        self.online
            .write()
            .insert(player.id.clone(), Arc::clone(&player));

        if self.hooks.name.enabled {
            self.apply_name(&player).await;
        }

        if self.hooks.join {
            let ctx = ResolutionContext::new(Arc::clone(&player));
            let announcement = self.render(Slot::Join, &ctx);
            if !announcement.trim().is_empty() {
                self.bridge.broadcast(&announcement).await;
            }
        }

        info!(
            player = %player.id,
            name = %strip_colors(&player.name),
            "Player connected"
        );
    }

    async fn on_chat(&self, player: Player, message: String) {
        // The event carries the current name and rights.
        let player = Arc::new(player);
        if let Some(online) = self.online.write().get_mut(&player.id) {
            *online = Arc::clone(&player);
        }

        if !self.hooks.chat {
            debug!(player = %player.id, "Chat hook disabled, leaving the line to the host");
            return;
        }

        let ctx = ResolutionContext::with_message(Arc::clone(&player), message);
        let line = self.render(Slot::Chat, &ctx);
        self.bridge.broadcast(&line).await;

        info!(player = %player.id, line = %strip_colors(&line), "Chat");
    }

    async fn on_leave(&self, player: Player) {
        let player = Arc::new(player);
        if self.hooks.left {
            let ctx = ResolutionContext::new(Arc::clone(&player));
            let announcement = self.render(Slot::Left, &ctx);
            if !announcement.trim().is_empty() {
                self.bridge.broadcast(&announcement).await;
            }
        }

        self.online.write().remove(&player.id);
        info!(
            player = %player.id,
            name = %strip_colors(&player.name),
            "Player disconnected"
        );
    }

    async fn apply_name(&self, player: &Arc<Player>) {
        let ctx = ResolutionContext::new(Arc::clone(player));
        let name = self.render(Slot::Name, &ctx);

        let length = name.chars().count();
        let max_length = self.hooks.name.max_length;
        if length > max_length {
            warn!(
                player = %player.id,
                length,
                max_length,
                "Rendered name is too long, restoring the raw name"
            );
            self.bridge.set_display_name(&player.id, &player.name).await;
        } else if name.trim().is_empty() {
            warn!(player = %player.id, "Rendered name is blank, keeping the current name");
        } else {
            self.bridge.set_display_name(&player.id, &name).await;
        }
    }

    /// Re-renders and re-applies the name slot for every online player.
    ///
    /// Returns how many players were refreshed; none when the name hook is
    /// disabled.
    pub async fn refresh_names(&self) -> usize {
        if !self.hooks.name.enabled {
            return 0;
        }
        let players = self.online_players();
        future::join_all(players.iter().map(|player| self.apply_name(player))).await;
        debug!(players = players.len(), "Refreshed display names");
        players.len()
    }

    /// Currently connected players.
    pub fn online_players(&self) -> Vec<Arc<Player>> {
        self.online.read().values().cloned().collect()
    }
}

impl std::fmt::Debug for SlotDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotDispatcher")
            .field("renderer", &self.renderer)
            .field("online", &self.online.read().len())
            .finish_non_exhaustive()
    }
}
