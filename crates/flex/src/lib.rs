//! # Flex
//!
//! Composable, hot-reloadable player-facing text for multiplayer game servers.
//!
//! ## Overview
//!
//! Display names, chat prefixes and join/leave announcements are built from
//! small template components stored per slot. Each component names a handler
//! whose value replaces the placeholder in its template. Operators edit the
//! slot files and reload them live; a file that references an unknown handler
//! is rejected and the previous configuration stays active.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐     ┌────────────────┐     ┌────────────┐     ┌─────────────┐
//! │ Host event │────▶│ SlotDispatcher │────▶│  Renderer  │────▶│ HostBridge  │
//! │ join/chat/ │     │  slot → config │     │ components │     │ broadcast / │
//! │   leave    │     └────────────────┘     └─────┬──────┘     │ set name    │
//! └────────────┘                                  ▼            └─────────────┘
//!                                     Extension chain or handler registry
//! ```
//!
//! - **Runtime**: owns everything, loads configuration, guards against a second instance
//! - **Store**: one JSON file per slot, validated hot reload, reset to defaults
//! - **Resolution**: extensions (newest first) or a handler registry, chosen per deployment
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flex::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = FlexRuntime::builder().bridge(MyServer::connect()?).build()?;
//!     runtime.register_extension(RankExtension::new())?;
//!     runtime.start().await?;
//!
//!     let player = Player::new("uuid", "[scarlet]Alice");
//!     runtime.handle_event(HostEvent::PlayerJoin(player)).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `command` *(default)*: operator console commands
//! - `toml-config` *(default)*: `flex.toml` configuration files
//! - `yaml-config`: `flex.yaml` configuration files
//! - `json-log`: JSON log format

pub use flex_core as core;
pub use flex_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use flex::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use flex_runtime::{FlexRuntime, RuntimeBuilder};

    // Host boundary
    pub use flex_runtime::{HostBridge, HostEvent, Slot, SlotTarget};

    // Resolution - for custom handlers and extensions
    pub use flex_core::{
        Color, Component, Extension, HandlerSource, Player, ResolutionContext, ResolutionModel,
        Resolver,
    };

    // Operator commands (requires "command" feature)
    #[cfg(feature = "command")]
    pub use flex_runtime::CommandOutcome;

    pub use flex_runtime::async_trait;
}
