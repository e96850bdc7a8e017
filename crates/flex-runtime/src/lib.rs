//! Flex Runtime - configuration, dispatch and wiring for Flex.
//!
//! This crate provides:
//! - Slot configuration persistence with validated hot reload (`ConfigurationStore`)
//! - Host event routing to slot rendering (`SlotDispatcher`, `HostBridge`)
//! - The single-instance runtime object (`FlexRuntime`)
//! - Operator console commands (`command` feature)
//! - figment configuration loading and `tracing` setup
//!
//! ```rust,ignore
//! use flex_runtime::{FlexRuntime, HostEvent, SlotTarget};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = FlexRuntime::builder().bridge(MyBridge).build()?;
//!     runtime.start().await?;
//!
//!     runtime.handle_event(HostEvent::PlayerJoin(player)).await;
//!     runtime.reload(SlotTarget::All).await;
//!     Ok(())
//! }
//! ```

#[cfg(feature = "command")]
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod store;

// Re-exports
#[cfg(feature = "command")]
pub use command::{Action, CommandOutcome, OperatorCommand};
pub use config::{ConfigError, ConfigLoader, ConfigResult, FlexConfig, HooksConfig};
pub use dispatcher::{HostBridge, HostEvent, LogBridge, SlotDispatcher};
pub use error::{RuntimeError, RuntimeResult, StoreError, StoreResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{FlexRuntime, RuntimeBuilder, SlotReport};
pub use store::{ConfigurationStore, ParseSlotError, Slot, SlotTarget, unresolved_handlers};

// Re-exports for implementors of `HostBridge` and resolvers
pub use async_trait::async_trait;
pub use tracing;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use super::{FlexRuntime, HostBridge, HostEvent, Slot, SlotTarget};
    pub use tracing::{debug, error, info, trace, warn};
}
