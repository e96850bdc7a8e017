//! # Flex Core
//!
//! Resolution and rendering core for Flex, which composes player-facing text
//! (display names, chat prefixes, join and leave announcements) from small
//! template components.
//!
//! ## Building Blocks
//!
//! - **Components**: a template plus a handler id ([`Component`]), persisted
//!   as JSON records ([`decode_components`], [`encode_components`]).
//! - **Resolvers**: closures or types answering one handler id ([`Resolver`]),
//!   or layered extensions answering many ([`Extension`]).
//! - **Resolution models**: a [`HandlerRegistry`] (push, exact lookup) or an
//!   [`ExtensionChain`] (pull, newest extension first), selected per
//!   deployment through [`Resolution`].
//! - **Rendering**: [`Renderer`] walks components in order, skips the ones
//!   whose handler has no answer and concatenates the rest.
//!
//! ## Render Flow
//!
//! ```text
//! ┌────────────┐     ┌────────────┐     ┌──────────────┐
//! │ Components │────▶│  Renderer  │────▶│ HandlerSource│
//! │  (a slot)  │     │            │◀────│ chain / reg. │
//! └────────────┘     └─────┬──────┘     └──────────────┘
//!                          ▼
//!                     display text
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use flex_core::{Component, Player, Renderer, Resolution, ResolutionContext, ResolutionModel};
//!
//! let resolution = Resolution::new(ResolutionModel::Chain);
//! let components = [Component::new("flex:name", "[accent]%VALUE%[accent] has connected.")];
//! let ctx = ResolutionContext::new(Arc::new(Player::new("uuid", "Alice")));
//!
//! let line = Renderer::default().render(&components, &resolution, &ctx);
//! assert_eq!(line, "[accent]Alice[accent] has connected.");
//! ```

pub mod builtin;
pub mod chain;
pub mod component;
pub mod context;
pub mod error;
pub mod registry;
pub mod render;
pub mod resolution;
pub mod resolver;

pub use builtin::{StandardExtension, strip_colors};
pub use chain::ExtensionChain;
pub use component::{
    Component, ComponentRecord, DEFAULT_PLACEHOLDER, decode_components, encode_components,
};
pub use context::{Color, Player, ResolutionContext};
pub use error::{RecordError, RecordResult, RegistrationError, RegistrationResult};
pub use registry::HandlerRegistry;
pub use render::Renderer;
pub use resolution::{Resolution, ResolutionModel};
pub use resolver::{BoxedExtension, BoxedResolver, Extension, HandlerSource, Resolver};

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        Color, Component, Extension, HandlerSource, Player, RegistrationError, Renderer,
        Resolution, ResolutionContext, ResolutionModel, Resolver, StandardExtension,
    };
}
