//! Resolver traits.
//!
//! Three seams meet here:
//!
//! - [`Resolver`]: a single handler, invoked by exact id (push model).
//! - [`Extension`]: answers any of the ids it declares, consulted in
//!   priority order with other extensions (pull model).
//! - [`HandlerSource`]: what the renderer and reload validation need from
//!   either model. It resolves an id and enumerates the resolvable ids.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::context::ResolutionContext;

/// A value provider bound to one handler id.
///
/// Returning `None` suppresses the component; returning an empty string keeps
/// the component with nothing substituted.
///
/// Closures of the shape `Fn(&ResolutionContext) -> Option<String>` implement
/// this trait.
pub trait Resolver: Send + Sync {
    fn resolve(&self, ctx: &ResolutionContext) -> Option<String>;
}

impl<F> Resolver for F
where
    F: Fn(&ResolutionContext) -> Option<String> + Send + Sync,
{
    fn resolve(&self, ctx: &ResolutionContext) -> Option<String> {
        self(ctx)
    }
}

/// Shared, type-erased resolver.
pub type BoxedResolver = Arc<dyn Resolver>;

/// A resolver consulted across every handler id it chooses to answer.
///
/// Extensions are layered: the most recently registered one is asked first,
/// so a later extension can shadow ids also answered by an earlier one.
pub trait Extension: Send + Sync {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Handler ids this extension may answer.
    ///
    /// Reload validation only accepts ids declared here by some registered
    /// extension.
    fn provides(&self) -> Vec<&str>;

    /// Resolves `handler` for `ctx`, or `None` to defer to the next extension.
    fn resolve(&self, handler: &str, ctx: &ResolutionContext) -> Option<String>;
}

/// Shared, type-erased extension.
pub type BoxedExtension = Arc<dyn Extension>;

/// Anything that can resolve handler ids for the renderer.
pub trait HandlerSource: Send + Sync {
    /// Resolves `handler`; `None` when nothing answers.
    fn resolve(&self, handler: &str, ctx: &ResolutionContext) -> Option<String>;

    /// Every handler id this source can resolve, sorted.
    fn handler_ids(&self) -> BTreeSet<String>;

    /// Returns `true` when `handler` is among [`handler_ids`](Self::handler_ids).
    fn contains(&self, handler: &str) -> bool {
        self.handler_ids().contains(handler)
    }
}
