//! Extension chain: layered resolvers consulted in priority order.
//!
//! This is the pull model. For every component the chain is walked from the
//! most recently registered extension to the oldest, and the first extension
//! that answers wins. The built-in [`StandardExtension`] is registered first,
//! which makes it the fallback of last resort.
//!
//! ```text
//! register: Standard ─▶ Ranks ─▶ Teams
//! consult:  Teams ─▶ Ranks ─▶ Standard
//! ```
//!
//! [`StandardExtension`]: crate::builtin::StandardExtension

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::context::ResolutionContext;
use crate::resolver::{BoxedExtension, Extension, HandlerSource};

/// Ordered, append-only list of extensions.
///
/// Registration publishes a new immutable list; resolution works on whichever
/// list was current when it started and never holds the lock while an
/// extension runs.
#[derive(Default)]
pub struct ExtensionChain {
    extensions: RwLock<Arc<Vec<BoxedExtension>>>,
}

impl ExtensionChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            extensions: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Appends `extension`, giving it priority over every earlier one.
    pub fn register_extension<E>(&self, extension: E)
    where
        E: Extension + 'static,
    {
        self.register_arc(Arc::new(extension));
    }

    /// Appends an already shared extension.
    pub fn register_arc(&self, extension: BoxedExtension) {
        let name = extension.name().to_string();
        let mut guard = self.extensions.write();
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend(guard.iter().cloned());
        next.push(extension);
        *guard = Arc::new(next);
        info!(extension = %name, position = guard.len(), "Registered extension");
    }

    fn snapshot(&self) -> Arc<Vec<BoxedExtension>> {
        Arc::clone(&self.extensions.read())
    }

    /// Walks the chain newest-first and returns the first answer.
    pub fn resolve(&self, handler: &str, ctx: &ResolutionContext) -> Option<String> {
        self.snapshot()
            .iter()
            .rev()
            .find_map(|extension| extension.resolve(handler, ctx))
    }

    /// Union of every extension's declared handler ids, sorted.
    pub fn list_ids(&self) -> BTreeSet<String> {
        self.snapshot()
            .iter()
            .flat_map(|extension| {
                extension
                    .provides()
                    .into_iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Extension names in consultation order (newest first).
    pub fn extension_names(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .rev()
            .map(|extension| extension.name().to_string())
            .collect()
    }

    /// Number of registered extensions.
    pub fn len(&self) -> usize {
        self.extensions.read().len()
    }

    /// Returns `true` when no extension is registered.
    pub fn is_empty(&self) -> bool {
        self.extensions.read().is_empty()
    }
}

impl HandlerSource for ExtensionChain {
    fn resolve(&self, handler: &str, ctx: &ResolutionContext) -> Option<String> {
        ExtensionChain::resolve(self, handler, ctx)
    }

    fn handler_ids(&self) -> BTreeSet<String> {
        self.list_ids()
    }

    fn contains(&self, handler: &str) -> bool {
        self.snapshot()
            .iter()
            .any(|extension| extension.provides().contains(&handler))
    }
}

impl std::fmt::Debug for ExtensionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionChain")
            .field("extensions", &self.extension_names())
            .finish()
    }
}
