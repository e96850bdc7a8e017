//! Handler registry: resolvers keyed by exact handler id.
//!
//! This is the push model. Each handler id maps to exactly one [`Resolver`];
//! registering the same id again replaces the previous resolver. There is no
//! removal.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::context::ResolutionContext;
use crate::error::{RegistrationError, RegistrationResult};
use crate::resolver::{BoxedResolver, HandlerSource, Resolver};

/// Process-wide map of handler id to resolver.
///
/// # Thread Safety
///
/// Registration and lookup may run concurrently. Lookups clone the resolver
/// handle out of the map, so the lock is never held while a resolver runs.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, BoxedResolver>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Binds `resolver` to `id`, replacing any previous binding.
    pub fn register<R>(&self, id: impl Into<String>, resolver: R) -> RegistrationResult<()>
    where
        R: Resolver + 'static,
    {
        self.register_arc(id, Arc::new(resolver))
    }

    /// Binds an already shared resolver to `id`.
    pub fn register_arc(
        &self,
        id: impl Into<String>,
        resolver: BoxedResolver,
    ) -> RegistrationResult<()> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(RegistrationError::EmptyHandlerId);
        }
        self.insert(id, resolver);
        Ok(())
    }

    /// Binds `resolver` to an id already known to be non-empty.
    pub(crate) fn insert(&self, id: String, resolver: BoxedResolver) {
        let previous = self.handlers.write().insert(id.clone(), resolver);
        if previous.is_some() {
            debug!(handler = %id, "Replaced handler");
        } else {
            info!(handler = %id, "Registered handler");
        }
    }

    /// Returns the resolver bound to `id`.
    pub fn lookup(&self, id: &str) -> Option<BoxedResolver> {
        self.handlers.read().get(id).cloned()
    }

    /// Every registered handler id, sorted.
    pub fn list_ids(&self) -> BTreeSet<String> {
        self.handlers.read().keys().cloned().collect()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Returns `true` when no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}

impl HandlerSource for HandlerRegistry {
    fn resolve(&self, handler: &str, ctx: &ResolutionContext) -> Option<String> {
        self.lookup(handler)?.resolve(ctx)
    }

    fn handler_ids(&self) -> BTreeSet<String> {
        self.list_ids()
    }

    fn contains(&self, handler: &str) -> bool {
        self.handlers.read().contains_key(handler)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.list_ids())
            .finish()
    }
}
