//! Template renderer.

use tracing::trace;

use crate::component::{Component, DEFAULT_PLACEHOLDER};
use crate::context::ResolutionContext;
use crate::resolver::HandlerSource;

/// Turns an ordered component list into one display string.
///
/// Each component is resolved through a [`HandlerSource`]. An absent value
/// drops the component entirely; any present value, the empty string
/// included, is substituted for the placeholder and appended. Components are
/// concatenated as-is with no separator or trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderer {
    placeholder: String,
}

impl Renderer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn render<S>(&self, components: &[Component], source: &S, ctx: &ResolutionContext) -> String
    where
        S: HandlerSource + ?Sized,
    {
        let mut out = String::new();
        for component in components {
            match source.resolve(component.handler(), ctx) {
                Some(value) => out.push_str(&component.apply(&self.placeholder, &value)),
                None => {
                    trace!(
                        handler = component.handler(),
                        player = ctx.player_id(),
                        "Skipped unresolved component"
                    );
                }
            }
        }
        out
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER)
    }
}
