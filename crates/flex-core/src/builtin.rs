//! Built-in handlers.
//!
//! | id                    | value                                      |
//! |-----------------------|--------------------------------------------|
//! | `flex:none`           | empty string                               |
//! | `flex:name`           | raw player name                            |
//! | `flex:name-colored`   | `[#RRGGBB]` followed by the raw name       |
//! | `flex:name-colorless` | name with color markup stripped            |
//! | `flex:admin`          | empty for admins, absent for everyone else |
//! | `flex:message`        | chat message, empty outside chat           |
//!
//! Colors are written as six hex digits without an alpha channel; the
//! game's markup reads `[#RRGGBB]` as fully opaque.
//!
//! The same set is offered in both resolution models: as the
//! [`StandardExtension`] at the bottom of an extension chain, or through
//! [`register_handlers`] into a handler registry.

use std::sync::Arc;

use crate::context::ResolutionContext;
use crate::registry::HandlerRegistry;
use crate::resolver::Extension;

pub const NONE: &str = "flex:none";
pub const NAME: &str = "flex:name";
pub const NAME_COLORED: &str = "flex:name-colored";
pub const NAME_COLORLESS: &str = "flex:name-colorless";
pub const ADMIN: &str = "flex:admin";
pub const MESSAGE: &str = "flex:message";

/// Every built-in handler id.
pub const BUILTIN_IDS: [&str; 6] = [NONE, NAME, NAME_COLORED, NAME_COLORLESS, ADMIN, MESSAGE];

/// Resolves one of the built-in ids, or `None` for any other id.
pub fn resolve_builtin(handler: &str, ctx: &ResolutionContext) -> Option<String> {
    match handler {
        NONE => Some(String::new()),
        NAME => Some(ctx.name().to_string()),
        NAME_COLORED => Some(format!("[#{}]{}", ctx.player().color.to_hex(), ctx.name())),
        NAME_COLORLESS => Some(strip_colors(ctx.name())),
        ADMIN => ctx.player().admin.then(String::new),
        MESSAGE => Some(ctx.message().unwrap_or_default().to_string()),
        _ => None,
    }
}

/// The built-in handlers as an extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardExtension;

impl StandardExtension {
    pub const NAME: &'static str = "flex:standard";
}

impl Extension for StandardExtension {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn provides(&self) -> Vec<&str> {
        BUILTIN_IDS.to_vec()
    }

    fn resolve(&self, handler: &str, ctx: &ResolutionContext) -> Option<String> {
        resolve_builtin(handler, ctx)
    }
}

/// Registers every built-in handler into `registry`.
pub fn register_handlers(registry: &HandlerRegistry) {
    for id in BUILTIN_IDS {
        let resolver = move |ctx: &ResolutionContext| resolve_builtin(id, ctx);
        registry.insert(id.to_string(), Arc::new(resolver));
    }
}

/// Removes color markup from `text`.
///
/// `[[` is an escaped bracket and becomes `[`. A bracketed tag is dropped when
/// it is empty (`[]`), a hex color (`[#ff0000]`, up to 8 digits) or a color
/// name (`[scarlet]`). Anything else in brackets is kept as written.
pub fn strip_colors(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        if let Some(escaped) = after.strip_prefix('[') {
            out.push('[');
            rest = escaped;
            continue;
        }

        match after.find(']') {
            Some(close) if is_color_tag(&after[..close]) => {
                rest = &after[close + 1..];
            }
            _ => {
                out.push('[');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_color_tag(tag: &str) -> bool {
    if tag.is_empty() {
        return true;
    }
    if let Some(hex) = tag.strip_prefix('#') {
        return (1..=8).contains(&hex.len()) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    tag.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::context::{Color, Player};
    use crate::resolver::HandlerSource;

    fn ctx(player: Player) -> ResolutionContext {
        ResolutionContext::new(Arc::new(player))
    }

    #[test]
    fn test_strip_colors() {
        assert_eq!(strip_colors("[red]Bob"), "Bob");
        assert_eq!(strip_colors("[#ff0000ff]A[]B"), "AB");
        assert_eq!(strip_colors("[[not a tag]"), "[not a tag]");
        assert_eq!(strip_colors("[a b]"), "[a b]");
        assert_eq!(strip_colors("open [ only"), "open [ only");
        assert_eq!(strip_colors("x]y"), "x]y");
        assert_eq!(strip_colors("plain"), "plain");
    }

    #[test]
    fn test_name_handlers() {
        let player = Player::new("1", "[red]Bob").with_color(Color::rgb(0xFF, 0x80, 0x00));
        let ctx = ctx(player);

        assert_eq!(resolve_builtin(NAME, &ctx), Some("[red]Bob".into()));
        assert_eq!(resolve_builtin(NAME_COLORED, &ctx), Some("[#FF8000][red]Bob".into()));
        assert_eq!(resolve_builtin(NAME_COLORLESS, &ctx), Some("Bob".into()));
        assert_eq!(resolve_builtin(NONE, &ctx), Some(String::new()));
    }

    #[test]
    fn test_admin_handler_suppresses_non_admins() {
        let admin = ctx(Player::new("1", "A").with_admin(true));
        let regular = ctx(Player::new("2", "B"));

        assert_eq!(resolve_builtin(ADMIN, &admin), Some(String::new()));
        assert_eq!(resolve_builtin(ADMIN, &regular), None);
    }

    #[test]
    fn test_message_handler() {
        let player = Arc::new(Player::new("1", "A"));
        let chat = ResolutionContext::with_message(Arc::clone(&player), "hello");
        let join = ResolutionContext::new(player);

        assert_eq!(resolve_builtin(MESSAGE, &chat), Some("hello".into()));
        assert_eq!(resolve_builtin(MESSAGE, &join), Some(String::new()));
    }

    #[test]
    fn test_builtins_always_answer() {
        let admin = ctx(Player::new("1", "[]").with_admin(true));
        let regular = ctx(Player::new("2", ""));

        for id in BUILTIN_IDS {
            assert!(StandardExtension.resolve(id, &admin).is_some(), "{id}");
            if id != ADMIN {
                assert!(StandardExtension.resolve(id, &regular).is_some(), "{id}");
            }
        }
        assert!(StandardExtension.resolve("other", &admin).is_none());
    }

    #[test]
    fn test_register_handlers() {
        let registry = HandlerRegistry::new();
        register_handlers(&registry);

        assert_eq!(registry.len(), BUILTIN_IDS.len());
        let ctx = ctx(Player::new("1", "[blue]Eve"));
        assert_eq!(registry.resolve(NAME_COLORLESS, &ctx), Some("Eve".into()));
    }
}
