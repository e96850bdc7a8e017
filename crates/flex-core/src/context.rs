//! Player data and the per-render resolution context.
//!
//! A [`ResolutionContext`] is built fresh for every render call from the
//! player the event concerns and, for chat, the message text. Resolvers only
//! ever see it by shared reference.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A 24-bit RGB player color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(u32);

impl Color {
    /// Pure white, the color of players the host assigned none to.
    pub const WHITE: Self = Self(0xFF_FF_FF);

    /// Creates a color from its red, green and blue channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Parses `RRGGBB`, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Self)
    }

    /// Upper-case `RRGGBB` form, without the `#`.
    pub fn to_hex(self) -> String {
        format!("{:06X}", self.0 & 0xFF_FF_FF)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A connected player as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Stable unique identifier.
    pub id: String,
    /// Raw display name as chosen by the player, markup included.
    pub name: String,
    /// Player color.
    pub color: Color,
    /// Whether the player holds admin rights.
    pub admin: bool,
}

impl Player {
    /// Creates a non-admin player with the default color.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: Color::default(),
            admin: false,
        }
    }

    /// Sets the player color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Sets the admin flag.
    pub fn with_admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }
}

/// Read-only input handed to every resolver during one render call.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    player: Arc<Player>,
    message: Option<String>,
}

impl ResolutionContext {
    /// Context for name, join and leave rendering.
    pub fn new(player: Arc<Player>) -> Self {
        Self {
            player,
            message: None,
        }
    }

    /// Context for chat rendering.
    pub fn with_message(player: Arc<Player>, message: impl Into<String>) -> Self {
        Self {
            player,
            message: Some(message.into()),
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn name(&self) -> &str {
        &self.player.name
    }

    pub fn player_id(&self) -> &str {
        &self.player.id
    }

    /// The chat message, if this context was built for a chat line.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_round_trip() {
        let color = Color::rgb(0x12, 0xAB, 0xEF);
        assert_eq!(color.to_hex(), "12ABEF");
        assert_eq!(Color::from_hex("#12abef"), Some(color));
        assert_eq!(Color::from_hex("12ABEF"), Some(color));
    }

    #[test]
    fn test_color_from_hex_rejects_garbage() {
        assert_eq!(Color::from_hex("#FFF"), None);
        assert_eq!(Color::from_hex("zzzzzz"), None);
    }

    #[test]
    fn test_context_accessors() {
        let player = Arc::new(Player::new("uuid-1", "[red]Bob").with_admin(true));
        let ctx = ResolutionContext::with_message(player, "hi");
        assert_eq!(ctx.name(), "[red]Bob");
        assert_eq!(ctx.player_id(), "uuid-1");
        assert_eq!(ctx.message(), Some("hi"));
        assert!(ctx.player().admin);
    }
}
