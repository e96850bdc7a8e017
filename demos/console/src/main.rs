//! Console Example
//!
//! Drives a Flex runtime from standard input, standing in for a game server.
//! Rendered text is printed to standard output with color tags stripped.
//!
//! # Input
//!
//! ```text
//! join <id> <name> [admin]   player connects
//! chat <id> <message...>     player sends a chat message
//! leave <id>                 player disconnects
//! reload <all|name|join|chat|left>
//! reset <all|name|join|chat|left>
//! list-handlers
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package flex-console -- --config flex.toml
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use flex::core::strip_colors;
use flex::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "flex-console", about = "Drive Flex from the terminal")]
struct Args {
    /// Configuration file to load instead of searching the defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. "development".
    #[arg(short, long)]
    profile: Option<String>,
}

// ============================================================================
// Host side
// ============================================================================

/// Prints everything the runtime would send to players.
struct ConsoleBridge;

#[async_trait]
impl HostBridge for ConsoleBridge {
    async fn broadcast(&self, text: &str) {
        println!("> {}", strip_colors(text));
    }

    async fn set_display_name(&self, player_id: &str, name: &str) {
        println!("* {player_id} is now shown as {}", strip_colors(name));
    }
}

/// Gives admins a rank tag, defers for everyone else.
struct RankExtension;

impl Extension for RankExtension {
    fn name(&self) -> &str {
        "console:ranks"
    }

    fn provides(&self) -> Vec<&str> {
        vec!["console:rank"]
    }

    fn resolve(&self, handler: &str, ctx: &ResolutionContext) -> Option<String> {
        match handler {
            "console:rank" if ctx.player().admin => Some("[scarlet]Admin".to_string()),
            _ => None,
        }
    }
}

fn rank(ctx: &ResolutionContext) -> Option<String> {
    RankExtension.resolve("console:rank", ctx)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = FlexRuntime::builder().bridge(ConsoleBridge);
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &args.profile {
        builder = builder.profile(profile);
    }
    let runtime = builder.build()?;

    match runtime.model() {
        ResolutionModel::Chain => runtime.register_extension(RankExtension)?,
        ResolutionModel::Registry => runtime.register_handler("console:rank", rank)?,
    }
    runtime.start().await?;
    info!("Reading commands from stdin");

    let mut players: HashMap<String, Player> = HashMap::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut words = line.splitn(3, ' ');
        match (words.next(), words.next(), words.next()) {
            (Some("join"), Some(id), Some(rest)) => {
                let (name, admin) = match rest.rsplit_once(' ') {
                    Some((name, "admin")) => (name, true),
                    _ => (rest, false),
                };
                let player = Player::new(id, name).with_admin(admin);
                players.insert(id.to_string(), player.clone());
                runtime.handle_event(HostEvent::PlayerJoin(player)).await;
            }
            (Some("chat"), Some(id), Some(message)) => match players.get(id) {
                Some(player) => {
                    let event = HostEvent::Chat {
                        player: player.clone(),
                        message: message.to_string(),
                    };
                    runtime.handle_event(event).await;
                }
                None => error!(player = id, "Unknown player"),
            },
            (Some("leave"), Some(id), None) => match players.remove(id) {
                Some(player) => runtime.handle_event(HostEvent::PlayerLeave(player)).await,
                None => error!(player = id, "Unknown player"),
            },
            _ => {
                let outcome = runtime.execute(line).await;
                if outcome.is_error() {
                    eprintln!("{outcome}");
                } else {
                    println!("{outcome}");
                }
            }
        }
    }

    Ok(())
}
