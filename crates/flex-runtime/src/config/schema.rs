//! Configuration schema definitions.
//!
//! ```toml
//! resolution = "chain"          # or "registry"
//!
//! [storage]
//! dir = "./flex"
//!
//! [render]
//! placeholder = "%VALUE%"
//!
//! [hooks]
//! chat = true
//! join = true
//! left = true                   # `quit` is accepted as well
//!
//! [hooks.name]
//! enabled = true
//! max_length = 512
//!
//! [logging]
//! level = "info"
//! format = "compact"            # compact | full | pretty | json
//! output = "stdout"             # stdout | stderr | file
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use flex_core::{DEFAULT_PLACEHOLDER, ResolutionModel};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexConfig {
    /// Which resolution model this deployment uses.
    #[serde(default)]
    pub resolution: ResolutionModel,

    /// Where slot configurations are persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Rendering options.
    #[serde(default)]
    pub render: RenderConfig,

    /// Which host events are rendered.
    #[serde(default)]
    pub hooks: HooksConfig,

    /// Logging options.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Persistence settings for slot configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one `<slot>-config.json` file per slot.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./flex")
}

/// Template rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Token replaced by the resolved value in every template.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
        }
    }
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

// =============================================================================
// Hooks
// =============================================================================

/// Per-event switches. A disabled event is left to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Render and broadcast chat lines.
    #[serde(default = "enabled")]
    pub chat: bool,

    /// Broadcast connect announcements.
    #[serde(default = "enabled")]
    pub join: bool,

    /// Broadcast disconnect announcements.
    #[serde(default = "enabled", alias = "quit")]
    pub left: bool,

    #[serde(default)]
    pub name: NameHookConfig,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            chat: true,
            join: true,
            left: true,
            name: NameHookConfig::default(),
        }
    }
}

/// Display name application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameHookConfig {
    /// Apply the rendered name slot on connect and after name updates.
    #[serde(default = "enabled")]
    pub enabled: bool,

    /// Longest rendered name, in characters, that is applied. Longer names
    /// are replaced by the player's raw name.
    #[serde(default = "default_max_name_length")]
    pub max_length: usize,
}

impl Default for NameHookConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_length: default_max_name_length(),
        }
    }
}

fn enabled() -> bool {
    true
}

fn default_max_name_length() -> usize {
    512
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level; `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line in each event.
    #[serde(default)]
    pub file_location: bool,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Per-module level overrides, e.g. `flex_runtime = "debug"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            thread_ids: false,
            file_location: false,
            span_events: SpanEventConfig::default(),
            filters: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FlexConfig::default();
        assert_eq!(config.resolution, ResolutionModel::Chain);
        assert_eq!(config.storage.dir, PathBuf::from("./flex"));
        assert_eq!(config.render.placeholder, "%VALUE%");
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.hooks.chat && config.hooks.join && config.hooks.left);
        assert!(config.hooks.name.enabled);
        assert_eq!(config.hooks.name.max_length, 512);
    }

    #[test]
    fn test_hooks_accept_quit_alias() {
        let config: FlexConfig =
            serde_json::from_str(r#"{"hooks": {"quit": false, "name": {"max_length": 32}}}"#)
                .unwrap();
        assert!(!config.hooks.left);
        assert!(config.hooks.join);
        assert!(config.hooks.name.enabled);
        assert_eq!(config.hooks.name.max_length, 32);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FlexConfig =
            serde_json::from_str(r#"{"resolution": "registry", "logging": {"level": "debug"}}"#)
                .unwrap();
        assert_eq!(config.resolution, ResolutionModel::Registry);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.render, RenderConfig::default());
    }
}
