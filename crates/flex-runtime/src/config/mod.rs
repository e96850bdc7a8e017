//! Configuration module for the Flex runtime.
//!
//! Layered figment loading of the deployment settings: the resolution model,
//! where slot files live, the placeholder token, event hooks and logging.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    FlexConfig, HooksConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, NameHookConfig,
    RenderConfig, SpanEventConfig, StorageConfig,
};
pub use validation::validate_config;
