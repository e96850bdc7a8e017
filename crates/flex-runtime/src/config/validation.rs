//! Configuration validation utilities.

use flex_core::ComponentRecord;

use super::error::{ConfigError, ConfigResult};
use super::schema::{FlexConfig, LogOutput};
use crate::store::Slot;

/// Validates the entire configuration.
pub fn validate_config(config: &FlexConfig) -> ConfigResult<()> {
    validate_render(config)?;
    validate_storage(config)?;
    validate_hooks(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_render(config: &FlexConfig) -> ConfigResult<()> {
    let placeholder = &config.render.placeholder;
    if placeholder.trim().is_empty() {
        return Err(ConfigError::validation(
            "render.placeholder must contain at least one non-whitespace character",
        ));
    }

    // The built-in defaults must survive their own reload.
    for slot in Slot::ALL {
        for (index, component) in slot.defaults(placeholder).iter().enumerate() {
            ComponentRecord::from(component)
                .into_component(index, placeholder)
                .map_err(|err| {
                    ConfigError::validation(format!(
                        "render.placeholder '{placeholder}' clashes with the default {slot} configuration: {err}"
                    ))
                })?;
        }
    }
    Ok(())
}

fn validate_storage(config: &FlexConfig) -> ConfigResult<()> {
    if config.storage.dir.as_os_str().is_empty() {
        return Err(ConfigError::validation("storage.dir must not be empty"));
    }
    Ok(())
}

fn validate_hooks(config: &FlexConfig) -> ConfigResult<()> {
    if config.hooks.name.max_length == 0 {
        return Err(ConfigError::validation(
            "hooks.name.max_length must be at least 1",
        ));
    }
    Ok(())
}

fn validate_logging(config: &FlexConfig) -> ConfigResult<()> {
    if config.logging.output == LogOutput::File && config.logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is \"file\"",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&FlexConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_placeholder() {
        for placeholder in ["", "   "] {
            let mut config = FlexConfig::default();
            config.render.placeholder = placeholder.to_string();
            assert!(matches!(
                validate_config(&config),
                Err(ConfigError::Validation { .. })
            ));
        }
    }

    #[test]
    fn test_validate_rejects_placeholder_found_in_defaults() {
        // "connected" and "disconnected" both contain "ed".
        for placeholder in ["ed", "[", "accent"] {
            let mut config = FlexConfig::default();
            config.render.placeholder = placeholder.to_string();
            assert!(
                matches!(validate_config(&config), Err(ConfigError::Validation { .. })),
                "{placeholder}"
            );
        }

        let mut config = FlexConfig::default();
        config.render.placeholder = "{value}".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_name_length() {
        let mut config = FlexConfig::default();
        config.hooks.name.max_length = 0;
        assert!(validate_config(&config).is_err());

        config.hooks.name.max_length = 1;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_storage_dir() {
        let mut config = FlexConfig::default();
        config.storage.dir = PathBuf::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = FlexConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some(PathBuf::from("flex.log"));
        assert!(validate_config(&config).is_ok());
    }
}
