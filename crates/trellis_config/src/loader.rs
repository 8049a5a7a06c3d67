//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::TrellisConfig;
use std::path::Path;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "trellis.toml";

/// Loads and validates `trellis.toml` from a directory.
pub fn load_config(dir: &Path) -> Result<TrellisConfig, ConfigError> {
    let content = std::fs::read_to_string(dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Like [`load_config`], but a missing file yields the default configuration.
pub fn load_config_or_default(dir: &Path) -> Result<TrellisConfig, ConfigError> {
    match load_config(dir) {
        Err(ConfigError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            Ok(TrellisConfig::default())
        }
        other => other,
    }
}

/// Parses and validates a `trellis.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<TrellisConfig, ConfigError> {
    let config: TrellisConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &TrellisConfig) -> Result<(), ConfigError> {
    if config.simulation.max_iterations == 0 {
        return Err(ConfigError::ValidationError(
            "simulation.max_iterations must be at least 1".to_string(),
        ));
    }
    if config.simulation.run_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "simulation.run_interval_ms must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_common::DisplayFormat;

    #[test]
    fn parse_full_config() {
        let toml = r#"
[simulation]
max_iterations = 250
seed = 42
run_interval_ms = 100

[display]
format = "bin"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.simulation.max_iterations, 250);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.simulation.run_interval_ms, 100);
        assert_eq!(config.display.format, DisplayFormat::Bin);
    }

    #[test]
    fn empty_file_is_default() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, TrellisConfig::default());
    }

    #[test]
    fn zero_iterations_rejected() {
        let err = load_config_from_str("[simulation]\nmax_iterations = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_interval_rejected() {
        let err = load_config_from_str("[simulation]\nrun_interval_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn unknown_format_is_parse_error() {
        let err = load_config_from_str("[display]\nformat = \"octal\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let err = load_config_from_str("[simulation]\nmax_iters = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[display]\nformat = \"dec\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.display.format, DisplayFormat::Dec);
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = load_config_or_default(dir.path()).unwrap();
        assert_eq!(config, TrellisConfig::default());
        assert!(matches!(
            load_config(dir.path()).unwrap_err(),
            ConfigError::IoError(_)
        ));
    }
}
