use std::{fs, io, path::Path};

use math_core::MathCoreConfig;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Class that marks an element as math content.
    pub math_class: Option<String>,
    /// Class that selects display-style rendering.
    pub display_class: Option<String>,
    #[serde(flatten)]
    pub math_core: MathCoreConfig,
}

/// Error type for configuration loading operations.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error when reading the file.
    Io(io::Error),
    /// TOML parsing error.
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "I/O error: {}", err),
            ConfigError::Parse(err) => write!(f, "TOML parsing error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// Loads the configuration from a TOML file: the marker classes, plus the
/// renderer settings which are flattened into the same table.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok(config)
}

#[inline]
fn parse_config(s: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(s)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use math_core::PrettyPrint;

    use super::*;

    #[test]
    fn test_full_config() {
        let toml_content = r#"
math-class = "equation"
display-class = "centered"
pretty-print = "always"

[macros]
R = "\\mathbb{R}"
        "#;
        let config = parse_config(toml_content).unwrap();
        assert_eq!(config.math_class.as_deref(), Some("equation"));
        assert_eq!(config.display_class.as_deref(), Some("centered"));
        assert!(matches!(config.math_core.pretty_print, PrettyPrint::Always));
        assert!(
            config
                .math_core
                .macros
                .iter()
                .any(|(name, def)| name == "R" && def == "\\mathbb{R}")
        );
    }

    #[test]
    fn test_invalid_config() {
        let invalid_toml = "invalid_toml";
        let result = parse_config(invalid_toml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_partial_config() {
        let toml_content = r#"
[macros]
R = "\\mathbb{R}"
        "#;
        let config = parse_config(toml_content).unwrap();
        assert!(config.math_class.is_none());
        assert!(matches!(config.math_core.pretty_print, PrettyPrint::Never));
    }
}
