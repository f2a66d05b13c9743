use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use wikimark_handler::{HandlerOptions, reference::DEFAULT_EXTERNAL_SCHEMES};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings file, `~/.config/wikimark/config.toml` by default.
///
/// ```toml
/// [handler]
/// rewrite_blocks = true
///
/// [media]
/// external_schemes = ["http", "https", "ftp"]
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub handler: HandlerSection,
    pub media: MediaSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerSection {
    /// Restructure tables, lists and other blocks. Off shows the raw calls.
    pub rewrite_blocks: bool,
}

impl Default for HandlerSection {
    fn default() -> Self {
        Self {
            rewrite_blocks: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSection {
    /// URL schemes whose media is external.
    pub external_schemes: Vec<String>,
}

impl Default for MediaSection {
    fn default() -> Self {
        Self {
            external_schemes: DEFAULT_EXTERNAL_SCHEMES.map(String::from).to_vec(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/wikimark");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            rewrite_blocks: self.handler.rewrite_blocks,
            external_schemes: self.media.external_schemes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/wikimark/config.toml"));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert!(config.handler.rewrite_blocks);
        assert_eq!(config.media.external_schemes, vec!["http", "https", "ftp"]);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[media]
external_schemes = ["gopher"]
"#,
        )
        .unwrap();

        assert!(config.handler.rewrite_blocks);
        assert_eq!(config.media.external_schemes, vec!["gopher"]);
    }

    #[test]
    fn test_handler_options_follow_config() {
        let config: Config = toml::from_str(
            r#"
[handler]
rewrite_blocks = false
"#,
        )
        .unwrap();

        let options = config.handler_options();

        assert!(!options.rewrite_blocks);
        assert_eq!(options.external_schemes, HandlerOptions::default().external_schemes);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_config_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[handler]\nrewrite_blocks = \"yes\"\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/dir/config.toml");
        let test_config = Config {
            handler: HandlerSection {
                rewrite_blocks: false,
            },
            media: MediaSection {
                external_schemes: vec!["https".into()],
            },
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }
}
