use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use blogsmith_highlight::{DEFAULT_DARK_BACKGROUND, DEFAULT_MAX_LINE_LENGTH};

pub const DEFAULT_COPY_FEEDBACK_MS: u64 = 2000;
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

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

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub highlight: HighlightConfig,
    pub editor: EditorConfig,
    pub settings: SettingsConfig,
}

/// `[highlight]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Extra or overriding `<language>.sublime-syntax` grammars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar_dir: Option<PathBuf>,
    pub dark_background: String,
    pub max_line_length: usize,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            grammar_dir: None,
            dark_background: DEFAULT_DARK_BACKGROUND.to_string(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// `[editor]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub copy_feedback_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            copy_feedback_ms: DEFAULT_COPY_FEEDBACK_MS,
        }
    }
}

/// `[settings]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// JSON file holding the system settings
    pub store_path: PathBuf,
    pub cache_capacity: usize,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        let data_dir = shellexpand::tilde("~/.config/blogsmith");
        Self {
            store_path: PathBuf::from(data_dir.as_ref()).join("settings.json"),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
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

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in configured paths
        config.highlight.grammar_dir = config
            .highlight
            .grammar_dir
            .map(|dir| Self::expand_path(&dir).unwrap_or(dir));
        config.settings.store_path =
            Self::expand_path(&config.settings.store_path).unwrap_or(config.settings.store_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// The configuration file, or defaults when there is none
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
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

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/blogsmith");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
