use crate::client::{DEFAULT_BASE_URL, Endpoint};
use crate::engine::DEFAULT_INFECTION_PATTERN;
use crate::render::Locale;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding `[service] base_url`.
pub const API_URL_ENV: &str = "ROSESENSE_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no config directory available on this platform")]
    NoConfigDir,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CliConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub endpoint: Endpoint,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Case-insensitive regex matched against detection labels.
    pub infection_pattern: String,
    /// Exact `disease_label` value meaning infected.
    pub disease_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub locale: Locale,
    pub color: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: Endpoint::Analyze,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            infection_pattern: DEFAULT_INFECTION_PATTERN.to_string(),
            disease_label: crate::contracts::disease_label::DEFAULT_DISEASE_LABEL.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            locale: Locale::En,
            color: true,
        }
    }
}

impl CliConfig {
    pub fn load() -> Self {
        // Try to load from config file, fallback to default
        if let Some(config_path) = Self::config_file_path()
            && let Ok(content) = std::fs::read_to_string(&config_path)
        {
            match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => log::warn!("ignoring invalid config {}: {}", config_path.display(), e),
            }
        }
        Self::default()
    }

    /// Load an explicitly requested file; unlike [`CliConfig::load`] failures are errors.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// File a command should write: `explicit` when given, else the default location.
    pub fn target_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::config_file_path().ok_or(ConfigError::NoConfigDir),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)
    }

    /// Apply `ROSESENSE_API_URL` when set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = std::env::var_os(API_URL_ENV).filter(|v| !v.is_empty()) {
            self.service.base_url = url.to_string_lossy().into_owned();
        }
        self
    }

    pub fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|mut path| {
            path.push("config.toml");
            path
        })
    }

    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("rosesense");
            path
        })
    }
}
