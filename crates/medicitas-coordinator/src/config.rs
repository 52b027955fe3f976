//! Runtime configuration loaded from YAML.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "medicitas.yaml";
pub const DEFAULT_DATA_DIR: &str = ".medicitas";
pub const DEFAULT_STORAGE_BASE_URL: &str = "mem://medicitas";
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;
pub const DEFAULT_MAX_FAILED_SIGN_INS: u32 = 5;
pub const DEFAULT_REVIEWS_PREVIEW_LIMIT: usize = 3;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediCitasConfig {
    /// Directory for the persisted backend snapshot and local cache
    pub data_dir: PathBuf,
    /// Prefix of download URLs handed out by blob storage
    pub storage_base_url: String,
    pub min_password_length: usize,
    /// Consecutive failed sign-ins before an email is rate limited
    pub max_failed_sign_ins: u32,
    pub reviews_preview_limit: usize,
    pub log_level: String,
}

impl Default for MediCitasConfig {
    fn default() -> Self {
        MediCitasConfig {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_base_url: DEFAULT_STORAGE_BASE_URL.to_string(),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            max_failed_sign_ins: DEFAULT_MAX_FAILED_SIGN_INS,
            reviews_preview_limit: DEFAULT_REVIEWS_PREVIEW_LIMIT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl MediCitasConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load from `path`, or `medicitas.yaml` when none is given. A missing
    /// file yields the defaults; an unreadable or invalid one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        info!("Attempting to load config from {:?}", path);
        if !path.exists() {
            warn!("Config file not found at {}. Using default config.", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config = Self::from_yaml(&content)?;
        info!("Loaded config: {:?}", config);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}
