//! Poller configuration
//!
//! Three layers, later ones winning: an optional TOML file, environment
//! variables, and command-line overrides.
//!
//! The default file lives at `$XDG_CONFIG_HOME/remo-poller/config.toml`:
//!
//! ```toml
//! api_token = "..."
//! endpoint = "https://api.nature.global/1/devices"
//! csv_file = "/var/lib/remo/readings.csv"
//! timeout_secs = 10
//! device = "Living Room"
//! ```

use crate::error::PollerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Device list endpoint of the cloud API
pub const DEFAULT_ENDPOINT: &str = "https://api.nature.global/1/devices";

const CONFIG_DIR_NAME: &str = "remo-poller";
const CONFIG_FILE: &str = "config.toml";

pub const ENV_API_KEY: &str = "REMO_API_KEY";
pub const ENV_ENDPOINT: &str = "REMO_API_URL";
pub const ENV_CSV_FILE: &str = "CSV_FILE";
pub const ENV_TIMEOUT: &str = "REMO_TIMEOUT_SECS";
pub const ENV_DEVICE: &str = "REMO_DEVICE";

fn default_timeout_secs() -> u64 {
    10
}

/// Contents of the TOML file. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub csv_file: Option<PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub device: Option<String>,
}

impl FileConfig {
    /// Default file path, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE))
    }

    /// Load the explicit file, or the default one if it exists.
    ///
    /// A missing default file yields empty settings; a missing explicit
    /// file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, PollerError> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => {
                debug!("No config file, using environment only");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, PollerError> {
        let content = fs::read_to_string(path).map_err(|e| {
            PollerError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            PollerError::Config(format!("Cannot parse {}: {}", path.display(), e))
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Command-line overrides, applied last
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub csv_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub device: Option<String>,
}

/// Fully resolved settings for one run
#[derive(Clone)]
pub struct PollerConfig {
    pub api_token: String,
    pub endpoint: String,
    pub csv_file: Option<PathBuf>,
    pub timeout_secs: u64,
    pub device: Option<String>,
}

impl fmt::Debug for PollerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollerConfig")
            .field("api_token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("csv_file", &self.csv_file)
            .field("timeout_secs", &self.timeout_secs)
            .field("device", &self.device)
            .finish()
    }
}

impl PollerConfig {
    /// Load file and process environment, then apply overrides
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self, PollerError> {
        let file = FileConfig::load(config_path)?;
        Self::resolve(file, |key| std::env::var(key).ok(), overrides)
    }

    /// Environment only, through an injectable lookup
    pub fn from_env_with<F>(lookup: F) -> Result<Self, PollerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(FileConfig::default(), lookup, &Overrides::default())
    }

    /// Merge the three layers
    pub fn resolve<F>(
        file: FileConfig,
        lookup: F,
        overrides: &Overrides,
    ) -> Result<Self, PollerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty variables count as unset
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_token = env(ENV_API_KEY)
            .or(file.api_token)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| PollerError::Config(format!("{} is not set", ENV_API_KEY)))?;

        let endpoint = overrides
            .endpoint
            .clone()
            .or_else(|| env(ENV_ENDPOINT))
            .or(file.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let csv_file = overrides
            .csv_file
            .clone()
            .or_else(|| env(ENV_CSV_FILE).map(PathBuf::from))
            .or(file.csv_file);

        let env_timeout = match env(ENV_TIMEOUT) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                PollerError::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_TIMEOUT, raw
                ))
            })?),
            None => None,
        };
        let timeout_secs = overrides
            .timeout_secs
            .or(env_timeout)
            .or(file.timeout_secs)
            .unwrap_or_else(default_timeout_secs);

        let device = overrides
            .device
            .clone()
            .or_else(|| env(ENV_DEVICE))
            .or(file.device);

        Ok(Self {
            api_token,
            endpoint,
            csv_file,
            timeout_secs,
            device,
        })
    }

    /// Request timeout clamped to 1-120 seconds
    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.clamp(1, 120)
    }
}
