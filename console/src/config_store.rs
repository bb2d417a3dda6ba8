use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use blake3::Hasher as Blake3;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ConsoleError, ConsoleResult};
use crate::storage::ConsolePaths;

const CONFIG_VERSION: u16 = 1;

/// Overrides the backend base URL without touching the stored config.
pub const API_URL_ENV_VAR: &str = "VALIDATOR_CONSOLE_API_URL";
/// Selects the configuration environment name.
pub const ENVIRONMENT_ENV_VAR: &str = "VALIDATOR_CONSOLE_ENV";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollingConfig {
    pub data_interval_secs: u64,
    pub log_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            data_interval_secs: 5,
            log_interval_secs: 5,
        }
    }
}

impl PollingConfig {
    pub fn data_interval(&self) -> Duration {
        Duration::from_secs(self.data_interval_secs.max(1))
    }

    pub fn log_interval(&self) -> Duration {
        Duration::from_secs(self.log_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub backend: BackendConfig,
    pub polling: PollingConfig,
    pub environment: String,
    pub last_updated: DateTime<Utc>,
    pub version: u16,
}

impl ConsoleConfig {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            backend: BackendConfig::default(),
            polling: PollingConfig::default(),
            environment: environment.into(),
            last_updated: Utc::now(),
            version: CONFIG_VERSION,
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// Apply process-level overrides. Never persisted.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV_VAR) {
            let url = url.trim();
            if !url.is_empty() {
                log::info!("Using backend URL from {}", API_URL_ENV_VAR);
                self.backend.base_url = url.to_string();
            }
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigEnvelope {
    version: u16,
    checksum: [u8; 32],
    payload: ConsoleConfig,
    modified_at_unix: i64,
}

/// Handles persistence of console configuration with integrity checks.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_paths(paths: &ConsolePaths) -> Self {
        Self {
            path: paths.config_file().to_path_buf(),
        }
    }

    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load_or_default(&self, environment: impl Into<String>) -> ConsoleResult<ConsoleConfig> {
        if !self.path.exists() {
            let config = ConsoleConfig::new(environment);
            self.save(&config)?;
            return Ok(config);
        }

        let bytes = fs::read(&self.path)?;
        let envelope: ConfigEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| ConsoleError::ValidationError(format!("Config is unreadable: {}", e)))?;
        if envelope.version != CONFIG_VERSION {
            return Err(ConsoleError::ValidationError(format!(
                "Unsupported config version {}",
                envelope.version
            )));
        }

        if checksum(&envelope.payload)? != envelope.checksum {
            return Err(ConsoleError::ValidationError(
                "Config integrity verification failed".to_string(),
            ));
        }

        Ok(envelope.payload)
    }

    pub fn save(&self, config: &ConsoleConfig) -> ConsoleResult<()> {
        let mut payload = config.clone();
        payload.touch();

        let envelope = ConfigEnvelope {
            version: CONFIG_VERSION,
            checksum: checksum(&payload)?,
            modified_at_unix: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map_err(|e| ConsoleError::StorageError(e.to_string()))?
                .as_secs() as i64,
            payload,
        };

        let serialized = serde_json::to_vec_pretty(&envelope)?;
        let tmp_path = self.path.with_extension("new");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&serialized)?;
            file.sync_all()?;
        }
        fs::rename(tmp_path, &self.path)?;
        log::debug!("Saved console config to {}", self.path.display());
        Ok(())
    }

    pub fn update<F>(
        &self,
        environment: impl Into<String>,
        updater: F,
    ) -> ConsoleResult<ConsoleConfig>
    where
        F: FnOnce(&mut ConsoleConfig) -> ConsoleResult<()>,
    {
        let mut config = self.load_or_default(environment)?;
        updater(&mut config)?;
        config.touch();
        self.save(&config)?;
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn checksum(config: &ConsoleConfig) -> ConsoleResult<[u8; 32]> {
    let mut hasher = Blake3::new();
    let encoded = serde_json::to_vec(config)?;
    hasher.update(&encoded);
    let mut output = [0u8; 32];
    output.copy_from_slice(hasher.finalize().as_bytes());
    Ok(output)
}
