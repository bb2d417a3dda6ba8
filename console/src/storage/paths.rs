use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ConsoleError, ConsoleResult};

/// Environment variable that overrides the console home directory.
pub const HOME_ENV_VAR: &str = "VALIDATOR_CONSOLE_HOME";

/// Manages filesystem paths used by the console.
#[derive(Debug, Clone)]
pub struct ConsolePaths {
    /// Root directory for console data.
    root_dir: PathBuf,
    /// Path to persisted console configuration.
    config_file: PathBuf,
    /// Durable session token.
    token_file: PathBuf,
}

impl ConsolePaths {
    pub const CONFIG_FILENAME: &'static str = "console.config";
    pub const TOKEN_FILENAME: &'static str = "session.token";

    /// Create a new path manager rooted at the provided directory.
    pub fn new(root: impl AsRef<Path>) -> ConsoleResult<Self> {
        let root_dir = root.as_ref().to_path_buf();
        if root_dir.as_os_str().is_empty() {
            return Err(ConsoleError::StorageError(
                "Console root directory cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            config_file: root_dir.join(Self::CONFIG_FILENAME),
            token_file: root_dir.join(Self::TOKEN_FILENAME),
            root_dir,
        })
    }

    /// Resolve the root from `VALIDATOR_CONSOLE_HOME`, falling back to
    /// `$HOME/.validator-console`.
    pub fn from_env() -> ConsoleResult<Self> {
        if let Ok(root) = std::env::var(HOME_ENV_VAR) {
            if !root.trim().is_empty() {
                return Self::new(root);
            }
        }

        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .ok_or_else(|| {
                ConsoleError::StorageError(format!(
                    "Cannot determine home directory; set {}",
                    HOME_ENV_VAR
                ))
            })?;
        Self::new(PathBuf::from(home).join(".validator-console"))
    }

    /// Ensure the directory structure exists, creating missing folders.
    pub fn ensure_directories(&self) -> ConsoleResult<()> {
        fs::create_dir_all(&self.root_dir)?;
        Ok(())
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn token_file(&self) -> &Path {
        &self.token_file
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }
}
