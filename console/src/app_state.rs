use std::path::PathBuf;
use std::sync::Arc;

use crate::backend_client::BackendGateway;
use crate::config_store::{ConfigStore, ConsoleConfig, ENVIRONMENT_ENV_VAR};
use crate::errors::ConsoleResult;
use crate::session::CredentialBroker;
use crate::storage::{ConsolePaths, FileTokenStore};

/// Everything the console needs to talk to one backend.
#[derive(Debug)]
pub struct ConsoleContext {
    paths: ConsolePaths,
    config_store: ConfigStore,
    config: ConsoleConfig,
    credentials: CredentialBroker,
    gateway: Arc<BackendGateway>,
    environment: String,
}

impl ConsoleContext {
    pub fn initialize(root_dir: PathBuf) -> ConsoleResult<Self> {
        let environment =
            std::env::var(ENVIRONMENT_ENV_VAR).unwrap_or_else(|_| "development".to_string());
        let paths = ConsolePaths::new(&root_dir)?;
        paths.ensure_directories()?;

        let config_store = ConfigStore::from_paths(&paths);
        let config = config_store
            .load_or_default(environment.clone())?
            .with_env_overrides();

        let token_store = Arc::new(FileTokenStore::new(paths.token_file()));
        let credentials = CredentialBroker::new(token_store)?;
        let gateway = Arc::new(BackendGateway::new(&config.backend, credentials.clone())?);
        log::info!(
            "Console initialized ({}) against {}",
            environment,
            gateway.base_url()
        );

        Ok(Self {
            paths,
            config_store,
            config,
            credentials,
            gateway,
            environment,
        })
    }

    /// Initialize under the default console home.
    pub fn from_env() -> ConsoleResult<Self> {
        let paths = ConsolePaths::from_env()?;
        Self::initialize(paths.root_dir().to_path_buf())
    }

    pub fn gateway(&self) -> &Arc<BackendGateway> {
        &self.gateway
    }

    pub fn credentials(&self) -> &CredentialBroker {
        &self.credentials
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn paths(&self) -> &ConsolePaths {
        &self.paths
    }

    /// Persist a config change and rebuild the gateway so it takes effect.
    /// The credential broker is kept, so the session survives. Env overrides
    /// still win over the stored values.
    pub fn update_config<F>(&mut self, updater: F) -> ConsoleResult<&ConsoleConfig>
    where
        F: FnOnce(&mut ConsoleConfig) -> ConsoleResult<()>,
    {
        let updated = self
            .config_store
            .update(self.environment.clone(), updater)?
            .with_env_overrides();
        self.gateway = Arc::new(BackendGateway::new(
            &updated.backend,
            self.credentials.clone(),
        )?);
        self.config = updated;
        Ok(&self.config)
    }
}
