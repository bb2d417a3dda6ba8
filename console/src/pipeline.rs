//! Sequential installation of the node's external components.

use std::future::Future;

use serde::Serialize;

use crate::api::NodeApi;
use crate::errors::{ConsoleError, ConsoleResult};
use crate::snapshot::DependenciesInstalled;

/// A catalog entry. Adding a component only requires a new entry here and a
/// backend that understands its id.
#[derive(Debug, Clone, Copy)]
pub struct InstallableComponent {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    /// Advisory only; never enforced.
    pub estimated_size_mb: u32,
    pub is_installed: fn(&DependenciesInstalled) -> bool,
}

pub fn default_catalog() -> Vec<InstallableComponent> {
    vec![
        InstallableComponent {
            id: "binary",
            display_name: "Tickfy Blockchain",
            description: "Main node binary",
            estimated_size_mb: 123,
            is_installed: |deps| deps.binary,
        },
        InstallableComponent {
            id: "cosmovisor",
            display_name: "Cosmovisor",
            description: "Automatic upgrade manager",
            estimated_size_mb: 15,
            is_installed: |deps| deps.upgrade_manager,
        },
    ]
}

/// Performs installs and reports what is already present.
pub trait ComponentInstaller: Send + Sync {
    fn installed_components(
        &self,
    ) -> impl Future<Output = ConsoleResult<DependenciesInstalled>> + Send;

    fn install(&self, component_id: &str) -> impl Future<Output = ConsoleResult<()>> + Send;
}

impl<T: NodeApi> ComponentInstaller for T {
    async fn installed_components(&self) -> ConsoleResult<DependenciesInstalled> {
        let status = self.dependency_status().await?;
        Ok(DependenciesInstalled::from(&status))
    }

    async fn install(&self, component_id: &str) -> ConsoleResult<()> {
        let ack = self.install_dependency(component_id).await?;
        if let Some(message) = ack.message {
            log::debug!("Install {}: {}", component_id, message);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InstallEvent {
    Started {
        id: &'static str,
        display_name: &'static str,
    },
    Installed {
        id: &'static str,
        progress: u8,
    },
    Failed {
        id: &'static str,
        display_name: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InstallReport {
    AlreadyInstalled,
    Completed { installed: Vec<&'static str> },
}

pub struct DependencyInstallPipeline {
    catalog: Vec<InstallableComponent>,
    installed: Vec<bool>,
    progress: u8,
}

impl DependencyInstallPipeline {
    pub fn new(catalog: Vec<InstallableComponent>) -> Self {
        let installed = vec![false; catalog.len()];
        Self {
            catalog,
            installed,
            progress: 0,
        }
    }

    pub fn with_default_catalog() -> Self {
        Self::new(default_catalog())
    }

    /// Apply a dependency status. `None` (probe failed) marks everything
    /// pending, as on a first run.
    pub fn apply_status(&mut self, status: Option<&DependenciesInstalled>) {
        for (slot, component) in self.installed.iter_mut().zip(&self.catalog) {
            *slot = status.is_some_and(|s| (component.is_installed)(s));
        }
    }

    pub async fn refresh<I: ComponentInstaller>(&mut self, installer: &I) {
        match installer.installed_components().await {
            Ok(status) => self.apply_status(Some(&status)),
            Err(e) => {
                log::info!("Dependency status unavailable, assuming first run: {}", e);
                self.apply_status(None);
            }
        }
    }

    pub fn pending(&self) -> Vec<&InstallableComponent> {
        self.catalog
            .iter()
            .zip(&self.installed)
            .filter(|(_, installed)| !**installed)
            .map(|(component, _)| component)
            .collect()
    }

    pub fn all_installed(&self) -> bool {
        self.installed.iter().all(|i| *i)
    }

    pub fn is_installed(&self, component_id: &str) -> bool {
        self.catalog
            .iter()
            .position(|c| c.id == component_id)
            .is_some_and(|i| self.installed[i])
    }

    pub fn estimated_size_mb(&self) -> u32 {
        self.pending().iter().map(|c| c.estimated_size_mb).sum()
    }

    /// Percentage of the last run's pending set that finished.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Re-probe, then install every pending component in catalog order.
    /// Halts on the first failure; components installed before it stay
    /// installed.
    pub async fn run<I, F>(&mut self, installer: &I, mut observer: F) -> ConsoleResult<InstallReport>
    where
        I: ComponentInstaller,
        F: FnMut(&InstallEvent),
    {
        self.refresh(installer).await;
        let pending: Vec<usize> = (0..self.catalog.len())
            .filter(|i| !self.installed[*i])
            .collect();
        if pending.is_empty() {
            self.progress = 100;
            return Ok(InstallReport::AlreadyInstalled);
        }

        self.progress = 0;
        let total = pending.len();
        let mut done = Vec::with_capacity(total);

        for index in pending {
            let component = self.catalog[index];
            observer(&InstallEvent::Started {
                id: component.id,
                display_name: component.display_name,
            });
            log::info!("Installing {}", component.display_name);

            if let Err(e) = installer.install(component.id).await {
                let reason = e.to_string();
                log::error!("Failed to install {}: {}", component.display_name, reason);
                observer(&InstallEvent::Failed {
                    id: component.id,
                    display_name: component.display_name,
                    reason: reason.clone(),
                });
                return Err(ConsoleError::InstallFailed {
                    component: component.display_name.to_string(),
                    reason,
                });
            }

            self.installed[index] = true;
            done.push(component.id);
            self.progress = ((100 * done.len()) as f64 / total as f64).round() as u8;
            observer(&InstallEvent::Installed {
                id: component.id,
                progress: self.progress,
            });
        }

        Ok(InstallReport::Completed { installed: done })
    }
}
