// lib.rs - Core library structure for the validator console

pub mod api;
pub mod app_state;
pub mod backend_client;
pub mod config_store;
pub mod confirm;
pub mod dashboard;
pub mod errors;
pub mod navigation;
pub mod pipeline;
pub mod reconcile;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod validation;
pub mod wallets;
pub mod wizard;

#[cfg(test)]
pub(crate) mod testing;

// Re-export common types
pub use api::types::*;
pub use api::{AuthApi, Backend, NodeApi, ValidatorApi, WalletApi};
pub use app_state::ConsoleContext;
pub use backend_client::BackendGateway;
pub use config_store::{BackendConfig, ConfigStore, ConsoleConfig, PollingConfig};
pub use confirm::{ConfirmationGate, Decision, DestructiveAction, FixedDecision, GateOutcome};
pub use dashboard::{DashboardActions, DashboardFeed, DashboardPoller, DashboardState};
pub use errors::{ConsoleError, ConsoleResult};
pub use pipeline::{DependencyInstallPipeline, InstallEvent, InstallReport, InstallableComponent};
pub use reconcile::{derive_step, reconcile, Observation, Probe, Reconciliation, Step};
pub use session::CredentialBroker;
pub use snapshot::{DependenciesInstalled, StatusSnapshot};
pub use storage::{ConsolePaths, FileTokenStore, MemoryTokenStore, TokenStore};
pub use wallets::WalletManager;
pub use wizard::{CommissionChoice, ProvisioningWizard, WizardStage, WizardView};
