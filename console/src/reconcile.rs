//! Derives which screen the console should show from backend-observed truth.
//!
//! There is no stored "current step": every decision is recomputed from a
//! fresh [`Observation`], so reloading after a crash or a half-finished setup
//! lands on the same screen as before.

use serde::{Deserialize, Serialize};

use crate::api::types::NodeStatusResponse;
use crate::api::{AuthApi, NodeApi};
use crate::session::CredentialBroker;
use crate::snapshot::{DependenciesInstalled, StatusSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    Loading,
    InstallDependencies,
    FirstRunSetup,
    Login,
    Wallet,
    NodeSetup,
    Dashboard,
}

impl Step {
    /// Steps that require a session.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Step::Wallet | Step::NodeSetup | Step::Dashboard)
    }
}

/// Outcome of a single backend probe.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Probe<T> {
    #[default]
    Pending,
    Failed(String),
    Observed(T),
}

impl<T> Probe<T> {
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Probe::Observed(value),
            Err(err) => Probe::Failed(err.to_string()),
        }
    }

    pub fn observed(&self) -> Option<&T> {
        match self {
            Probe::Observed(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Probe::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    pub dependencies: Probe<DependenciesInstalled>,
    pub auth_configured: Probe<bool>,
    pub node_status: Probe<NodeStatusResponse>,
}

/// Pure step derivation. First matching rule wins.
pub fn derive_step(observation: &Observation, has_stored_token: bool) -> Step {
    match &observation.dependencies {
        Probe::Pending => return Step::Loading,
        Probe::Failed(_) => return Step::InstallDependencies,
        Probe::Observed(deps) if !deps.all() => return Step::InstallDependencies,
        Probe::Observed(_) => {}
    }

    match &observation.auth_configured {
        Probe::Pending => return Step::Loading,
        Probe::Failed(_) | Probe::Observed(false) => return Step::FirstRunSetup,
        Probe::Observed(true) => {}
    }

    if !has_stored_token {
        return Step::Login;
    }

    match &observation.node_status {
        Probe::Pending => Step::Loading,
        Probe::Failed(_) => Step::Login,
        Probe::Observed(_) => Step::Dashboard,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub step: Step,
    pub observation: Observation,
    /// Present once `/node/status` has been observed.
    pub snapshot: Option<StatusSnapshot>,
    /// A probe failure worth showing the operator.
    pub notice: Option<String>,
}

impl Reconciliation {
    fn settle(observation: Observation, has_stored_token: bool, notice: Option<String>) -> Self {
        let step = derive_step(&observation, has_stored_token);
        let snapshot = match (&observation.dependencies, &observation.node_status) {
            (Probe::Observed(deps), Probe::Observed(node)) => Some(StatusSnapshot::compose(
                *deps,
                observation.auth_configured.observed().copied().unwrap_or(false),
                node,
            )),
            _ => None,
        };
        log::debug!("Reconciled to {:?}", step);
        Self {
            step,
            observation,
            snapshot,
            notice,
        }
    }
}

/// Probe the backend in order, stopping as soon as the step is decided.
///
/// A failed `/node/status` with a token in hand means the token is no longer
/// accepted, so it is invalidated before returning `Login`.
pub async fn reconcile<B>(backend: &B, credentials: &CredentialBroker) -> Reconciliation
where
    B: AuthApi + NodeApi,
{
    let mut observation = Observation {
        dependencies: Probe::from_result(
            backend
                .dependency_status()
                .await
                .map(|status| DependenciesInstalled::from(&status)),
        ),
        ..Default::default()
    };
    if let Some(reason) = observation.dependencies.failure() {
        log::warn!("Dependency status probe failed: {}", reason);
    }
    if derive_step(&observation, false) == Step::InstallDependencies {
        return Reconciliation::settle(observation, credentials.has_stored_token(), None);
    }

    observation.auth_configured =
        Probe::from_result(backend.auth_status().await.map(|status| status.is_setup));
    if let Some(reason) = observation.auth_configured.failure() {
        log::warn!("Auth status probe failed: {}", reason);
        let notice = Some(reason.to_string());
        return Reconciliation::settle(observation, credentials.has_stored_token(), notice);
    }
    if observation.auth_configured == Probe::Observed(false) || !credentials.has_stored_token() {
        return Reconciliation::settle(observation, credentials.has_stored_token(), None);
    }

    observation.node_status = Probe::from_result(backend.node_status().await);
    if let Some(reason) = observation.node_status.failure() {
        log::warn!("Stored session rejected: {}", reason);
        credentials.invalidate_token();
    }
    Reconciliation::settle(observation, credentials.has_stored_token(), None)
}
