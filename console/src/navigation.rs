//! Menu entries and setup warnings derived from a status snapshot.

use serde::{Deserialize, Serialize};

use crate::errors::{ConsoleError, ConsoleResult};
use crate::reconcile::Step;
use crate::snapshot::StatusSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub step: Step,
    pub label: &'static str,
    pub description: &'static str,
    pub completed: bool,
}

pub fn menu(snapshot: Option<&StatusSnapshot>) -> Vec<MenuEntry> {
    let wallet_completed = snapshot.is_some_and(|s| s.has_wallet);
    let node_completed = snapshot.is_some_and(|s| s.is_validator);

    vec![
        MenuEntry {
            step: Step::Dashboard,
            label: "Dashboard",
            description: "Monitor your validator",
            completed: false,
        },
        MenuEntry {
            step: Step::Wallet,
            label: "Wallet",
            description: if wallet_completed {
                "Connected"
            } else {
                "Create or import a wallet"
            },
            completed: wallet_completed,
        },
        MenuEntry {
            step: Step::NodeSetup,
            label: "Node setup",
            description: if node_completed {
                "Configured"
            } else {
                "Set up node and validator"
            },
            completed: node_completed,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupWarning {
    WalletRequired,
    NodeSetupIncomplete { node_initialized: bool },
}

impl SetupWarning {
    /// Screen that resolves the warning.
    pub fn target(&self) -> Step {
        match self {
            SetupWarning::WalletRequired => Step::Wallet,
            SetupWarning::NodeSetupIncomplete { .. } => Step::NodeSetup,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SetupWarning::WalletRequired => "Create or import a wallet to continue",
            SetupWarning::NodeSetupIncomplete {
                node_initialized: false,
            } => "Initialize the node and create your validator in Node setup",
            SetupWarning::NodeSetupIncomplete {
                node_initialized: true,
            } => "Create your validator in Node setup",
        }
    }
}

pub fn setup_warnings(snapshot: &StatusSnapshot) -> Vec<SetupWarning> {
    if !snapshot.has_wallet {
        return vec![SetupWarning::WalletRequired];
    }
    if !snapshot.is_node_initialized || !snapshot.is_validator {
        return vec![SetupWarning::NodeSetupIncomplete {
            node_initialized: snapshot.is_node_initialized,
        }];
    }
    Vec::new()
}

pub fn can_start_node(snapshot: &StatusSnapshot) -> bool {
    snapshot.setup_complete()
}

/// Explicit menu navigation. Only authenticated screens can be selected and
/// only from an authenticated screen.
pub fn navigate(current: Step, target: Step) -> ConsoleResult<Step> {
    if !current.is_authenticated() {
        return Err(ConsoleError::Unauthorized(format!(
            "Cannot open {:?} before signing in",
            target
        )));
    }
    if !target.is_authenticated() {
        return Err(ConsoleError::ValidationError(format!(
            "{:?} is not reachable from the menu",
            target
        )));
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(wallet: bool, initialized: bool, validator: bool) -> StatusSnapshot {
        StatusSnapshot {
            has_wallet: wallet,
            is_node_initialized: initialized,
            is_validator: validator,
            ..Default::default()
        }
    }

    #[test]
    fn menu_completion_flags() {
        let entries = menu(Some(&snapshot(true, true, false)));
        assert!(entries[1].completed);
        assert!(!entries[2].completed);

        let entries = menu(None);
        assert!(entries.iter().all(|e| !e.completed));
    }

    #[test]
    fn warnings_point_at_the_fixing_screen() {
        let warnings = setup_warnings(&snapshot(false, false, true));
        assert_eq!(warnings, vec![SetupWarning::WalletRequired]);
        assert_eq!(warnings[0].target(), Step::Wallet);

        let warnings = setup_warnings(&snapshot(true, true, false));
        assert_eq!(
            warnings,
            vec![SetupWarning::NodeSetupIncomplete {
                node_initialized: true
            }]
        );
        assert_eq!(warnings[0].target(), Step::NodeSetup);

        assert!(setup_warnings(&snapshot(true, true, true)).is_empty());
    }

    #[test]
    fn start_requires_complete_setup() {
        assert!(!can_start_node(&snapshot(false, true, true)));
        assert!(!can_start_node(&snapshot(true, false, true)));
        assert!(can_start_node(&snapshot(true, true, true)));
    }

    #[test]
    fn navigation_is_limited_to_authenticated_screens() {
        assert_eq!(navigate(Step::Dashboard, Step::Wallet).unwrap(), Step::Wallet);
        assert!(navigate(Step::Login, Step::Dashboard).is_err());
        assert!(navigate(Step::Dashboard, Step::InstallDependencies).is_err());
    }
}
