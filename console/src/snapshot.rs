//! Point-in-time view of backend-observed truth.

use serde::{Deserialize, Serialize};

use crate::api::types::{DependencyStatusResponse, NodeStatusResponse};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependenciesInstalled {
    pub binary: bool,
    pub upgrade_manager: bool,
}

impl DependenciesInstalled {
    pub fn all(&self) -> bool {
        self.binary && self.upgrade_manager
    }
}

impl From<&DependencyStatusResponse> for DependenciesInstalled {
    fn from(status: &DependencyStatusResponse) -> Self {
        Self {
            binary: status.is_node_installed,
            upgrade_manager: status.is_cosmovisor_installed,
        }
    }
}

/// Immutable snapshot; refreshes replace it wholesale.
///
/// Fields are raw observations and may be mutually inconsistent (for example
/// `is_validator` without `has_wallet` after an external wipe).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub dependencies_installed: DependenciesInstalled,
    pub auth_configured: bool,
    pub has_wallet: bool,
    pub active_wallet_address: Option<String>,
    pub is_node_initialized: bool,
    pub is_node_running: bool,
    pub is_validator: bool,
    pub moniker: Option<String>,
    pub current_block: u64,
    pub peer_count: u32,
}

impl StatusSnapshot {
    pub fn compose(
        dependencies: DependenciesInstalled,
        auth_configured: bool,
        node: &NodeStatusResponse,
    ) -> Self {
        Self {
            dependencies_installed: dependencies,
            auth_configured,
            has_wallet: node.has_wallet,
            active_wallet_address: node.wallet_address.clone(),
            is_node_initialized: node.is_node_initialized,
            is_node_running: node.is_node_running,
            is_validator: node.is_validator,
            moniker: node.moniker.clone(),
            current_block: node.current_block,
            peer_count: node.peers,
        }
    }

    /// Build from `/node/status` alone; its dependency flags are authoritative.
    pub fn from_node_status(node: &NodeStatusResponse, auth_configured: bool) -> Self {
        let dependencies = DependenciesInstalled {
            binary: node.is_node_installed,
            upgrade_manager: node.is_cosmovisor_installed,
        };
        Self::compose(dependencies, auth_configured, node)
    }

    pub fn setup_complete(&self) -> bool {
        self.has_wallet && self.is_node_initialized && self.is_validator
    }
}
