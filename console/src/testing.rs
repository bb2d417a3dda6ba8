//! In-memory backend used by unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use zeroize::Zeroizing;

use crate::api::types::{
    Acknowledgement, AuthStatusResponse, BalanceResponse, CreatedWallet,
    DependencyStatusResponse, ImportedWallet, LogTailResponse, NodeStatusResponse,
    StakingInfoResponse, TokenResponse, Wallet, WalletListResponse,
};
use crate::api::{AuthApi, NodeApi, ValidatorApi, WalletApi};
use crate::errors::{ConsoleError, ConsoleResult};

#[derive(Default)]
struct FakeState {
    auth_setup: bool,
    login_token: String,
    dependencies: DependencyStatusResponse,
    node: NodeStatusResponse,
    wallets: WalletListResponse,
    balance: Option<BalanceResponse>,
    staking: StakingInfoResponse,
    logs: Vec<String>,
    failures: HashMap<String, String>,
    holds: HashMap<String, Arc<Notify>>,
    releases: HashMap<String, Arc<Notify>>,
    calls: Vec<(String, Vec<String>)>,
}

pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    /// A fully installed, configured backend with no wallets.
    pub fn new() -> Self {
        let state = FakeState {
            auth_setup: true,
            login_token: "token".to_string(),
            dependencies: DependencyStatusResponse {
                is_node_installed: true,
                is_cosmovisor_installed: true,
            },
            node: NodeStatusResponse {
                is_node_installed: true,
                is_cosmovisor_installed: true,
                ..Default::default()
            },
            balance: Some(BalanceResponse {
                utkfy: Some(250_000_000_000),
                tkfy: 250_000.0,
                display: "250000.00 TKFY".to_string(),
            }),
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Make `method` (or `method:arg`) fail with a backend error.
    pub fn fail(&self, method: &str, message: &str) {
        self.state
            .lock()
            .failures
            .insert(method.to_string(), message.to_string());
    }

    pub fn recover(&self, method: &str) {
        self.state.lock().failures.remove(method);
    }

    /// `waiter` does not answer until `releaser` has been called.
    pub fn hold_until(&self, waiter: &str, releaser: &str) {
        let notify = Arc::new(Notify::new());
        let mut state = self.state.lock();
        state.holds.insert(waiter.to_string(), Arc::clone(&notify));
        state.releases.insert(releaser.to_string(), notify);
    }

    pub fn set_login_token(&self, token: &str) {
        self.state.lock().login_token = token.to_string();
    }

    pub fn set_auth_setup(&self, is_setup: bool) {
        self.state.lock().auth_setup = is_setup;
    }

    pub fn set_dependencies(&self, binary: bool, cosmovisor: bool) {
        let mut state = self.state.lock();
        state.dependencies = DependencyStatusResponse {
            is_node_installed: binary,
            is_cosmovisor_installed: cosmovisor,
        };
        state.node.is_node_installed = binary;
        state.node.is_cosmovisor_installed = cosmovisor;
    }

    pub fn update_node(&self, update: impl FnOnce(&mut NodeStatusResponse)) {
        update(&mut self.state.lock().node);
    }

    pub fn set_wallets(&self, wallets: Vec<Wallet>, active: Option<&str>) {
        let mut state = self.state.lock();
        state.node.has_wallet = !wallets.is_empty();
        state.wallets = WalletListResponse {
            wallets,
            active_wallet_id: active.map(str::to_string),
        };
    }

    pub fn set_logs(&self, logs: &[&str]) {
        self.state.lock().logs = logs.iter().map(|l| l.to_string()).collect();
    }

    pub fn set_balance(&self, balance: BalanceResponse) {
        self.state.lock().balance = Some(balance);
    }

    pub fn active_wallet_id(&self) -> Option<String> {
        self.state.lock().wallets.active_wallet_id.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|(name, _)| name == method)
            .count()
    }

    /// Arguments of every call to `method`, in order.
    pub fn calls(&self, method: &str) -> Vec<Vec<String>> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|(name, _)| name == method)
            .map(|(_, args)| args.clone())
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().calls.len()
    }

    async fn checkpoint(&self, method: &str) {
        let (hold, release) = {
            let state = self.state.lock();
            (
                state.holds.get(method).cloned(),
                state.releases.get(method).cloned(),
            )
        };
        if let Some(release) = release {
            release.notify_one();
        }
        if let Some(hold) = hold {
            hold.notified().await;
        }
    }

    fn enter<T>(
        &self,
        method: &str,
        args: &[&str],
        respond: impl FnOnce(&mut FakeState) -> T,
    ) -> ConsoleResult<T> {
        let mut state = self.state.lock();
        state.calls.push((
            method.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
        let keyed = args
            .first()
            .map(|arg| format!("{}:{}", method, arg))
            .unwrap_or_default();
        let failure = state
            .failures
            .get(method)
            .or_else(|| state.failures.get(&keyed))
            .cloned();
        if let Some(message) = failure {
            return Err(ConsoleError::Backend {
                status: 500,
                message,
            });
        }
        Ok(respond(&mut state))
    }
}

impl AuthApi for FakeBackend {
    async fn auth_status(&self) -> ConsoleResult<AuthStatusResponse> {
        self.enter("auth_status", &[], |s| AuthStatusResponse {
            is_setup: s.auth_setup,
        })
    }

    async fn setup(&self, password: &str) -> ConsoleResult<TokenResponse> {
        self.enter("setup", &[password], |s| {
            s.auth_setup = true;
            TokenResponse {
                token: s.login_token.clone(),
            }
        })
    }

    async fn login(&self, password: &str) -> ConsoleResult<TokenResponse> {
        self.enter("login", &[password], |s| TokenResponse {
            token: s.login_token.clone(),
        })
    }
}

impl NodeApi for FakeBackend {
    async fn dependency_status(&self) -> ConsoleResult<DependencyStatusResponse> {
        self.enter("dependency_status", &[], |s| s.dependencies.clone())
    }

    async fn install_dependency(&self, component: &str) -> ConsoleResult<Acknowledgement> {
        self.enter("install_dependency", &[component], |s| {
            match component {
                "binary" => {
                    s.dependencies.is_node_installed = true;
                    s.node.is_node_installed = true;
                }
                "cosmovisor" => {
                    s.dependencies.is_cosmovisor_installed = true;
                    s.node.is_cosmovisor_installed = true;
                }
                _ => {}
            }
            Acknowledgement::default()
        })
    }

    async fn node_status(&self) -> ConsoleResult<NodeStatusResponse> {
        self.checkpoint("node_status").await;
        self.enter("node_status", &[], |s| s.node.clone())
    }

    async fn init_node(&self, moniker: &str) -> ConsoleResult<Acknowledgement> {
        self.enter("init_node", &[moniker], |s| {
            s.node.is_node_initialized = true;
            s.node.moniker = Some(moniker.to_string());
            Acknowledgement::default()
        })
    }

    async fn start_node(&self) -> ConsoleResult<Acknowledgement> {
        self.enter("start_node", &[], |s| {
            s.node.is_node_running = true;
            Acknowledgement::default()
        })
    }

    async fn stop_node(&self) -> ConsoleResult<Acknowledgement> {
        self.enter("stop_node", &[], |s| {
            s.node.is_node_running = false;
            Acknowledgement::default()
        })
    }

    async fn node_logs(&self) -> ConsoleResult<LogTailResponse> {
        self.enter("node_logs", &[], |s| LogTailResponse {
            logs: s.logs.clone(),
        })
    }
}

impl WalletApi for FakeBackend {
    async fn wallets(&self) -> ConsoleResult<WalletListResponse> {
        self.enter("wallets", &[], |s| s.wallets.clone())
    }

    async fn create_wallet(&self, name: &str) -> ConsoleResult<CreatedWallet> {
        self.enter("create_wallet", &[name], |s| {
            let id = format!("w{}", s.wallets.wallets.len() + 1);
            let address = format!("tkfy1{}", name.to_lowercase());
            s.wallets.wallets.push(Wallet {
                id: id.clone(),
                name: name.to_string(),
                address: address.clone(),
            });
            if s.wallets.active_wallet_id.is_none() {
                s.wallets.active_wallet_id = Some(id.clone());
            }
            s.node.has_wallet = true;
            CreatedWallet {
                id: Some(id),
                address,
                mnemonic: Zeroizing::new("abandon ability able about".to_string()),
            }
        })
    }

    async fn import_wallet(&self, name: &str, mnemonic: &str) -> ConsoleResult<ImportedWallet> {
        self.enter("import_wallet", &[name, mnemonic], |s| {
            let id = format!("w{}", s.wallets.wallets.len() + 1);
            let address = format!("tkfy1{}", name.to_lowercase());
            s.wallets.wallets.push(Wallet {
                id: id.clone(),
                name: name.to_string(),
                address: address.clone(),
            });
            s.node.has_wallet = true;
            ImportedWallet {
                id: Some(id),
                address: Some(address),
            }
        })
    }

    async fn set_active_wallet(&self, wallet_id: &str) -> ConsoleResult<Acknowledgement> {
        self.enter("set_active_wallet", &[wallet_id], |s| {
            s.wallets.active_wallet_id = Some(wallet_id.to_string());
            Acknowledgement::default()
        })
    }

    async fn delete_wallet(&self, wallet_id: &str) -> ConsoleResult<Acknowledgement> {
        self.enter("delete_wallet", &[wallet_id], |s| {
            s.wallets.wallets.retain(|w| w.id != wallet_id);
            if s.wallets.active_wallet_id.as_deref() == Some(wallet_id) {
                s.wallets.active_wallet_id = None;
            }
            s.node.has_wallet = !s.wallets.wallets.is_empty();
            Acknowledgement::default()
        })
    }

    async fn balance(&self) -> ConsoleResult<BalanceResponse> {
        self.checkpoint("balance").await;
        let balance = self.enter("balance", &[], |s| s.balance.clone())?;
        balance.ok_or_else(|| ConsoleError::Backend {
            status: 404,
            message: "no active wallet".to_string(),
        })
    }
}

impl ValidatorApi for FakeBackend {
    async fn create_validator(
        &self,
        moniker: &str,
        commission: &str,
        stake_amount: &str,
    ) -> ConsoleResult<Acknowledgement> {
        self.enter(
            "create_validator",
            &[moniker, commission, stake_amount],
            |s| {
                s.node.is_validator = true;
                s.staking = StakingInfoResponse {
                    total_staked: format!("{} TKFY", stake_amount),
                    self_delegation: format!("{} TKFY", stake_amount),
                    delegations: "0 TKFY".to_string(),
                };
                Acknowledgement::default()
            },
        )
    }

    async fn staking_info(&self) -> ConsoleResult<StakingInfoResponse> {
        self.checkpoint("staking_info").await;
        self.enter("staking_info", &[], |s| s.staking.clone())
    }

    async fn withdraw_rewards(&self) -> ConsoleResult<Acknowledgement> {
        self.enter("withdraw_rewards", &[], |_| Acknowledgement::default())
    }

    async fn restake_rewards(&self) -> ConsoleResult<Acknowledgement> {
        self.enter("restake_rewards", &[], |_| Acknowledgement::default())
    }
}
