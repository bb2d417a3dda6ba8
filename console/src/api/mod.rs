//! Typed seams over the validator backend REST API.
//!
//! `BackendGateway` is the production implementation. Components depend on
//! the narrowest trait they need so tests can substitute fakes.

pub mod types;

use std::future::Future;

use crate::errors::ConsoleResult;
use types::{
    Acknowledgement, AuthStatusResponse, BalanceResponse, CreatedWallet,
    DependencyStatusResponse, ImportedWallet, LogTailResponse, NodeStatusResponse,
    StakingInfoResponse, TokenResponse, WalletListResponse,
};

/// Unauthenticated endpoints used before a session exists.
pub trait AuthApi: Send + Sync {
    fn auth_status(&self) -> impl Future<Output = ConsoleResult<AuthStatusResponse>> + Send;

    fn setup(&self, password: &str) -> impl Future<Output = ConsoleResult<TokenResponse>> + Send;

    fn login(&self, password: &str) -> impl Future<Output = ConsoleResult<TokenResponse>> + Send;
}

pub trait NodeApi: Send + Sync {
    fn dependency_status(
        &self,
    ) -> impl Future<Output = ConsoleResult<DependencyStatusResponse>> + Send;

    fn install_dependency(
        &self,
        component: &str,
    ) -> impl Future<Output = ConsoleResult<Acknowledgement>> + Send;

    fn node_status(&self) -> impl Future<Output = ConsoleResult<NodeStatusResponse>> + Send;

    fn init_node(
        &self,
        moniker: &str,
    ) -> impl Future<Output = ConsoleResult<Acknowledgement>> + Send;

    fn start_node(&self) -> impl Future<Output = ConsoleResult<Acknowledgement>> + Send;

    fn stop_node(&self) -> impl Future<Output = ConsoleResult<Acknowledgement>> + Send;

    fn node_logs(&self) -> impl Future<Output = ConsoleResult<LogTailResponse>> + Send;
}

pub trait WalletApi: Send + Sync {
    fn wallets(&self) -> impl Future<Output = ConsoleResult<WalletListResponse>> + Send;

    /// Privileged: carries the signing password.
    fn create_wallet(
        &self,
        name: &str,
    ) -> impl Future<Output = ConsoleResult<CreatedWallet>> + Send;

    /// Privileged: carries the signing password.
    fn import_wallet(
        &self,
        name: &str,
        mnemonic: &str,
    ) -> impl Future<Output = ConsoleResult<ImportedWallet>> + Send;

    fn set_active_wallet(
        &self,
        wallet_id: &str,
    ) -> impl Future<Output = ConsoleResult<Acknowledgement>> + Send;

    fn delete_wallet(
        &self,
        wallet_id: &str,
    ) -> impl Future<Output = ConsoleResult<Acknowledgement>> + Send;

    fn balance(&self) -> impl Future<Output = ConsoleResult<BalanceResponse>> + Send;
}

pub trait ValidatorApi: Send + Sync {
    /// Privileged: carries the signing password.
    fn create_validator(
        &self,
        moniker: &str,
        commission: &str,
        stake_amount: &str,
    ) -> impl Future<Output = ConsoleResult<Acknowledgement>> + Send;

    fn staking_info(&self) -> impl Future<Output = ConsoleResult<StakingInfoResponse>> + Send;

    /// Privileged: carries the signing password.
    fn withdraw_rewards(&self) -> impl Future<Output = ConsoleResult<Acknowledgement>> + Send;

    /// Privileged: carries the signing password.
    fn restake_rewards(&self) -> impl Future<Output = ConsoleResult<Acknowledgement>> + Send;
}

/// The full backend surface.
pub trait Backend: AuthApi + NodeApi + WalletApi + ValidatorApi {}

impl<T> Backend for T where T: AuthApi + NodeApi + WalletApi + ValidatorApi {}
