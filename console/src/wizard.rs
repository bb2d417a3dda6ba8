//! Three-stage validator provisioning: pick a wallet, initialize the node,
//! create the validator.
//!
//! Backend truth always wins over wizard-local progress: whenever a snapshot
//! says the node is already initialized, the init stage is skipped, and once
//! the account is a validator the wizard only shows the completed summary.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::api::types::{BalanceResponse, Wallet};
use crate::api::{NodeApi, ValidatorApi, WalletApi};
use crate::confirm::{gated, ConfirmationGate, DestructiveAction, GateOutcome};
use crate::errors::{ConsoleError, ConsoleResult};
use crate::snapshot::StatusSnapshot;
use crate::validation;

pub const COMMISSION_PRESETS: [u8; 4] = [5, 10, 15, 20];
pub const DEFAULT_COMMISSION_PERCENT: u8 = 10;

const MONIKER_PREFIXES: [&str; 10] = [
    "alfa", "beta", "gamma", "delta", "epsilon", "zeta", "theta", "lambda", "omega", "sigma",
];
const MONIKER_WORDS: [&str; 40] = [
    "nova", "star", "moon", "sun", "sky", "cloud", "storm", "wind", "fire", "ice", "rock", "wave",
    "peak", "vale", "river", "lake", "ocean", "forest", "desert", "mountain", "tiger", "eagle",
    "wolf", "bear", "lion", "hawk", "phoenix", "dragon", "falcon", "panther", "cyber", "crypto",
    "chain", "block", "node", "hash", "stake", "yield", "vault", "nexus",
];

/// `prefix-word-word`, e.g. `omega-storm-falcon`.
pub fn random_moniker<R: Rng + ?Sized>(rng: &mut R) -> String {
    let prefix = MONIKER_PREFIXES[rng.gen_range(0..MONIKER_PREFIXES.len())];
    let first = MONIKER_WORDS[rng.gen_range(0..MONIKER_WORDS.len())];
    let second = MONIKER_WORDS[rng.gen_range(0..MONIKER_WORDS.len())];
    format!("{}-{}-{}", prefix, first, second)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardStage {
    SelectWallet,
    InitNode,
    CreateValidator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardView {
    Stage(WizardStage),
    /// Already a validator; only "delete configuration" is offered.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommissionChoice {
    Preset(u8),
    Custom(String),
}

impl Default for CommissionChoice {
    fn default() -> Self {
        CommissionChoice::Preset(DEFAULT_COMMISSION_PERCENT)
    }
}

impl CommissionChoice {
    /// Resolve to a percentage. An empty custom value means the default.
    pub fn percent(&self) -> ConsoleResult<f64> {
        match self {
            CommissionChoice::Preset(p) if COMMISSION_PRESETS.contains(p) => Ok(f64::from(*p)),
            CommissionChoice::Preset(p) => Err(ConsoleError::InvalidCommission(format!(
                "{}% is not one of the presets",
                p
            ))),
            CommissionChoice::Custom(text) if text.trim().is_empty() => {
                Ok(f64::from(DEFAULT_COMMISSION_PERCENT))
            }
            CommissionChoice::Custom(text) => validation::parse_commission_percent(text),
        }
    }
}

/// Percent to the decimal rate string the backend expects (10 -> "0.1").
pub fn commission_rate(percent: f64) -> String {
    let rate = percent / 100.0;
    // "-0" parses as zero but must not reach the backend with its sign.
    if rate == 0.0 {
        return "0".to_string();
    }
    rate.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardState {
    pub stage: WizardStage,
    pub wallets: Vec<Wallet>,
    pub active_wallet_id: Option<String>,
    pub selected_wallet_id: Option<String>,
    pub moniker: String,
    pub commission: CommissionChoice,
    pub stake_input: String,
    pub website: Option<String>,
    pub details: Option<String>,
    pub balance: Option<BalanceResponse>,
}

pub struct ProvisioningWizard<'a, B> {
    api: &'a B,
    state: WizardState,
    node_initialized: bool,
    is_validator: bool,
}

impl<'a, B> ProvisioningWizard<'a, B>
where
    B: WalletApi + NodeApi + ValidatorApi,
{
    /// Open the wizard against the latest snapshot.
    pub async fn enter<R: Rng + ?Sized>(
        api: &'a B,
        snapshot: &StatusSnapshot,
        rng: &mut R,
    ) -> Self {
        let mut wizard = Self {
            api,
            state: WizardState {
                stage: WizardStage::SelectWallet,
                wallets: Vec::new(),
                active_wallet_id: None,
                selected_wallet_id: None,
                moniker: random_moniker(rng),
                commission: CommissionChoice::default(),
                stake_input: validation::MIN_STAKE.to_string(),
                website: None,
                details: None,
                balance: None,
            },
            node_initialized: false,
            is_validator: false,
        };
        wizard.reload_wallets().await;
        wizard.observe(snapshot).await;
        if wizard.node_initialized && wizard.state.stage == WizardStage::SelectWallet {
            wizard.advance_to_create_validator().await;
        }
        wizard
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn stage(&self) -> WizardStage {
        self.state.stage
    }

    pub fn view(&self) -> WizardView {
        if self.is_validator {
            WizardView::Completed
        } else {
            WizardView::Stage(self.state.stage)
        }
    }

    /// Re-apply backend truth after a refresh.
    pub async fn observe(&mut self, snapshot: &StatusSnapshot) {
        self.is_validator = snapshot.is_validator;
        self.node_initialized = snapshot.is_node_initialized;
        if self.node_initialized {
            if let Some(moniker) = &snapshot.moniker {
                self.state.moniker = moniker.clone();
            }
            if self.state.stage == WizardStage::InitNode {
                self.advance_to_create_validator().await;
            }
        }
    }

    /// List wallets; a failed listing shows as empty.
    pub async fn reload_wallets(&mut self) {
        match self.api.wallets().await {
            Ok(listing) => {
                self.state.selected_wallet_id = listing.active_wallet_id.clone();
                self.state.active_wallet_id = listing.active_wallet_id;
                self.state.wallets = listing.wallets;
            }
            Err(e) => {
                log::warn!("Failed to list wallets: {}", e);
                self.state.wallets.clear();
            }
        }
    }

    pub fn select_wallet(&mut self, wallet_id: &str) -> ConsoleResult<()> {
        if !self.state.wallets.iter().any(|w| w.id == wallet_id) {
            return Err(ConsoleError::NotFound(format!("wallet {}", wallet_id)));
        }
        self.state.selected_wallet_id = Some(wallet_id.to_string());
        Ok(())
    }

    /// Leave the wallet stage, activating the selection if it changed.
    pub async fn confirm_wallet(&mut self) -> ConsoleResult<WizardStage> {
        self.require_stage(WizardStage::SelectWallet)?;
        if self.state.wallets.is_empty() {
            return Err(ConsoleError::NoWallets);
        }
        let selected = self
            .state
            .selected_wallet_id
            .clone()
            .ok_or_else(|| ConsoleError::ValidationError("Select a wallet".to_string()))?;

        if self.state.active_wallet_id.as_deref() != Some(selected.as_str()) {
            self.api.set_active_wallet(&selected).await?;
            log::info!("Active wallet set to {}", selected);
            self.state.active_wallet_id = Some(selected);
        }

        if self.node_initialized {
            self.advance_to_create_validator().await;
        } else {
            self.state.stage = WizardStage::InitNode;
        }
        Ok(self.state.stage)
    }

    pub fn set_moniker(&mut self, moniker: &str) {
        self.state.moniker = moniker.to_string();
    }

    pub fn regenerate_moniker<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &str {
        self.state.moniker = random_moniker(rng);
        &self.state.moniker
    }

    /// Initialize the node with the current moniker.
    pub async fn confirm_moniker(&mut self) -> ConsoleResult<WizardStage> {
        self.require_stage(WizardStage::InitNode)?;
        let moniker = self.state.moniker.trim().to_string();
        validation::validate_moniker(&moniker)?;

        self.api.init_node(&moniker).await?;
        log::info!("Node initialized as {}", moniker);
        self.state.moniker = moniker;
        self.node_initialized = true;
        self.advance_to_create_validator().await;
        Ok(self.state.stage)
    }

    pub fn choose_commission(&mut self, choice: CommissionChoice) {
        self.state.commission = choice;
    }

    pub fn set_stake(&mut self, stake: &str) {
        self.state.stake_input = stake.to_string();
    }

    pub fn set_website(&mut self, website: &str) {
        self.state.website = Some(website.trim().to_string()).filter(|w| !w.is_empty());
    }

    pub fn set_details(&mut self, details: &str) {
        self.state.details = Some(details.trim().to_string()).filter(|d| !d.is_empty());
    }

    /// Submit the validator. Commission is checked before stake and both
    /// before any backend call.
    pub async fn create_validator(&mut self) -> ConsoleResult<()> {
        self.require_stage(WizardStage::CreateValidator)?;
        let percent = self.state.commission.percent()?;
        let stake = validation::parse_stake(&self.state.stake_input)?;
        let moniker = self.state.moniker.trim().to_string();
        validation::validate_moniker(&moniker)?;

        let rate = commission_rate(percent);
        self.api
            .create_validator(&moniker, &rate, &stake.to_string())
            .await?;
        log::info!(
            "Validator {} created with {}% commission and {} TKFY stake",
            moniker,
            percent,
            stake
        );
        self.is_validator = true;
        Ok(())
    }

    /// Step back one visible stage.
    pub fn back(&mut self) -> WizardStage {
        self.state.stage = match self.state.stage {
            WizardStage::CreateValidator if self.node_initialized => WizardStage::SelectWallet,
            WizardStage::CreateValidator => WizardStage::InitNode,
            WizardStage::InitNode | WizardStage::SelectWallet => WizardStage::SelectWallet,
        };
        self.state.stage
    }

    /// The backend has no endpoint for this yet; confirming reports that.
    pub async fn delete_configuration<G: ConfirmationGate>(
        &self,
        gate: &G,
    ) -> ConsoleResult<GateOutcome<()>> {
        gated(gate, &DestructiveAction::DeleteValidatorConfiguration, || async {
            Err(ConsoleError::Unsupported(
                "deleting the validator configuration".to_string(),
            ))
        })
        .await
    }

    /// Refresh the displayed balance; failures leave it unchanged.
    pub async fn load_balance(&mut self) {
        match self.api.balance().await {
            Ok(balance) => self.state.balance = Some(balance),
            Err(e) => log::debug!("Balance unavailable: {}", e),
        }
    }

    async fn advance_to_create_validator(&mut self) {
        self.state.stage = WizardStage::CreateValidator;
        self.load_balance().await;
    }

    fn require_stage(&self, stage: WizardStage) -> ConsoleResult<()> {
        if self.is_validator {
            return Err(ConsoleError::ValidationError(
                "This account is already a validator".to_string(),
            ));
        }
        if self.state.stage != stage {
            return Err(ConsoleError::ValidationError(format!(
                "{:?} is not the current step",
                stage
            )));
        }
        Ok(())
    }
}
