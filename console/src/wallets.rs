//! Wallet management screen: list, create, import and remove wallets.
//!
//! Wallets live in the backend; this keeps only the last fetched listing.

use crate::api::types::{CreatedWallet, ImportedWallet, Wallet, WalletListResponse};
use crate::api::WalletApi;
use crate::confirm::{gated, ConfirmationGate, DestructiveAction, GateOutcome};
use crate::errors::{ConsoleError, ConsoleResult};
use crate::validation;

pub struct WalletManager<'a, W> {
    api: &'a W,
    listing: WalletListResponse,
}

impl<'a, W: WalletApi> WalletManager<'a, W> {
    pub fn new(api: &'a W) -> Self {
        Self {
            api,
            listing: WalletListResponse::default(),
        }
    }

    /// Re-fetch the listing. On failure the previous listing is kept.
    pub async fn refresh(&mut self) -> ConsoleResult<()> {
        self.listing = self.api.wallets().await?;
        Ok(())
    }

    async fn refresh_after_mutation(&mut self) {
        if let Err(e) = self.refresh().await {
            log::warn!("Failed to reload wallets: {}", e);
        }
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.listing.wallets
    }

    pub fn active_wallet_id(&self) -> Option<&str> {
        self.listing.active_wallet_id.as_deref()
    }

    /// Create a wallet. The returned mnemonic is shown once; it is not kept.
    pub async fn create(&mut self, name: &str) -> ConsoleResult<CreatedWallet> {
        validation::validate_wallet_name(name)?;
        let created = self.api.create_wallet(name.trim()).await?;
        log::info!("Created wallet {}", created.address);
        self.refresh_after_mutation().await;
        Ok(created)
    }

    pub async fn import(&mut self, name: &str, mnemonic: &str) -> ConsoleResult<ImportedWallet> {
        validation::validate_wallet_name(name)?;
        let mnemonic = zeroize::Zeroizing::new(validation::normalize_mnemonic(mnemonic)?);
        let imported = self.api.import_wallet(name.trim(), &mnemonic).await?;
        log::info!("Imported wallet {}", name.trim());
        self.refresh_after_mutation().await;
        Ok(imported)
    }

    /// Remove a wallet after the operator confirms.
    pub async fn delete<G: ConfirmationGate>(
        &mut self,
        gate: &G,
        wallet_id: &str,
    ) -> ConsoleResult<GateOutcome<()>> {
        let name = self
            .listing
            .find(wallet_id)
            .map(|w| w.name.clone())
            .ok_or_else(|| ConsoleError::NotFound(format!("wallet {}", wallet_id)))?;

        let api = self.api;
        let outcome = gated(gate, &DestructiveAction::DeleteWallet { name }, || async move {
            api.delete_wallet(wallet_id).await.map(|_| ())
        })
        .await?;

        if !outcome.is_declined() {
            log::info!("Removed wallet {}", wallet_id);
            self.refresh_after_mutation().await;
        }
        Ok(outcome)
    }
}
