//! Confirmation gate in front of irreversible or fund-moving actions.

use std::future::Future;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::errors::ConsoleResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestructiveAction {
    WithdrawRewards,
    RestakeRewards,
    DeleteWallet { name: String },
    DeleteValidatorConfiguration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Danger,
}

impl DestructiveAction {
    pub fn title(&self) -> &'static str {
        match self {
            DestructiveAction::WithdrawRewards => "Withdraw rewards",
            DestructiveAction::RestakeRewards => "Restake rewards",
            DestructiveAction::DeleteWallet { .. } => "Remove wallet",
            DestructiveAction::DeleteValidatorConfiguration => "Delete configuration",
        }
    }

    pub fn default_message(&self) -> String {
        match self {
            DestructiveAction::WithdrawRewards => "Withdraw all of your validator rewards? \
                The tokens will be transferred to your wallet."
                .to_string(),
            DestructiveAction::RestakeRewards => {
                "Restake all of your validator rewards into your self-delegation?".to_string()
            }
            DestructiveAction::DeleteWallet { name } => format!(
                "Remove the wallet \"{}\"? You will need its 24 words to add it again.",
                name
            ),
            DestructiveAction::DeleteValidatorConfiguration => {
                "Delete the whole validator configuration? This cannot be undone.".to_string()
            }
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DestructiveAction::WithdrawRewards | DestructiveAction::RestakeRewards => Severity::Info,
            _ => Severity::Danger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Confirmed,
    Declined,
}

/// Asks the operator. Implemented by whatever renders the prompt.
pub trait ConfirmationGate: Send + Sync {
    fn request_confirmation(
        &self,
        action: &DestructiveAction,
        message: &str,
    ) -> impl Future<Output = Decision> + Send;
}

/// Answers every prompt the same way and remembers what was asked.
#[derive(Debug)]
pub struct FixedDecision {
    decision: Decision,
    asked: Mutex<Vec<DestructiveAction>>,
}

impl FixedDecision {
    pub fn new(decision: Decision) -> Self {
        Self {
            decision,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn confirm() -> Self {
        Self::new(Decision::Confirmed)
    }

    pub fn decline() -> Self {
        Self::new(Decision::Declined)
    }

    pub fn asked(&self) -> Vec<DestructiveAction> {
        self.asked.lock().clone()
    }
}

impl ConfirmationGate for FixedDecision {
    async fn request_confirmation(&self, action: &DestructiveAction, _message: &str) -> Decision {
        self.asked.lock().push(action.clone());
        self.decision
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome<T> {
    Declined,
    Completed(T),
}

impl<T> GateOutcome<T> {
    pub fn is_declined(&self) -> bool {
        matches!(self, GateOutcome::Declined)
    }
}

/// Run `call` only if the operator confirms `action`.
pub async fn gated<G, F, Fut, T>(
    gate: &G,
    action: &DestructiveAction,
    call: F,
) -> ConsoleResult<GateOutcome<T>>
where
    G: ConfirmationGate,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ConsoleResult<T>>,
{
    let message = action.default_message();
    match gate.request_confirmation(action, &message).await {
        Decision::Declined => {
            log::debug!("{} declined", action.title());
            Ok(GateOutcome::Declined)
        }
        Decision::Confirmed => call().await.map(GateOutcome::Completed),
    }
}
