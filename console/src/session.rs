use parking_lot::RwLock;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::api::AuthApi;
use crate::errors::{ConsoleError, ConsoleResult};
use crate::storage::TokenStore;
use crate::validation;

const SUGGESTED_PASSWORD_LENGTH: usize = 16;
const PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%&*";

#[derive(Default)]
struct Credentials {
    token: Option<SecretString>,
    signing_password: Option<SecretString>,
}

/// Owns the durable session token and the volatile signing password.
///
/// Cloning is cheap and every clone observes the same credentials, so a
/// logout through one handle is seen by the next call through any other.
#[derive(Clone)]
pub struct CredentialBroker {
    state: Arc<RwLock<Credentials>>,
    store: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for CredentialBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("CredentialBroker")
            .field("has_token", &state.token.is_some())
            .field("has_signing_password", &state.signing_password.is_some())
            .finish()
    }
}

impl CredentialBroker {
    /// Build a broker, restoring any token left in the durable store.
    pub fn new(store: Arc<dyn TokenStore>) -> ConsoleResult<Self> {
        let token = store
            .load()?
            .map(|token| SecretString::from(token.as_str().to_owned()));
        if token.is_some() {
            log::debug!("Restored session token from durable storage");
        }

        Ok(Self {
            state: Arc::new(RwLock::new(Credentials {
                token,
                signing_password: None,
            })),
            store,
        })
    }

    /// First-run setup: validates the new password locally, then registers it.
    pub async fn setup<A: AuthApi>(
        &self,
        api: &A,
        password: &str,
        confirmation: &str,
    ) -> ConsoleResult<Zeroizing<String>> {
        validation::validate_new_password(password, confirmation)?;
        let response = api.setup(password).await?;
        self.accept(response.token, password)
    }

    pub async fn login<A: AuthApi>(
        &self,
        api: &A,
        password: &str,
    ) -> ConsoleResult<Zeroizing<String>> {
        let response = api.login(password).await?;
        self.accept(response.token, password)
    }

    fn accept(&self, token: String, password: &str) -> ConsoleResult<Zeroizing<String>> {
        let token = Zeroizing::new(token);
        if token.is_empty() {
            return Err(ConsoleError::InvalidResponse(
                "Backend did not return a session token".to_string(),
            ));
        }

        self.store.save(&token)?;
        let mut state = self.state.write();
        state.token = Some(SecretString::from(token.as_str().to_owned()));
        state.signing_password = Some(SecretString::from(password.to_owned()));
        log::info!("Session established");
        Ok(token)
    }

    /// Clear both credentials. Local state is cleared even when the durable
    /// store fails.
    pub fn logout(&self) {
        {
            let mut state = self.state.write();
            state.token = None;
            state.signing_password = None;
        }
        if let Err(err) = self.store.clear() {
            log::warn!("Failed to clear stored session token: {}", err);
        }
        log::info!("Logged out");
    }

    /// Drop the token only, after the backend rejected it.
    pub fn invalidate_token(&self) {
        let had_token = self.state.write().token.take().is_some();
        if let Err(err) = self.store.clear() {
            log::warn!("Failed to clear stored session token: {}", err);
        }
        if had_token {
            log::info!("Session token rejected by backend; login required");
        }
    }

    pub fn has_stored_token(&self) -> bool {
        self.state.read().token.is_some()
    }

    /// The current token, or an empty string.
    pub fn current_token(&self) -> Zeroizing<String> {
        let state = self.state.read();
        Zeroizing::new(
            state
                .token
                .as_ref()
                .map(|t| t.expose_secret().to_owned())
                .unwrap_or_default(),
        )
    }

    /// The current signing password, or an empty string.
    pub fn current_password(&self) -> Zeroizing<String> {
        let state = self.state.read();
        Zeroizing::new(
            state
                .signing_password
                .as_ref()
                .map(|p| p.expose_secret().to_owned())
                .unwrap_or_default(),
        )
    }
}

/// A random 16-character password drawn from letters, digits and symbols.
pub fn suggest_password<R: Rng + ?Sized>(rng: &mut R) -> Zeroizing<String> {
    let password: String = (0..SUGGESTED_PASSWORD_LENGTH)
        .map(|_| PASSWORD_ALPHABET[rng.gen_range(0..PASSWORD_ALPHABET.len())] as char)
        .collect();
    Zeroizing::new(password)
}
