/// HTTP gateway to the validator backend.
///
/// Every request carries the session token as a bearer header when one is
/// held. Privileged calls additionally put the signing password in the JSON
/// body, read from the credential broker at call time.
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::types::{
    Acknowledgement, AuthStatusResponse, BalanceResponse, CreateValidatorRequest,
    CreateWalletRequest, CreatedWallet, DependencyStatusResponse, ErrorBody,
    ImportWalletRequest, ImportedWallet, InitNodeRequest, InstallDependencyRequest,
    LogTailResponse, NodeStatusResponse, PasswordRequest, StakingInfoResponse, TokenResponse,
    WalletIdRequest, WalletListResponse,
};
use crate::api::{AuthApi, NodeApi, ValidatorApi, WalletApi};
use crate::config_store::BackendConfig;
use crate::errors::{ConsoleError, ConsoleResult};
use crate::session::CredentialBroker;

const UNKNOWN_ERROR: &str = "Unknown error";

/// HTTP client for the backend REST API
#[derive(Debug, Clone)]
pub struct BackendGateway {
    client: Client,
    base_url: String,
    credentials: CredentialBroker,
}

impl BackendGateway {
    /// Create a new gateway
    pub fn new(config: &BackendConfig, credentials: CredentialBroker) -> ConsoleResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                ConsoleError::NetworkError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(BackendGateway {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialBroker {
        &self.credentials
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ConsoleResult<T> {
        self.send(self.request(Method::GET, path), path).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ConsoleResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body), path)
            .await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ConsoleResult<T> {
        self.send(
            self.request(Method::POST, path).json(&serde_json::json!({})),
            path,
        )
        .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Attach the bearer token, send, and decode either the body or the
    /// backend's `{error}` message.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> ConsoleResult<T> {
        let token = self.credentials.current_token();
        let carried_token = !token.is_empty();
        let builder = if carried_token {
            builder.bearer_auth(token.as_str())
        } else {
            builder
        };

        let response = builder.send().await.map_err(|e| {
            log::warn!("Request to {} failed: {}", path, e);
            ConsoleError::from(e)
        })?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            let body: &[u8] = if body.is_empty() { b"{}" } else { &body };
            return serde_json::from_slice(body).map_err(|e| {
                ConsoleError::InvalidResponse(format!("Failed to parse {} response: {}", path, e))
            });
        }

        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        log::debug!("{} returned {}: {}", path, status, message);

        if status == StatusCode::UNAUTHORIZED {
            if carried_token {
                self.credentials.invalidate_token();
            }
            return Err(ConsoleError::Unauthorized(message));
        }
        Err(ConsoleError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

impl AuthApi for BackendGateway {
    async fn auth_status(&self) -> ConsoleResult<AuthStatusResponse> {
        self.get("/auth/status").await
    }

    async fn setup(&self, password: &str) -> ConsoleResult<TokenResponse> {
        self.post("/auth/setup", &PasswordRequest { password }).await
    }

    async fn login(&self, password: &str) -> ConsoleResult<TokenResponse> {
        self.post("/auth/login", &PasswordRequest { password }).await
    }
}

impl NodeApi for BackendGateway {
    async fn dependency_status(&self) -> ConsoleResult<DependencyStatusResponse> {
        self.get("/dependencies/status").await
    }

    async fn install_dependency(&self, component: &str) -> ConsoleResult<Acknowledgement> {
        self.post(
            "/dependencies/install",
            &InstallDependencyRequest { component },
        )
        .await
    }

    async fn node_status(&self) -> ConsoleResult<NodeStatusResponse> {
        self.get("/node/status").await
    }

    async fn init_node(&self, moniker: &str) -> ConsoleResult<Acknowledgement> {
        self.post("/node/init", &InitNodeRequest { moniker }).await
    }

    async fn start_node(&self) -> ConsoleResult<Acknowledgement> {
        self.post_empty("/node/start").await
    }

    async fn stop_node(&self) -> ConsoleResult<Acknowledgement> {
        self.post_empty("/node/stop").await
    }

    async fn node_logs(&self) -> ConsoleResult<LogTailResponse> {
        self.get("/node/logs").await
    }
}

impl WalletApi for BackendGateway {
    async fn wallets(&self) -> ConsoleResult<WalletListResponse> {
        self.get("/wallets").await
    }

    async fn create_wallet(&self, name: &str) -> ConsoleResult<CreatedWallet> {
        let password = self.credentials.current_password();
        self.post(
            "/wallet/create",
            &CreateWalletRequest {
                name,
                password: &password,
            },
        )
        .await
    }

    async fn import_wallet(&self, name: &str, mnemonic: &str) -> ConsoleResult<ImportedWallet> {
        let password = self.credentials.current_password();
        self.post(
            "/wallet/import",
            &ImportWalletRequest {
                name,
                mnemonic,
                password: &password,
            },
        )
        .await
    }

    async fn set_active_wallet(&self, wallet_id: &str) -> ConsoleResult<Acknowledgement> {
        self.post("/wallet/active", &WalletIdRequest { wallet_id })
            .await
    }

    async fn delete_wallet(&self, wallet_id: &str) -> ConsoleResult<Acknowledgement> {
        self.post("/wallet/delete", &WalletIdRequest { wallet_id })
            .await
    }

    async fn balance(&self) -> ConsoleResult<BalanceResponse> {
        self.get("/wallet/balance").await
    }
}

impl ValidatorApi for BackendGateway {
    async fn create_validator(
        &self,
        moniker: &str,
        commission: &str,
        stake_amount: &str,
    ) -> ConsoleResult<Acknowledgement> {
        let password = self.credentials.current_password();
        self.post(
            "/validator/create",
            &CreateValidatorRequest {
                moniker,
                commission,
                stake_amount,
                password: &password,
            },
        )
        .await
    }

    async fn staking_info(&self) -> ConsoleResult<StakingInfoResponse> {
        self.get("/validator/staking").await
    }

    async fn withdraw_rewards(&self) -> ConsoleResult<Acknowledgement> {
        let password = self.credentials.current_password();
        self.post(
            "/validator/withdraw",
            &PasswordRequest {
                password: &password,
            },
        )
        .await
    }

    async fn restake_rewards(&self) -> ConsoleResult<Acknowledgement> {
        let password = self.credentials.current_password();
        self.post(
            "/validator/restake",
            &PasswordRequest {
                password: &password,
            },
        )
        .await
    }
}
