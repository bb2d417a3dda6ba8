use serde::{Deserialize, Deserializer, Serialize};
use zeroize::Zeroizing;

/// Go encodes nil slices as `null`; treat that the same as an empty list.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn zeroizing_string<'de, D>(deserializer: D) -> Result<Zeroizing<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Zeroizing::new)
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusResponse {
    pub is_setup: bool,
}

#[derive(Serialize)]
pub(crate) struct PasswordRequest<'a> {
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: String,
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DependencyStatusResponse {
    #[serde(default)]
    pub is_node_installed: bool,
    #[serde(default)]
    pub is_cosmovisor_installed: bool,
}

#[derive(Serialize)]
pub(crate) struct InstallDependencyRequest<'a> {
    pub component: &'a str,
}

/// Body of endpoints that only acknowledge success.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Wallets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wallet {
    pub id: String,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WalletListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub wallets: Vec<Wallet>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub active_wallet_id: Option<String>,
}

impl WalletListResponse {
    pub fn find(&self, wallet_id: &str) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.id == wallet_id)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateWalletRequest<'a> {
    pub name: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImportWalletRequest<'a> {
    pub name: &'a str,
    pub mnemonic: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WalletIdRequest<'a> {
    pub wallet_id: &'a str,
}

/// A freshly generated wallet. The mnemonic is shown once and then dropped.
#[derive(Clone, Deserialize)]
pub struct CreatedWallet {
    #[serde(default)]
    pub id: Option<String>,
    pub address: String,
    #[serde(deserialize_with = "zeroizing_string")]
    pub mnemonic: Zeroizing<String>,
}

impl std::fmt::Debug for CreatedWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatedWallet")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("mnemonic", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ImportedWallet {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceResponse {
    #[serde(default)]
    pub utkfy: Option<i64>,
    #[serde(default)]
    pub tkfy: f64,
    #[serde(default)]
    pub display: String,
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatusResponse {
    #[serde(default)]
    pub has_wallet: bool,
    #[serde(default)]
    pub is_node_installed: bool,
    #[serde(default)]
    pub is_node_initialized: bool,
    #[serde(default)]
    pub is_node_running: bool,
    #[serde(default)]
    pub is_validator: bool,
    #[serde(default)]
    pub is_cosmovisor_installed: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub wallet_address: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub moniker: Option<String>,
    #[serde(default)]
    pub current_block: u64,
    #[serde(default)]
    pub peers: u32,
}

#[derive(Serialize)]
pub(crate) struct InitNodeRequest<'a> {
    pub moniker: &'a str,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogTailResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub logs: Vec<String>,
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateValidatorRequest<'a> {
    pub moniker: &'a str,
    pub commission: &'a str,
    pub stake_amount: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StakingInfoResponse {
    #[serde(default)]
    pub total_staked: String,
    #[serde(default)]
    pub self_delegation: String,
    #[serde(default)]
    pub delegations: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_list_accepts_null_wallets_and_empty_active_id() {
        let parsed: WalletListResponse =
            serde_json::from_str(r#"{"wallets":null,"activeWalletId":""}"#).unwrap();
        assert!(parsed.wallets.is_empty());
        assert!(parsed.active_wallet_id.is_none());
    }

    #[test]
    fn wallet_list_ignores_backend_only_fields() {
        let parsed: WalletListResponse = serde_json::from_str(
            r#"{"wallets":[{"id":"w1","name":"main","address":"tkfy1abc",
                "encryptedMnemonic":"xx","salt":"yy","createdAt":1}],
               "activeWalletId":"w1"}"#,
        )
        .unwrap();
        assert_eq!(parsed.find("w1").map(|w| w.name.as_str()), Some("main"));
        assert_eq!(parsed.active_wallet_id.as_deref(), Some("w1"));
    }

    #[test]
    fn node_status_tolerates_missing_optional_fields() {
        let parsed: NodeStatusResponse =
            serde_json::from_str(r#"{"isNodeRunning":true,"currentBlock":42,"peers":3}"#)
                .unwrap();
        assert!(parsed.is_node_running);
        assert_eq!(parsed.current_block, 42);
        assert_eq!(parsed.peers, 3);
        assert!(parsed.moniker.is_none());
    }

    #[test]
    fn log_tail_null_is_empty() {
        let parsed: LogTailResponse = serde_json::from_str(r#"{"logs":null}"#).unwrap();
        assert!(parsed.logs.is_empty());
    }

    #[test]
    fn created_wallet_debug_redacts_mnemonic() {
        let created: CreatedWallet = serde_json::from_str(
            r#"{"id":"w2","address":"tkfy1xyz","mnemonic":"word word word"}"#,
        )
        .unwrap();
        assert_eq!(created.mnemonic.as_str(), "word word word");
        assert!(!format!("{:?}", created).contains("word word"));
    }

    #[test]
    fn create_validator_request_uses_camel_case() {
        let body = serde_json::to_value(CreateValidatorRequest {
            moniker: "alfa-nova-star",
            commission: "0.1",
            stake_amount: "200000",
            password: "secret",
        })
        .unwrap();
        assert_eq!(body["stakeAmount"], "200000");
        assert_eq!(body["commission"], "0.1");
    }
}
