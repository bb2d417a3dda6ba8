use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use validator_console_lib::dashboard::{refresh_data, DashboardFeed};
use validator_console_lib::{
    reconcile, BackendConfig, BackendGateway, CredentialBroker, MemoryTokenStore,
    ProvisioningWizard, Step, WizardStage,
};

async fn mount_json(
    server: &MockServer,
    verb: &str,
    route: &str,
    status: u16,
    body: serde_json::Value,
) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

async fn provisioned_backend() -> MockServer {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/api/dependencies/status",
        200,
        json!({ "isNodeInstalled": true, "isCosmovisorInstalled": true }),
    )
    .await;
    mount_json(&server, "GET", "/api/auth/status", 200, json!({ "isSetup": true })).await;
    server
}

fn console(server: &MockServer) -> (BackendGateway, CredentialBroker) {
    let broker = CredentialBroker::new(Arc::new(MemoryTokenStore::new())).expect("broker");
    let config = BackendConfig {
        base_url: format!("{}/api", server.uri()),
        ..Default::default()
    };
    let gateway = BackendGateway::new(&config, broker.clone()).expect("gateway");
    (gateway, broker)
}

#[tokio::test]
async fn login_moves_console_from_login_to_dashboard() {
    let server = provisioned_backend().await;
    mount_json(&server, "POST", "/api/auth/login", 200, json!({ "token": "tok-9" })).await;
    Mock::given(method("GET"))
        .and(path("/api/node/status"))
        .and(header("authorization", "Bearer tok-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hasWallet": true,
            "isNodeInitialized": true,
            "isNodeRunning": false,
            "moniker": "alfa-nova-star",
            "currentBlock": 0,
            "peers": 0
        })))
        .mount(&server)
        .await;

    let (gateway, broker) = console(&server);

    let before = reconcile(&gateway, &broker).await;
    assert_eq!(before.step, Step::Login);
    assert!(before.snapshot.is_none());

    broker.login(&gateway, "s3cret!").await.unwrap();

    let after = reconcile(&gateway, &broker).await;
    assert_eq!(after.step, Step::Dashboard);
    let snapshot = after.snapshot.expect("snapshot after login");
    assert!(snapshot.is_node_initialized);
    assert!(!snapshot.setup_complete());
    assert!(!snapshot.is_node_running);
    assert_eq!(snapshot.moniker.as_deref(), Some("alfa-nova-star"));
}

#[tokio::test]
async fn rejected_session_sends_console_back_to_login() {
    let server = provisioned_backend().await;
    mount_json(&server, "POST", "/api/auth/login", 200, json!({ "token": "old" })).await;
    mount_json(&server, "GET", "/api/node/status", 401, json!({ "error": "token expired" })).await;

    let (gateway, broker) = console(&server);
    broker.login(&gateway, "s3cret!").await.unwrap();

    let outcome = reconcile(&gateway, &broker).await;
    assert_eq!(outcome.step, Step::Login);
    assert!(!broker.has_stored_token());
    // The signing password stays cached until logout.
    assert_eq!(broker.current_password().as_str(), "s3cret!");
}

#[tokio::test]
async fn dashboard_refresh_tolerates_missing_staking_info() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/api/node/status",
        200,
        json!({ "hasWallet": true, "isNodeRunning": true, "currentBlock": 1200, "peers": 8 }),
    )
    .await;
    mount_json(
        &server,
        "GET",
        "/api/wallet/balance",
        200,
        json!({ "utkfy": 250000000000i64, "tkfy": 250000.0, "display": "250000.000000 TKFY" }),
    )
    .await;
    mount_json(
        &server,
        "GET",
        "/api/validator/staking",
        500,
        json!({ "error": "not a validator" }),
    )
    .await;

    let (gateway, _) = console(&server);
    let feed = DashboardFeed::new();
    feed.activate();

    assert!(refresh_data(&gateway, &feed).await);
    let state = feed.current();
    let snapshot = state.snapshot.expect("snapshot");
    assert_eq!(snapshot.current_block, 1200);
    assert_eq!(snapshot.peer_count, 8);
    assert_eq!(
        state.balance.map(|b| b.display),
        Some("250000.000000 TKFY".to_string())
    );
    assert!(state.staking.is_none());
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn wizard_creates_validator_on_initialized_node() {
    let server = provisioned_backend().await;
    mount_json(&server, "POST", "/api/auth/login", 200, json!({ "token": "tok" })).await;
    mount_json(
        &server,
        "GET",
        "/api/node/status",
        200,
        json!({
            "hasWallet": true,
            "isNodeInitialized": true,
            "moniker": "omega-storm-falcon",
            "walletAddress": "tkfy1abc"
        }),
    )
    .await;
    mount_json(
        &server,
        "GET",
        "/api/wallets",
        200,
        json!({
            "wallets": [{ "id": "w1", "name": "main", "address": "tkfy1abc" }],
            "activeWalletId": "w1"
        }),
    )
    .await;
    mount_json(
        &server,
        "GET",
        "/api/wallet/balance",
        200,
        json!({ "tkfy": 300000.0, "display": "300000.000000 TKFY" }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/validator/create"))
        .and(body_json(json!({
            "moniker": "omega-storm-falcon",
            "commission": "0.1",
            "stakeAmount": "200000",
            "password": "s3cret!"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, broker) = console(&server);
    broker.login(&gateway, "s3cret!").await.unwrap();
    let snapshot = reconcile(&gateway, &broker)
        .await
        .snapshot
        .expect("snapshot");

    let mut rng = StdRng::seed_from_u64(1);
    let mut wizard = ProvisioningWizard::enter(&gateway, &snapshot, &mut rng).await;
    assert_eq!(wizard.stage(), WizardStage::CreateValidator);
    assert_eq!(wizard.state().moniker, "omega-storm-falcon");
    assert!(wizard.state().balance.is_some());

    wizard.create_validator().await.unwrap();
}
