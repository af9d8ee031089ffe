//! Listing page and JSON endpoints against a real listener on an ephemeral
//! port, with the browser swapped for a recording fake.

use async_trait::async_trait;
use loginport_domain::client::{ClientRecord, ClientSource};
use loginport_domain::login::{BrowserLauncher, LoginDriver};
use loginport_domain::DomainError;
use loginport_infrastructure::security::TotpGenerator;
use loginport_lib::application::config::LoginTimeouts;
use loginport_lib::application::services::{ClientStore, LoginSequencer};
use loginport_lib::presentation::{load_roster, serve, AppState};
use mockall::mock;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Records launch requests and refuses to start a browser.
struct RecordingLauncher {
    launches: mpsc::UnboundedSender<(String, String)>,
}

#[async_trait]
impl BrowserLauncher for RecordingLauncher {
    async fn launch(&self, url: &str, label: &str) -> Result<Box<dyn LoginDriver>, DomainError> {
        let _ = self.launches.send((url.to_string(), label.to_string()));
        Err(DomainError::Configuration("no browser in tests".to_string()))
    }
}

mock! {
    Source {}

    #[async_trait]
    impl ClientSource for Source {
        async fn load_clients(&self) -> Result<Vec<ClientRecord>, DomainError>;
    }
}

fn roster() -> Vec<ClientRecord> {
    vec![
        ClientRecord::new("CoA-env1-prod", "111111111111", "admin", "pw1", "JBSWY3DPEHPK3PXP")
            .unwrap(),
        ClientRecord::new(
            "<b>Acme</b> & Co",
            "222222222222",
            "ops",
            "pw2",
            "GEZDGNBVGY3TQOJQ",
        )
        .unwrap(),
    ]
}

struct TestServer {
    base: String,
    clients: ClientStore,
    launches: mpsc::UnboundedReceiver<(String, String)>,
    http: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        let (tx, launches) = mpsc::unbounded_channel();
        let clients = ClientStore::new(roster());
        let otp = Arc::new(TotpGenerator::new());
        let sequencer = Arc::new(LoginSequencer::new(
            Arc::new(RecordingLauncher { launches: tx }),
            otp.clone(),
            LoginTimeouts::default(),
        ));
        let state = AppState::new(clients.clone(), sequencer, otp);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            serve(listener, state, std::future::pending::<()>()).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            clients,
            launches,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn post_json(&self, path: &str, body: serde_json::Value) -> reqwest::Response {
        self.http.post(self.url(path)).json(&body).send().await.unwrap()
    }
}

#[tokio::test]
async fn test_listing_page_renders_escaped_rows() {
    let server = TestServer::start().await;

    let response = server.http.get(server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();

    assert!(body.contains("2 accounts"));
    assert!(body.contains("CoA-env1-prod"));
    assert!(body.contains("&lt;b&gt;Acme&lt;/b&gt; &amp; Co"));
    assert!(!body.contains("<b>Acme</b>"));
    assert!(!body.contains("{{CLIENT_ROWS}}"));
}

#[tokio::test]
async fn test_login_unknown_client_is_not_found() {
    let mut server = TestServer::start().await;

    let response = server.http.get(server.url("/login/Nobody")).send().await.unwrap();

    assert_eq!(response.status(), 404);
    assert!(server.launches.try_recv().is_err());
}

#[tokio::test]
async fn test_login_known_client_launches_browser() {
    let mut server = TestServer::start().await;

    let response = server
        .http
        .get(server.url("/login/CoA-env1-prod"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let (url, label) = tokio::time::timeout(Duration::from_secs(5), server.launches.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(url, "https://111111111111.signin.aws.amazon.com/console");
    assert_eq!(label, "CoA-env1-prod");
}

#[tokio::test]
async fn test_generate_mfa_returns_six_digits() {
    let server = TestServer::start().await;

    let response = server
        .post_json("/generate-mfa", json!({ "mfaSecret": "JBSWY3DPEHPK3PXP" }))
        .await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    let code = body["mfaCode"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_generate_mfa_rejects_invalid_secret() {
    let server = TestServer::start().await;

    let response = server
        .post_json("/generate-mfa", json!({ "mfaSecret": "not base32!" }))
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_update_password_only_touches_password() {
    let server = TestServer::start().await;

    let response = server
        .post_json(
            "/update-client",
            json!({ "account": "111111111111", "field": "password", "value": "rotated" }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let client = server.clients.find_by_name("CoA-env1-prod").await.unwrap();
    assert_eq!(client.password(), "rotated");
    assert_eq!(client.username(), "admin");
    assert_eq!(client.account(), "111111111111");
    assert_eq!(client.mfa_secret(), "JBSWY3DPEHPK3PXP");
}

#[tokio::test]
async fn test_update_unknown_account_changes_nothing() {
    let server = TestServer::start().await;
    let before = server.clients.snapshot().await;

    let response = server
        .post_json(
            "/update-client",
            json!({ "account": "999999999999", "field": "username", "value": "x" }),
        )
        .await;

    assert_eq!(response.status(), 404);
    assert_eq!(server.clients.snapshot().await, before);
}

#[tokio::test]
async fn test_update_unknown_account_with_unknown_field_is_not_found() {
    let server = TestServer::start().await;

    let response = server
        .post_json(
            "/update-client",
            json!({ "account": "999999999999", "field": "region", "value": "x" }),
        )
        .await;

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_update_unknown_field_is_bad_request() {
    let server = TestServer::start().await;

    let response = server
        .post_json(
            "/update-client",
            json!({ "account": "111111111111", "field": "region", "value": "x" }),
        )
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_load_roster_from_source() {
    let mut source = MockSource::new();
    source.expect_load_clients().times(1).returning(|| Ok(roster()));

    let store = load_roster(&source).await.unwrap();

    assert_eq!(store.len().await, 2);
    assert!(store.find_by_name("CoA-env1-prod").await.is_some());
}

#[tokio::test]
async fn test_load_roster_propagates_source_error() {
    let mut source = MockSource::new();
    source
        .expect_load_clients()
        .returning(|| Err(DomainError::Permission("share the sheet".to_string())));

    let err = load_roster(&source).await.unwrap_err();

    assert!(matches!(err, DomainError::Permission(_)));
}
