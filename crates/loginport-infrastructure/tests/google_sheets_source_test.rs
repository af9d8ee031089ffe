//! Google roster loading against an in-process mock of the Drive, Sheets
//! and OAuth token endpoints.

use axum::extract::{Form, Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use loginport_domain::client::{ClientSource, RowParser};
use loginport_domain::DomainError;
use loginport_infrastructure::config::AppConfig;
use loginport_infrastructure::google::{
    GoogleEndpoints, GoogleSheetsClientSource, ServiceAccountKey, ServiceAccountTokenProvider,
    StaticTokenProvider,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

const TOKEN: &str = "mock-token";
const FIXTURE_KEY: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/service_account.json"
);

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

fn queried_name(q: &str) -> Option<&str> {
    let start = q.find("name='")? + "name='".len();
    let end = q[start..].find("' and")? + start;
    Some(&q[start..end])
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    let grant_ok = form.get("grant_type").map(String::as_str)
        == Some("urn:ietf:params:oauth:grant-type:jwt-bearer");
    let assertion_ok = form
        .get("assertion")
        .map(|a| a.split('.').count() == 3)
        .unwrap_or(false);

    if !(grant_ok && assertion_ok) {
        return (StatusCode::BAD_REQUEST, r#"{"error":"invalid_grant"}"#).into_response();
    }
    Json(json!({ "access_token": TOKEN, "expires_in": 3600, "token_type": "Bearer" }))
        .into_response()
}

async fn drive_files(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let q = params.get("q").cloned().unwrap_or_default();

    let files = match queried_name(&q) {
        Some("Test Sheet") => json!([{ "id": "sheet-1", "name": "Test Sheet" }]),
        Some("Forbidden Sheet") => json!([{ "id": "forbidden", "name": "Forbidden Sheet" }]),
        Some("Empty Sheet") => json!([{ "id": "empty", "name": "Empty Sheet" }]),
        Some(name) if name.starts_with('%') => json!([{ "id": "sheet-1", "name": name }]),
        Some(_) => json!([]),
        None => json!([{ "name": "Test Sheet" }, { "name": "Other Sheet" }]),
    };
    Json(json!({ "files": files })).into_response()
}

async fn spreadsheet_meta(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id == "forbidden" {
        return (
            StatusCode::FORBIDDEN,
            r#"{"error":{"code":403,"message":"The caller does not have permission"}}"#,
        )
            .into_response();
    }
    Json(json!({
        "properties": { "title": id },
        "sheets": [{ "properties": { "title": "Clients" } }, { "properties": { "title": "Archive" } }]
    }))
    .into_response()
}

async fn spreadsheet_values(
    headers: HeaderMap,
    Path((id, range)): Path<(String, String)>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if range != "'Clients'!A1:Z1000" {
        return (StatusCode::BAD_REQUEST, format!("unexpected range {}", range)).into_response();
    }
    if id == "empty" {
        return Json(json!({ "range": range, "majorDimension": "ROWS" })).into_response();
    }
    Json(json!({
        "range": range,
        "majorDimension": "ROWS",
        "values": [
            ["", "고객사", "상세", "환경", "ID", "PW", "계정", "MFA"],
            ["1", "CoA", "prod", "env1", "admin", "pw1", "111111111111", "JBSWY3DPEHPK3PXP"],
            ["2", "", "dev", "env2", "dev-user", "pw2", 222222222222u64, "JBSWY3DPEHPK3PXP"],
            ["3", "NCP", "main", "env3", "u", "p", "333333333333", "S"],
            [],
            ["4", "CoB", "prod", "env1", "ops", "", "444444444444", "S"]
        ]
    }))
    .into_response()
}

async fn spawn_mock() -> String {
    let app = Router::new()
        .route("/token", post(token))
        .route("/drive/v3/files", get(drive_files))
        .route("/v4/spreadsheets/:id", get(spreadsheet_meta))
        .route("/v4/spreadsheets/:id/values/:range", get(spreadsheet_values));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn source_for(title: &str) -> GoogleSheetsClientSource {
    let base = spawn_mock().await;
    GoogleSheetsClientSource::new(
        Arc::new(StaticTokenProvider(TOKEN.to_string())),
        title,
        RowParser::default(),
    )
    .unwrap()
    .with_endpoints(GoogleEndpoints::with_base(&base).unwrap())
}

#[tokio::test]
async fn test_loads_and_parses_roster() {
    let source = source_for("Test Sheet").await;

    let clients = source.load_clients().await.unwrap();

    let names: Vec<&str> = clients.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["CoA-env1-prod", "CoA-env2-dev"]);
    assert_eq!(clients[0].account(), "111111111111");
    assert_eq!(clients[0].username(), "admin");
    assert_eq!(clients[1].account(), "222222222222");
    assert_eq!(clients[1].mfa_secret(), "JBSWY3DPEHPK3PXP");
}

#[tokio::test]
async fn test_falls_back_to_encoded_title() {
    let source = source_for("고객 목록").await;

    let clients = source.load_clients().await.unwrap();

    assert_eq!(clients.len(), 2);
}

#[tokio::test]
async fn test_missing_spreadsheet_lists_available_titles() {
    let source = source_for("Nope").await;

    match source.load_clients().await.unwrap_err() {
        DomainError::NotFound(msg) => {
            assert!(msg.contains("'Nope'"));
            assert!(msg.contains("- Test Sheet"));
            assert!(msg.contains("- Other Sheet"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_forbidden_spreadsheet_is_permission_error() {
    let source = source_for("Forbidden Sheet").await;

    let err = source.load_clients().await.unwrap_err();

    assert!(matches!(err, DomainError::Permission(_)));
}

#[tokio::test]
async fn test_empty_sheet_is_data_error() {
    let source = source_for("Empty Sheet").await;

    let err = source.load_clients().await.unwrap_err();

    assert!(matches!(err, DomainError::Data(_)));
}

#[tokio::test]
async fn test_service_account_exchange() {
    let base = spawn_mock().await;
    let key = ServiceAccountKey::from_file(std::path::Path::new(FIXTURE_KEY)).unwrap();
    let tokens = ServiceAccountTokenProvider::new(reqwest::Client::new(), key)
        .with_token_uri(format!("{}/token", base));

    let source = GoogleSheetsClientSource::new(Arc::new(tokens), "Test Sheet", RowParser::default())
        .unwrap()
        .with_endpoints(GoogleEndpoints::with_base(&base).unwrap());

    assert_eq!(source.load_clients().await.unwrap().len(), 2);
}

#[test]
fn test_from_config_resolves_key_and_title() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let config = AppConfig {
        sheet_title: "Configured".to_string(),
        credentials_file: FIXTURE_KEY.to_string(),
        ..AppConfig::default()
    };

    let configured = GoogleSheetsClientSource::from_config(&config, &config_path, None).unwrap();
    assert_eq!(configured.sheet_title(), "Configured");

    let overridden =
        GoogleSheetsClientSource::from_config(&config, &config_path, Some("Override")).unwrap();
    assert_eq!(overridden.sheet_title(), "Override");

    let blank = GoogleSheetsClientSource::from_config(&config, &config_path, Some("  ")).unwrap();
    assert_eq!(blank.sheet_title(), "Configured");
}
