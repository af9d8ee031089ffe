//! Google Sheets roster source.
//!
//! Flow per load: service-account token → Drive title search → first tab
//! metadata → `A1:Z1000` values → `RowParser`.

mod drive;
mod service_account;
mod sheets;
mod status;

pub use drive::{spreadsheet_query, DriveFile, DriveLookup};
pub use service_account::{
    AccessTokenProvider, AssertionClaims, ServiceAccountKey, ServiceAccountTokenProvider,
    StaticTokenProvider, SCOPES,
};
pub use sheets::{data_range, SheetsReader};

use async_trait::async_trait;
use log::info;
use loginport_domain::client::{ClientRecord, ClientSource, RowParser};
use loginport_domain::DomainError;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use url::Url;

use crate::config::{AppConfig, TimeoutConfig};

const DRIVE_BASE: &str = "https://www.googleapis.com/drive/v3";
const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4";

/// Base URLs of the Drive and Sheets APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    drive_base: String,
    sheets_base: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            drive_base: DRIVE_BASE.to_string(),
            sheets_base: SHEETS_BASE.to_string(),
        }
    }
}

impl GoogleEndpoints {
    /// Both APIs under one host, as `<base>/drive/v3` and `<base>/v4`.
    pub fn with_base(base: &str) -> Result<Self, DomainError> {
        let parsed = Url::parse(base)
            .map_err(|e| DomainError::Configuration(format!("Invalid API base {}: {}", base, e)))?;
        let root = parsed.as_str().trim_end_matches('/');
        Ok(Self {
            drive_base: format!("{}/drive/v3", root),
            sheets_base: format!("{}/v4", root),
        })
    }

    pub fn drive_files_url(&self) -> String {
        format!("{}/files", self.drive_base)
    }

    pub fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!(
            "{}/spreadsheets/{}",
            self.sheets_base,
            urlencoding::encode(spreadsheet_id)
        )
    }

    pub fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(spreadsheet_id),
            urlencoding::encode(range)
        )
    }
}

/// `ClientSource` backed by a Google spreadsheet found by title.
pub struct GoogleSheetsClientSource {
    http: Client,
    endpoints: GoogleEndpoints,
    tokens: Arc<dyn AccessTokenProvider>,
    sheet_title: String,
    parser: RowParser,
}

impl GoogleSheetsClientSource {
    pub fn new(
        tokens: Arc<dyn AccessTokenProvider>,
        sheet_title: impl Into<String>,
        parser: RowParser,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            http: build_http_client()?,
            endpoints: GoogleEndpoints::default(),
            tokens,
            sheet_title: sheet_title.into(),
            parser,
        })
    }

    pub fn with_endpoints(mut self, endpoints: GoogleEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Resolve the key file from `config` and authenticate as that service
    /// account. `sheet_title` overrides the configured title.
    pub fn from_config(
        config: &AppConfig,
        config_path: &Path,
        sheet_title: Option<&str>,
    ) -> Result<Self, DomainError> {
        let key_path = config.resolve_credentials_path(config_path)?;
        let key = ServiceAccountKey::from_file(&key_path)?;
        let http = build_http_client()?;
        let tokens = ServiceAccountTokenProvider::new(http.clone(), key);

        let title = sheet_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(config.sheet_title.as_str());

        Ok(Self {
            http,
            endpoints: GoogleEndpoints::default(),
            tokens: Arc::new(tokens),
            sheet_title: title.to_string(),
            parser: RowParser::new(config.exclude_keywords.clone()),
        })
    }

    pub fn sheet_title(&self) -> &str {
        &self.sheet_title
    }

    /// Raw cell rows, before parsing.
    pub async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, DomainError> {
        let token = self.tokens.access_token().await?;
        let file = DriveLookup::new(&self.http, &self.endpoints, &token)
            .find_spreadsheet(&self.sheet_title)
            .await?;
        SheetsReader::new(&self.http, &self.endpoints, &token)
            .read_rows(&file.id)
            .await
    }
}

#[async_trait]
impl ClientSource for GoogleSheetsClientSource {
    async fn load_clients(&self) -> Result<Vec<ClientRecord>, DomainError> {
        let rows = self.fetch_rows().await?;
        let clients = self.parser.parse(&rows);
        info!(
            "✅ Loaded {} clients from {} rows of '{}'",
            clients.len(),
            rows.len(),
            self.sheet_title
        );
        Ok(clients)
    }
}

fn build_http_client() -> Result<Client, DomainError> {
    Client::builder()
        .timeout(TimeoutConfig::global().http_request)
        .build()
        .map_err(|e| DomainError::Infrastructure(format!("Failed to build HTTP client: {}", e)))
}
