use log::{debug, info, warn};
use loginport_domain::DomainError;
use reqwest::Client;
use serde::Deserialize;

use super::status::ensure_success;
use super::GoogleEndpoints;

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const AVAILABLE_LISTING_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct NameOnly {
    name: String,
}

#[derive(Debug, Deserialize)]
struct NameList {
    #[serde(default)]
    files: Vec<NameOnly>,
}

/// Drive `q` expression matching a non-trashed spreadsheet by exact name.
pub fn spreadsheet_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "name='{}' and mimeType='{}' and trashed=false",
        escaped, SPREADSHEET_MIME
    )
}

/// Spreadsheet lookup by title through the Drive v3 files API.
pub struct DriveLookup<'a> {
    http: &'a Client,
    endpoints: &'a GoogleEndpoints,
    token: &'a str,
}

impl<'a> DriveLookup<'a> {
    pub fn new(http: &'a Client, endpoints: &'a GoogleEndpoints, token: &'a str) -> Self {
        Self {
            http,
            endpoints,
            token,
        }
    }

    /// Exact title first, then the percent-encoded title. On a miss the error
    /// lists the spreadsheets the service account can see.
    pub async fn find_spreadsheet(&self, title: &str) -> Result<DriveFile, DomainError> {
        info!("🔍 Searching spreadsheet by title: {}", title);

        if let Some(file) = self.search_one(&spreadsheet_query(title)).await? {
            info!("Spreadsheet found: {} ({})", file.name, file.id);
            return Ok(file);
        }

        let encoded = urlencoding::encode(title);
        if encoded != title {
            debug!("Exact title missed, retrying encoded title: {}", encoded);
            if let Some(file) = self.search_one(&spreadsheet_query(&encoded)).await? {
                info!("Spreadsheet found by encoded title: {} ({})", file.name, file.id);
                return Ok(file);
            }
        }

        let available = self.list_available().await.unwrap_or_else(|e| {
            warn!("Could not list available spreadsheets: {}", e);
            Vec::new()
        });
        let listing = if available.is_empty() {
            "  (none)".to_string()
        } else {
            available
                .iter()
                .map(|name| format!("  - {}", name))
                .collect::<Vec<_>>()
                .join("\n")
        };

        Err(DomainError::NotFound(format!(
            "Spreadsheet '{}' not found. Check sheet_title in config.json.\nAvailable spreadsheets:\n{}",
            title, listing
        )))
    }

    /// Names of up to 50 spreadsheets visible to the caller.
    pub async fn list_available(&self) -> Result<Vec<String>, DomainError> {
        let q = format!("mimeType='{}' and trashed=false", SPREADSHEET_MIME);
        let page_size = AVAILABLE_LISTING_SIZE.to_string();
        let response = self
            .files_request(&[("q", q.as_str()), ("fields", "files(name)"), ("pageSize", &page_size)])
            .await?;
        let list: NameList = parse_json(response, "Drive file listing").await?;
        Ok(list.files.into_iter().map(|f| f.name).collect())
    }

    async fn search_one(&self, q: &str) -> Result<Option<DriveFile>, DomainError> {
        debug!("Drive query: {}", q);
        let response = self
            .files_request(&[("q", q), ("fields", "files(id,name)"), ("pageSize", "1")])
            .await?;
        let list: FileList = parse_json(response, "Drive search").await?;
        Ok(list.files.into_iter().next())
    }

    async fn files_request(&self, params: &[(&str, &str)]) -> Result<reqwest::Response, DomainError> {
        let response = self
            .http
            .get(self.endpoints.drive_files_url())
            .bearer_auth(self.token)
            .query(params)
            .query(&[
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
                ("spaces", "drive"),
            ])
            .send()
            .await
            .map_err(|e| DomainError::Infrastructure(format!("Drive request failed: {}", e)))?;
        ensure_success(response, "Drive search").await
    }
}

pub(crate) async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<T, DomainError> {
    response
        .json::<T>()
        .await
        .map_err(|e| DomainError::Infrastructure(format!("Invalid {} response: {}", context, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_plain_title() {
        assert_eq!(
            spreadsheet_query("AWS Accounts"),
            "name='AWS Accounts' and mimeType='application/vnd.google-apps.spreadsheet' and trashed=false"
        );
    }

    #[test]
    fn test_query_escapes_quotes_and_backslashes() {
        let q = spreadsheet_query(r"Bob's \ sheet");
        assert!(q.starts_with(r"name='Bob\'s \\ sheet'"));
    }
}
