use log::{debug, info};
use loginport_domain::DomainError;
use reqwest::Client;
use serde::Deserialize;

use super::drive::parse_json;
use super::status::ensure_success;
use super::GoogleEndpoints;

const DEFAULT_SHEET_NAME: &str = "Sheet1";
const DATA_RANGE: &str = "A1:Z1000";

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    properties: Option<TitleProperties>,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    #[serde(default)]
    properties: Option<TitleProperties>,
}

#[derive(Debug, Deserialize)]
struct TitleProperties {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// `'<sheet>'!A1:Z1000` with embedded quotes doubled.
pub fn data_range(sheet_name: &str) -> String {
    format!("'{}'!{}", sheet_name.replace('\'', "''"), DATA_RANGE)
}

/// Reads cell values through the Sheets v4 API.
pub struct SheetsReader<'a> {
    http: &'a Client,
    endpoints: &'a GoogleEndpoints,
    token: &'a str,
}

impl<'a> SheetsReader<'a> {
    pub fn new(http: &'a Client, endpoints: &'a GoogleEndpoints, token: &'a str) -> Self {
        Self {
            http,
            endpoints,
            token,
        }
    }

    /// Title of the first tab, `Sheet1` if the metadata has none.
    pub async fn first_sheet_name(&self, spreadsheet_id: &str) -> Result<String, DomainError> {
        let response = self
            .http
            .get(self.endpoints.spreadsheet_url(spreadsheet_id))
            .bearer_auth(self.token)
            .query(&[("fields", "properties.title,sheets.properties.title")])
            .send()
            .await
            .map_err(|e| DomainError::Infrastructure(format!("Sheets request failed: {}", e)))?;
        let response = ensure_success(response, "Spreadsheet metadata").await?;
        let meta: SpreadsheetMeta = parse_json(response, "spreadsheet metadata").await?;

        if let Some(title) = meta.properties.as_ref().and_then(|p| p.title.as_deref()) {
            debug!("Spreadsheet title: {}", title);
        }

        Ok(meta
            .sheets
            .into_iter()
            .next()
            .and_then(|s| s.properties)
            .and_then(|p| p.title)
            .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()))
    }

    /// Rows of `A1:Z1000` on the first tab, every cell rendered as text.
    pub async fn read_rows(&self, spreadsheet_id: &str) -> Result<Vec<Vec<String>>, DomainError> {
        let sheet_name = self.first_sheet_name(spreadsheet_id).await?;
        let range = data_range(&sheet_name);
        info!("📄 Reading range {}", range);

        let response = self
            .http
            .get(self.endpoints.values_url(spreadsheet_id, &range))
            .bearer_auth(self.token)
            .send()
            .await
            .map_err(|e| DomainError::Infrastructure(format!("Sheets request failed: {}", e)))?;
        let response = ensure_success(response, "Spreadsheet values").await?;
        let values: ValueRange = parse_json(response, "spreadsheet values").await?;

        if values.values.is_empty() {
            return Err(DomainError::Data(format!(
                "Sheet '{}' has no data",
                sheet_name
            )));
        }

        Ok(values
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
