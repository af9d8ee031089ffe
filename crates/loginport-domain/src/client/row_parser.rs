//! Spreadsheet row → `ClientRecord` conversion.
//!
//! Column layout of the roster sheet:
//!
//! | idx | content      |
//! |-----|--------------|
//! | 0   | (ignored)    |
//! | 1   | company      |
//! | 2   | detail       |
//! | 3   | environment  |
//! | 4   | username     |
//! | 5   | password     |
//! | 6   | account id   |
//! | 7   | MFA secret   |
//!
//! Blank company cells mean "same as the row above" (merged cells in the sheet).

use super::aggregate::ClientRecord;

const COL_COMPANY: usize = 1;
const COL_DETAIL: usize = 2;
const COL_ENVIRONMENT: usize = 3;
const COL_USERNAME: usize = 4;
const COL_PASSWORD: usize = 5;
const COL_ACCOUNT: usize = 6;
const COL_MFA_SECRET: usize = 7;

/// Default keywords marking header or non-AWS rows.
pub const DEFAULT_EXCLUDE_KEYWORDS: &[&str] = &["고객사", "issuereporter", "NCP"];

#[derive(Debug, Clone)]
pub struct RowParser {
    exclude_keywords: Vec<String>,
}

impl Default for RowParser {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDE_KEYWORDS.iter().map(|k| k.to_string()).collect())
    }
}

impl RowParser {
    pub fn new(exclude_keywords: Vec<String>) -> Self {
        Self { exclude_keywords }
    }

    /// Parse raw sheet rows, silently dropping incomplete or excluded rows.
    pub fn parse<S: AsRef<str>>(&self, rows: &[Vec<S>]) -> Vec<ClientRecord> {
        let mut latest_company: Option<String> = None;
        let mut parsed = Vec::new();

        for row in rows {
            let company = cell(row, COL_COMPANY);
            let environment = cell(row, COL_ENVIRONMENT);
            if company.is_empty() && environment.is_empty() {
                continue;
            }

            if !company.is_empty() {
                latest_company = Some(company.to_string());
            }
            let effective_company = latest_company.as_deref().unwrap_or_default();

            let detail = cell(row, COL_DETAIL);
            let full_name = format!("{}-{}-{}", effective_company, environment, detail);

            if self.is_excluded(&full_name) {
                continue;
            }

            if let Ok(record) = ClientRecord::new(
                full_name,
                cell(row, COL_ACCOUNT),
                cell(row, COL_USERNAME),
                cell(row, COL_PASSWORD),
                cell(row, COL_MFA_SECRET),
            ) {
                parsed.push(record);
            }
        }

        parsed
    }

    fn is_excluded(&self, full_name: &str) -> bool {
        self.exclude_keywords
            .iter()
            .any(|keyword| full_name.contains(keyword.as_str()))
    }
}

fn cell<S: AsRef<str>>(row: &[S], idx: usize) -> &str {
    row.get(idx).map(|c| c.as_ref().trim()).unwrap_or("")
}
