use loginport_domain::client::row_parser::DEFAULT_EXCLUDE_KEYWORDS;
use loginport_domain::DomainError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const APP_DIR_NAME: &str = "aws-login-port";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_SHEET_TITLE: &str = "AWS Accounts";
pub const DEFAULT_CREDENTIALS_FILE: &str = "service-account.json";
pub const DEFAULT_PORT: u16 = 3000;

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Display title of the roster spreadsheet
    #[serde(default = "default_sheet_title")]
    pub sheet_title: String,

    /// Service-account key, absolute or relative to the config file
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,

    /// Rows whose composite name contains one of these are skipped
    #[serde(default = "default_exclude_keywords")]
    pub exclude_keywords: Vec<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Explicit Chromium executable; auto-detected when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_path: Option<PathBuf>,
}

fn default_sheet_title() -> String {
    DEFAULT_SHEET_TITLE.to_string()
}

fn default_credentials_file() -> String {
    DEFAULT_CREDENTIALS_FILE.to_string()
}

fn default_exclude_keywords() -> Vec<String> {
    DEFAULT_EXCLUDE_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheet_title: default_sheet_title(),
            credentials_file: default_credentials_file(),
            exclude_keywords: default_exclude_keywords(),
            port: default_port(),
            browser_path: None,
        }
    }
}

impl AppConfig {
    /// Load the config file, creating it with defaults when it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, DomainError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            info!("📁 Default config created at: {}", path.display());
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config = serde_json::from_str::<AppConfig>(&content).map_err(|e| {
            DomainError::Configuration(format!("Invalid config {}: {}", path.display(), e))
        })?;

        info!("📁 Config loaded from: {}", path.display());
        Ok(config)
    }

    /// Persist as pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), DomainError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                DomainError::Configuration(format!(
                    "Failed to create config dir {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DomainError::Configuration(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| {
            DomainError::Configuration(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    /// Candidate locations for the service-account key, in priority order.
    pub fn credential_candidates(&self, config_path: &Path, exe_dir: Option<&Path>) -> Vec<PathBuf> {
        let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        let mut candidates = Vec::new();

        if !self.credentials_file.trim().is_empty() {
            let configured = PathBuf::from(self.credentials_file.trim());
            if configured.is_absolute() {
                candidates.push(configured);
            } else {
                candidates.push(config_dir.join(configured));
            }
        }

        if let Some(exe_dir) = exe_dir {
            candidates.push(exe_dir.join("resources").join(DEFAULT_CREDENTIALS_FILE));
            candidates.push(exe_dir.join(DEFAULT_CREDENTIALS_FILE));
        }

        candidates.push(config_dir.join(DEFAULT_CREDENTIALS_FILE));
        candidates.dedup();
        candidates
    }

    /// First existing key file among the candidates.
    pub fn resolve_credentials_path(&self, config_path: &Path) -> Result<PathBuf, DomainError> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let candidates = self.credential_candidates(config_path, exe_dir.as_deref());

        if let Some(found) = candidates.iter().find(|p| p.is_file()) {
            info!("🔑 Service-account key found at: {}", found.display());
            return Ok(found.clone());
        }

        let searched = candidates
            .iter()
            .enumerate()
            .map(|(i, p)| format!("  {}. {}", i + 1, p.display()))
            .collect::<Vec<_>>()
            .join("\n");
        warn!("Service-account key not found, searched:\n{}", searched);

        Err(DomainError::Configuration(format!(
            "Service-account key file not found. Searched:\n{}",
            searched
        )))
    }
}

/// `<OS config dir>/aws-login-port/config.json`
pub fn default_config_path() -> Result<PathBuf, DomainError> {
    let base = dirs::config_dir().ok_or_else(|| {
        DomainError::Configuration("Could not determine the OS config directory".to_string())
    })?;
    Ok(base.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// `<OS data dir>/aws-login-port/logs`, falling back to the temp dir.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join("logs")
}
