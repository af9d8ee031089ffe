use loginport_domain::DomainError;
use loginport_infrastructure::config::AppConfig;
use std::path::Path;
use tracing::info;

/// Pretty JSON of the effective config, creating the file if needed.
pub fn show(config_path: &Path) -> Result<String, DomainError> {
    let config = AppConfig::load_or_create(config_path)?;
    serde_json::to_string_pretty(&config).map_err(|e| DomainError::Configuration(e.to_string()))
}

pub fn set_sheet_title(config_path: &Path, title: &str) -> Result<AppConfig, DomainError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::Validation("Sheet title must not be empty".to_string()));
    }
    update(config_path, |config| config.sheet_title = title.to_string())
}

pub fn set_credentials(config_path: &Path, credentials: &str) -> Result<AppConfig, DomainError> {
    let credentials = credentials.trim();
    if credentials.is_empty() {
        return Err(DomainError::Validation(
            "Credentials path must not be empty".to_string(),
        ));
    }
    update(config_path, |config| {
        config.credentials_file = credentials.to_string()
    })
}

fn update(
    config_path: &Path,
    apply: impl FnOnce(&mut AppConfig),
) -> Result<AppConfig, DomainError> {
    let mut config = AppConfig::load_or_create(config_path)?;
    apply(&mut config);
    config.save(config_path)?;
    info!("Config saved to {}", config_path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_sheet_title_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        set_sheet_title(&path, "  Customer Accounts ").unwrap();

        let reloaded = AppConfig::load_or_create(&path).unwrap();
        assert_eq!(reloaded.sheet_title, "Customer Accounts");
    }

    #[test]
    fn test_set_credentials_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        set_sheet_title(&path, "Keep Me").unwrap();

        set_credentials(&path, "keys/sa.json").unwrap();

        let reloaded = AppConfig::load_or_create(&path).unwrap();
        assert_eq!(reloaded.sheet_title, "Keep Me");
        assert_eq!(reloaded.credentials_file, "keys/sa.json");
    }

    #[test]
    fn test_blank_title_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = set_sheet_title(&dir.path().join("config.json"), "   ").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_show_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let shown = show(&path).unwrap();

        assert!(path.exists());
        assert!(shown.contains("\"sheet_title\""));
    }
}
