mod app_config;
mod timeouts;

pub use app_config::{
    default_config_path, default_log_dir, AppConfig, APP_DIR_NAME, CONFIG_FILE_NAME,
    DEFAULT_CREDENTIALS_FILE, DEFAULT_PORT, DEFAULT_SHEET_TITLE,
};
pub use timeouts::TimeoutConfig;
