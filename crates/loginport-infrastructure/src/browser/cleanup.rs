use log::{info, warn};
use std::path::Path;
use std::time::Duration;

const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Remove a throwaway profile directory once Chromium has let go of it.
pub(super) async fn remove_profile_dir(profile_dir: &Path, delay: Duration, label: &str) {
    // Chromium releases its lock files shortly after the process exits
    tokio::time::sleep(delay).await;

    if std::fs::remove_dir_all(profile_dir).is_ok() {
        info!("[{}] Removed profile directory", label);
        return;
    }

    tokio::time::sleep(RETRY_DELAY).await;
    match std::fs::remove_dir_all(profile_dir) {
        Ok(()) => info!("[{}] Removed profile directory on retry", label),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            "[{}] Failed to remove profile directory {}: {}",
            label,
            profile_dir.display(),
            e
        ),
    }
}
