//! Opens the listing page in the operator's default browser.

use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

fn open_command(url: &str) -> Command {
    #[cfg(target_os = "macos")]
    let command = {
        let mut command = Command::new("open");
        command.arg(url);
        command
    };
    #[cfg(target_os = "windows")]
    let command = {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let command = {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    };
    command
}

/// Start `command` without waiting for it; tokio reaps it once it exits.
fn spawn_detached(mut command: Command) -> bool {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    match command.spawn() {
        Ok(_child) => true,
        Err(e) => {
            debug!("Failed to start browser opener: {}", e);
            false
        }
    }
}

/// Best-effort; true when the platform opener could be started.
///
/// Must be called from within the tokio runtime.
pub fn try_open_browser(url: &str) -> bool {
    spawn_detached(open_command(url))
}
