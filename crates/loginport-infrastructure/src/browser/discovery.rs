use log::debug;
use std::path::{Path, PathBuf};

/// Executable names searched on `PATH` after the well-known install locations.
const PATH_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
    "msedge",
];

fn install_locations() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();

    #[cfg(target_os = "macos")]
    {
        paths.extend(
            [
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
                "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
                "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
            ]
            .iter()
            .map(PathBuf::from),
        );
    }

    #[cfg(target_os = "linux")]
    {
        paths.extend(
            [
                "/usr/bin/google-chrome",
                "/usr/bin/chromium",
                "/usr/bin/chromium-browser",
                "/snap/bin/chromium",
                "/opt/google/chrome/chrome",
                "/usr/bin/microsoft-edge",
                "/usr/bin/brave-browser",
            ]
            .iter()
            .map(PathBuf::from),
        );
    }

    #[cfg(target_os = "windows")]
    {
        let local = std::env::var("LOCALAPPDATA").unwrap_or_default();
        for root in [r"C:\Program Files", r"C:\Program Files (x86)", local.as_str()] {
            if root.is_empty() {
                continue;
            }
            let root = PathBuf::from(root);
            paths.push(root.join(r"Google\Chrome\Application\chrome.exe"));
            paths.push(root.join(r"Microsoft\Edge\Application\msedge.exe"));
            paths.push(root.join(r"Chromium\Application\chrome.exe"));
            paths.push(root.join(r"BraveSoftware\Brave-Browser\Application\brave.exe"));
        }
        if let Some(registered) = chrome_from_registry() {
            paths.push(registered);
        }
    }

    paths
}

fn search_path() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        for name in PATH_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
            #[cfg(target_os = "windows")]
            {
                let exe = dir.join(format!("{}.exe", name));
                if exe.is_file() {
                    return Some(exe);
                }
            }
        }
    }
    None
}

#[cfg(target_os = "windows")]
fn chrome_from_registry() -> Option<PathBuf> {
    let output = std::process::Command::new("reg")
        .args([
            "query",
            r"HKEY_LOCAL_MACHINE\SOFTWARE\Microsoft\Windows\CurrentVersion\App Paths\chrome.exe",
            "/ve",
        ])
        .output()
        .ok()?;

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find_map(|line| line.split("REG_SZ").nth(1))
        .map(|path| PathBuf::from(path.trim()))
}

/// Chromium-family executable to drive: the configured one when it exists,
/// then the platform install locations, then `PATH`.
pub fn find_browser(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        debug!("Configured browser {} does not exist, auto-detecting", path.display());
    }

    install_locations()
        .into_iter()
        .find(|p| p.is_file())
        .or_else(search_path)
}
