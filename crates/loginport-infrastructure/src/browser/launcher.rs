use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::EventLoadEventFired;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use log::{error, info, warn};
use loginport_domain::login::{BrowserLauncher, LoginDriver};
use loginport_domain::DomainError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::discovery::find_browser;
use super::driver::ChromiumDriver;
use super::navigation::NavigationTracker;
use crate::config::TimeoutConfig;

const INITIAL_TAB_ATTEMPTS: u32 = 20;
const INITIAL_TAB_POLL: Duration = Duration::from_millis(100);

/// Navigate the tab Chromium opened at startup, opening one only if none
/// shows up.
async fn open_in_first_tab(browser: &Browser, url: &str) -> Result<Page, CdpError> {
    for _ in 0..INITIAL_TAB_ATTEMPTS {
        if let Some(page) = browser.pages().await?.into_iter().next() {
            page.goto(url).await?;
            return Ok(page);
        }
        tokio::time::sleep(INITIAL_TAB_POLL).await;
    }
    browser.new_page(url).await
}

async fn track_loads(page: &Page) -> Result<NavigationTracker, CdpError> {
    let mut loads = page.event_listener::<EventLoadEventFired>().await?;
    let tracker = NavigationTracker::new();
    let recorder = tracker.clone();
    tokio::spawn(async move {
        while loads.next().await.is_some() {
            recorder.record_load();
        }
        recorder.close();
    });
    Ok(tracker)
}

/// Launches one visible, maximized Chromium window per sign-in, each with
/// a throwaway profile directory.
pub struct ChromiumLauncher {
    browser_path: Option<PathBuf>,
    timeouts: TimeoutConfig,
}

impl ChromiumLauncher {
    pub fn new(browser_path: Option<PathBuf>) -> Self {
        Self {
            browser_path,
            timeouts: TimeoutConfig::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    fn browser_config(
        &self,
        executable: &Path,
        profile_dir: &Path,
    ) -> Result<BrowserConfig, DomainError> {
        BrowserConfig::builder()
            .with_head()
            .viewport(None)
            .arg("--start-maximized")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .user_data_dir(profile_dir)
            .chrome_executable(executable)
            .launch_timeout(self.timeouts.browser_launch)
            .build()
            .map_err(|e| DomainError::Infrastructure(format!("Failed to build browser config: {}", e)))
    }
}

impl ChromiumLauncher {
    async fn launch_chromium(&self, url: &str, label: &str) -> Result<ChromiumDriver, DomainError> {
        let executable = find_browser(self.browser_path.as_deref()).ok_or_else(|| {
            let msg = "No Chromium-based browser found. Install Google Chrome, Chromium or Microsoft Edge, or set browser_path in config.json";
            error!("[{}] {}", label, msg);
            DomainError::Configuration(msg.to_string())
        })?;
        info!("[{}] Using browser at: {}", label, executable.display());

        let profile_dir = std::env::temp_dir().join(format!("loginport-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&profile_dir).map_err(|e| {
            DomainError::Infrastructure(format!("Failed to create profile directory: {}", e))
        })?;

        let config = match self.browser_config(&executable, &profile_dir) {
            Ok(config) => config,
            Err(e) => {
                let _ = std::fs::remove_dir_all(&profile_dir);
                return Err(e);
            }
        };

        let launched =
            tokio::time::timeout(self.timeouts.browser_launch, Browser::launch(config)).await;
        let (browser, mut handler) = match launched {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => {
                let _ = std::fs::remove_dir_all(&profile_dir);
                error!("[{}] Failed to launch browser: {}", label, e);
                return Err(DomainError::Infrastructure(format!(
                    "Failed to launch browser: {}",
                    e
                )));
            }
            Err(_) => {
                let _ = std::fs::remove_dir_all(&profile_dir);
                error!("[{}] Browser launch timed out", label);
                return Err(DomainError::AutomationTimeout(format!(
                    "Browser launch timed out after {:?}",
                    self.timeouts.browser_launch
                )));
            }
        };

        let connected = Arc::new(AtomicBool::new(true));
        let handler_flag = connected.clone();
        let handler_label = label.to_string();
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(CdpError::Ws(e)) = event {
                    warn!("[{}] DevTools connection lost: {}", handler_label, e);
                    break;
                }
            }
            handler_flag.store(false, Ordering::SeqCst);
        });

        let opened = match open_in_first_tab(&browser, url).await {
            Ok(page) => track_loads(&page).await.map(|tracker| (page, tracker)),
            Err(e) => Err(e),
        };
        let (page, navigation) = match opened {
            Ok(opened) => opened,
            Err(e) => {
                handler_task.abort();
                drop(browser);
                let _ = std::fs::remove_dir_all(&profile_dir);
                return Err(DomainError::Infrastructure(format!(
                    "Failed to open {}: {}",
                    url, e
                )));
            }
        };
        info!("[{}] Opened {}", label, url);

        Ok(ChromiumDriver::new(
            label.to_string(),
            browser,
            page,
            navigation,
            handler_task,
            connected,
            profile_dir,
            self.timeouts.clone(),
        ))
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, url: &str, label: &str) -> Result<Box<dyn LoginDriver>, DomainError> {
        let driver = self.launch_chromium(url, label).await?;
        Ok(Box::new(driver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loginport_domain::login::DriverError;

    const FIRST_PAGE: &str = "data:text/html,<p id='first'>first</p>";
    const SECOND_PAGE: &str = "data:text/html,<p id='second'>second</p>";

    /// Skips when no Chromium can be started on this machine.
    async fn launch_or_skip() -> Option<ChromiumDriver> {
        find_browser(None)?;
        match ChromiumLauncher::new(None).launch_chromium(FIRST_PAGE, "test").await {
            Ok(driver) => Some(driver),
            Err(e) => {
                eprintln!("skipping: browser did not start: {}", e);
                None
            }
        }
    }

    #[tokio::test]
    async fn test_sign_in_page_reuses_startup_tab() {
        let Some(driver) = launch_or_skip().await else {
            return;
        };

        assert_eq!(driver.open_tabs().await, 1);
    }

    #[tokio::test]
    async fn test_finished_load_does_not_satisfy_later_wait() {
        let Some(driver) = launch_or_skip().await else {
            return;
        };
        driver
            .wait_visible("#first", Duration::from_secs(10))
            .await
            .unwrap();

        driver.arm_navigation();
        let stale = driver.wait_for_navigation(Duration::from_secs(1)).await;
        assert!(matches!(stale, Err(DriverError::Timeout { .. })));

        driver.arm_navigation();
        driver.navigate_by_script(SECOND_PAGE).await;
        driver
            .wait_for_navigation(Duration::from_secs(10))
            .await
            .unwrap();
        driver
            .wait_visible("#second", Duration::from_secs(10))
            .await
            .unwrap();
    }
}
