use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::Page;
use log::{debug, info};
use loginport_domain::login::{DriverError, LoginDriver};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::cleanup::remove_profile_dir;
use super::navigation::NavigationTracker;
use crate::config::TimeoutConfig;

/// A launched Chromium window with one page, driven over CDP.
pub struct ChromiumDriver {
    label: String,
    browser: Mutex<Browser>,
    page: Page,
    navigation: NavigationTracker,
    handler_task: JoinHandle<()>,
    connected: Arc<AtomicBool>,
    profile_dir: PathBuf,
    timeouts: TimeoutConfig,
}

impl ChromiumDriver {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        label: String,
        browser: Browser,
        page: Page,
        navigation: NavigationTracker,
        handler_task: JoinHandle<()>,
        connected: Arc<AtomicBool>,
        profile_dir: PathBuf,
        timeouts: TimeoutConfig,
    ) -> Self {
        Self {
            label,
            browser: Mutex::new(browser),
            page,
            navigation,
            handler_task,
            connected,
            profile_dir,
            timeouts,
        }
    }

    fn classify(&self, err: impl std::fmt::Display) -> DriverError {
        if self.is_connected() {
            DriverError::Other(err.to_string())
        } else {
            DriverError::Disconnected
        }
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, DriverError> {
        let result = self
            .page
            .evaluate(visibility_script(selector))
            .await
            .map_err(|e| self.classify(e))?;
        Ok(result.into_value::<bool>().unwrap_or(false))
    }
}

/// JS expression: true when `selector` matches a rendered, non-hidden element.
fn visibility_script(selector: &str) -> String {
    let quoted = serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"(() => {{
    const el = document.querySelector({quoted});
    if (!el) return false;
    const style = window.getComputedStyle(el);
    const rect = el.getBoundingClientRect();
    return style.visibility !== 'hidden' && style.display !== 'none' && rect.width > 0 && rect.height > 0;
}})()"#
    )
}

#[async_trait]
impl LoginDriver for ChromiumDriver {
    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<(), DriverError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if !self.is_connected() {
                return Err(DriverError::Disconnected);
            }
            // Check errors during a page transition are transient
            match self.is_visible(selector).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(DriverError::Disconnected) => return Err(DriverError::Disconnected),
                Err(e) => debug!("[{}] Visibility check for {} failed: {}", self.label, selector, e),
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(DriverError::Timeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(self.timeouts.element_poll).await;
        }
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| self.classify(e))?;
        element.click().await.map_err(|e| self.classify(e))?;
        element.type_str(text).await.map_err(|e| self.classify(e))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| self.classify(e))?;
        element.click().await.map_err(|e| self.classify(e))?;
        Ok(())
    }

    fn arm_navigation(&self) {
        self.navigation.arm();
    }

    async fn wait_for_navigation(&self, timeout: Duration) -> Result<(), DriverError> {
        self.navigation.wait(timeout).await
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn keep_open(self: Box<Self>) {
        let ChromiumDriver {
            label,
            browser,
            page,
            navigation,
            handler_task,
            profile_dir,
            timeouts,
            ..
        } = *self;
        drop(page);
        drop(navigation);

        // Dropping `Browser` kills the process, so it lives in this task
        // until the operator closes the window.
        tokio::spawn(async move {
            let browser = browser.into_inner();
            let _ = handler_task.await;
            info!("[{}] Browser window closed", label);
            drop(browser);
            remove_profile_dir(&profile_dir, timeouts.profile_cleanup_delay, &label).await;
        });
    }
}

#[cfg(test)]
impl ChromiumDriver {
    pub(super) async fn open_tabs(&self) -> usize {
        let browser = self.browser.lock().await;
        browser.pages().await.map(|pages| pages.len()).unwrap_or(0)
    }

    /// Script-driven navigation, as a form submit would trigger.
    pub(super) async fn navigate_by_script(&self, url: &str) {
        let quoted = serde_json::to_string(url).unwrap();
        let _ = self.page.evaluate(format!("window.location.href = {}", quoted)).await;
    }
}
