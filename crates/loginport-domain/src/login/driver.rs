use async_trait::async_trait;
use std::time::Duration;

use crate::shared::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    #[error("'{selector}' not visible within {timeout:?}")]
    Timeout { selector: String, timeout: Duration },

    #[error("browser disconnected")]
    Disconnected,

    #[error("{0}")]
    Other(String),
}

impl From<DriverError> for DomainError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Timeout { .. } => DomainError::AutomationTimeout(err.to_string()),
            DriverError::Disconnected => DomainError::AutomationAborted(err.to_string()),
            DriverError::Other(msg) => DomainError::Infrastructure(msg),
        }
    }
}

/// One page of one browser instance, as seen by the sign-in sequence.
#[async_trait]
pub trait LoginDriver: Send + Sync {
    /// Wait until an element matching `selector` exists and is visible.
    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Type `text` into the first element matching `selector`.
    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError>;

    async fn click(&self, selector: &str) -> Result<(), DriverError>;

    /// Mark the current point in the page's history. Call right before the
    /// action expected to navigate.
    fn arm_navigation(&self);

    /// Wait for a navigation that finishes after the latest `arm_navigation`.
    async fn wait_for_navigation(&self, timeout: Duration) -> Result<(), DriverError>;

    /// Whether the browser process is still reachable.
    fn is_connected(&self) -> bool;

    /// Give up control but leave the window open for the operator.
    fn keep_open(self: Box<Self>);
}

/// Starts a fresh browser instance on a URL.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, url: &str, label: &str) -> Result<Box<dyn LoginDriver>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_mapping() {
        let timeout = DriverError::Timeout {
            selector: "#mfacode".into(),
            timeout: Duration::from_secs(10),
        };
        assert!(matches!(
            DomainError::from(timeout),
            DomainError::AutomationTimeout(_)
        ));
        assert!(matches!(
            DomainError::from(DriverError::Disconnected),
            DomainError::AutomationAborted(_)
        ));
        assert_eq!(
            DomainError::from(DriverError::Other("boom".into())),
            DomainError::Infrastructure("boom".into())
        );
    }
}
