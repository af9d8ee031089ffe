use loginport_infrastructure::config::TimeoutConfig;
use std::time::Duration;

/// Per-step bounds of the console sign-in sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginTimeouts {
    /// Username, password and submit-button waits (default: 30 seconds)
    pub element_wait: Duration,

    /// MFA input field wait (default: 10 seconds)
    pub mfa_field: Duration,

    /// Each branch of the post-login landing race (default: 15 seconds)
    pub landing: Duration,

    /// Browser process start (default: 30 seconds)
    pub browser_launch: Duration,

    /// DOM visibility poll interval (default: 100 milliseconds)
    pub poll_interval: Duration,
}

impl Default for LoginTimeouts {
    fn default() -> Self {
        Self {
            element_wait: Duration::from_secs(30),
            mfa_field: Duration::from_secs(10),
            landing: Duration::from_secs(15),
            browser_launch: Duration::from_secs(30),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl LoginTimeouts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set element wait
    pub fn with_element_wait(mut self, duration: Duration) -> Self {
        self.element_wait = duration;
        self
    }

    /// Builder pattern: set MFA field wait
    pub fn with_mfa_field(mut self, duration: Duration) -> Self {
        self.mfa_field = duration;
        self
    }

    /// Builder pattern: set landing race bound
    pub fn with_landing(mut self, duration: Duration) -> Self {
        self.landing = duration;
        self
    }

    /// Builder pattern: set browser launch timeout
    pub fn with_browser_launch(mut self, duration: Duration) -> Self {
        self.browser_launch = duration;
        self
    }

    /// Builder pattern: set poll interval
    pub fn with_poll_interval(mut self, duration: Duration) -> Self {
        self.poll_interval = duration;
        self
    }

    /// Browser-side timeouts derived from these step bounds.
    pub fn browser_timeouts(&self) -> TimeoutConfig {
        TimeoutConfig {
            browser_launch: self.browser_launch,
            element_poll: self.poll_interval,
            ..TimeoutConfig::default()
        }
    }
}
