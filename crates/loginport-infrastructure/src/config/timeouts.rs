use std::time::Duration;

/// Configuration for infrastructure-level timeout durations
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Browser launch timeout
    pub browser_launch: Duration,

    /// Interval between DOM visibility checks
    pub element_poll: Duration,

    /// Delay before removing a closed browser's profile directory
    pub profile_cleanup_delay: Duration,

    /// HTTP request timeout for Google APIs
    pub http_request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        GLOBAL_TIMEOUT_CONFIG.clone()
    }
}

impl TimeoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the global timeout configuration
    pub fn global() -> &'static Self {
        &GLOBAL_TIMEOUT_CONFIG
    }
}

/// Global timeout configuration instance
static GLOBAL_TIMEOUT_CONFIG: TimeoutConfig = TimeoutConfig {
    browser_launch: Duration::from_secs(30),
    element_poll: Duration::from_millis(100),
    profile_cleanup_delay: Duration::from_secs(1),
    http_request: Duration::from_secs(30),
};
