use loginport_domain::login::DriverError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LoadState {
    loads: u64,
    closed: bool,
}

/// Counts finished main-frame loads of one page.
///
/// A wait only resolves on a load that finished after the latest `arm`,
/// so a page that was already loaded when the trigger fired never counts.
#[derive(Debug, Clone)]
pub(crate) struct NavigationTracker {
    state: Arc<watch::Sender<LoadState>>,
    armed_at: Arc<AtomicU64>,
}

impl NavigationTracker {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(LoadState::default());
        Self {
            state: Arc::new(state),
            armed_at: Arc::new(AtomicU64::new(0)),
        }
    }

    pub(crate) fn record_load(&self) {
        self.state.send_modify(|s| s.loads += 1);
    }

    /// The page is gone; pending and future waits fail.
    pub(crate) fn close(&self) {
        self.state.send_modify(|s| s.closed = true);
    }

    pub(crate) fn arm(&self) {
        let loads = self.state.borrow().loads;
        self.armed_at.store(loads, Ordering::SeqCst);
    }

    pub(crate) async fn wait(&self, timeout: Duration) -> Result<(), DriverError> {
        let armed_at = self.armed_at.load(Ordering::SeqCst);
        let mut state = self.state.subscribe();

        let reached = tokio::time::timeout(
            timeout,
            state.wait_for(|s| s.closed || s.loads > armed_at),
        )
        .await;

        match reached {
            Ok(Ok(s)) if s.loads > armed_at => Ok(()),
            Ok(_) => Err(DriverError::Disconnected),
            Err(_) => Err(DriverError::Timeout {
                selector: "<navigation>".to_string(),
                timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_load_before_arm_is_ignored() {
        let tracker = NavigationTracker::new();
        tracker.record_load();
        tracker.arm();

        let result = tracker.wait(Duration::from_secs(15)).await;

        assert!(matches!(result, Err(DriverError::Timeout { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_after_arm_resolves() {
        let tracker = NavigationTracker::new();
        tracker.record_load();
        tracker.arm();

        let page = tracker.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            page.record_load();
        });

        let started = tokio::time::Instant::now();
        tracker.wait(Duration::from_secs(15)).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(started.elapsed() < Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearming_ignores_earlier_navigation() {
        let tracker = NavigationTracker::new();
        tracker.arm();
        tracker.record_load();
        tracker.wait(Duration::from_secs(1)).await.unwrap();

        tracker.arm();
        let result = tracker.wait(Duration::from_secs(1)).await;

        assert!(matches!(result, Err(DriverError::Timeout { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_page_is_disconnected() {
        let tracker = NavigationTracker::new();
        tracker.arm();

        let page = tracker.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            page.close();
        });

        let result = tracker.wait(Duration::from_secs(15)).await;

        assert_eq!(result, Err(DriverError::Disconnected));
    }
}
