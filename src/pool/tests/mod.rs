//! Test modules for the worker pool system

mod resize;

use std::time::Duration;

/// Poll `condition` every few milliseconds until it holds or `deadline` passes
pub(super) async fn eventually(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = tokio::time::Instant::now();
    loop {
        if condition() {
            return true;
        }
        if start.elapsed() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
