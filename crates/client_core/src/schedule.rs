use std::time::Duration;

use tokio::runtime::Handle;
use tracing::warn;

/// Runs `task` after `delay` on the current runtime.
pub(crate) fn schedule_after(delay: Duration, task: impl FnOnce() + Send + 'static) {
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                task();
            });
        }
        Err(_) => warn!(
            delay_ms = delay.as_millis() as u64,
            "ui: no async runtime available, delayed update dropped"
        ),
    }
}
