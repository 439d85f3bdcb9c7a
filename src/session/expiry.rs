// Cancellable delayed task used for session expiry scheduling

use std::future::Future;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A one-shot task scheduled to run at a deadline.
///
/// Cancelled by calling [`DelayedTask::cancel`] or by dropping the handle.
/// Backed by `tokio::time`, so paused test clocks drive it deterministically.
#[derive(Debug)]
pub struct DelayedTask {
    handle: Option<JoinHandle<()>>,
}

impl DelayedTask {
    /// Schedule `task` to run once `deadline` is reached.
    pub fn spawn_at<F>(deadline: Instant, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            task.await;
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Cancel the task if it has not fired yet
    pub fn cancel(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    /// Let the task run to completion without this handle.
    ///
    /// Required when the running task drops its own `DelayedTask` (the
    /// session-expiry path); cancelling there would abort the task at its
    /// next await point, mid-cleanup.
    pub fn detach(mut self) {
        self.handle.take();
    }
}

impl Drop for DelayedTask {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_fires_at_deadline() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        let _task = DelayedTask::spawn_at(Instant::now() + Duration::from_secs(60), async move {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        let task = DelayedTask::spawn_at(Instant::now() + Duration::from_secs(60), async move {
            flag.store(true, Ordering::SeqCst);
        });
        task.cancel();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        {
            let _task =
                DelayedTask::spawn_at(Instant::now() + Duration::from_secs(60), async move {
                    flag.store(true, Ordering::SeqCst);
                });
        }

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
