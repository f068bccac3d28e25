use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A schedule/cancel pair around a single delayed callback.
///
/// Each call to [`schedule`](Self::schedule) cancels the previously pending
/// callback (if it hasn't fired yet) before arming a new one. Once the delay
/// elapses the callback runs to completion; cancelling after that point has
/// no effect on it. Use your own [`CancellationToken`] inside the callback if
/// the work itself needs to be interruptible.
///
/// Callbacks are spawned onto the current Tokio runtime, so both methods must
/// be called from within one.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: Mutex::new(None) }
    }

    /// Arm the timer, replacing (and cancelling) any pending callback.
    pub fn schedule<F>(&self, callback: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let previous = self.pending.lock().unwrap_or_else(PoisonError::into_inner).replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::trace!("debounced callback cancelled before firing");
                },
                _ = tokio::time::sleep(delay) => callback.await,
            }
        });
    }

    /// Cancel the pending callback, if any. Safe to call repeatedly.
    pub fn cancel(&self) {
        if let Some(token) = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take() {
            token.cancel();
        }
    }

    /// Returns `true` if a callback has been scheduled and not cancelled.
    ///
    /// A callback that has already fired still counts as armed until the
    /// next `schedule()` or `cancel()`.
    pub fn is_armed(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_callback(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.schedule(counter_callback(&fired));
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_coalesces_into_one_callback() {
        let fired = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.schedule(counter_callback(&fired));
        tokio::time::sleep(Duration::from_millis(50)).await;
        debouncer.schedule(counter_callback(&fired));
        tokio::time::sleep(Duration::from_millis(280)).await;
        // First timer would have fired at 300ms; it was replaced.
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent() {
        let fired = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.cancel();
        debouncer.schedule(counter_callback(&fired));
        assert!(debouncer.is_armed());
        debouncer.cancel();
        debouncer.cancel();
        assert!(!debouncer.is_armed());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
