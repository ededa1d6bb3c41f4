//! Fixed-period timer driving auto-mode samples

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Repeating timer that spawns `on_tick` every period.
///
/// Ticks never wait for the previous tick's work; overlap is the callback's
/// concern. Stopping or dropping the task cancels the timer, so no further
/// ticks fire. Work already spawned by a tick keeps running.
#[derive(Debug)]
pub struct PollingTask {
    handle: JoinHandle<()>,
}

impl PollingTask {
    /// Start the timer; the first tick fires one period from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                tokio::spawn(on_tick());
            }
        });
        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PollingTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(
        ticks: &Arc<AtomicUsize>,
    ) -> impl FnMut() -> std::future::Ready<()> + Send + 'static {
        let ticks = Arc::clone(ticks);
        move || {
            ticks.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let _task = PollingTask::start(Duration::from_millis(800), counting(&ticks));

        tokio::time::sleep(Duration::from_millis(799)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2400)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_future_ticks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let task = PollingTask::start(Duration::from_millis(800), counting(&ticks));

        tokio::time::sleep(Duration::from_millis(1700)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        task.stop();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_task_stops_it() {
        let ticks = Arc::new(AtomicUsize::new(0));
        drop(PollingTask::start(Duration::from_millis(100), counting(&ticks)));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }
}
