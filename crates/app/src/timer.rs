//! Repeating timer driving the emulation loop.
//!
//! [`arm`] spawns a task that calls the tick closure once per period and
//! hands back the only [`TimerHandle`] for it. [`TimerHandle::disarm`]
//! consumes the handle, so a timer can be stopped at most once; dropping
//! the handle also stops it. Ticks run inside the timer task one after
//! another; a tick that overruns the period delays the next firing instead
//! of overlapping it.
//! Disarming is observed only between ticks, so an in-flight tick always
//! completes.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Owned handle to an armed timer.
#[derive(Debug)]
pub struct TimerHandle {
    period: Duration,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Start calling `tick` every `period`, first after one full period.
#[must_use = "dropping the handle stops the timer after the current tick"]
pub fn arm<F, Fut>(period: Duration, mut tick: F) -> TimerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (stop, mut stopped) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = &mut stopped => break,
                _ = interval.tick() => tick().await,
            }
        }
        tracing::debug!(period = ?period, "timer task finished");
    });

    tracing::debug!(period = ?period, "timer armed");
    TimerHandle { period, stop, task }
}

impl TimerHandle {
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stop the timer and wait for its task to finish, including any
    /// in-flight tick.
    pub async fn disarm(self) {
        // The receiver is gone only if the task already ended.
        let _ = self.stop.send(());
        if let Err(err) = self.task.await
            && err.is_panic()
        {
            tracing::error!(%err, "timer task panicked");
        }
        tracing::debug!(period = ?self.period, "timer disarmed");
    }
}
