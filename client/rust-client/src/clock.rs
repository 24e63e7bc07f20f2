use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Source of the current instant
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock moved by hand, for tests and replays
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Shared "now" that views subscribe to.
///
/// Every `tick` samples the clock and publishes the instant to all
/// subscribers, whether or not it moved forward.
pub struct Ticker {
    clock: Arc<dyn Clock>,
    tx: watch::Sender<DateTime<Utc>>,
}

impl Ticker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let (tx, _rx) = watch::channel(clock.now());
        Self { clock, tx }
    }

    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Last published instant
    pub fn now(&self) -> DateTime<Utc> {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<DateTime<Utc>> {
        self.tx.subscribe()
    }

    pub fn tick(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        self.tx.send_replace(now);
        tracing::trace!(%now, "clock tick");
        now
    }

    /// Tick on a fixed cadence until the returned handle is dropped
    pub fn spawn(self: &Arc<Self>, interval: Duration) -> TickerHandle {
        let ticker = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                ticker.tick();
            }
        });
        TickerHandle { task }
    }
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticker").field("now", &self.now()).finish()
    }
}

/// Stops the periodic ticker when dropped
#[derive(Debug)]
pub struct TickerHandle {
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Consumes the handle; dropping it aborts the ticking task.
    pub fn stop(self) {}
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
