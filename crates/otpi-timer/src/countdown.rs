//! Countdown scheduling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Interval between ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Sentinel stored in the live-run slot when no run is active.
const NO_RUN: u64 = 0;

/// Identifier of a single countdown run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(u64);

impl RunId {
    /// Raw numeric value, for logging.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Receives countdown events.
///
/// Callbacks run on the timer task and must not block.
pub trait CountdownListener: Send + Sync + 'static {
    /// Called with the new remaining value, including the terminal `0`.
    fn on_tick(&self, run: RunId, remaining: u32);

    /// Called once when the run reaches zero.
    fn on_expire(&self, run: RunId);
}

struct ActiveRun {
    id: RunId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// A restartable, cancelable one-second countdown.
pub struct CountdownTimer {
    /// Id of the run allowed to fire, or `NO_RUN`
    live: Arc<AtomicU64>,
    last_id: u64,
    active: Option<ActiveRun>,
}

impl CountdownTimer {
    /// Create an idle timer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            live: Arc::new(AtomicU64::new(NO_RUN)),
            last_id: NO_RUN,
            active: None,
        }
    }

    /// Start a run of `duration_secs`, replacing any run in progress.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, duration_secs: u32, listener: Arc<dyn CountdownListener>) -> RunId {
        self.stop();

        self.last_id += 1;
        let id = RunId(self.last_id);
        self.live.store(id.0, Ordering::SeqCst);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_countdown(
            id,
            duration_secs,
            listener,
            cancel.clone(),
            Arc::clone(&self.live),
        ));

        tracing::debug!(run = id.0, duration_secs, "countdown started");
        self.active = Some(ActiveRun { id, cancel, handle });
        id
    }

    /// Cancel the current run, if any. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(run) = self.active.take() {
            // Retire the id first so an in-flight tick observes the stop.
            let _ = self.live.compare_exchange(
                run.id.0,
                NO_RUN,
                Ordering::SeqCst,
                Ordering::SeqCst,
            );
            run.cancel.cancel();
            if !run.handle.is_finished() {
                tracing::debug!(run = run.id.0, "countdown stopped");
            }
        }
    }

    /// Whether a run is scheduled and has not yet expired or been stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.current_run().is_some()
    }

    /// The run currently allowed to fire.
    #[must_use]
    pub fn current_run(&self) -> Option<RunId> {
        let live = self.live.load(Ordering::SeqCst);
        self.active
            .as_ref()
            .filter(|run| run.id.0 == live)
            .map(|run| run.id)
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("current_run", &self.current_run())
            .finish()
    }
}

async fn run_countdown(
    id: RunId,
    duration_secs: u32,
    listener: Arc<dyn CountdownListener>,
    cancel: CancellationToken,
    live: Arc<AtomicU64>,
) {
    let is_live = || live.load(Ordering::SeqCst) == id.0;

    if !is_live() {
        return;
    }

    let mut remaining = duration_secs;
    listener.on_tick(id, remaining);

    let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while remaining > 0 {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            _ = interval.tick() => {}
        }

        if !is_live() {
            return;
        }

        remaining -= 1;
        listener.on_tick(id, remaining);
    }

    // Only the run that still owns the slot may report expiry.
    if live
        .compare_exchange(id.0, NO_RUN, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
    {
        tracing::debug!(run = id.0, "countdown expired");
        listener.on_expire(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Tick(RunId, u32),
        Expire(RunId),
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<Event>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<Event> {
            self.events.lock().expect("recorder lock").clone()
        }
    }

    impl CountdownListener for Recorder {
        fn on_tick(&self, run: RunId, remaining: u32) {
            self.events
                .lock()
                .expect("recorder lock")
                .push(Event::Tick(run, remaining));
        }

        fn on_expire(&self, run: RunId) {
            self.events
                .lock()
                .expect("recorder lock")
                .push(Event::Expire(run));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run_ticks_then_expires() {
        let recorder = Arc::new(Recorder::default());
        let mut timer = CountdownTimer::new();

        let run = timer.start(3, recorder.clone());
        assert!(timer.is_running());

        time::sleep(Duration::from_secs(10)).await;

        assert_eq!(
            recorder.events(),
            vec![
                Event::Tick(run, 3),
                Event::Tick(run, 2),
                Event::Tick(run, 1),
                Event::Tick(run, 0),
                Event::Expire(run),
            ]
        );
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate() {
        let recorder = Arc::new(Recorder::default());
        let mut timer = CountdownTimer::new();

        let run = timer.start(90, recorder.clone());
        tokio::task::yield_now().await;

        assert_eq!(recorder.events(), vec![Event::Tick(run, 90)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_expires_immediately() {
        let recorder = Arc::new(Recorder::default());
        let mut timer = CountdownTimer::new();

        let run = timer.start(0, recorder.clone());
        tokio::task::yield_now().await;

        assert_eq!(
            recorder.events(),
            vec![Event::Tick(run, 0), Event::Expire(run)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let mut timer = CountdownTimer::new();
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());

        let recorder = Arc::new(Recorder::default());
        timer.start(5, recorder);
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(timer.current_run(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ids_increase() {
        let recorder = Arc::new(Recorder::default());
        let mut timer = CountdownTimer::new();

        let first = timer.start(5, recorder.clone());
        let second = timer.start(5, recorder);
        assert!(second > first);
        assert_eq!(timer.current_run(), Some(second));
    }
}
