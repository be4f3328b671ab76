//! Background simulation clock
//!
//! A tokio task that wakes on a fixed interval and asks a [`Simulation`] to
//! advance to the current wall-clock time. Errors and panics from a tick are
//! logged and followed by a longer pause; they never end the loop. The loop
//! exits when the shutdown flag flips.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::config::ClockConfig;
use crate::core::error::{Result, SimError};
use crate::core::time::TimeSource;
use crate::core::types::Timestamp;
use crate::state::store::{StateStore, TickOutcome};

/// Something the clock can drive forward
pub trait Simulation: Send + Sync + 'static {
    fn advance(&self, now: Timestamp) -> Result<TickOutcome>;
}

impl Simulation for StateStore {
    fn advance(&self, now: Timestamp) -> Result<TickOutcome> {
        StateStore::advance(self, now)
    }
}

/// Tick counts collected over a clock's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockStats {
    pub applied: u64,
    pub skipped: u64,
    pub failed: u64,
}

#[derive(Debug, Clone)]
pub struct SimulationClock {
    tick_interval: Duration,
    error_backoff: Duration,
}

impl SimulationClock {
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            error_backoff: config.error_backoff(),
        }
    }

    /// Drive a store with its own clock settings and stop signal
    pub fn start(store: Arc<StateStore>, time: Arc<dyn TimeSource>) -> ClockHandle {
        let shutdown = store.shutdown_signal();
        Self::new(&store.config().clock).spawn(store, time, shutdown)
    }

    /// Spawn the loop on the current tokio runtime
    pub fn spawn<S: Simulation>(
        self,
        sim: Arc<S>,
        time: Arc<dyn TimeSource>,
        shutdown: watch::Receiver<bool>,
    ) -> ClockHandle {
        let join = tokio::spawn(self.run(sim, time, shutdown));
        ClockHandle { join }
    }

    async fn run<S: Simulation>(
        self,
        sim: Arc<S>,
        time: Arc<dyn TimeSource>,
        mut shutdown: watch::Receiver<bool>,
    ) -> ClockStats {
        let mut stats = ClockStats::default();
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut backing_off = false;

        tracing::info!(
            interval_secs = self.tick_interval.as_secs_f64(),
            "Simulation clock started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let after_backoff = backing_off;
            if backing_off {
                tokio::select! {
                    _ = tokio::time::sleep(self.error_backoff) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                }
            } else {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                }
            }

            match advance_guarded(sim.as_ref(), time.now()) {
                Ok(TickOutcome::Applied(_)) => {
                    stats.applied += 1;
                    backing_off = false;
                }
                Ok(TickOutcome::Skipped) => {
                    stats.skipped += 1;
                    backing_off = false;
                }
                Err(err) => {
                    stats.failed += 1;
                    backing_off = true;
                    tracing::warn!(
                        error = %err,
                        backoff_secs = self.error_backoff.as_secs_f64(),
                        "Simulation tick failed, backing off"
                    );
                }
            }
            if after_backoff {
                // Regular ticks resume one interval after the retry
                ticker.reset();
            }
        }

        tracing::info!(
            applied = stats.applied,
            skipped = stats.skipped,
            failed = stats.failed,
            "Simulation clock stopped"
        );
        stats
    }
}

/// Run one tick, converting a panic into a transient error
fn advance_guarded<S: Simulation>(sim: &S, now: Timestamp) -> Result<TickOutcome> {
    match panic::catch_unwind(AssertUnwindSafe(|| sim.advance(now))) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic during advance".to_string());
            Err(SimError::TransientEvolution(message))
        }
    }
}

/// Owner of a running clock task
#[derive(Debug)]
pub struct ClockHandle {
    join: JoinHandle<ClockStats>,
}

impl ClockHandle {
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the loop to exit after its stop signal
    pub async fn join(self) -> Result<ClockStats> {
        self.join
            .await
            .map_err(|e| SimError::TransientEvolution(format!("clock task ended abnormally: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct Panicking;

    impl Simulation for Panicking {
        fn advance(&self, _now: Timestamp) -> Result<TickOutcome> {
            panic!("sensor table corrupted");
        }
    }

    struct Counting(AtomicU64);

    impl Simulation for Counting {
        fn advance(&self, _now: Timestamp) -> Result<TickOutcome> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(TickOutcome::Skipped)
        }
    }

    #[test]
    fn test_panic_becomes_transient_error() {
        let err = advance_guarded(&Panicking, chrono::Utc::now()).unwrap_err();
        match err {
            SimError::TransientEvolution(msg) => assert!(msg.contains("sensor table corrupted")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_first_tick_exits() {
        let (tx, rx) = watch::channel(true);
        let sim = Arc::new(Counting(AtomicU64::new(0)));
        let clock = SimulationClock::new(&ClockConfig::default());
        let handle = clock.spawn(sim.clone(), Arc::new(crate::core::time::SystemTimeSource), rx);

        let stats = handle.join().await.unwrap();
        assert_eq!(stats, ClockStats::default());
        assert_eq!(sim.0.load(Ordering::SeqCst), 0);
        drop(tx);
    }
}
