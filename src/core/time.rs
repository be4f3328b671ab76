//! Wall-clock sources for the simulation clock

use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};

use crate::core::types::Timestamp;

/// Supplies "now" to the simulation clock
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Real UTC wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Simulated time that runs `scale` times faster than wall time
#[derive(Debug, Clone)]
pub struct ScaledTimeSource {
    origin_wall: Instant,
    origin_sim: Timestamp,
    scale: f64,
}

impl ScaledTimeSource {
    pub fn new(origin_sim: Timestamp, scale: f64) -> Self {
        Self {
            origin_wall: Instant::now(),
            origin_sim,
            scale: scale.max(0.0),
        }
    }
}

impl TimeSource for ScaledTimeSource {
    /// Saturates at the latest representable instant
    fn now(&self) -> Timestamp {
        let wall_ms = self.origin_wall.elapsed().as_secs_f64() * 1000.0;
        Duration::try_milliseconds((wall_ms * self.scale) as i64)
            .and_then(|offset| self.origin_sim.checked_add_signed(offset))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Each read returns the previous value plus a fixed step
///
/// Deterministic driver for tests and replay.
#[derive(Debug)]
pub struct SteppingTimeSource {
    next: Mutex<Timestamp>,
    step: Duration,
}

impl SteppingTimeSource {
    pub fn new(start: Timestamp, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }
}

impl TimeSource for SteppingTimeSource {
    fn now(&self) -> Timestamp {
        let mut next = match self.next.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *next = *next + self.step;
        *next
    }
}
