//! Diurnal traffic load
//!
//! Peak hours: 08:00-10:59 and 18:00-21:59
//! Low hours: 23:00-06:59

use std::ops::RangeInclusive;

use chrono::Timelike;
use rand::Rng;

use crate::core::types::Timestamp;
use crate::network::region::{Region, TrafficPattern};

/// Load of an average region at multiplier 1.0
pub const BASE_LOAD: f64 = 0.6;

const REGION_FACTOR: RangeInclusive<f64> = 0.9..=1.1;
const NOISE: RangeInclusive<f64> = -0.1..=0.1;

impl TrafficPattern {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            8..=10 | 18..=21 => TrafficPattern::Peak,
            23 | 0..=6 => TrafficPattern::Low,
            _ => TrafficPattern::Normal,
        }
    }

    /// Range the tick's global load multiplier is drawn from
    pub fn multiplier_range(&self) -> RangeInclusive<f64> {
        match self {
            TrafficPattern::Peak => 1.2..=1.5,
            TrafficPattern::Low => 0.4..=0.7,
            TrafficPattern::Normal => 0.8..=1.1,
        }
    }
}

/// Pattern for the hour and one multiplier drawn for the whole tick
pub fn diurnal_load<R: Rng>(now: Timestamp, rng: &mut R) -> (TrafficPattern, f64) {
    let pattern = TrafficPattern::from_hour(now.hour());
    let multiplier = rng.gen_range(pattern.multiplier_range());
    (pattern, multiplier)
}

/// Recompute one region's load with its own regional factor and noise
pub fn update_region_load<R: Rng>(
    region: &mut Region,
    pattern: TrafficPattern,
    multiplier: f64,
    rng: &mut R,
) {
    let region_factor = rng.gen_range(REGION_FACTOR);
    let noise = rng.gen_range(NOISE);
    region.traffic_pattern = pattern;
    region.set_load(BASE_LOAD * multiplier * region_factor + noise);
}
