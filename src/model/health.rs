//! Health decay, failure probability and derived performance metrics
//!
//! Health only ever falls during a tick. Maintenance is the single path
//! that raises it again.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::Timestamp;
use crate::network::component::{
    Component, MAX_FAILURE_PROBABILITY, MAX_HEALTH, MIN_FAILURE_PROBABILITY,
};

/// Below this health the failure probability grows each tick
pub const DEGRADED_THRESHOLD: f64 = 50.0;
/// Above this health the failure probability recovers each tick
pub const EXCELLENT_THRESHOLD: f64 = 90.0;

const FAILURE_GROWTH: f64 = 1.1;
const FAILURE_RECOVERY: f64 = 0.99;

const MIN_TEMPERATURE: f64 = 20.0;
const MIN_POWER_WATTS: f64 = 50.0;

/// Result of one decay step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthUpdate {
    pub health_score: f64,
    pub failure_probability: f64,
}

/// Health and failure probability after `elapsed_hours` without maintenance
pub fn decay(component: &Component, elapsed_hours: f64) -> HealthUpdate {
    let loss = component.degradation_rate * elapsed_hours.max(0.0) / 24.0;
    let health_score = (component.health_score - loss).max(0.0);

    let failure_probability = if health_score < DEGRADED_THRESHOLD {
        (component.failure_probability * FAILURE_GROWTH).min(MAX_FAILURE_PROBABILITY)
    } else if health_score > EXCELLENT_THRESHOLD {
        (component.failure_probability * FAILURE_RECOVERY).max(MIN_FAILURE_PROBABILITY)
    } else {
        component.failure_probability
    };

    HealthUpdate {
        health_score,
        failure_probability,
    }
}

/// 0.0 for a perfectly healthy component, 1.0 for a dead one
pub fn health_factor(health_score: f64) -> f64 {
    ((MAX_HEALTH - health_score) / MAX_HEALTH).clamp(0.0, 1.0)
}

/// Redraw temperature, error count and power draw; accumulate uptime
///
/// Jitter is scaled by `1 + health_factor`, so worse health widens the spread.
pub fn refresh_metrics<R: Rng>(component: &mut Component, elapsed_hours: f64, rng: &mut R) {
    let profile = component.component_type.profile();
    let factor = health_factor(component.health_score);
    let spread = 1.0 + factor;
    let metrics = &mut component.performance_metrics;

    let temp_variation = rng.gen_range(-5.0..=15.0) * spread;
    metrics.temperature_celsius = (profile.base_temperature + temp_variation).max(MIN_TEMPERATURE);

    let base_errors: u32 = rng.gen_range(0..=3);
    let health_errors = (factor * f64::from(rng.gen_range(0u32..=20))) as u32;
    metrics.error_count_24h = base_errors + health_errors;

    let power_variation = rng.gen_range(-50.0..=100.0) * spread;
    metrics.power_consumption_watts =
        (profile.base_power_watts + power_variation).max(MIN_POWER_WATTS);

    metrics.uptime_hours += elapsed_hours.max(0.0);
}

/// Apply one tick of decay and metric refresh in place
pub fn update_component<R: Rng>(component: &mut Component, elapsed_hours: f64, rng: &mut R) {
    let update = decay(component, elapsed_hours);
    component.health_score = update.health_score;
    component.failure_probability = update.failure_probability;
    refresh_metrics(component, elapsed_hours, rng);
}

/// Before/after figures of one maintenance action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceReport {
    pub health_before: f64,
    pub health_after: f64,
    pub failure_probability_before: f64,
    pub failure_probability_after: f64,
}

/// Restore 20-40 health (capped), halve failure probability, stamp the time
pub fn maintain<R: Rng>(component: &mut Component, now: Timestamp, rng: &mut R) -> MaintenanceReport {
    let health_before = component.health_score;
    let failure_probability_before = component.failure_probability;

    let restored = rng.gen_range(20.0..=40.0);
    component.health_score = (component.health_score + restored).min(MAX_HEALTH);
    component.failure_probability =
        (component.failure_probability * 0.5).max(MIN_FAILURE_PROBABILITY);
    component.last_maintenance = now;

    MaintenanceReport {
        health_before,
        health_after: component.health_score,
        failure_probability_before,
        failure_probability_after: component.failure_probability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ComponentId, RegionId};
    use crate::network::component::ComponentKind;
    use chrono::Utc;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn component(kind: ComponentKind, health: f64, fp: f64, rate: f64) -> Component {
        Component::new(
            ComponentId::new("test-component"),
            kind,
            RegionId::new("region-test-01"),
            rate,
            Utc::now(),
        )
        .with_health(health)
        .with_failure_probability(fp)
    }

    #[test]
    fn test_ten_day_decay() {
        let c = component(ComponentKind::EdgeCompute, 100.0, 0.02, 0.12);
        let update = decay(&c, 240.0);
        assert!((update.health_score - 98.8).abs() < 1e-9);
    }

    #[test]
    fn test_decay_floors_at_zero() {
        let c = component(ComponentKind::BaseStation, 0.5, 0.02, 0.15);
        assert_eq!(decay(&c, 24.0 * 365.0).health_score, 0.0);
    }

    #[test]
    fn test_failure_probability_grows_when_degraded() {
        let c = component(ComponentKind::CoreNode, 40.0, 0.1, 0.05);
        let update = decay(&c, 1.0);
        assert!((update.failure_probability - 0.11).abs() < 1e-12);
    }

    #[test]
    fn test_failure_probability_capped() {
        let c = component(ComponentKind::CoreNode, 10.0, 0.89, 0.05);
        assert_eq!(decay(&c, 1.0).failure_probability, MAX_FAILURE_PROBABILITY);
    }

    #[test]
    fn test_failure_probability_recovers_when_excellent() {
        let c = component(ComponentKind::CoreNode, 99.0, 0.02, 0.05);
        let update = decay(&c, 1.0);
        assert!((update.failure_probability - 0.0198).abs() < 1e-12);
    }

    #[test]
    fn test_failure_probability_unchanged_in_middle_band() {
        let c = component(ComponentKind::CoreNode, 70.0, 0.3, 0.05);
        assert_eq!(decay(&c, 1.0).failure_probability, 0.3);
    }

    #[test]
    fn test_maintenance_restores_health() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut c = component(ComponentKind::BaseStation, 55.0, 0.2, 0.1);
        let now = Utc::now();

        let report = maintain(&mut c, now, &mut rng);
        assert!(report.health_after >= 75.0 && report.health_after <= 95.0);
        assert!((report.failure_probability_after - 0.1).abs() < 1e-12);
        assert_eq!(c.last_maintenance, now);
    }

    #[test]
    fn test_maintenance_caps_at_full_health() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut c = component(ComponentKind::BaseStation, 95.0, 0.0015, 0.1);
        let report = maintain(&mut c, Utc::now(), &mut rng);
        assert_eq!(report.health_after, MAX_HEALTH);
        assert_eq!(report.failure_probability_after, MIN_FAILURE_PROBABILITY);
    }

    proptest! {
        #[test]
        fn prop_decay_stays_in_bounds(
            health in 0.0f64..=100.0,
            fp in 0.001f64..=0.9,
            rate in 0.02f64..=0.20,
            hours in 0.0f64..10_000.0,
        ) {
            let c = component(ComponentKind::EdgeCompute, health, fp, rate);
            let update = decay(&c, hours);
            prop_assert!(update.health_score <= health);
            prop_assert!(update.health_score >= 0.0);
            prop_assert!(update.failure_probability >= MIN_FAILURE_PROBABILITY);
            prop_assert!(update.failure_probability <= MAX_FAILURE_PROBABILITY);
        }

        #[test]
        fn prop_metrics_respect_floors(health in 0.0f64..=100.0, seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for kind in ComponentKind::ALL {
                let mut c = component(kind, health, 0.05, 0.1);
                refresh_metrics(&mut c, 0.5, &mut rng);
                let m = &c.performance_metrics;
                prop_assert!(m.temperature_celsius >= MIN_TEMPERATURE);
                prop_assert!(m.power_consumption_watts >= MIN_POWER_WATTS);
                prop_assert!(m.error_count_24h <= 3 + 20);
                // Upper jitter bound doubles at zero health
                let p = kind.profile();
                prop_assert!(m.temperature_celsius <= p.base_temperature + 30.0);
                prop_assert!(m.power_consumption_watts <= p.base_power_watts + 200.0);
                prop_assert_eq!(c.health_score, health);
            }
        }

        #[test]
        fn prop_maintenance_never_worsens(
            health in 0.0f64..=100.0,
            fp in 0.001f64..=0.9,
            seed in any::<u64>(),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut c = component(ComponentKind::CoreNode, health, fp, 0.05);
            let report = maintain(&mut c, Utc::now(), &mut rng);
            prop_assert!(report.health_after >= report.health_before);
            if report.health_before < MAX_HEALTH {
                prop_assert!(report.health_after > report.health_before);
            }
            prop_assert!(report.failure_probability_after <= report.failure_probability_before);
        }
    }
}
