//! Integration tests for the state store
//!
//! These tests drive the store directly with explicit timestamps and check
//! the model's invariants:
//! - decay follows the per-day formula until the floor
//! - maintenance never makes a component worse
//! - the active/history split matches each event's duration
//! - recent events come back newest first and inside the window
//! - loads, health and failure probability stay in bounds
//! - a skipped tick changes nothing

use chrono::{DateTime, Duration, TimeZone, Utc};

use netpulse::core::types::{hours_between, ComponentId, RegionId};
use netpulse::events::ResolutionStatus;
use netpulse::network::component::{
    Component, ComponentKind, MAX_FAILURE_PROBABILITY, MIN_FAILURE_PROBABILITY,
};
use netpulse::network::region::{EnvironmentalFactors, Region, MAX_LOAD, MIN_LOAD};
use netpulse::network::Topology;
use netpulse::{SimulationConfig, StateStore, TickOutcome};

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 15, 6, 0, 0).unwrap()
}

fn config(seed: u64, event_probability: f64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.seed = Some(seed);
    config.events.probability_per_tick = event_probability;
    config
}

fn seeded_store(seed: u64, event_probability: f64) -> StateStore {
    StateStore::new(config(seed, event_probability), start_time()).expect("valid config")
}

#[test]
fn test_decay_follows_formula_without_events() {
    let store = seeded_store(1, 0.0);
    let initial = store.components().unwrap();

    let mut previous = initial.clone();
    let mut now = start_time();
    for _ in 0..48 {
        now = now + Duration::minutes(30);
        assert!(store.advance(now).unwrap().is_applied());

        let current = store.components().unwrap();
        for (before, after) in previous.iter().zip(&current) {
            assert_eq!(before.component_id, after.component_id);
            assert!(after.health_score <= before.health_score);
        }
        previous = current;
    }

    let hours = hours_between(start_time(), now);
    for (first, last) in initial.iter().zip(&previous) {
        let expected = (first.health_score - first.degradation_rate * hours / 24.0).max(0.0);
        assert!(
            (last.health_score - expected).abs() < 1e-9,
            "{}: expected {}, got {}",
            first.component_id,
            expected,
            last.health_score
        );
    }
}

#[test]
fn test_ten_day_scenario() {
    let start = start_time();
    let region = Region::new(
        RegionId::new("region-test-01"),
        "Test",
        10,
        1_000,
        0.5,
        EnvironmentalFactors::default(),
    );
    let id = ComponentId::new("edge-compute-01-01");
    let component = Component::new(
        id.clone(),
        ComponentKind::EdgeCompute,
        region.region_id.clone(),
        0.12,
        start,
    );
    let topology = Topology::new(vec![region], vec![component]).unwrap();
    let store = StateStore::with_topology(config(2, 0.0), start, topology).unwrap();

    store.advance(start + Duration::hours(240)).unwrap();

    let c = store.get_component(&id).unwrap();
    assert!((c.health_score - 98.8).abs() < 1e-9);
    assert!((c.performance_metrics.uptime_hours - 240.0).abs() < 1e-9);
    assert!(c.performance_metrics.temperature_celsius >= 20.0);
    assert!(c.performance_metrics.power_consumption_watts >= 50.0);
}

#[test]
fn test_maintenance_never_worsens_any_component() {
    let store = seeded_store(3, 0.3);
    let mut now = start_time();
    for _ in 0..20 {
        now = now + Duration::hours(6);
        store.advance(now).unwrap();
    }

    for before in store.components().unwrap() {
        let after = store.trigger_maintenance(&before.component_id).unwrap();
        assert!(after.health_score >= before.health_score);
        if before.health_score < 100.0 {
            assert!(after.health_score > before.health_score);
        }
        assert!(after.failure_probability <= before.failure_probability);
        assert_eq!(after.last_maintenance, now);
    }
}

#[test]
fn test_event_lifecycle_split() {
    let store = seeded_store(4, 1.0);
    let mut now = start_time();
    for _ in 0..200 {
        now = now + Duration::minutes(20);
        store.advance(now).unwrap();
    }

    let snapshot = store.snapshot().unwrap();
    assert!(!snapshot.history.is_empty());
    assert!(!snapshot.active_events.is_empty());

    for event in &snapshot.history {
        assert_eq!(event.resolution_status, ResolutionStatus::Resolved);
        let resolved_at = event.resolved_at.expect("history entries carry resolution time");
        assert!(hours_between(event.timestamp, resolved_at) > event.duration_hours);
    }
    for event in &snapshot.active_events {
        assert_eq!(event.resolution_status, ResolutionStatus::Active);
        assert!(hours_between(event.timestamp, snapshot.current_time) <= event.duration_hours);
        for cid in &event.affected_components {
            let c = snapshot.component(cid).expect("affected component exists");
            assert!(c.active_events.contains(&event.event_id));
            let r = snapshot.region(&c.region_id).expect("region exists");
            assert!(r.active_incidents.contains(&event.event_id));
        }
    }
    assert!(snapshot.dangling_references().is_empty());
}

#[test]
fn test_recent_events_ordering_and_window() {
    let store = seeded_store(5, 1.0);
    let mut now = start_time();
    for _ in 0..150 {
        now = now + Duration::minutes(30);
        store.advance(now).unwrap();
    }

    let window = 12.0;
    let recent = store.recent_events(window).unwrap();
    assert!(!recent.is_empty());

    for pair in recent.windows(2) {
        assert!(pair[0].timestamp > pair[1].timestamp);
    }
    let cutoff = now - Duration::hours(12);
    for event in &recent {
        assert!(event.timestamp >= cutoff || event.resolution_status == ResolutionStatus::Active);
    }

    let active = store.active_events().unwrap();
    for event in &active {
        assert!(recent.iter().any(|e| e.event_id == event.event_id));
    }
}

#[test]
fn test_bounds_hold_over_long_run() {
    let store = seeded_store(6, 0.5);
    let mut now = start_time();
    for _ in 0..500 {
        now = now + Duration::hours(3);
        store.advance(now).unwrap();

        for r in store.regions().unwrap() {
            assert!(r.current_load >= MIN_LOAD && r.current_load <= MAX_LOAD);
            let t = r.environmental_factors.temperature;
            assert!((-10.0..=40.0).contains(&t));
        }
    }

    for c in store.components().unwrap() {
        assert!((0.0..=100.0).contains(&c.health_score));
        assert!(c.failure_probability >= MIN_FAILURE_PROBABILITY);
        assert!(c.failure_probability <= MAX_FAILURE_PROBABILITY);
    }
}

#[test]
fn test_skipped_tick_leaves_state_identical() {
    let store = seeded_store(7, 1.0);
    let now = start_time() + Duration::minutes(5);
    assert!(store.advance(now).unwrap().is_applied());
    let before = store.snapshot().unwrap();

    assert_eq!(store.advance(now).unwrap(), TickOutcome::Skipped);
    assert_eq!(
        store.advance(now + Duration::seconds(9)).unwrap(),
        TickOutcome::Skipped
    );

    assert_eq!(store.snapshot().unwrap(), before);
}

#[test]
fn test_health_summary_matches_snapshot() {
    let store = seeded_store(8, 0.5);
    let mut now = start_time();
    for _ in 0..30 {
        now = now + Duration::hours(1);
        store.advance(now).unwrap();
    }

    let summary = store.health_summary().unwrap();
    let snapshot = store.snapshot().unwrap();

    assert_eq!(summary.timestamp, now);
    assert_eq!(summary.total_components, snapshot.components.len());
    assert_eq!(
        summary.healthy_components,
        snapshot.components.iter().filter(|c| c.health_score > 80.0).count()
    );
    let mean = snapshot.components.iter().map(|c| c.health_score).sum::<f64>()
        / snapshot.components.len() as f64;
    assert!((summary.average_health_score - mean).abs() < 1e-9);
    assert_eq!(summary.active_incidents, snapshot.active_events.len());
    assert_eq!(summary.regions_status.len(), 6);
}

#[test]
fn test_history_limit_bounds_growth() {
    let mut config = config(9, 1.0);
    config.history_limit = Some(5);
    let store = StateStore::new(config, start_time()).unwrap();

    let mut now = start_time();
    for _ in 0..200 {
        now = now + Duration::hours(1);
        store.advance(now).unwrap();
    }

    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.history.len(), 5);
    assert!(snapshot.dangling_references().is_empty());
}
