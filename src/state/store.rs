//! The single source of truth for the evolving network
//!
//! All state sits behind one reader-writer lock. `advance` and
//! `trigger_maintenance` take the write guard; every query takes the read
//! guard and returns owned copies, so a reader sees either the whole of a
//! tick or none of it.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{hours_between, ComponentId, EventId, RegionId, Timestamp};
use crate::events::engine::{self, EventLedger};
use crate::events::event::NetworkEvent;
use crate::model::{environment, health, load};
use crate::network::component::Component;
use crate::network::region::Region;
use crate::network::topology::Topology;
use crate::state::snapshot::{HealthSummary, NetworkSnapshot};

/// What one call to `advance` did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TickOutcome {
    /// Too soon after the last applied tick; nothing changed
    Skipped,
    Applied(TickReport),
}

impl TickOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Count of applied ticks including this one
    pub tick: u64,
    pub at: Timestamp,
    pub elapsed_hours: f64,
    pub generated: Option<EventId>,
    pub resolved: Vec<EventId>,
    pub weather_changes: usize,
}

struct NetworkState {
    current_time: Timestamp,
    regions: BTreeMap<RegionId, Region>,
    components: BTreeMap<ComponentId, Component>,
    ledger: EventLedger,
    rng: ChaCha8Rng,
    ticks_applied: u64,
}

impl NetworkState {
    fn evolve(&mut self, now: Timestamp, config: &SimulationConfig) -> TickReport {
        let elapsed_hours = hours_between(self.current_time, now);
        let rng = &mut self.rng;

        for component in self.components.values_mut() {
            health::update_component(component, elapsed_hours, rng);
        }

        let (pattern, multiplier) = load::diurnal_load(now, rng);
        for region in self.regions.values_mut() {
            load::update_region_load(region, pattern, multiplier, rng);
        }

        let generated = engine::generate(
            &mut self.ledger,
            &mut self.components,
            &mut self.regions,
            now,
            &config.events,
            rng,
        );
        let resolved =
            engine::resolve_expired(&mut self.ledger, &mut self.components, &mut self.regions, now);

        let weather_changes = self
            .regions
            .values_mut()
            .filter_map(|region| environment::update_environment(region, &config.environment, rng))
            .count();

        self.current_time = now;
        self.ticks_applied += 1;

        TickReport {
            tick: self.ticks_applied,
            at: now,
            elapsed_hours,
            generated,
            resolved,
            weather_changes,
        }
    }

    fn sorted_active(&self) -> Vec<NetworkEvent> {
        let mut events: Vec<NetworkEvent> = self.ledger.active().cloned().collect();
        sort_newest_first(&mut events);
        events
    }
}

fn sort_newest_first(events: &mut [NetworkEvent]) {
    events.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.event_id.cmp(&a.event_id))
    });
}

/// Concurrency-safe owner of regions, components and events
pub struct StateStore {
    state: RwLock<NetworkState>,
    config: SimulationConfig,
    shutdown: watch::Sender<bool>,
}

impl StateStore {
    /// Seed the reference network at `now`
    pub fn new(config: SimulationConfig, now: Timestamp) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let topology = Topology::seeded(&config.topology, now, &mut rng);
        Ok(Self::build(config, now, topology, rng))
    }

    /// Start from a caller-supplied topology
    pub fn with_topology(config: SimulationConfig, now: Timestamp, topology: Topology) -> Result<Self> {
        config.validate()?;
        // Re-check references; the fields are public and may have been edited.
        let topology = Topology::new(
            topology.regions.into_values().collect(),
            topology.components.into_values().collect(),
        )?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self::build(config, now, topology, rng))
    }

    fn build(config: SimulationConfig, now: Timestamp, topology: Topology, rng: ChaCha8Rng) -> Self {
        let (shutdown, _) = watch::channel(false);
        let state = NetworkState {
            current_time: now,
            regions: topology.regions,
            components: topology.components,
            ledger: EventLedger::new(config.history_limit),
            rng,
            ticks_applied: 0,
        };
        Self {
            state: RwLock::new(state),
            config,
            shutdown,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn read(&self, op: &'static str) -> Result<RwLockReadGuard<'_, NetworkState>> {
        self.state.read().map_err(|_| SimError::StatePoisoned(op))
    }

    fn write(&self, op: &'static str) -> Result<RwLockWriteGuard<'_, NetworkState>> {
        self.state.write().map_err(|_| SimError::StatePoisoned(op))
    }

    /// Apply one evolution step at `now`
    ///
    /// Returns `Skipped` without touching any state when `now` is less than
    /// the minimum tick spacing after the last applied tick.
    pub fn advance(&self, now: Timestamp) -> Result<TickOutcome> {
        let mut state = self.write("advance")?;
        if now - state.current_time < self.config.clock.min_tick_spacing() {
            return Ok(TickOutcome::Skipped);
        }

        let report = state.evolve(now, &self.config);
        tracing::debug!(
            tick = report.tick,
            elapsed_hours = report.elapsed_hours,
            generated = report.generated.is_some(),
            resolved = report.resolved.len(),
            weather_changes = report.weather_changes,
            "Applied simulation tick"
        );
        Ok(TickOutcome::Applied(report))
    }

    /// Last applied simulation time
    pub fn current_time(&self) -> Result<Timestamp> {
        Ok(self.read("current_time")?.current_time)
    }

    pub fn get_component(&self, id: &ComponentId) -> Result<Component> {
        self.read("get_component")?
            .components
            .get(id)
            .cloned()
            .ok_or_else(|| SimError::ComponentNotFound(id.clone()))
    }

    pub fn get_region(&self, id: &RegionId) -> Result<Region> {
        self.read("get_region")?
            .regions
            .get(id)
            .cloned()
            .ok_or_else(|| SimError::RegionNotFound(id.clone()))
    }

    /// All components, ordered by id
    pub fn components(&self) -> Result<Vec<Component>> {
        Ok(self.read("components")?.components.values().cloned().collect())
    }

    /// All regions, ordered by id
    pub fn regions(&self) -> Result<Vec<Region>> {
        Ok(self.read("regions")?.regions.values().cloned().collect())
    }

    pub fn health_summary(&self) -> Result<HealthSummary> {
        let state = self.read("health_summary")?;

        let total_components = state.components.len();
        let healthy_components = state.components.values().filter(|c| c.is_healthy()).count();
        let average_health_score = if total_components == 0 {
            0.0
        } else {
            state.components.values().map(|c| c.health_score).sum::<f64>()
                / total_components as f64
        };

        Ok(HealthSummary {
            timestamp: state.current_time,
            total_components,
            healthy_components,
            average_health_score,
            active_incidents: state.ledger.active_count(),
            regions_status: state
                .regions
                .values()
                .map(|r| (r.region_id.clone(), r.current_load))
                .collect(),
        })
    }

    /// Currently active events, newest first
    pub fn active_events(&self) -> Result<Vec<NetworkEvent>> {
        Ok(self.read("active_events")?.sorted_active())
    }

    /// Resolved events created within `window_hours` of the current time,
    /// plus every active event, newest first
    ///
    /// A window reaching past the earliest representable time covers the
    /// whole history. Negative and NaN windows are rejected.
    pub fn recent_events(&self, window_hours: f64) -> Result<Vec<NetworkEvent>> {
        if !(window_hours >= 0.0) {
            return Err(SimError::InvalidQuery(format!(
                "window_hours must be a non-negative number, got {window_hours}"
            )));
        }

        let state = self.read("recent_events")?;
        // `as` saturates, so an infinite window becomes the largest offset
        let cutoff = chrono::Duration::try_milliseconds((window_hours * 3_600_000.0) as i64)
            .and_then(|window| state.current_time.checked_sub_signed(window));

        let mut events: Vec<NetworkEvent> = state
            .ledger
            .history()
            .filter(|e| cutoff.map_or(true, |cutoff| e.timestamp >= cutoff))
            .chain(state.ledger.active())
            .cloned()
            .collect();
        sort_newest_first(&mut events);
        Ok(events)
    }

    /// Restore a component's health; returns its state afterwards
    pub fn trigger_maintenance(&self, id: &ComponentId) -> Result<Component> {
        let mut state = self.write("trigger_maintenance")?;
        let state = &mut *state;
        let now = state.current_time;

        let component = state
            .components
            .get_mut(id)
            .ok_or_else(|| SimError::ComponentNotFound(id.clone()))?;
        let report = health::maintain(component, now, &mut state.rng);

        tracing::info!(
            component = %id,
            health_before = report.health_before,
            health_after = report.health_after,
            "Maintenance applied"
        );
        Ok(component.clone())
    }

    /// Every entity under one read guard
    pub fn snapshot(&self) -> Result<NetworkSnapshot> {
        let state = self.read("snapshot")?;
        Ok(NetworkSnapshot {
            current_time: state.current_time,
            regions: state.regions.values().cloned().collect(),
            components: state.components.values().cloned().collect(),
            active_events: state.sorted_active(),
            history: state.ledger.history().cloned().collect(),
        })
    }

    /// Ask any clock driving this store to halt. Never blocks.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Receiver a clock watches for the stop request
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}
