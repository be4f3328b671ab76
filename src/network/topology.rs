//! Initial network layout
//!
//! Either the seeded reference network (six named regions plus randomly
//! placed components) or a caller-supplied set that is checked for dangling
//! region references.

use std::collections::BTreeMap;

use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::TopologyConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{ComponentId, RegionId, Timestamp};
use crate::network::component::{
    Component, ComponentKind, PerformanceMetrics, MAX_FAILURE_PROBABILITY, MAX_HEALTH,
    MIN_FAILURE_PROBABILITY,
};
use crate::network::region::{
    EnvironmentalFactors, Region, Weather, MAX_LOAD, MAX_TEMPERATURE, MIN_LOAD, MIN_TEMPERATURE,
};

/// Regions and components owned by a store
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub regions: BTreeMap<RegionId, Region>,
    pub components: BTreeMap<ComponentId, Component>,
}

struct RegionSeed {
    id: &'static str,
    name: &'static str,
    base_stations: u32,
    connected_devices: u64,
    load: f64,
    weather: Weather,
    temperature: f64,
}

const REGION_SEEDS: [RegionSeed; 6] = [
    RegionSeed {
        id: "region-northwest-01",
        name: "Pacific Northwest",
        base_stations: 127,
        connected_devices: 234_891,
        load: 0.67,
        weather: Weather::Cloudy,
        temperature: 15.5,
    },
    RegionSeed {
        id: "region-northeast-02",
        name: "New England",
        base_stations: 156,
        connected_devices: 398_456,
        load: 0.72,
        weather: Weather::Clear,
        temperature: 8.2,
    },
    RegionSeed {
        id: "region-southwest-03",
        name: "Southwest",
        base_stations: 189,
        connected_devices: 567_234,
        load: 0.58,
        weather: Weather::Sunny,
        temperature: 28.7,
    },
    RegionSeed {
        id: "region-southeast-04",
        name: "Southeast",
        base_stations: 201,
        connected_devices: 645_123,
        load: 0.69,
        weather: Weather::Humid,
        temperature: 24.1,
    },
    RegionSeed {
        id: "region-central-05",
        name: "Central Plains",
        base_stations: 98,
        connected_devices: 123_789,
        load: 0.43,
        weather: Weather::Windy,
        temperature: 12.8,
    },
    RegionSeed {
        id: "region-west-06",
        name: "West Coast",
        base_stations: 234,
        connected_devices: 789_456,
        load: 0.81,
        weather: Weather::Foggy,
        temperature: 18.3,
    },
];

impl Topology {
    /// Build from explicit entities
    ///
    /// Rejects components in unknown regions, entities already linked to
    /// events, and values outside the model's bounds.
    pub fn new(regions: Vec<Region>, components: Vec<Component>) -> Result<Self> {
        let mut by_region = BTreeMap::new();
        for region in regions {
            check_region(&region)?;
            by_region.insert(region.region_id.clone(), region);
        }
        let regions = by_region;

        let mut by_id = BTreeMap::new();
        for component in components {
            if !regions.contains_key(&component.region_id) {
                return Err(SimError::UnknownRegion {
                    component: component.component_id,
                    region: component.region_id,
                });
            }
            check_component(&component)?;
            by_id.insert(component.component_id.clone(), component);
        }

        Ok(Self {
            regions,
            components: by_id,
        })
    }

    /// The reference network: six regions, components spread at random
    pub fn seeded<R: Rng>(config: &TopologyConfig, now: Timestamp, rng: &mut R) -> Self {
        let regions: BTreeMap<_, _> = REGION_SEEDS
            .iter()
            .map(|seed| {
                let region = Region::new(
                    RegionId::new(seed.id),
                    seed.name,
                    seed.base_stations,
                    seed.connected_devices,
                    seed.load,
                    EnvironmentalFactors::new(seed.weather, seed.temperature),
                );
                (region.region_id.clone(), region)
            })
            .collect();

        let region_ids: Vec<RegionId> = regions.keys().cloned().collect();
        let mut components = BTreeMap::new();

        let counts = [
            (ComponentKind::BaseStation, config.base_stations),
            (ComponentKind::CoreNode, config.core_nodes),
            (ComponentKind::EdgeCompute, config.edge_compute),
        ];
        for (kind, count) in counts {
            for index in 1..=count {
                let Some(region_id) = region_ids.choose(rng) else {
                    break;
                };
                let component = seed_component(kind, region_id, index, now, rng);
                components.insert(component.component_id.clone(), component);
            }
        }

        tracing::debug!(
            regions = regions.len(),
            components = components.len(),
            "Seeded network topology"
        );

        Self {
            regions,
            components,
        }
    }
}

fn check_region(region: &Region) -> Result<()> {
    let id = &region.region_id;
    if !(MIN_LOAD..=MAX_LOAD).contains(&region.current_load) {
        return Err(SimError::InvalidTopology(format!(
            "{id}: load {} outside [{MIN_LOAD}, {MAX_LOAD}]",
            region.current_load
        )));
    }
    let temperature = region.environmental_factors.temperature;
    if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
        return Err(SimError::InvalidTopology(format!(
            "{id}: temperature {temperature} outside [{MIN_TEMPERATURE}, {MAX_TEMPERATURE}]"
        )));
    }
    if let Some(event) = region.active_incidents.iter().next() {
        return Err(SimError::InvalidTopology(format!(
            "{id}: references unknown event {event}"
        )));
    }
    Ok(())
}

fn check_component(component: &Component) -> Result<()> {
    let id = &component.component_id;
    if !(component.degradation_rate.is_finite() && component.degradation_rate >= 0.0) {
        return Err(SimError::InvalidTopology(format!(
            "{id}: degradation rate must be non-negative, got {}",
            component.degradation_rate
        )));
    }
    if !(0.0..=MAX_HEALTH).contains(&component.health_score) {
        return Err(SimError::InvalidTopology(format!(
            "{id}: health {} outside [0, {MAX_HEALTH}]",
            component.health_score
        )));
    }
    let fp = component.failure_probability;
    if !(MIN_FAILURE_PROBABILITY..=MAX_FAILURE_PROBABILITY).contains(&fp) {
        return Err(SimError::InvalidTopology(format!(
            "{id}: failure probability {fp} outside \
             [{MIN_FAILURE_PROBABILITY}, {MAX_FAILURE_PROBABILITY}]"
        )));
    }
    if let Some(event) = component.active_events.iter().next() {
        return Err(SimError::InvalidTopology(format!(
            "{id}: references unknown event {event}"
        )));
    }
    Ok(())
}

fn seed_component<R: Rng>(
    kind: ComponentKind,
    region_id: &RegionId,
    index: usize,
    now: Timestamp,
    rng: &mut R,
) -> Component {
    let profile = kind.profile();
    let id = kind.component_id(region_id, index);
    let age_days = rng.gen_range(profile.maintenance_age_days.clone());

    let mut component = Component::new(
        id,
        kind,
        region_id.clone(),
        rng.gen_range(profile.degradation_rate.clone()),
        now - Duration::days(age_days),
    )
    .with_health(rng.gen_range(profile.initial_health.clone()))
    .with_failure_probability(rng.gen_range(profile.initial_failure_probability.clone()));

    component.performance_metrics = PerformanceMetrics {
        temperature_celsius: rng.gen_range(profile.initial_temperature.clone()),
        power_consumption_watts: rng.gen_range(profile.initial_power_watts.clone()),
        error_count_24h: rng.gen_range(profile.initial_error_count.clone()),
        uptime_hours: rng.gen_range(profile.initial_uptime_hours.clone()),
    };
    component
}
