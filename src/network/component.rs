//! Network components and their per-kind profiles

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::core::types::{ComponentId, EventId, RegionId, Timestamp};

pub const MAX_HEALTH: f64 = 100.0;
pub const MIN_FAILURE_PROBABILITY: f64 = 0.001;
pub const MAX_FAILURE_PROBABILITY: f64 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    BaseStation,
    CoreNode,
    EdgeCompute,
}

/// Static per-kind constants
#[derive(Debug, Clone)]
pub struct ComponentProfile {
    /// Prefix of generated component ids
    pub id_prefix: &'static str,
    /// Zero-padding width of the index in generated ids
    pub id_width: usize,
    pub base_temperature: f64,
    pub base_power_watts: f64,
    /// Health lost per day
    pub degradation_rate: RangeInclusive<f64>,
    pub initial_health: RangeInclusive<f64>,
    pub initial_failure_probability: RangeInclusive<f64>,
    /// Days since last maintenance at seeding time
    pub maintenance_age_days: RangeInclusive<i64>,
    pub initial_uptime_hours: RangeInclusive<f64>,
    pub initial_error_count: RangeInclusive<u32>,
    pub initial_temperature: RangeInclusive<f64>,
    pub initial_power_watts: RangeInclusive<f64>,
}

static BASE_STATION: ComponentProfile = ComponentProfile {
    id_prefix: "base-station",
    id_width: 3,
    base_temperature: 40.0,
    base_power_watts: 200.0,
    degradation_rate: 0.05..=0.15,
    initial_health: 85.0..=100.0,
    initial_failure_probability: 0.01..=0.05,
    maintenance_age_days: 1..=180,
    initial_uptime_hours: 1000.0..=8760.0,
    initial_error_count: 0..=10,
    initial_temperature: 35.0..=50.0,
    initial_power_watts: 150.0..=300.0,
};

static CORE_NODE: ComponentProfile = ComponentProfile {
    id_prefix: "core-node",
    id_width: 2,
    base_temperature: 50.0,
    base_power_watts: 750.0,
    degradation_rate: 0.02..=0.08,
    initial_health: 90.0..=100.0,
    initial_failure_probability: 0.005..=0.02,
    maintenance_age_days: 1..=90,
    initial_uptime_hours: 2000.0..=8760.0,
    initial_error_count: 0..=5,
    initial_temperature: 40.0..=60.0,
    initial_power_watts: 500.0..=1000.0,
};

static EDGE_COMPUTE: ComponentProfile = ComponentProfile {
    id_prefix: "edge-compute",
    id_width: 2,
    base_temperature: 45.0,
    base_power_watts: 350.0,
    degradation_rate: 0.08..=0.20,
    initial_health: 80.0..=100.0,
    initial_failure_probability: 0.02..=0.08,
    maintenance_age_days: 1..=120,
    initial_uptime_hours: 500.0..=5000.0,
    initial_error_count: 0..=15,
    initial_temperature: 30.0..=70.0,
    initial_power_watts: 200.0..=500.0,
};

impl ComponentKind {
    pub const ALL: [ComponentKind; 3] = [
        ComponentKind::BaseStation,
        ComponentKind::CoreNode,
        ComponentKind::EdgeCompute,
    ];

    pub fn profile(&self) -> &'static ComponentProfile {
        match self {
            Self::BaseStation => &BASE_STATION,
            Self::CoreNode => &CORE_NODE,
            Self::EdgeCompute => &EDGE_COMPUTE,
        }
    }

    /// Id of the `index`-th (1-based) component of this kind, tagged with its region
    pub fn component_id(&self, region: &RegionId, index: usize) -> ComponentId {
        let profile = self.profile();
        ComponentId::new(format!(
            "{}-{}-{:0width$}",
            profile.id_prefix,
            region.suffix(),
            index,
            width = profile.id_width
        ))
    }
}

/// Named readings refreshed every tick
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub temperature_celsius: f64,
    pub power_consumption_watts: f64,
    pub error_count_24h: u32,
    pub uptime_hours: f64,
}

impl PerformanceMetrics {
    /// Nominal readings for a freshly installed component
    pub fn nominal(kind: ComponentKind) -> Self {
        let profile = kind.profile();
        Self {
            temperature_celsius: profile.base_temperature,
            power_consumption_watts: profile.base_power_watts,
            error_count_24h: 0,
            uptime_hours: 0.0,
        }
    }
}

/// A single network element
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub component_id: ComponentId,
    pub component_type: ComponentKind,
    /// Owning region; must exist in the store
    pub region_id: RegionId,

    pub health_score: f64,
    pub failure_probability: f64,
    pub last_maintenance: Timestamp,
    pub performance_metrics: PerformanceMetrics,
    pub active_events: BTreeSet<EventId>,
    /// Health lost per day; fixed at creation
    pub degradation_rate: f64,
}

impl Component {
    /// A healthy component with the default failure probability
    pub fn new(
        component_id: ComponentId,
        component_type: ComponentKind,
        region_id: RegionId,
        degradation_rate: f64,
        installed_at: Timestamp,
    ) -> Self {
        Self {
            component_id,
            component_type,
            region_id,
            health_score: MAX_HEALTH,
            failure_probability: 0.01,
            last_maintenance: installed_at,
            performance_metrics: PerformanceMetrics::nominal(component_type),
            active_events: BTreeSet::new(),
            degradation_rate,
        }
    }

    pub fn with_health(mut self, health_score: f64) -> Self {
        self.health_score = health_score.clamp(0.0, MAX_HEALTH);
        self
    }

    pub fn with_failure_probability(mut self, probability: f64) -> Self {
        self.failure_probability =
            probability.clamp(MIN_FAILURE_PROBABILITY, MAX_FAILURE_PROBABILITY);
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.health_score > 80.0
    }
}
