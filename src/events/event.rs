//! Network events and their per-type tables

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::core::types::{hours_between, ComponentId, EventId, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    TrafficSpike,
    HardwareFailure,
    Maintenance,
    CapacityIssue,
    Environmental,
    ConfigurationChange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactMetric {
    LatencyIncreasePercent,
    ThroughputDecreasePercent,
    CpuIncreasePercent,
    AvailabilityImpactPercent,
    PerformanceDegradationPercent,
    ErrorRateIncreasePercent,
    PacketLossIncreasePercent,
}

pub type ImpactRow = (ImpactMetric, RangeInclusive<f64>);

static TRAFFIC_SPIKE_IMPACT: [ImpactRow; 3] = [
    (ImpactMetric::LatencyIncreasePercent, 10.0..=50.0),
    (ImpactMetric::ThroughputDecreasePercent, 5.0..=25.0),
    (ImpactMetric::CpuIncreasePercent, 20.0..=60.0),
];

static HARDWARE_FAILURE_IMPACT: [ImpactRow; 3] = [
    (ImpactMetric::AvailabilityImpactPercent, 30.0..=100.0),
    (ImpactMetric::PerformanceDegradationPercent, 40.0..=80.0),
    (ImpactMetric::ErrorRateIncreasePercent, 100.0..=500.0),
];

static CAPACITY_ISSUE_IMPACT: [ImpactRow; 3] = [
    (ImpactMetric::ThroughputDecreasePercent, 15.0..=40.0),
    (ImpactMetric::LatencyIncreasePercent, 20.0..=80.0),
    (ImpactMetric::PacketLossIncreasePercent, 1.0..=10.0),
];

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::TrafficSpike,
        EventType::HardwareFailure,
        EventType::Maintenance,
        EventType::CapacityIssue,
        EventType::Environmental,
        EventType::ConfigurationChange,
    ];

    /// Percentage-delta ranges drawn when an event of this type is created
    pub fn impact_table(&self) -> &'static [ImpactRow] {
        match self {
            Self::TrafficSpike => &TRAFFIC_SPIKE_IMPACT,
            Self::HardwareFailure => &HARDWARE_FAILURE_IMPACT,
            Self::CapacityIssue => &CAPACITY_ISSUE_IMPACT,
            Self::Maintenance | Self::Environmental | Self::ConfigurationChange => &[],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::TrafficSpike => "Unexpected traffic surge detected",
            Self::HardwareFailure => "Hardware component failure detected",
            Self::Maintenance => "Scheduled maintenance window active",
            Self::CapacityIssue => "Network capacity threshold exceeded",
            Self::Environmental => "Environmental factors affecting performance",
            Self::ConfigurationChange => "Configuration update applied",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// One-time health multiplier applied to affected components on creation
    pub fn health_multiplier(&self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 0.95,
            Self::High => 0.85,
            Self::Critical => 0.7,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Active,
    Resolved,
}

/// A transient occurrence degrading one or more components
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkEvent {
    pub event_id: EventId,
    pub event_type: EventType,
    pub timestamp: Timestamp,
    pub affected_components: Vec<ComponentId>,
    pub severity: Severity,
    pub duration_hours: f64,
    pub impact_metrics: BTreeMap<ImpactMetric, f64>,
    pub description: String,
    pub resolution_status: ResolutionStatus,
    /// Time the event moved to history
    pub resolved_at: Option<Timestamp>,
}

impl NetworkEvent {
    pub fn is_active(&self) -> bool {
        self.resolution_status == ResolutionStatus::Active
    }

    /// True once strictly more than `duration_hours` have passed
    pub fn has_expired(&self, now: Timestamp) -> bool {
        hours_between(self.timestamp, now) > self.duration_hours
    }

    pub(crate) fn resolve(&mut self, now: Timestamp) {
        self.resolution_status = ResolutionStatus::Resolved;
        self.resolved_at = Some(now);
    }
}
