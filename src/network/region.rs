//! Region - geographic grouping of components

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::{EventId, RegionId};

/// Lowest load a region can report
pub const MIN_LOAD: f64 = 0.1;
/// Highest load a region can report
pub const MAX_LOAD: f64 = 0.99;

/// Regional temperature bounds (°C)
pub const MIN_TEMPERATURE: f64 = -10.0;
pub const MAX_TEMPERATURE: f64 = 40.0;

/// A geographic region with aggregate load and environment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub region_id: RegionId,
    pub name: String,

    // Static capacity
    pub base_stations: u32,
    pub connected_devices: u64,

    // Dynamic state
    pub current_load: f64,
    pub traffic_pattern: TrafficPattern,
    pub environmental_factors: EnvironmentalFactors,

    /// Events touching a component in this region (informational)
    pub active_incidents: BTreeSet<EventId>,
}

impl Region {
    pub fn new(
        region_id: RegionId,
        name: impl Into<String>,
        base_stations: u32,
        connected_devices: u64,
        current_load: f64,
        environmental_factors: EnvironmentalFactors,
    ) -> Self {
        Self {
            region_id,
            name: name.into(),
            base_stations,
            connected_devices,
            current_load: current_load.clamp(MIN_LOAD, MAX_LOAD),
            traffic_pattern: TrafficPattern::Normal,
            environmental_factors,
            active_incidents: BTreeSet::new(),
        }
    }

    pub fn set_load(&mut self, load: f64) {
        self.current_load = load.clamp(MIN_LOAD, MAX_LOAD);
    }
}

/// Diurnal traffic classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficPattern {
    Normal,
    Peak,
    Low,
}

/// Weather conditions reported for a region
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Cloudy,
    Rainy,
    Stormy,
    Foggy,
    Sunny,
    Humid,
    Windy,
}

impl Weather {
    /// Conditions a random weather change can pick from
    pub const CHANGEABLE: [Weather; 6] = [
        Weather::Clear,
        Weather::Cloudy,
        Weather::Rainy,
        Weather::Stormy,
        Weather::Foggy,
        Weather::Sunny,
    ];
}

impl Default for Weather {
    fn default() -> Self {
        Self::Clear
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalFactors {
    pub weather: Weather,
    pub temperature: f64,
}

impl EnvironmentalFactors {
    pub fn new(weather: Weather, temperature: f64) -> Self {
        Self {
            weather,
            temperature: temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE),
        }
    }
}

impl Default for EnvironmentalFactors {
    fn default() -> Self {
        Self::new(Weather::Clear, 20.0)
    }
}
