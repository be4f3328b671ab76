//! Read-side views returned by the state store

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::types::{ComponentId, EventId, RegionId, Timestamp};
use crate::events::event::NetworkEvent;
use crate::network::component::Component;
use crate::network::region::Region;

/// Aggregate health computed under a single read guard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub timestamp: Timestamp,
    pub total_components: usize,
    /// Components with health above 80
    pub healthy_components: usize,
    /// 0.0 when there are no components
    pub average_health_score: f64,
    pub active_incidents: usize,
    pub regions_status: BTreeMap<RegionId, f64>,
}

/// Every entity at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub current_time: Timestamp,
    pub regions: Vec<Region>,
    pub components: Vec<Component>,
    /// Newest first
    pub active_events: Vec<NetworkEvent>,
    /// Oldest resolution first
    pub history: Vec<NetworkEvent>,
}

impl NetworkSnapshot {
    /// Event ids held by components that are neither active nor archived
    pub fn dangling_references(&self) -> Vec<(ComponentId, EventId)> {
        let known: BTreeSet<&EventId> = self
            .active_events
            .iter()
            .chain(self.history.iter())
            .map(|e| &e.event_id)
            .collect();

        self.components
            .iter()
            .flat_map(|c| {
                c.active_events
                    .iter()
                    .filter(|id| !known.contains(id))
                    .map(move |id| (c.component_id.clone(), id.clone()))
            })
            .collect()
    }

    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| &c.component_id == id)
    }

    pub fn region(&self, id: &RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| &r.region_id == id)
    }
}
