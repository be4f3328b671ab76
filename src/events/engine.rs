//! Event generation, impact application and expiry
//!
//! Lifecycle per event: created active during a tick, resolved once more
//! than `duration_hours` have passed, then moved to history and never
//! touched again. Components and regions hold the event id only while the
//! event is active.

use std::collections::{BTreeMap, VecDeque};

use ahash::AHashMap;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::EventConfig;
use crate::core::types::{ComponentId, EventId, RegionId, Timestamp};
use crate::events::event::{EventType, NetworkEvent, ResolutionStatus, Severity};
use crate::network::component::Component;
use crate::network::region::Region;

/// Active events plus the resolved history
#[derive(Debug, Clone, Default)]
pub struct EventLedger {
    active: AHashMap<EventId, NetworkEvent>,
    history: VecDeque<NetworkEvent>,
    next_sequence: u64,
    history_limit: Option<usize>,
}

impl EventLedger {
    pub fn new(history_limit: Option<usize>) -> Self {
        Self {
            history_limit,
            ..Self::default()
        }
    }

    pub fn active(&self) -> impl Iterator<Item = &NetworkEvent> {
        self.active.values()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn get_active(&self, id: &EventId) -> Option<&NetworkEvent> {
        self.active.get(id)
    }

    /// Resolved events, oldest resolution first
    pub fn history(&self) -> impl Iterator<Item = &NetworkEvent> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn next_id(&mut self, now: Timestamp) -> EventId {
        self.next_sequence += 1;
        EventId::generate(now, self.next_sequence)
    }

    fn archive(&mut self, event: NetworkEvent) {
        self.history.push_back(event);
        if let Some(limit) = self.history_limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }
}

/// Draw the attributes of a new event, touching no entity
pub fn roll_event<R: Rng>(
    id: EventId,
    candidates: &[ComponentId],
    now: Timestamp,
    config: &EventConfig,
    rng: &mut R,
) -> Option<NetworkEvent> {
    if candidates.is_empty() {
        return None;
    }

    let event_type = *EventType::ALL.choose(rng)?;
    let count = rng.gen_range(1..=config.max_affected.max(1)).min(candidates.len());
    let affected_components: Vec<ComponentId> =
        candidates.choose_multiple(rng, count).cloned().collect();
    let severity = *Severity::ALL.choose(rng)?;
    let duration_hours = rng.gen_range(config.min_duration_hours..=config.max_duration_hours);

    let impact_metrics: BTreeMap<_, _> = event_type
        .impact_table()
        .iter()
        .map(|(metric, range)| (*metric, rng.gen_range(range.clone())))
        .collect();

    Some(NetworkEvent {
        event_id: id,
        event_type,
        timestamp: now,
        affected_components,
        severity,
        duration_hours,
        impact_metrics,
        description: event_type.description().to_string(),
        resolution_status: ResolutionStatus::Active,
        resolved_at: None,
    })
}

/// With `probability_per_tick`, create one event and apply its impact
///
/// Each affected component loses health by the severity multiplier and
/// records the event id; so does every region owning one of them.
pub fn generate<R: Rng>(
    ledger: &mut EventLedger,
    components: &mut BTreeMap<ComponentId, Component>,
    regions: &mut BTreeMap<RegionId, Region>,
    now: Timestamp,
    config: &EventConfig,
    rng: &mut R,
) -> Option<EventId> {
    if components.is_empty() || !rng.gen_bool(config.probability_per_tick) {
        return None;
    }

    let candidates: Vec<ComponentId> = components.keys().cloned().collect();
    let id = ledger.next_id(now);
    let event = roll_event(id.clone(), &candidates, now, config, rng)?;

    let multiplier = event.severity.health_multiplier();
    for component_id in &event.affected_components {
        let Some(component) = components.get_mut(component_id) else {
            continue;
        };
        component.health_score *= multiplier;
        component.active_events.insert(id.clone());
        if let Some(region) = regions.get_mut(&component.region_id) {
            region.active_incidents.insert(id.clone());
        }
    }

    tracing::debug!(
        event = %id,
        event_type = ?event.event_type,
        severity = ?event.severity,
        affected = event.affected_components.len(),
        duration_hours = event.duration_hours,
        "Network event started"
    );

    ledger.active.insert(id.clone(), event);
    Some(id)
}

/// Move every event older than its duration into history
pub fn resolve_expired(
    ledger: &mut EventLedger,
    components: &mut BTreeMap<ComponentId, Component>,
    regions: &mut BTreeMap<RegionId, Region>,
    now: Timestamp,
) -> Vec<EventId> {
    let mut expired: Vec<EventId> = ledger
        .active
        .values()
        .filter(|event| event.has_expired(now))
        .map(|event| event.event_id.clone())
        .collect();
    expired.sort();

    for id in &expired {
        let Some(mut event) = ledger.active.remove(id) else {
            continue;
        };
        event.resolve(now);

        for component_id in &event.affected_components {
            if let Some(component) = components.get_mut(component_id) {
                component.active_events.remove(id);
                if let Some(region) = regions.get_mut(&component.region_id) {
                    region.active_incidents.remove(id);
                }
            }
        }

        tracing::debug!(event = %id, event_type = ?event.event_type, "Network event resolved");
        ledger.archive(event);
    }

    expired
}
