//! Core type definitions used throughout the codebase

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Wall-clock instant used for simulation time
pub type Timestamp = DateTime<Utc>;

/// Unique identifier for regions
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing two characters, used as the region tag in component ids
    pub fn suffix(&self) -> &str {
        let start = self.0.len().saturating_sub(2);
        self.0.get(start..).unwrap_or(&self.0)
    }
}

/// Unique identifier for network components
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for network events
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build an id from the creation time and a per-store sequence number
    pub fn generate(at: Timestamp, sequence: u64) -> Self {
        Self(format!("event-{}-{:04}", at.timestamp(), sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Hours between two instants (negative if `later` is earlier)
pub fn hours_between(earlier: Timestamp, later: Timestamp) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 3_600_000.0
}
