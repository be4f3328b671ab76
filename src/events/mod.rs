//! Transient network events

pub mod engine;
pub mod event;

pub use engine::EventLedger;
pub use event::{EventType, ImpactMetric, NetworkEvent, ResolutionStatus, Severity};
