//! Guarded network state and its query API

pub mod snapshot;
pub mod store;

pub use snapshot::{HealthSummary, NetworkSnapshot};
pub use store::{StateStore, TickOutcome, TickReport};
