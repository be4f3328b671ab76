//! Netpulse - background state-evolution engine for a simulated telecom network
//!
//! A [`StateStore`] owns every region, component and event behind one
//! reader-writer lock. A [`SimulationClock`] advances it on a timer while any
//! number of readers query consistent snapshots.

pub mod clock;
pub mod core;
pub mod events;
pub mod model;
pub mod network;
pub mod state;

pub use crate::clock::{ClockHandle, ClockStats, Simulation, SimulationClock};
pub use crate::core::{Result, SimError, SimulationConfig};
pub use crate::state::{HealthSummary, NetworkSnapshot, StateStore, TickOutcome, TickReport};
