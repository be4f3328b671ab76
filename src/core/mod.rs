pub mod config;
pub mod error;
pub mod time;
pub mod types;

pub use config::SimulationConfig;
pub use error::{Result, SimError};
pub use time::{ScaledTimeSource, SteppingTimeSource, SystemTimeSource, TimeSource};
pub use types::{ComponentId, EventId, RegionId, Timestamp};
