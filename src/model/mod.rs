//! Pure evolution models applied to entities during a tick

pub mod environment;
pub mod health;
pub mod load;

pub use health::{HealthUpdate, MaintenanceReport};
