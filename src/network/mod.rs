//! Network entities: regions, components and the initial topology

pub mod component;
pub mod region;
pub mod topology;

pub use component::{Component, ComponentKind, ComponentProfile, PerformanceMetrics};
pub use region::{EnvironmentalFactors, Region, TrafficPattern, Weather};
pub use topology::Topology;
