use thiserror::Error;

use crate::core::types::{ComponentId, RegionId};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Region not found: {0}")]
    RegionNotFound(RegionId),

    #[error("Component not found: {0}")]
    ComponentNotFound(ComponentId),

    #[error("Component {component} references unknown region {region}")]
    UnknownRegion {
        component: ComponentId,
        region: RegionId,
    },

    #[error("Network state lock poisoned during {0}")]
    StatePoisoned(&'static str),

    #[error("Evolution step failed: {0}")]
    TransientEvolution(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl SimError {
    /// True for the lookup failures a caller should report as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RegionNotFound(_) | Self::ComponentNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(SimError::ComponentNotFound(ComponentId::new("core-node-01-01")).is_not_found());
        assert!(SimError::RegionNotFound(RegionId::new("region-west-06")).is_not_found());
        assert!(!SimError::TransientEvolution("boom".into()).is_not_found());
    }

    #[test]
    fn test_error_messages_name_the_id() {
        let err = SimError::ComponentNotFound(ComponentId::new("edge-compute-03-07"));
        assert_eq!(err.to_string(), "Component not found: edge-compute-03-07");
    }
}
