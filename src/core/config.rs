//! Simulation configuration with documented constants
//!
//! Operational knobs live here. The numeric model itself (decay formula,
//! failure-probability thresholds, load ranges, impact tables) is fixed in
//! `model` and `events` because its bounds are part of the contract.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::network::region::{MAX_TEMPERATURE, MIN_TEMPERATURE};

/// Shortest accepted tick interval (one millisecond)
pub const MIN_TICK_INTERVAL_SECS: f64 = 0.001;
/// Longest accepted tick interval (one day)
pub const MAX_TICK_INTERVAL_SECS: f64 = 86_400.0;

/// Top-level configuration, loadable from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the simulation RNG. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Maximum number of resolved events kept in history.
    ///
    /// `None` keeps every resolved event for the life of the process, which
    /// grows without bound. Set a limit for long-running deployments.
    pub history_limit: Option<usize>,

    pub clock: ClockConfig,
    pub events: EventConfig,
    pub environment: EnvironmentConfig,
    pub topology: TopologyConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            history_limit: None,
            clock: ClockConfig::default(),
            events: EventConfig::default(),
            environment: EnvironmentConfig::default(),
            topology: TopologyConfig::default(),
        }
    }
}

/// Background clock timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Target wall time between ticks
    pub tick_interval_secs: f64,

    /// Ticks closer than this to the last applied tick are no-ops.
    ///
    /// Protects against timer jitter applying the same interval twice.
    pub min_tick_spacing_secs: f64,

    /// After a failed tick the clock waits `tick_interval * multiplier`
    pub error_backoff_multiplier: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 30.0,
            min_tick_spacing_secs: 10.0,
            error_backoff_multiplier: 2,
        }
    }
}

impl ClockConfig {
    /// Clamped to the accepted range so an unvalidated config cannot panic
    pub fn tick_interval(&self) -> Duration {
        let secs = if self.tick_interval_secs.is_nan() {
            MIN_TICK_INTERVAL_SECS
        } else {
            self.tick_interval_secs
                .clamp(MIN_TICK_INTERVAL_SECS, MAX_TICK_INTERVAL_SECS)
        };
        Duration::from_secs_f64(secs)
    }

    pub fn error_backoff(&self) -> Duration {
        self.tick_interval()
            .saturating_mul(self.error_backoff_multiplier.max(1))
    }

    pub fn min_tick_spacing(&self) -> chrono::Duration {
        chrono::Duration::milliseconds((self.min_tick_spacing_secs * 1000.0) as i64)
    }
}

/// Random event generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Chance that one event is created on an applied tick
    pub probability_per_tick: f64,
    /// Upper bound on components hit by one event (lower bound is 1)
    pub max_affected: usize,
    pub min_duration_hours: f64,
    pub max_duration_hours: f64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            probability_per_tick: 0.05,
            max_affected: 3,
            min_duration_hours: 0.5,
            max_duration_hours: 8.0,
        }
    }
}

/// Regional environment drift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Per-region, per-tick chance that the weather changes
    pub weather_change_probability: f64,
    /// Largest absolute temperature change per tick (°C)
    pub temperature_step: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            weather_change_probability: 0.1,
            temperature_step: 2.0,
        }
    }
}

/// Size of the seeded network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub base_stations: usize,
    pub core_nodes: usize,
    pub edge_compute: usize,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            base_stations: 50,
            core_nodes: 12,
            edge_compute: 25,
        }
    }
}

impl SimulationConfig {
    /// Parse a TOML document. Missing sections fall back to defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        fn probability(name: &str, value: f64) -> Result<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(SimError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )))
            }
        }

        let floats = [
            ("clock.tick_interval_secs", self.clock.tick_interval_secs),
            ("clock.min_tick_spacing_secs", self.clock.min_tick_spacing_secs),
            ("events.min_duration_hours", self.events.min_duration_hours),
            ("events.max_duration_hours", self.events.max_duration_hours),
            ("environment.temperature_step", self.environment.temperature_step),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        probability("events.probability_per_tick", self.events.probability_per_tick)?;
        probability(
            "environment.weather_change_probability",
            self.environment.weather_change_probability,
        )?;

        let interval = self.clock.tick_interval_secs;
        if !(MIN_TICK_INTERVAL_SECS..=MAX_TICK_INTERVAL_SECS).contains(&interval) {
            return Err(SimError::InvalidConfig(format!(
                "clock.tick_interval_secs must be within \
                 [{MIN_TICK_INTERVAL_SECS}, {MAX_TICK_INTERVAL_SECS}], got {interval}"
            )));
        }
        if self.clock.min_tick_spacing_secs < 0.0 {
            return Err(SimError::InvalidConfig(
                "clock.min_tick_spacing_secs must not be negative".into(),
            ));
        }
        if self.events.max_affected == 0 {
            return Err(SimError::InvalidConfig(
                "events.max_affected must be at least 1".into(),
            ));
        }
        let (lo, hi) = (self.events.min_duration_hours, self.events.max_duration_hours);
        if !(lo > 0.0 && lo <= hi) {
            return Err(SimError::InvalidConfig(format!(
                "event duration range [{lo}, {hi}] is invalid"
            )));
        }
        let step = self.environment.temperature_step;
        if !(0.0..=MAX_TEMPERATURE - MIN_TEMPERATURE).contains(&step) {
            return Err(SimError::InvalidConfig(format!(
                "environment.temperature_step must be within [0, {}], got {step}",
                MAX_TEMPERATURE - MIN_TEMPERATURE
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.clock.tick_interval(), Duration::from_secs(30));
        assert_eq!(config.clock.error_backoff(), Duration::from_secs(60));
        assert_eq!(config.clock.min_tick_spacing(), chrono::Duration::seconds(10));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            seed = 42

            [events]
            probability_per_tick = 0.5
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.events.probability_per_tick, 0.5);
        assert_eq!(config.events.max_affected, 3);
        assert_eq!(config.topology.base_stations, 50);
        assert_eq!(config.history_limit, None);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = SimulationConfig::from_toml_str("[events]\nprobability_per_tick = 1.5\n")
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_inverted_duration_range() {
        let mut config = SimulationConfig::default();
        config.events.min_duration_hours = 9.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/netpulse.toml");
        let config = SimulationConfig::load(&path).expect("shipped config should load");
        assert_eq!(config.history_limit, Some(10_000));
        assert_eq!(config.clock, ClockConfig::default());
        assert_eq!(config.topology, TopologyConfig::default());
    }

    #[test]
    fn test_rejects_infinite_durations() {
        let err = SimulationConfig::from_toml_str("[events]\nmax_duration_hours = inf\n")
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));

        let err = SimulationConfig::from_toml_str("[environment]\ntemperature_step = inf\n")
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));

        let err = SimulationConfig::from_toml_str("[clock]\nmin_tick_spacing_secs = inf\n")
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_oversized_temperature_step() {
        let mut config = SimulationConfig::default();
        config.environment.temperature_step = 1e308;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_sub_millisecond_interval() {
        let mut config = SimulationConfig::default();
        config.clock.tick_interval_secs = 1e-12;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        // The getter stays usable even on an unvalidated config
        assert_eq!(config.clock.tick_interval(), Duration::from_millis(1));
        config.clock.tick_interval_secs = f64::NAN;
        assert_eq!(config.clock.tick_interval(), Duration::from_millis(1));
        config.clock.tick_interval_secs = f64::INFINITY;
        assert_eq!(config.clock.tick_interval(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_rejects_unparseable_toml() {
        let err = SimulationConfig::from_toml_str("seed = [").unwrap_err();
        assert!(matches!(err, SimError::ConfigParse(_)));
    }
}
