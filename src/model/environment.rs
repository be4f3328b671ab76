//! Regional weather changes and temperature random walk

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::EnvironmentConfig;
use crate::network::region::{Region, Weather, MAX_TEMPERATURE, MIN_TEMPERATURE};

/// Drift one region's environment. Returns the new weather if it changed.
pub fn update_environment<R: Rng>(
    region: &mut Region,
    config: &EnvironmentConfig,
    rng: &mut R,
) -> Option<Weather> {
    let factors = &mut region.environmental_factors;

    let mut changed = None;
    if rng.gen_bool(config.weather_change_probability) {
        if let Some(&weather) = Weather::CHANGEABLE.choose(rng) {
            if weather != factors.weather {
                changed = Some(weather);
            }
            factors.weather = weather;
        }
    }

    let step = config.temperature_step;
    let delta = if step > 0.0 { rng.gen_range(-step..=step) } else { 0.0 };
    factors.temperature = (factors.temperature + delta).clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);

    changed
}
