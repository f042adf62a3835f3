use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

const CONFIG_PATH: &str = "config/birb.toml";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawBirbConfig {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    spawn: RawSpawn,
    #[serde(default)]
    flight: RawFlight,
    #[serde(default)]
    wander: RawWander,
    #[serde(default)]
    job: RawJob,
    #[serde(default)]
    health: RawHealth,
    #[serde(default)]
    noise: RawNoise,
    #[serde(default)]
    overlay: RawOverlay,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawSpawn {
    max_per_owner: usize,
    search_radius: f32,
    min_search_radius: f32,
    search_attempts: u32,
    default_bounds_size: f32,
}

impl Default for RawSpawn {
    fn default() -> Self {
        Self {
            max_per_owner: 2,
            search_radius: 250.0,
            min_search_radius: 50.0,
            search_attempts: 1000,
            default_bounds_size: 2.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawFlight {
    reach_cache_secs: f32,
    close_tolerance_player: f32,
    close_tolerance_prop: f32,
    home_tolerance: f32,
    seek_speed_player: f32,
    seek_speed_prop: f32,
    job_speed: f32,
    home_speed_player: f32,
    home_speed_prop: f32,
    orbit_radius_min: f32,
    orbit_radius_max: f32,
    orbit_rate: f32,
    hover_rate: f32,
    hover_amplitude: f32,
    glide_speed: f32,
}

impl Default for RawFlight {
    fn default() -> Self {
        Self {
            reach_cache_secs: 0.2,
            close_tolerance_player: 0.625,
            close_tolerance_prop: 0.75,
            home_tolerance: 12.5,
            seek_speed_player: 2.0,
            seek_speed_prop: 1.5,
            job_speed: 40.0,
            home_speed_player: 0.25,
            home_speed_prop: 0.095,
            orbit_radius_min: 0.375,
            orbit_radius_max: 0.75,
            orbit_rate: 1.5,
            hover_rate: 3.0,
            hover_amplitude: 0.2,
            glide_speed: 15.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawWander {
    interval_secs: f32,
    horizontal_range: f32,
    vertical_range: f32,
    lerp_speed: f32,
    limit_min: u32,
    limit_max: u32,
}

impl Default for RawWander {
    fn default() -> Self {
        Self {
            interval_secs: 3.0,
            horizontal_range: 5.0,
            vertical_range: 0.25,
            lerp_speed: 2.0,
            limit_min: 5,
            limit_max: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawJob {
    pooping_secs: f32,
}

impl Default for RawJob {
    fn default() -> Self {
        Self { pooping_secs: 5.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawHealth {
    max: f32,
}

impl Default for RawHealth {
    fn default() -> Self {
        Self { max: 10.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawNoise {
    interval_min_secs: f32,
    interval_max_secs: f32,
}

impl Default for RawNoise {
    fn default() -> Self {
        Self {
            interval_min_secs: 3.0,
            interval_max_secs: 5.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawOverlay {
    lifetime_secs: f32,
}

impl Default for RawOverlay {
    fn default() -> Self {
        Self { lifetime_secs: 5.0 }
    }
}

/// Runtime tuning derived from `config/birb.toml`.
#[derive(Resource, Debug, Clone)]
pub struct BirbConfig {
    pub seed: Option<u64>,
    pub spawn: SpawnConfig,
    pub flight: FlightConfig,
    pub wander: WanderConfig,
    pub job: JobConfig,
    pub max_health: f32,
    pub noise: NoiseConfig,
    pub overlay: OverlayConfig,
}

#[derive(Debug, Clone)]
pub struct SpawnConfig {
    pub max_per_owner: usize,
    pub search_radius: f32,
    pub min_search_radius: f32,
    pub search_attempts: u32,
    pub default_bounds_size: f32,
}

#[derive(Debug, Clone)]
pub struct FlightConfig {
    pub reach_cache_secs: f32,
    pub close_tolerance_player: f32,
    pub close_tolerance_prop: f32,
    pub home_tolerance: f32,
    pub seek_speed_player: f32,
    pub seek_speed_prop: f32,
    pub job_speed: f32,
    pub home_speed_player: f32,
    pub home_speed_prop: f32,
    pub orbit_radius_min: f32,
    pub orbit_radius_max: f32,
    pub orbit_rate: f32,
    pub hover_rate: f32,
    pub hover_amplitude: f32,
    pub glide_speed: f32,
}

#[derive(Debug, Clone)]
pub struct WanderConfig {
    pub interval_secs: f32,
    pub horizontal_range: f32,
    pub vertical_range: f32,
    pub lerp_speed: f32,
    pub limit_min: u32,
    pub limit_max: u32,
}

#[derive(Debug, Clone)]
pub struct JobConfig {
    pub pooping_secs: f32,
}

#[derive(Debug, Clone)]
pub struct NoiseConfig {
    pub interval_min_secs: f32,
    pub interval_max_secs: f32,
}

#[derive(Debug, Clone)]
pub struct OverlayConfig {
    pub lifetime_secs: f32,
}

impl BirbConfig {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw).unwrap_or_else(|err| {
                warn!(
                    "Failed to parse {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                Self::default()
            }),
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                Self::default()
            }
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawBirbConfig>(raw).map(Self::from)
    }
}

impl Default for BirbConfig {
    fn default() -> Self {
        RawBirbConfig::default().into()
    }
}

impl From<RawBirbConfig> for BirbConfig {
    fn from(value: RawBirbConfig) -> Self {
        let spawn = SpawnConfig {
            // The cap counts the birb being launched; below 2 none could fly.
            max_per_owner: value.spawn.max_per_owner.max(2),
            search_radius: value.spawn.search_radius.max(0.0),
            min_search_radius: value
                .spawn
                .min_search_radius
                .clamp(0.0, value.spawn.search_radius.max(0.0)),
            search_attempts: value.spawn.search_attempts.max(1),
            default_bounds_size: value.spawn.default_bounds_size.max(0.0),
        };

        let raw_flight = value.flight;
        let flight = FlightConfig {
            reach_cache_secs: raw_flight.reach_cache_secs.max(0.0),
            close_tolerance_player: raw_flight.close_tolerance_player.max(0.0),
            close_tolerance_prop: raw_flight.close_tolerance_prop.max(0.0),
            home_tolerance: raw_flight.home_tolerance.max(0.0),
            seek_speed_player: raw_flight.seek_speed_player.max(0.0),
            seek_speed_prop: raw_flight.seek_speed_prop.max(0.0),
            job_speed: raw_flight.job_speed.max(0.0),
            home_speed_player: raw_flight.home_speed_player.max(0.0),
            home_speed_prop: raw_flight.home_speed_prop.max(0.0),
            orbit_radius_min: raw_flight.orbit_radius_min.min(raw_flight.orbit_radius_max),
            orbit_radius_max: raw_flight.orbit_radius_max.max(raw_flight.orbit_radius_min),
            orbit_rate: raw_flight.orbit_rate,
            hover_rate: raw_flight.hover_rate,
            hover_amplitude: raw_flight.hover_amplitude,
            glide_speed: raw_flight.glide_speed.max(0.0),
        };

        let wander = WanderConfig {
            interval_secs: value.wander.interval_secs.max(0.0),
            horizontal_range: value.wander.horizontal_range.max(0.0),
            vertical_range: value.wander.vertical_range.max(0.0),
            lerp_speed: value.wander.lerp_speed.max(0.0),
            limit_min: value.wander.limit_min.min(value.wander.limit_max),
            limit_max: value.wander.limit_max.max(value.wander.limit_min),
        };

        let noise = NoiseConfig {
            interval_min_secs: value
                .noise
                .interval_min_secs
                .min(value.noise.interval_max_secs)
                .max(0.1),
            interval_max_secs: value
                .noise
                .interval_max_secs
                .max(value.noise.interval_min_secs)
                .max(0.1),
        };

        Self {
            seed: value.seed,
            spawn,
            flight,
            wander,
            job: JobConfig {
                pooping_secs: value.job.pooping_secs.max(0.0),
            },
            max_health: value.health.max.max(f32::EPSILON),
            noise,
            overlay: OverlayConfig {
                lifetime_secs: value.overlay.lifetime_secs.max(0.0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_falls_back_to_defaults() {
        let config = BirbConfig::default();
        assert_eq!(config.spawn.max_per_owner, 2);
        assert_eq!(config.spawn.search_attempts, 1000);
        assert_eq!(config.wander.limit_min, 5);
        assert_eq!(config.wander.limit_max, 20);
        assert_eq!(config.max_health, 10.0);
        assert!(config.seed.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = BirbConfig::from_toml_str(
            r#"
            seed = 11

            [health]
            max = 25.0
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.max_health, 25.0);
        assert_eq!(config.job.pooping_secs, 5.0);
    }

    #[test]
    fn inverted_ranges_are_repaired() {
        let config = BirbConfig::from_toml_str(
            r#"
            [wander]
            limit_min = 30
            limit_max = 10

            [flight]
            orbit_radius_min = 2.0
            orbit_radius_max = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(config.wander.limit_min, 10);
        assert_eq!(config.wander.limit_max, 30);
        assert!(config.flight.orbit_radius_min <= config.flight.orbit_radius_max);
    }

    #[test]
    fn owner_cap_always_allows_one_birb() {
        let config = BirbConfig::from_toml_str(
            r#"
            [spawn]
            max_per_owner = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.spawn.max_per_owner, 2);
    }

    #[test]
    fn shipped_config_parses() {
        let raw = include_str!("../../config/birb.toml");
        let config = BirbConfig::from_toml_str(raw).unwrap();
        let defaults = BirbConfig::default();
        assert_eq!(config.spawn.search_radius, defaults.spawn.search_radius);
        assert_eq!(config.flight.home_tolerance, defaults.flight.home_tolerance);
    }
}
