//! Data-driven game balance
//!
//! Every gameplay constant lives here so difficulty can be tuned without
//! touching the simulation. Loaded from JSON; missing fields fall back to the
//! Normal preset.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Shortest flight time any duration model may produce (seconds)
pub const MIN_FLIGHT_SECS: f32 = 0.05;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Extra margin added to every platform edge for the landing test
    pub fn landing_tolerance(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.4,
            Difficulty::Normal => 0.15,
            Difficulty::Hard => 0.05,
        }
    }

    /// Inclusive range of platform-to-platform distances
    pub fn distance_range(&self) -> (i32, i32) {
        match self {
            Difficulty::Easy => (4, 6),
            Difficulty::Normal => (4, 7),
            Difficulty::Hard => (5, 8),
        }
    }
}

/// How long a jump stays in the air
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum FlightDuration {
    /// Constant flight time regardless of distance
    Fixed { secs: f32 },
    /// Legacy model: flight time grows with jump distance
    DistanceProportional { units_per_sec: f32 },
}

impl Default for FlightDuration {
    fn default() -> Self {
        FlightDuration::Fixed { secs: 0.6 }
    }
}

impl FlightDuration {
    /// Flight time in seconds for a jump covering `distance` units
    pub fn secs_for(&self, distance: f32) -> f32 {
        let secs = match *self {
            FlightDuration::Fixed { secs } => secs,
            FlightDuration::DistanceProportional { units_per_sec } => {
                distance.abs() / units_per_sec
            }
        };
        secs.max(MIN_FLIGHT_SECS)
    }
}

/// Gameplay balance parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Press duration that yields full power (milliseconds)
    pub max_press_ms: f32,
    /// Fraction of the platform distance covered at zero power (< 1)
    pub min_ratio: f32,
    /// Fraction of the platform distance covered at full power (> 1)
    pub max_ratio: f32,
    pub flight: FlightDuration,
    /// Apex height of every jump above the straight start-target line
    pub peak_height: f32,
    /// Extra margin added to every platform edge for the landing test
    pub landing_tolerance: f32,
    /// Inclusive integer range for platform-to-platform distance
    pub distance_min: i32,
    pub distance_max: i32,
    /// Inclusive range for generated footprint width and depth
    pub footprint_min: f32,
    pub footprint_max: f32,
    /// Width and depth of the start platform
    pub start_footprint: f32,
    /// Vertical thickness of every platform (its resting top surface)
    pub platform_height: f32,
    /// Height new platforms drop in from
    pub spawn_height: f32,
    /// Gravity applied to falling platforms (units/s²)
    pub gravity: f32,
    /// Fraction of impact speed kept on the single bounce
    pub bounce_restitution: f32,
    /// Time between a missed landing and game over (seconds)
    pub topple_delay_secs: f32,
    /// Camera/ground transition time per unit of platform shift (seconds)
    pub camera_secs_per_unit: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::from_preset(Difficulty::Normal)
    }
}

impl Tuning {
    /// Create tuning from a difficulty preset
    pub fn from_preset(preset: Difficulty) -> Self {
        let (distance_min, distance_max) = preset.distance_range();
        Self {
            max_press_ms: 1500.0,
            min_ratio: 0.5,
            max_ratio: 1.5,
            flight: FlightDuration::default(),
            peak_height: 2.0,
            landing_tolerance: preset.landing_tolerance(),
            distance_min,
            distance_max,
            footprint_min: 2.0,
            footprint_max: 3.0,
            start_footprint: 2.5,
            platform_height: 1.0,
            spawn_height: 6.0,
            gravity: 30.0,
            bounce_restitution: 0.3,
            topple_delay_secs: 0.8,
            camera_secs_per_unit: 0.08,
        }
    }

    /// Apply a difficulty preset (only the difficulty-dependent fields change)
    pub fn apply_preset(&mut self, preset: Difficulty) {
        let (distance_min, distance_max) = preset.distance_range();
        self.landing_tolerance = preset.landing_tolerance();
        self.distance_min = distance_min;
        self.distance_max = distance_max;
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_press_ms > 0.0) {
            return Err(ConfigError::invalid("tuning", "max_press_ms must be > 0"));
        }
        if !(self.min_ratio >= 0.0 && self.min_ratio < 1.0 && self.max_ratio > 1.0) {
            return Err(ConfigError::invalid(
                "tuning",
                format!(
                    "ratios must satisfy 0 <= min_ratio < 1 < max_ratio (got {} / {})",
                    self.min_ratio, self.max_ratio
                ),
            ));
        }
        match self.flight {
            FlightDuration::Fixed { secs } if !(secs > 0.0) => {
                return Err(ConfigError::invalid("tuning", "fixed flight secs must be > 0"));
            }
            FlightDuration::DistanceProportional { units_per_sec } if !(units_per_sec > 0.0) => {
                return Err(ConfigError::invalid("tuning", "flight units_per_sec must be > 0"));
            }
            _ => {}
        }
        if self.distance_min < 1 || self.distance_min > self.distance_max {
            return Err(ConfigError::invalid(
                "tuning",
                format!(
                    "distance range must be 1 <= min <= max (got {}..={})",
                    self.distance_min, self.distance_max
                ),
            ));
        }
        if !(self.footprint_min > 0.0 && self.footprint_min <= self.footprint_max) {
            return Err(ConfigError::invalid(
                "tuning",
                format!(
                    "footprint range must be 0 < min <= max (got {}..={})",
                    self.footprint_min, self.footprint_max
                ),
            ));
        }
        if !(self.start_footprint > 0.0 && self.platform_height > 0.0) {
            return Err(ConfigError::invalid(
                "tuning",
                "start_footprint and platform_height must be > 0",
            ));
        }
        if !(self.landing_tolerance >= 0.0 && self.peak_height >= 0.0 && self.spawn_height >= 0.0)
        {
            return Err(ConfigError::invalid(
                "tuning",
                "landing_tolerance, peak_height and spawn_height must be >= 0",
            ));
        }
        if !(self.gravity > 0.0) || !(0.0..1.0).contains(&self.bounce_restitution) {
            return Err(ConfigError::invalid(
                "tuning",
                "gravity must be > 0 and bounce_restitution in [0, 1)",
            ));
        }
        if !(self.topple_delay_secs >= 0.0 && self.camera_secs_per_unit >= 0.0) {
            return Err(ConfigError::invalid(
                "tuning",
                "topple_delay_secs and camera_secs_per_unit must be >= 0",
            ));
        }
        Ok(())
    }

    /// Load tuning from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning: Tuning = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tuning.validate()?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load tuning, falling back to the given preset on any error
    pub fn load_or_preset(path: &Path, preset: Difficulty) -> Self {
        match Self::load(path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::warn!("{err}; using {} preset", preset.as_str());
                Self::from_preset(preset)
            }
        }
    }
}
