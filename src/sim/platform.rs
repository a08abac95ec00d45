//! Procedural platform placement
//!
//! Each platform recedes from the previous one along a single axis (-x or -z)
//! by an integer distance. Footprint is collision-relevant; color is cosmetic
//! and rolled separately.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{FallState, Footprint, Platform};
use crate::tuning::Tuning;

/// Top-face colors new platforms pick from (0xRRGGBB)
const PALETTE: [u32; 8] = [
    0xF4A261, 0xE76F51, 0x2A9D8F, 0x8AB17D, 0xE9C46A, 0x90BEDE, 0xC77DFF, 0xF28482,
];

/// Cosmetic platform parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformVisual {
    pub color: u32,
}

impl Default for PlatformVisual {
    fn default() -> Self {
        Self { color: PALETTE[0] }
    }
}

impl PlatformVisual {
    pub const START: PlatformVisual = PlatformVisual { color: 0xFFFFFF };

    pub fn roll<R: Rng>(rng: &mut R) -> Self {
        Self {
            color: PALETTE[rng.random_range(0..PALETTE.len())],
        }
    }
}

/// Generates each next platform from the previous one
#[derive(Debug, Clone)]
pub struct PlatformGenerator {
    distance_min: i32,
    distance_max: i32,
    footprint_min: f32,
    footprint_max: f32,
    height: f32,
    spawn_height: f32,
}

impl PlatformGenerator {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            distance_min: tuning.distance_min,
            distance_max: tuning.distance_max,
            footprint_min: tuning.footprint_min,
            footprint_max: tuning.footprint_max,
            height: tuning.platform_height,
            spawn_height: tuning.spawn_height,
        }
    }

    /// Place the platform after `previous`. It spawns elevated and falling.
    pub fn generate_next<R: Rng>(&self, previous: &Platform, rng: &mut R) -> Platform {
        let along_x = rng.random_bool(0.5);
        let distance = rng.random_range(self.distance_min..=self.distance_max) as f32;

        let offset = if along_x {
            Vec3::new(-distance, 0.0, 0.0)
        } else {
            Vec3::new(0.0, 0.0, -distance)
        };
        let base = previous.position + offset;

        let footprint = Footprint::new(
            rng.random_range(self.footprint_min..=self.footprint_max),
            rng.random_range(self.footprint_min..=self.footprint_max),
        );

        Platform {
            position: Vec3::new(base.x, self.spawn_height, base.z),
            footprint,
            height: self.height,
            is_start: false,
            fall: FallState::Falling {
                velocity: 0.0,
                bounced: false,
            },
            visual: PlatformVisual::roll(rng),
        }
    }
}
