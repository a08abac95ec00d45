//! Landing adjudication
//!
//! A landing succeeds when the final horizontal position lies inside any
//! platform's footprint grown by a small tolerance. On a miss, the side of the
//! target platform the character ended up on picks which way it topples.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::Platform;
use super::trajectory::{Axis, TravelDirection};

/// World cardinal direction a character topples in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallDirection {
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl FallDirection {
    pub fn from_travel(travel: TravelDirection) -> Self {
        match (travel.axis, travel.sign > 0) {
            (Axis::X, true) => FallDirection::PosX,
            (Axis::X, false) => FallDirection::NegX,
            (Axis::Z, true) => FallDirection::PosZ,
            (Axis::Z, false) => FallDirection::NegZ,
        }
    }
}

/// Outcome of a completed jump
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Landing {
    Landed {
        platform_index: usize,
        /// Height the character snaps to
        surface_y: f32,
    },
    Missed { fall: FallDirection },
}

impl Landing {
    pub fn is_success(&self) -> bool {
        matches!(self, Landing::Landed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandingJudge {
    pub tolerance: f32,
}

impl LandingJudge {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    /// Judge a finished jump against every platform.
    ///
    /// Later platforms are checked first, so the target wins over an older
    /// platform should their grown bounds ever overlap.
    pub fn judge(
        &self,
        final_position: Vec3,
        platforms: &[Platform],
        target_index: usize,
        travel: TravelDirection,
    ) -> Landing {
        let hit = platforms
            .iter()
            .enumerate()
            .rev()
            .find(|(_, p)| p.contains(final_position, self.tolerance));

        match hit {
            Some((platform_index, platform)) => Landing::Landed {
                platform_index,
                surface_y: platform.rest_top(),
            },
            None => {
                let fall = match platforms.get(target_index) {
                    Some(target) => self.fall_direction(final_position, target, travel),
                    None => FallDirection::from_travel(travel),
                };
                Landing::Missed { fall }
            }
        }
    }

    /// Which side of `target` the position fell off.
    ///
    /// The travel axis (short or long) is checked before the cross axis; a
    /// position inside every edge falls along the travel direction.
    pub fn fall_direction(
        &self,
        position: Vec3,
        target: &Platform,
        travel: TravelDirection,
    ) -> FallDirection {
        let half = |axis: Axis| {
            let extent = match axis {
                Axis::X => target.footprint.half_width(),
                Axis::Z => target.footprint.half_depth(),
            };
            extent + self.tolerance
        };

        let along = travel.axis;
        let forward = (along.of(position) - along.of(target.position)) * travel.sign as f32;
        if forward < -half(along) {
            return FallDirection::from_travel(travel.reversed());
        }
        if forward > half(along) {
            return FallDirection::from_travel(travel);
        }

        let across = along.other();
        let side = across.of(position) - across.of(target.position);
        if side < -half(across) {
            return FallDirection::from_travel(TravelDirection {
                axis: across,
                sign: -1,
            });
        }
        if side > half(across) {
            return FallDirection::from_travel(TravelDirection {
                axis: across,
                sign: 1,
            });
        }

        FallDirection::from_travel(travel)
    }
}
