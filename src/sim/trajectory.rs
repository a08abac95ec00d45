//! Jump trajectory
//!
//! Jumps are axis-locked: travel happens along whichever horizontal axis
//! separates the two platform centers most, and the landing point's other
//! coordinate snaps to the target center. Every jump peaks at the same height
//! above the start-target line regardless of distance.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;
use crate::yaw_toward;

/// Horizontal world axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Z,
}

impl Axis {
    #[inline]
    pub fn of(&self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Z => v.z,
        }
    }

    #[inline]
    pub fn other(&self) -> Axis {
        match self {
            Axis::X => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    pub fn unit(&self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Axis plus sign a jump travels along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelDirection {
    pub axis: Axis,
    /// +1 or -1
    pub sign: i8,
}

impl TravelDirection {
    /// Direction from `from` toward `to`. Ties go to z; a zero delta recedes (-z).
    pub fn between(from: Vec3, to: Vec3) -> Self {
        let delta = to - from;
        let axis = if delta.x.abs() > delta.z.abs() {
            Axis::X
        } else {
            Axis::Z
        };
        let sign = if axis.of(delta) > 0.0 { 1 } else { -1 };
        Self { axis, sign }
    }

    pub fn vector(&self) -> Vec3 {
        self.axis.unit() * self.sign as f32
    }

    pub fn reversed(&self) -> Self {
        Self {
            axis: self.axis,
            sign: -self.sign,
        }
    }
}

/// Jump length for a given power: under-shoots at low power, over-shoots at high
#[inline]
pub fn jump_distance(platform_distance: f32, power: f32, min_ratio: f32, max_ratio: f32) -> f32 {
    let power = power.clamp(0.0, 1.0);
    platform_distance * (min_ratio + (max_ratio - min_ratio) * power)
}

/// Power that makes the jump cover exactly `wanted` units (clamped to [0, 1])
pub fn power_for_distance(
    platform_distance: f32,
    wanted: f32,
    min_ratio: f32,
    max_ratio: f32,
) -> f32 {
    if platform_distance <= 0.0 {
        return 0.0;
    }
    ((wanted / platform_distance - min_ratio) / (max_ratio - min_ratio)).clamp(0.0, 1.0)
}

/// Presentation view of a trajectory at time `t`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub position: Vec3,
    pub yaw: f32,
    /// Somersault angle in [0, 2π], locked to the same `t` as translation
    pub flip: f32,
}

/// A computed jump path
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub start: Vec3,
    pub target: Vec3,
    pub travel: TravelDirection,
    pub platform_distance: f32,
    pub jump_distance: f32,
    /// Flight time (seconds)
    pub duration: f32,
    pub peak_height: f32,
}

impl Trajectory {
    /// Plan a jump from `start` given the current and target platform surface
    /// centers. The landing height is the target surface height.
    pub fn compute(
        power: f32,
        start: Vec3,
        current_platform: Vec3,
        target_platform: Vec3,
        tuning: &Tuning,
    ) -> Self {
        let travel = TravelDirection::between(current_platform, target_platform);
        let delta = target_platform - current_platform;
        let platform_distance = delta.x.abs().max(delta.z.abs());
        let jump_distance =
            jump_distance(platform_distance, power, tuning.min_ratio, tuning.max_ratio);

        let along = travel.axis.of(start) + travel.sign as f32 * jump_distance;
        let across = travel.axis.other().of(target_platform);
        let target = match travel.axis {
            Axis::X => Vec3::new(along, target_platform.y, across),
            Axis::Z => Vec3::new(across, target_platform.y, along),
        };

        Self {
            start,
            target,
            travel,
            platform_distance,
            jump_distance,
            duration: tuning.flight.secs_for(jump_distance),
            peak_height: tuning.peak_height,
        }
    }

    /// Position at normalized time `t` (clamped to [0, 1])
    pub fn position_at(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let mut p = self.start.lerp(self.target, t);
        p.y += self.peak_height * (PI * t).sin();
        // Ends exactly on the landing point, free of sin(π) residue
        if t >= 1.0 {
            p = self.target;
        }
        p
    }

    pub fn sample(&self, t: f32) -> TrajectorySample {
        let t = t.clamp(0.0, 1.0);
        TrajectorySample {
            position: self.position_at(t),
            yaw: yaw_toward(self.travel.vector()),
            flip: t * TAU,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> Tuning {
        Tuning::default()
    }

    #[test]
    fn test_travel_axis_follows_larger_delta() {
        let d = TravelDirection::between(Vec3::ZERO, Vec3::new(-6.0, 0.0, 0.5));
        assert_eq!(d, TravelDirection { axis: Axis::X, sign: -1 });
        let d = TravelDirection::between(Vec3::ZERO, Vec3::new(0.2, 0.0, -4.0));
        assert_eq!(d, TravelDirection { axis: Axis::Z, sign: -1 });
        assert_eq!(d.reversed().vector(), Vec3::Z);
    }

    #[test]
    fn test_jump_distance_bounds() {
        assert_eq!(jump_distance(5.0, 0.0, 0.5, 1.5), 2.5);
        assert_eq!(jump_distance(5.0, 0.5, 0.5, 1.5), 5.0);
        assert_eq!(jump_distance(5.0, 1.0, 0.5, 1.5), 7.5);
        assert_eq!(jump_distance(5.0, 3.0, 0.5, 1.5), 7.5);
    }

    #[test]
    fn test_power_for_distance_inverts() {
        let p = power_for_distance(6.0, 6.0, 0.5, 1.5);
        assert!((jump_distance(6.0, p, 0.5, 1.5) - 6.0).abs() < 1e-5);
        assert_eq!(power_for_distance(6.0, 100.0, 0.5, 1.5), 1.0);
        assert_eq!(power_for_distance(0.0, 1.0, 0.5, 1.5), 0.0);
    }

    #[test]
    fn test_landing_point_is_axis_locked() {
        let t = tuning();
        // Character stands off-center on the current platform
        let start = Vec3::new(0.4, 1.0, 0.3);
        let traj = Trajectory::compute(
            0.5,
            start,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(-5.0, 1.0, 0.0),
            &t,
        );
        assert_eq!(traj.travel.axis, Axis::X);
        assert!((traj.target.x - (0.4 - 5.0)).abs() < 1e-5);
        assert_eq!(traj.target.z, 0.0, "cross-axis snaps to target center");
    }

    #[test]
    fn test_path_endpoints_and_apex() {
        let t = tuning();
        let traj = Trajectory::compute(
            0.5,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, -5.0),
            &t,
        );
        assert_eq!(traj.position_at(0.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(traj.position_at(1.0), Vec3::new(0.0, 1.0, -5.0));
        let apex = traj.position_at(0.5);
        assert!((apex.y - (1.0 + t.peak_height)).abs() < 1e-5);
        assert!((apex.z + 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_apex_independent_of_distance() {
        let t = tuning();
        let from = Vec3::new(0.0, 1.0, 0.0);
        let near = Trajectory::compute(0.0, from, from, Vec3::new(0.0, 1.0, -4.0), &t);
        let far = Trajectory::compute(1.0, from, from, Vec3::new(0.0, 1.0, -7.0), &t);
        assert!((near.position_at(0.5).y - far.position_at(0.5).y).abs() < 1e-5);
        assert_eq!(near.duration, far.duration);
    }

    #[test]
    fn test_legacy_duration_scales_with_distance() {
        let t = Tuning {
            flight: crate::tuning::FlightDuration::DistanceProportional { units_per_sec: 10.0 },
            ..Tuning::default()
        };
        let from = Vec3::new(0.0, 1.0, 0.0);
        let near = Trajectory::compute(0.5, from, from, Vec3::new(0.0, 1.0, -4.0), &t);
        let far = Trajectory::compute(0.5, from, from, Vec3::new(0.0, 1.0, -7.0), &t);
        assert!(far.duration > near.duration);
    }

    #[test]
    fn test_sample_flip_tracks_progress() {
        let t = tuning();
        let from = Vec3::new(0.0, 1.0, 0.0);
        let traj = Trajectory::compute(0.5, from, from, Vec3::new(-5.0, 1.0, 0.0), &t);
        assert_eq!(traj.sample(0.0).flip, 0.0);
        assert!((traj.sample(0.5).flip - PI).abs() < 1e-5);
        assert!((traj.sample(1.0).flip - TAU).abs() < 1e-5);
        // Facing -x
        assert!((traj.sample(0.3).yaw - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }
}
