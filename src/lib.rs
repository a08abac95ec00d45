//! Platform Leap - a charge-and-leap platform hopping game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (charge, trajectory, landing, run state)
//! - `tuning`: Data-driven game balance and difficulty presets
//! - `replay`: Scripted input sequences for headless runs
//! - `error`: Errors for file-backed configuration

pub mod error;
pub mod replay;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use tuning::{Difficulty, FlightDuration, Tuning};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Ground plane height (fallen characters rest here)
    pub const GROUND_Y: f32 = 0.0;
}

/// Horizontal (x, z) part of a world position
#[inline]
pub fn horizontal(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Yaw (radians around +y) that faces along a horizontal direction.
///
/// Zero yaw faces -z, the direction the first generated platforms recede in.
#[inline]
pub fn yaw_toward(dir: Vec3) -> f32 {
    (-dir.x).atan2(-dir.z)
}
