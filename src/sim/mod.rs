//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed-time driven; frame rate changes sampling, never outcomes
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod autoplay;
pub mod charge;
pub mod landing;
pub mod platform;
pub mod state;
pub mod tick;
pub mod trajectory;

pub use autoplay::{Autopilot, ideal_power};
pub use charge::{ChargeController, power_for};
pub use landing::{FallDirection, Landing, LandingJudge};
pub use platform::{PlatformGenerator, PlatformVisual};
pub use state::{
    CameraShift, Character, CharacterState, FallState, Footprint, GameEvent, JumpAttempt,
    Platform, RunSession,
};
pub use tick::{TickInput, tick};
pub use trajectory::{
    Axis, Trajectory, TrajectorySample, TravelDirection, jump_distance, power_for_distance,
};
