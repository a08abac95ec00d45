//! Demo/idle mode: an automated player
//!
//! Works only through `TickInput`, exactly like a human would.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{CharacterState, RunSession};
use super::tick::TickInput;
use super::trajectory::{TravelDirection, power_for_distance};

/// Power that lands the character on the target platform's center
pub fn ideal_power(session: &RunSession) -> Option<f32> {
    let platforms = session.platforms();
    let from = platforms.get(session.current_platform_index())?.surface_center();
    let to = platforms.get(session.target_platform_index())?.surface_center();

    let travel = TravelDirection::between(from, to);
    let delta = to - from;
    let platform_distance = delta.x.abs().max(delta.z.abs());
    let wanted =
        (travel.axis.of(to) - travel.axis.of(session.character().position)) * travel.sign as f32;

    let tuning = session.tuning();
    Some(power_for_distance(
        platform_distance,
        wanted,
        tuning.min_ratio,
        tuning.max_ratio,
    ))
}

/// Presses, holds until the planned power is reached, releases
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Pcg32,
    /// Max random error added to each planned power, in `0.0..=1.0`
    jitter: f32,
    goal: Option<f32>,
}

impl Autopilot {
    /// `jitter` is clamped to `0.0..=1.0`; a non-finite value means no jitter.
    pub fn new(seed: u64, jitter: f32) -> Self {
        let jitter = if jitter.is_finite() {
            jitter.abs().min(1.0)
        } else {
            0.0
        };
        Self {
            rng: Pcg32::seed_from_u64(seed),
            jitter,
            goal: None,
        }
    }

    /// Decide this frame's input from the session as it stands
    pub fn next_input(&mut self, session: &RunSession) -> TickInput {
        if session.is_game_over() {
            self.goal = None;
            return TickInput::default();
        }

        match session.character().state {
            CharacterState::Grounded if session.accepts_press() => {
                let Some(ideal) = ideal_power(session) else {
                    return TickInput::default();
                };
                let error = if self.jitter > 0.0 {
                    self.rng.random_range(-self.jitter..=self.jitter)
                } else {
                    0.0
                };
                self.goal = Some((ideal + error).clamp(0.0, 1.0));
                TickInput {
                    press: true,
                    ..Default::default()
                }
            }
            CharacterState::Charging => {
                let power = session.charge_power().unwrap_or(0.0);
                let release = self.goal.is_none_or(|goal| power >= goal);
                if release {
                    self.goal = None;
                }
                TickInput {
                    release,
                    ..Default::default()
                }
            }
            _ => TickInput::default(),
        }
    }
}
