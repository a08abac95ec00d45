//! Run state and core simulation types
//!
//! `RunSession` owns everything a single run needs. There is no global engine;
//! callers hold the sessions they create.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::charge::ChargeController;
use super::landing::{FallDirection, LandingJudge};
use super::platform::{PlatformGenerator, PlatformVisual};
use super::trajectory::Trajectory;
use crate::consts::GROUND_Y;
use crate::horizontal;
use crate::tuning::Tuning;

/// Horizontal landing surface size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Extent along x
    pub width: f32,
    /// Extent along z
    pub depth: f32,
}

impl Footprint {
    pub fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    pub fn square(size: f32) -> Self {
        Self::new(size, size)
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    #[inline]
    pub fn half_depth(&self) -> f32 {
        self.depth / 2.0
    }
}

/// Drop-in animation state of a platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FallState {
    /// Settled on the ground plane
    Resting,
    /// Dropping in under gravity (velocity is negative when moving down)
    Falling { velocity: f32, bounced: bool },
}

/// A platform the character can land on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    /// Base center; y is height above the ground plane
    pub position: Vec3,
    pub footprint: Footprint,
    /// Vertical thickness
    pub height: f32,
    pub is_start: bool,
    pub fall: FallState,
    /// Cosmetic only, never used for collision
    pub visual: PlatformVisual,
}

impl Platform {
    /// The start platform: at the origin, resting, fixed footprint
    pub fn start(tuning: &Tuning) -> Self {
        Self {
            position: Vec3::ZERO,
            footprint: Footprint::square(tuning.start_footprint),
            height: tuning.platform_height,
            is_start: true,
            fall: FallState::Resting,
            visual: PlatformVisual::START,
        }
    }

    /// A resting platform at a fixed spot (for scripted layouts)
    pub fn resting_at(position: Vec3, footprint: Footprint, tuning: &Tuning) -> Self {
        Self {
            position: Vec3::new(position.x, GROUND_Y, position.z),
            footprint,
            height: tuning.platform_height,
            is_start: false,
            fall: FallState::Resting,
            visual: PlatformVisual::default(),
        }
    }

    /// Top surface height once settled
    #[inline]
    pub fn rest_top(&self) -> f32 {
        GROUND_Y + self.height
    }

    /// Center of the settled landing surface
    pub fn surface_center(&self) -> Vec3 {
        Vec3::new(self.position.x, self.rest_top(), self.position.z)
    }

    pub fn is_resting(&self) -> bool {
        self.fall == FallState::Resting
    }

    /// Inclusive horizontal bounds test with `tolerance` added to every edge
    pub fn contains(&self, point: Vec3, tolerance: f32) -> bool {
        let d = (horizontal(point) - horizontal(self.position)).abs();
        d.x <= self.footprint.half_width() + tolerance && d.y <= self.footprint.half_depth() + tolerance
    }

    /// Advance the drop-in: constant gravity, one damped bounce, settle at ground
    pub fn step_fall(&mut self, dt: f32, gravity: f32, restitution: f32) {
        let FallState::Falling {
            mut velocity,
            mut bounced,
        } = self.fall
        else {
            return;
        };

        velocity -= gravity * dt;
        self.position.y += velocity * dt;

        if self.position.y <= GROUND_Y && velocity < 0.0 {
            self.position.y = GROUND_Y;
            let rebound = -velocity * restitution;
            // Second impact (or a bounce too small to see) settles
            if bounced || rebound < 0.01 {
                self.fall = FallState::Resting;
                return;
            }
            velocity = rebound;
            bounced = true;
        }

        self.fall = FallState::Falling { velocity, bounced };
    }
}

/// What the character is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterState {
    /// Standing on a platform, accepting input
    Grounded,
    /// Press held, power building
    Charging,
    /// Jump in flight, input ignored
    Airborne,
    /// Missed a landing; terminal until restart
    Toppling,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub position: Vec3,
    pub state: CharacterState,
    pub current_platform_index: usize,
    /// Facing (radians around +y)
    pub yaw: f32,
    /// Somersault angle during a jump (presentation only)
    pub flip: f32,
    /// Set once a landing is missed
    pub fall_direction: Option<FallDirection>,
}

impl Character {
    fn on(platform: &Platform) -> Self {
        Self {
            position: platform.surface_center(),
            state: CharacterState::Grounded,
            current_platform_index: 0,
            yaw: 0.0,
            flip: 0.0,
            fall_direction: None,
        }
    }
}

/// Camera/ground transition started by a successful landing.
///
/// The core only tracks its timing; an external follower animates by `offset()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraShift {
    /// Horizontal delta between old and new platform centers
    pub delta: Vec3,
    pub duration_secs: f32,
    pub elapsed_secs: f32,
}

impl CameraShift {
    pub fn new(delta: Vec3, secs_per_unit: f32) -> Self {
        Self {
            delta,
            duration_secs: delta.length() * secs_per_unit,
            elapsed_secs: 0.0,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration_secs <= 0.0 {
            1.0
        } else {
            (self.elapsed_secs / self.duration_secs).min(1.0)
        }
    }

    /// Portion of `delta` covered so far
    pub fn offset(&self) -> Vec3 {
        self.delta * self.progress()
    }

    pub fn is_done(&self) -> bool {
        self.progress() >= 1.0
    }
}

/// Discrete events for audio/particle feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Power while a press is held (emitted every frame)
    ChargeTick { power: f32 },
    /// Power first hit 1.0 during this press
    MaxChargeReached,
    Jumped { power: f32, jump_distance: f32 },
    /// `advanced` is false when the character came down on the platform it left
    LandingSuccess {
        platform_index: usize,
        score: u32,
        advanced: bool,
    },
    LandingFailure { fall: FallDirection },
    PlatformSpawned { index: usize },
    CameraShift { delta: Vec3, duration_secs: f32 },
    GameOver { score: u32 },
    Restarted,
}

/// A jump in flight
#[derive(Debug, Clone)]
pub struct JumpAttempt {
    pub power: f32,
    pub trajectory: Trajectory,
    pub elapsed_secs: f32,
}

impl JumpAttempt {
    /// Normalized flight progress in [0, 1]
    pub fn progress(&self) -> f32 {
        (self.elapsed_secs / self.trajectory.duration).min(1.0)
    }
}

/// One run of the game
#[derive(Debug, Clone)]
pub struct RunSession {
    pub(crate) seed: u64,
    pub(crate) tuning: Tuning,
    pub(crate) rng: Pcg32,
    pub(crate) generator: PlatformGenerator,
    pub(crate) judge: LandingJudge,
    pub(crate) charge: ChargeController,
    pub(crate) platforms: Vec<Platform>,
    pub(crate) character: Character,
    pub(crate) jump: Option<JumpAttempt>,
    pub(crate) camera: Option<CameraShift>,
    pub(crate) score: u32,
    pub(crate) game_over: bool,
    pub(crate) topple_elapsed: f32,
    /// Session clock (milliseconds of simulated time)
    pub(crate) clock_ms: f64,
    pub(crate) events: Vec<GameEvent>,
}

impl RunSession {
    /// Start a run: start platform at the origin plus one generated successor.
    ///
    /// `tuning` must pass [`Tuning::validate`]; empty generation ranges panic.
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        debug_assert_valid(&tuning);
        let mut rng = Pcg32::seed_from_u64(seed);
        let generator = PlatformGenerator::new(&tuning);
        let start = Platform::start(&tuning);
        let next = generator.generate_next(&start, &mut rng);
        log::info!("Run started (seed {seed})");
        Self::assemble(seed, tuning, rng, generator, vec![start, next])
    }

    /// Start a run on a fixed two-platform layout; later platforms are generated.
    /// Same `tuning` precondition as [`RunSession::new`].
    pub fn from_layout(seed: u64, tuning: Tuning, start: Platform, next: Platform) -> Self {
        debug_assert_valid(&tuning);
        let rng = Pcg32::seed_from_u64(seed);
        let generator = PlatformGenerator::new(&tuning);
        Self::assemble(seed, tuning, rng, generator, vec![start, next])
    }

    fn assemble(
        seed: u64,
        tuning: Tuning,
        rng: Pcg32,
        generator: PlatformGenerator,
        platforms: Vec<Platform>,
    ) -> Self {
        let character = Character::on(&platforms[0]);
        Self {
            seed,
            judge: LandingJudge::new(tuning.landing_tolerance),
            charge: ChargeController::new(tuning.max_press_ms),
            tuning,
            rng,
            generator,
            platforms,
            character,
            jump: None,
            camera: None,
            score: 0,
            game_over: false,
            topple_elapsed: 0.0,
            clock_ms: 0.0,
            events: Vec::new(),
        }
    }

    /// Reinitialize to a fresh run with the same seed and tuning
    pub fn restart(&mut self) {
        let tuning = self.tuning.clone();
        *self = Self::new(self.seed, tuning);
        self.events.push(GameEvent::Restarted);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn current_platform_index(&self) -> usize {
        self.character.current_platform_index
    }

    pub fn target_platform_index(&self) -> usize {
        self.character.current_platform_index + 1
    }

    /// The jump in flight, if any
    pub fn jump(&self) -> Option<&JumpAttempt> {
        self.jump.as_ref()
    }

    /// The camera/ground transition in progress, if any
    pub fn camera_shift(&self) -> Option<&CameraShift> {
        self.camera.as_ref()
    }

    /// Power the current press would release with right now
    pub fn charge_power(&self) -> Option<f32> {
        self.charge.power_at(self.clock_ms)
    }

    /// Simulated time since the run began (milliseconds)
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Whether a press would start charging right now
    pub fn accepts_press(&self) -> bool {
        !self.game_over
            && self.character.state == CharacterState::Grounded
            && self.camera.is_none_or(|c| c.is_done())
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

fn debug_assert_valid(tuning: &Tuning) {
    if cfg!(debug_assertions) {
        if let Err(err) = tuning.validate() {
            panic!("RunSession needs validated tuning: {err}");
        }
    }
}
