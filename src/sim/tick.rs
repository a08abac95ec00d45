//! Frame-driven simulation step
//!
//! Input for a frame is applied first, against the clock as it stood at the
//! end of the previous frame; then the clock advances and everything in
//! flight steps forward by `dt`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::landing::Landing;
use super::state::{CameraShift, CharacterState, GameEvent, JumpAttempt, RunSession};
use super::trajectory::Trajectory;
use crate::consts::GROUND_Y;

/// Input events collected since the previous frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    /// Press started (touch down / mouse down / key down)
    pub press: bool,
    /// Press ended
    pub release: bool,
    /// Throw the run away and start over
    pub restart: bool,
}

/// Advance the session by one frame
pub fn tick(session: &mut RunSession, input: &TickInput, dt: f32) {
    if input.restart {
        session.restart();
        log::info!("Run restarted (seed {})", session.seed);
    }
    if input.press {
        begin_charge(session);
    }
    if input.release {
        launch(session);
    }

    let dt = dt.max(0.0);
    session.clock_ms += dt as f64 * 1000.0;

    let (gravity, restitution) = (session.tuning.gravity, session.tuning.bounce_restitution);
    for platform in &mut session.platforms {
        platform.step_fall(dt, gravity, restitution);
    }

    if let Some(camera) = session.camera.as_mut() {
        camera.elapsed_secs += dt;
        if camera.is_done() {
            session.camera = None;
        }
    }

    match session.character.state {
        CharacterState::Grounded => {}
        CharacterState::Charging => sample_charge(session),
        CharacterState::Airborne => advance_jump(session, dt),
        CharacterState::Toppling => advance_topple(session, dt),
    }
}

fn begin_charge(session: &mut RunSession) {
    if !session.accepts_press() {
        log::trace!("Press ignored in {:?}", session.character.state);
        return;
    }
    if session.charge.press(session.clock_ms) {
        session.character.state = CharacterState::Charging;
    }
}

fn launch(session: &mut RunSession) {
    if session.character.state != CharacterState::Charging {
        return;
    }
    let Some(power) = session.charge.release(session.clock_ms) else {
        return;
    };

    let current = session.character.current_platform_index;
    let target_index = current + 1;
    debug_assert!(
        session.platforms.len() > target_index,
        "jump from platform {current} with no successor"
    );
    let (Some(from), Some(to)) = (
        session.platforms.get(current),
        session.platforms.get(target_index),
    ) else {
        log::error!("No successor for platform {current}; jump dropped");
        session.character.state = CharacterState::Grounded;
        return;
    };

    let trajectory = Trajectory::compute(
        power,
        session.character.position,
        from.surface_center(),
        to.surface_center(),
        &session.tuning,
    );
    log::debug!(
        "Jump: power {:.3}, {:.2} of {:.2} units toward platform {target_index}",
        power,
        trajectory.jump_distance,
        trajectory.platform_distance
    );

    session.events.push(GameEvent::Jumped {
        power,
        jump_distance: trajectory.jump_distance,
    });
    session.character.yaw = trajectory.sample(0.0).yaw;
    session.character.flip = 0.0;
    session.character.state = CharacterState::Airborne;
    session.jump = Some(JumpAttempt {
        power,
        trajectory,
        elapsed_secs: 0.0,
    });
}

fn sample_charge(session: &mut RunSession) {
    if let Some(power) = session.charge.power_at(session.clock_ms) {
        session.events.push(GameEvent::ChargeTick { power });
    }
    if session.charge.take_max_reached(session.clock_ms) {
        session.events.push(GameEvent::MaxChargeReached);
    }
}

fn advance_jump(session: &mut RunSession, dt: f32) {
    let Some(jump) = session.jump.as_mut() else {
        session.character.state = CharacterState::Grounded;
        return;
    };
    jump.elapsed_secs += dt;
    let t = jump.progress();
    let sample = jump.trajectory.sample(t);

    let character = &mut session.character;
    character.position = sample.position;
    character.yaw = sample.yaw;
    character.flip = sample.flip;

    if t >= 1.0 {
        if let Some(jump) = session.jump.take() {
            resolve(session, jump.trajectory);
        }
    }
}

fn resolve(session: &mut RunSession, trajectory: Trajectory) {
    let target_index = session.target_platform_index();
    let landing_at = trajectory.target;
    let landing = session.judge.judge(
        landing_at,
        &session.platforms,
        target_index,
        trajectory.travel,
    );

    match landing {
        Landing::Landed {
            platform_index,
            surface_y,
        } => {
            let previous = session.platforms[session.character.current_platform_index].position;
            let character = &mut session.character;
            character.position = Vec3::new(landing_at.x, surface_y, landing_at.z);
            character.state = CharacterState::Grounded;
            character.flip = 0.0;
            character.current_platform_index = platform_index;

            let advanced = platform_index == target_index;
            if advanced {
                session.score += 1;
                spawn_next(session);

                let landed = session.platforms[platform_index].position;
                let delta = Vec3::new(landed.x - previous.x, 0.0, landed.z - previous.z);
                let shift = CameraShift::new(delta, session.tuning.camera_secs_per_unit);
                session.events.push(GameEvent::CameraShift {
                    delta,
                    duration_secs: shift.duration_secs,
                });
                session.camera = Some(shift);
            }

            log::debug!(
                "Landed on platform {platform_index} (score {}, advanced {advanced})",
                session.score
            );
            session.events.push(GameEvent::LandingSuccess {
                platform_index,
                score: session.score,
                advanced,
            });
        }
        Landing::Missed { fall } => {
            let character = &mut session.character;
            character.position = Vec3::new(landing_at.x, GROUND_Y, landing_at.z);
            character.state = CharacterState::Toppling;
            character.fall_direction = Some(fall);
            session.topple_elapsed = 0.0;

            log::debug!("Missed platform {target_index}, toppling {fall:?}");
            session.events.push(GameEvent::LandingFailure { fall });
        }
    }
}

/// Keep one platform ahead of the character
fn spawn_next(session: &mut RunSession) {
    if let Some(last) = session.platforms.last() {
        let next = session.generator.generate_next(last, &mut session.rng);
        session.platforms.push(next);
        session.events.push(GameEvent::PlatformSpawned {
            index: session.platforms.len() - 1,
        });
    }
}

fn advance_topple(session: &mut RunSession, dt: f32) {
    if session.game_over {
        return;
    }
    session.topple_elapsed += dt;
    if session.topple_elapsed >= session.tuning.topple_delay_secs {
        session.game_over = true;
        log::info!("Game over (score {})", session.score);
        session.events.push(GameEvent::GameOver {
            score: session.score,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::landing::FallDirection;
    use crate::sim::state::{Footprint, Platform};
    use crate::tuning::Tuning;

    const PRESS: TickInput = TickInput {
        press: true,
        release: false,
        restart: false,
    };
    const RELEASE: TickInput = TickInput {
        press: false,
        release: true,
        restart: false,
    };
    const TAP: TickInput = TickInput {
        press: true,
        release: true,
        restart: false,
    };
    const IDLE: TickInput = TickInput {
        press: false,
        release: false,
        restart: false,
    };

    fn five_ahead() -> RunSession {
        let tuning = Tuning::default();
        let start = Platform::start(&tuning);
        let next = Platform::resting_at(Vec3::new(0.0, 0.0, -5.0), Footprint::new(2.4, 2.6), &tuning);
        RunSession::from_layout(1, tuning, start, next)
    }

    fn fly(session: &mut RunSession) {
        for _ in 0..200 {
            if session.character().state != CharacterState::Airborne {
                return;
            }
            tick(session, &IDLE, SIM_DT);
        }
        panic!("jump never resolved");
    }

    #[test]
    fn test_matched_power_lands_on_center() {
        let mut session = five_ahead();
        tick(&mut session, &PRESS, 0.75);
        assert_eq!(session.character().state, CharacterState::Charging);
        tick(&mut session, &RELEASE, 0.0);
        assert_eq!(session.character().state, CharacterState::Airborne);
        fly(&mut session);

        assert_eq!(session.character().state, CharacterState::Grounded);
        assert_eq!(session.score(), 1);
        assert_eq!(session.current_platform_index(), 1);
        assert_eq!(session.target_platform_index(), 2);
        assert_eq!(session.platforms().len(), 3);
        assert_eq!(session.character().position, Vec3::new(0.0, 1.0, -5.0));

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::Jumped {
            power: 0.5,
            jump_distance: 5.0
        }));
        assert!(events.contains(&GameEvent::PlatformSpawned { index: 2 }));
        assert!(events.contains(&GameEvent::LandingSuccess {
            platform_index: 1,
            score: 1,
            advanced: true
        }));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::CameraShift { delta, .. } if *delta == Vec3::new(0.0, 0.0, -5.0)
        )));
    }

    #[test]
    fn test_undershoot_topples_back_then_game_over() {
        let mut session = five_ahead();
        tick(&mut session, &TAP, SIM_DT);
        fly(&mut session);

        let character = session.character();
        assert_eq!(character.state, CharacterState::Toppling);
        assert_eq!(character.fall_direction, Some(FallDirection::PosZ));
        assert_eq!(character.position.y, GROUND_Y);
        assert!((character.position.z + 2.5).abs() < 1e-5);
        assert!(!session.is_game_over());

        let delay_ticks = (session.tuning().topple_delay_secs / SIM_DT).ceil() as usize + 1;
        for _ in 0..delay_ticks {
            tick(&mut session, &IDLE, SIM_DT);
        }
        assert!(session.is_game_over());
        assert_eq!(session.score(), 0);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::LandingFailure {
            fall: FallDirection::PosZ
        }));
        assert_eq!(
            events.iter().filter(|e| matches!(e, GameEvent::GameOver { .. })).count(),
            1
        );
    }

    #[test]
    fn test_long_hold_clamps_to_full_power() {
        let mut session = five_ahead();
        tick(&mut session, &PRESS, 0.0);
        tick(&mut session, &IDLE, 2.0);
        tick(&mut session, &RELEASE, 0.0);

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::MaxChargeReached));
        assert!(events.contains(&GameEvent::Jumped {
            power: 1.0,
            jump_distance: 7.5
        }));
    }

    #[test]
    fn test_charge_ticks_match_live_power() {
        let mut session = five_ahead();
        tick(&mut session, &PRESS, SIM_DT);
        for _ in 0..10 {
            tick(&mut session, &IDLE, SIM_DT);
            let live = session.charge_power();
            let last_tick = session
                .drain_events()
                .into_iter()
                .rev()
                .find_map(|e| match e {
                    GameEvent::ChargeTick { power } => Some(power),
                    _ => None,
                });
            assert_eq!(last_tick, live);
        }
    }

    #[test]
    fn test_input_ignored_while_airborne() {
        let mut session = five_ahead();
        tick(&mut session, &PRESS, 0.75);
        tick(&mut session, &RELEASE, SIM_DT);
        let before = session.jump().cloned().map(|j| j.trajectory);

        tick(&mut session, &TAP, SIM_DT);
        assert_eq!(session.character().state, CharacterState::Airborne);
        assert_eq!(session.jump().map(|j| j.trajectory.clone()), before);
    }

    #[test]
    fn test_release_without_press_is_noop() {
        let mut session = five_ahead();
        tick(&mut session, &RELEASE, SIM_DT);
        assert_eq!(session.character().state, CharacterState::Grounded);
        assert!(session.jump().is_none());
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_press_waits_for_camera_shift() {
        let mut session = five_ahead();
        tick(&mut session, &PRESS, 0.75);
        tick(&mut session, &RELEASE, 0.0);
        fly(&mut session);
        assert!(session.camera_shift().is_some());

        tick(&mut session, &PRESS, SIM_DT);
        assert_eq!(session.character().state, CharacterState::Grounded);

        for _ in 0..60 {
            tick(&mut session, &IDLE, SIM_DT);
        }
        assert!(session.camera_shift().is_none());
        tick(&mut session, &PRESS, SIM_DT);
        assert_eq!(session.character().state, CharacterState::Charging);
    }

    #[test]
    fn test_game_over_freezes_position_and_score() {
        let mut session = five_ahead();
        tick(&mut session, &TAP, SIM_DT);
        fly(&mut session);
        for _ in 0..120 {
            tick(&mut session, &IDLE, SIM_DT);
        }
        assert!(session.is_game_over());

        let position = session.character().position;
        for input in [PRESS, RELEASE, TAP, IDLE] {
            tick(&mut session, &input, SIM_DT);
            assert!(session.is_game_over());
            assert_eq!(session.character().position, position);
            assert_eq!(session.score(), 0);
        }
    }

    #[test]
    fn test_input_ignored_while_toppling() {
        let mut session = five_ahead();
        tick(&mut session, &TAP, SIM_DT);
        fly(&mut session);
        assert_eq!(session.character().state, CharacterState::Toppling);
        session.drain_events();

        let position = session.character().position;
        for input in [PRESS, IDLE, RELEASE, TAP] {
            tick(&mut session, &input, SIM_DT);
            assert!(!session.is_game_over());
            assert_eq!(session.character().state, CharacterState::Toppling);
            assert_eq!(session.character().position, position);
            assert_eq!(session.score(), 0);
            assert!(session.jump().is_none());
        }
        let events = session.drain_events();
        assert!(!events.iter().any(|e| matches!(
            e,
            GameEvent::ChargeTick { .. } | GameEvent::Jumped { .. }
        )));
    }

    /// Hold for 800 ms and release at the given frame length
    fn hold_and_land(dt: f32) -> (u32, Vec3, bool) {
        let mut session = five_ahead();
        let frames = (0.8 / dt).round() as usize;
        tick(&mut session, &PRESS, dt);
        for _ in 1..frames {
            tick(&mut session, &IDLE, dt);
        }
        tick(&mut session, &RELEASE, dt);
        for _ in 0..1000 {
            if session.character().state != CharacterState::Airborne {
                break;
            }
            tick(&mut session, &IDLE, dt);
        }
        (session.score(), session.character().position, session.is_game_over())
    }

    #[test]
    fn test_outcome_independent_of_frame_rate() {
        let (score_30, at_30, over_30) = hold_and_land(1.0 / 30.0);
        let (score_120, at_120, over_120) = hold_and_land(1.0 / 120.0);

        assert_eq!(score_30, 1);
        assert_eq!(score_30, score_120);
        assert_eq!(over_30, over_120);
        assert!(at_30.distance(at_120) < 1e-4, "{at_30} vs {at_120}");
        // 800 ms of 1500 ms gives 5 * (0.5 + 0.8 / 1.5)
        assert!((at_30.z + 5.0 * (0.5 + 0.8 / 1.5)).abs() < 1e-3, "{at_30}");
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut session = five_ahead();
        tick(&mut session, &TAP, SIM_DT);
        fly(&mut session);
        for _ in 0..120 {
            tick(&mut session, &IDLE, SIM_DT);
        }
        assert!(session.is_game_over());

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut session, &restart, SIM_DT);
        assert!(!session.is_game_over());
        assert_eq!(session.character().state, CharacterState::Grounded);
        assert_eq!(session.platforms().len(), 2);
        assert_eq!(session.platforms()[0].position, Vec3::ZERO);
        assert!(session.drain_events().contains(&GameEvent::Restarted));
    }

    #[test]
    fn test_short_hop_back_onto_same_platform() {
        let tuning = Tuning::default();
        let start = Platform::start(&tuning);
        // A target so close that the minimum jump stays on the start platform
        let next = Platform::resting_at(Vec3::new(0.0, 0.0, -2.0), Footprint::square(1.0), &tuning);
        let mut session = RunSession::from_layout(1, tuning, start, next);

        tick(&mut session, &TAP, SIM_DT);
        fly(&mut session);
        assert_eq!(session.character().state, CharacterState::Grounded);
        assert_eq!(session.current_platform_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.platforms().len(), 2);
    }

    #[test]
    fn test_determinism() {
        let mut a = RunSession::new(4242, Tuning::default());
        let mut b = RunSession::new(4242, Tuning::default());
        let inputs = [PRESS, IDLE, IDLE, RELEASE, IDLE, IDLE];

        for _ in 0..40 {
            for input in &inputs {
                tick(&mut a, input, SIM_DT);
                tick(&mut b, input, SIM_DT);
            }
        }

        assert_eq!(a.score(), b.score());
        assert_eq!(a.platforms().len(), b.platforms().len());
        assert_eq!(a.character().position, b.character().position);
        assert_eq!(a.drain_events(), b.drain_events());
    }
}
