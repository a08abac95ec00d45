//! Platform Leap headless runner
//!
//! Drives a run at a fixed timestep, either from a replay script or with the
//! autopilot, logs gameplay events and prints a JSON summary.
//!
//! ```text
//! platform-leap [--seed N] [--difficulty easy|normal|hard] [--tuning FILE]
//!               [--replay FILE] [--frames N] [--jitter X]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use serde::Serialize;

use platform_leap::consts::SIM_DT;
use platform_leap::replay::{ReplayInputs, ReplayScript};
use platform_leap::sim::{Autopilot, GameEvent, RunSession, TickInput, tick};
use platform_leap::{Difficulty, Tuning};

#[derive(Debug)]
struct Args {
    seed: u64,
    difficulty: Difficulty,
    tuning: Option<PathBuf>,
    replay: Option<PathBuf>,
    frames: u32,
    jitter: f32,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            seed: 1,
            difficulty: Difficulty::Normal,
            tuning: None,
            replay: None,
            frames: 60 * 60,
            jitter: 0.08,
        }
    }
}

impl Args {
    fn parse(mut it: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut args = Args::default();
        while let Some(flag) = it.next() {
            let mut value = || it.next().ok_or_else(|| format!("{flag} needs a value"));
            match flag.as_str() {
                "--seed" => args.seed = value()?.parse().map_err(|e| format!("--seed: {e}"))?,
                "--difficulty" => {
                    let raw = value()?;
                    args.difficulty = Difficulty::from_str(&raw)
                        .ok_or_else(|| format!("unknown difficulty '{raw}'"))?;
                }
                "--tuning" => args.tuning = Some(PathBuf::from(value()?)),
                "--replay" => args.replay = Some(PathBuf::from(value()?)),
                "--frames" => {
                    args.frames = value()?.parse().map_err(|e| format!("--frames: {e}"))?
                }
                "--jitter" => {
                    let raw = value()?;
                    let jitter: f32 = raw.parse().map_err(|e| format!("--jitter: {e}"))?;
                    if !(0.0..=1.0).contains(&jitter) {
                        return Err(format!("--jitter must be within 0..=1 (got '{raw}')"));
                    }
                    args.jitter = jitter;
                }
                other => return Err(format!("unknown argument '{other}'")),
            }
        }
        Ok(args)
    }
}

#[derive(Debug, Default, Serialize)]
struct RunSummary {
    seed: u64,
    difficulty: &'static str,
    frames: u32,
    jumps: u32,
    score: u32,
    best_score: u32,
    restarts: u32,
    platforms: usize,
    game_over: bool,
}

impl RunSummary {
    fn record(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::Jumped {
                power,
                jump_distance,
            } => {
                self.jumps += 1;
                log::info!("Jump #{}: power {power:.2}, {jump_distance:.2} units", self.jumps);
            }
            GameEvent::LandingSuccess { score, .. } => {
                self.best_score = self.best_score.max(score);
            }
            GameEvent::LandingFailure { fall } => log::info!("Missed! Toppling {fall:?}"),
            GameEvent::GameOver { score } => log::info!("Game over with score {score}"),
            GameEvent::Restarted => self.restarts += 1,
            _ => {}
        }
    }
}

enum Driver {
    Replay(ReplayInputs),
    Autopilot(Autopilot),
}

impl Driver {
    fn next_input(&mut self, session: &RunSession) -> Option<TickInput> {
        match self {
            Driver::Replay(inputs) => inputs.next(),
            Driver::Autopilot(pilot) => Some(pilot.next_input(session)),
        }
    }
}

fn run(args: Args) -> Result<RunSummary, String> {
    let tuning = match &args.tuning {
        Some(path) => Tuning::load_or_preset(path, args.difficulty),
        None => Tuning::from_preset(args.difficulty),
    };

    let (mut driver, seed, dt, frames) = match &args.replay {
        Some(path) => {
            let replay = ReplayScript::load(path).map_err(|e| e.to_string())?;
            let frames = u32::try_from(replay.total_ticks())
                .map_err(|_| format!("{}: replay too long", path.display()))?;
            let (seed, dt) = (replay.seed.unwrap_or(args.seed), replay.fixed_dt);
            log::info!("Replaying {} ({frames} frames)", path.display());
            (Driver::Replay(replay.into_inputs()), seed, dt, frames)
        }
        None => (
            Driver::Autopilot(Autopilot::new(args.seed, args.jitter)),
            args.seed,
            SIM_DT,
            args.frames,
        ),
    };

    let mut session = RunSession::new(seed, tuning);
    let mut summary = RunSummary {
        seed,
        difficulty: args.difficulty.as_str(),
        ..Default::default()
    };

    while summary.frames < frames {
        let Some(input) = driver.next_input(&session) else {
            break;
        };
        tick(&mut session, &input, dt);
        summary.frames += 1;
        for event in session.drain_events() {
            summary.record(&event);
        }
        if session.is_game_over() && matches!(driver, Driver::Autopilot(_)) {
            break;
        }
    }

    summary.score = session.score();
    summary.platforms = session.platforms().len();
    summary.game_over = session.is_game_over();
    Ok(summary)
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Platform Leap (headless) starting...");

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
