//! Scripted input sequences
//!
//! A replay is a JSON list of frames at a fixed timestep. Each frame may repeat
//! for several ticks, so "hold for 45 frames" is a single entry.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::TickInput;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    /// Overrides the runner's seed when present
    #[serde(default)]
    pub seed: Option<u64>,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayFrame {
    #[serde(default)]
    pub press: bool,
    #[serde(default)]
    pub release: bool,
    #[serde(default)]
    pub restart: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

/// Longest replay the runner accepts, in ticks
pub const MAX_REPLAY_TICKS: u64 = u32::MAX as u64;

impl ReplayScript {
    /// Ticks the script lasts once every frame's `repeat` is applied
    pub fn total_ticks(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.repeat.max(1))).sum()
    }

    /// One `TickInput` per tick, produced lazily. Events fire on the first
    /// tick of a repeated frame only; the rest are idle.
    pub fn into_inputs(self) -> ReplayInputs {
        ReplayInputs {
            frames: self.frames.into_iter(),
            idle_left: 0,
        }
    }

    pub fn from_json(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let replay: ReplayScript = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        replay.validate()?;
        Ok(replay)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw, path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_dt > 0.0) {
            return Err(ConfigError::invalid("replay", "fixed_dt must be > 0"));
        }
        if self.frames.is_empty() {
            return Err(ConfigError::invalid("replay", "frames list is empty"));
        }
        let ticks = self.total_ticks();
        if ticks > MAX_REPLAY_TICKS {
            return Err(ConfigError::invalid(
                "replay",
                format!("{ticks} ticks exceeds the limit of {MAX_REPLAY_TICKS}"),
            ));
        }
        Ok(())
    }
}

/// Iterator over a replay's per-tick inputs
#[derive(Debug, Clone)]
pub struct ReplayInputs {
    frames: std::vec::IntoIter<ReplayFrame>,
    /// Idle ticks still owed by the current frame
    idle_left: u32,
}

impl Iterator for ReplayInputs {
    type Item = TickInput;

    fn next(&mut self) -> Option<TickInput> {
        if self.idle_left > 0 {
            self.idle_left -= 1;
            return Some(TickInput::default());
        }
        let frame = self.frames.next()?;
        self.idle_left = frame.repeat.max(1) - 1;
        Some(TickInput {
            press: frame.press,
            release: frame.release,
            restart: frame.restart,
        })
    }
}

const fn default_dt() -> f32 {
    crate::consts::SIM_DT
}

const fn default_repeat() -> u32 {
    1
}
