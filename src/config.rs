//! Window constants and the tuning file
//!
//! Every number that shapes how the balloon moves or blinks lives in
//! [`Tuning`]. The defaults reproduce the classic feel; a JSON file can
//! override any subset of them.

use std::path::Path;

use ggez::{GameError, GameResult};
use serde::Deserialize;

pub const SCREEN_WIDTH: f32 = 800.0;
pub const SCREEN_HEIGHT: f32 = 600.0;
pub const TARGET_FPS: u32 = 60;
/// Length of one simulation frame in seconds
pub const FRAME_DT: f32 = 1.0 / TARGET_FPS as f32;

/// Largest edge the balloon may have, upgrades included
pub const MAX_BALLOON_SIZE: f32 = SCREEN_HEIGHT / 2.0;

pub const WINDOW_TITLE: &str = "Keep Up: The Diagonal Balloon";
pub const CONFIG_ENV: &str = "KEEP_UP_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "keep_up.json";

/// Motion constants, in pixels per frame
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Physics {
    /// Downward acceleration added to vy every frame
    pub gravity: f32,
    /// Vertical speed set by a click (negative is up)
    pub impulse: f32,
    /// Maximum falling speed
    pub terminal_velocity: f32,
    /// Per-frame multiplier on vx
    pub friction: f32,
    /// Largest sideways kick a click can add
    pub max_deflection: f32,
    /// Fraction of vx kept when bouncing off a wall
    pub wall_restitution: f32,
    /// Balloon edge length before size upgrades
    pub base_size: f32,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            gravity: 0.1,
            impulse: -15.0,
            terminal_velocity: 5.0,
            friction: 0.995,
            max_deflection: 3.0,
            wall_restitution: 0.8,
            base_size: 100.0,
        }
    }
}

/// How long each visual state is held, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Blink {
    pub open: f32,
    pub intermediate: f32,
    pub closed: f32,
    pub clicked: f32,
}

impl Default for Blink {
    fn default() -> Self {
        Self {
            open: 3.0,
            intermediate: 0.12,
            closed: 0.4,
            clicked: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: Physics,
    pub blink: Blink,
}

impl Tuning {
    pub fn from_json(json: &str) -> GameResult<Self> {
        let tuning: Self = serde_json::from_str(json)
            .map_err(|e| GameError::ConfigError(format!("invalid tuning file: {}", e)))?;
        tuning.validate()?;
        Ok(tuning)
    }

    // NaN fails every range check below
    fn validate(&self) -> GameResult {
        let p = &self.physics;
        let b = &self.blink;
        let checks = [
            ("physics.base_size", p.base_size > 0.0 && p.base_size <= MAX_BALLOON_SIZE),
            ("physics.friction", (0.0..=1.0).contains(&p.friction)),
            ("physics.wall_restitution", (0.0..=1.0).contains(&p.wall_restitution)),
            ("physics.gravity", p.gravity >= 0.0),
            ("physics.terminal_velocity", p.terminal_velocity >= 0.0),
            ("physics.max_deflection", p.max_deflection >= 0.0),
            ("physics.impulse", p.impulse.is_finite()),
            ("blink.open", b.open >= 0.0),
            ("blink.intermediate", b.intermediate >= 0.0),
            ("blink.closed", b.closed >= 0.0),
            ("blink.clicked", b.clicked >= 0.0),
        ];
        match checks.iter().find(|(_, ok)| !ok) {
            Some((field, _)) => Err(GameError::ConfigError(format!(
                "invalid tuning file: {} is out of range",
                field
            ))),
            None => Ok(()),
        }
    }

    /// Read tuning from `path`. A missing file is not an error.
    pub fn load(path: &Path) -> GameResult<Self> {
        if !path.exists() {
            log::info!("No tuning file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path).map_err(|e| {
            GameError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Path from `KEEP_UP_CONFIG`, or `keep_up.json` in the working directory
    pub fn config_path() -> std::path::PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(Into::into)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.into())
    }
}
