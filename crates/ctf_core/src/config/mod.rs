//! # Match Configuration
//!
//! Immutable configuration handed to the controller at construction.
//! Every field has a default; `validate()` runs before a controller exists.
//!
//! ## Usage
//! ```rust
//! use ctf_core::config::{MatchConfig, ScoreScale};
//!
//! let config = MatchConfig::default();
//! let flat = MatchConfig::default().with_score_scale(ScoreScale::Flat);
//! assert!(flat.validate().is_ok());
//! ```
//!
//! ## Environment Variables
//!
//! - `CTF_SCORE_SCALE`: score reward preset (asymmetric, flat, prototype)

mod reward_config;

pub use reward_config::{CaptureRewards, RewardConfig, ScoreRewards, ScoreScale, StealRewards};

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{Result, SetupError};
use crate::models::ArenaBounds;

/// Environment variable selecting the score reward preset.
pub const SCORE_SCALE_ENV: &str = "CTF_SCORE_SCALE";

/// What happens to the flag after an opponent knocks it loose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DropRespawn {
    /// Flag stays dropped for `respawn_delay` seconds, then respawns.
    #[default]
    Timed,
    /// Flag returns to its spawn immediately.
    Immediate,
}

/// Match-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Episode length in seconds
    pub episode_timeout: f32,
    /// Score that completes the match
    pub max_score: u32,
    /// Seconds a dropped flag stays uncollectable
    pub respawn_delay: f32,
    /// Opponent collisions a carrier absorbs before dropping the flag
    pub max_collisions_before_drop: u32,
    /// Seconds between episode end and the next episode start
    pub reset_delay: f32,
    /// Upper bound on agents per team
    pub team_size: usize,
    pub drop_respawn: DropRespawn,
    pub arena: ArenaBounds,
    pub rewards: RewardConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            episode_timeout: 300.0,
            max_score: 10,
            respawn_delay: 5.0,
            max_collisions_before_drop: 2,
            reset_delay: 2.0,
            team_size: 3,
            drop_respawn: DropRespawn::Timed,
            arena: ArenaBounds::default(),
            rewards: RewardConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Training defaults.
    pub fn training() -> Self {
        Self::default()
    }

    /// Short episodes and instant restarts, for smoke tests and demos.
    pub fn quick() -> Self {
        Self {
            episode_timeout: 30.0,
            max_score: 3,
            respawn_delay: 1.0,
            reset_delay: 0.0,
            ..Self::default()
        }
    }

    pub fn with_score_scale(mut self, scale: ScoreScale) -> Self {
        self.rewards = self.rewards.with_score_scale(scale);
        self
    }

    /// Defaults, with the score preset taken from `CTF_SCORE_SCALE` when set.
    pub fn from_env_or_default() -> Self {
        match env::var(SCORE_SCALE_ENV) {
            Ok(value) => match value.parse::<ScoreScale>() {
                Ok(scale) => Self::default().with_score_scale(scale),
                Err(err) => {
                    tracing::warn!(%err, "ignoring {}", SCORE_SCALE_ENV);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), SetupError> {
        fn invalid(msg: &str) -> SetupError {
            SetupError::InvalidConfig(msg.to_string())
        }

        if !(self.episode_timeout.is_finite() && self.episode_timeout > 0.0) {
            return Err(invalid("episode_timeout must be positive"));
        }
        if self.max_score == 0 {
            return Err(invalid("max_score must be at least 1"));
        }
        if !(self.respawn_delay.is_finite() && self.respawn_delay >= 0.0) {
            return Err(invalid("respawn_delay must be non-negative"));
        }
        if !(self.reset_delay.is_finite() && self.reset_delay >= 0.0) {
            return Err(invalid("reset_delay must be non-negative"));
        }
        if self.max_collisions_before_drop == 0 {
            return Err(invalid("max_collisions_before_drop must be at least 1"));
        }
        if self.team_size == 0 {
            return Err(invalid("team_size must be at least 1"));
        }
        if !self.arena.is_well_formed() {
            return Err(invalid("arena bounds are empty"));
        }
        self.rewards.validate()
    }
}

// ========== Tests ==========
