//! Reward table constants.
//!
//! | Event | Agent | Teammates | Opponents |
//! |-------|-------|-----------|-----------|
//! | Capture | +0.5 | +0.2 | -0.2 |
//! | Score (asymmetric) | +3.0 | +2.0 | -1.0 |
//! | Steal | carrier -1.0 | | stealer +1.5 |
//! | Drop broadcast | -0.1 everyone | | |
//! | Timeout | -0.1 everyone | | |
//!
//! Dense terms: step efficiency `-0.01/s`, approach flag `+0.001`,
//! carry home up to `+0.002`, wall contact `-0.05` per tick.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SetupError;

/// Rewards for a successful capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureRewards {
    pub capturer: f32,
    pub teammate: f32,
    pub opponent: f32,
}

impl Default for CaptureRewards {
    fn default() -> Self {
        Self { capturer: 0.5, teammate: 0.2, opponent: -0.2 }
    }
}

/// Rewards for a score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreRewards {
    pub scorer: f32,
    pub teammate: f32,
    pub opponent: f32,
}

impl Default for ScoreRewards {
    fn default() -> Self {
        Self::asymmetric()
    }
}

impl ScoreRewards {
    /// Scorer gets a premium over the rest of the team.
    pub fn asymmetric() -> Self {
        Self { scorer: 3.0, teammate: 2.0, opponent: -1.0 }
    }

    /// Whole team rewarded equally.
    pub fn flat() -> Self {
        Self { scorer: 2.0, teammate: 2.0, opponent: -1.0 }
    }

    /// Large scorer bonus, small team share.
    pub fn prototype() -> Self {
        Self { scorer: 5.0, teammate: 1.0, opponent: -1.0 }
    }
}

/// Named score scales, selectable from config files and `CTF_SCORE_SCALE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    #[default]
    Asymmetric,
    Flat,
    Prototype,
}

impl ScoreScale {
    pub fn rewards(self) -> ScoreRewards {
        match self {
            ScoreScale::Asymmetric => ScoreRewards::asymmetric(),
            ScoreScale::Flat => ScoreRewards::flat(),
            ScoreScale::Prototype => ScoreRewards::prototype(),
        }
    }
}

impl FromStr for ScoreScale {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asymmetric" | "default" => Ok(ScoreScale::Asymmetric),
            "flat" => Ok(ScoreScale::Flat),
            "prototype" => Ok(ScoreScale::Prototype),
            other => Err(SetupError::InvalidConfig(format!("unknown score scale '{}'", other))),
        }
    }
}

/// Rewards when an opponent knocks the flag loose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StealRewards {
    pub carrier: f32,
    pub stealer: f32,
}

impl Default for StealRewards {
    fn default() -> Self {
        Self { carrier: -1.0, stealer: 1.5 }
    }
}

/// Full reward table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub capture: CaptureRewards,
    pub score: ScoreRewards,
    pub steal: StealRewards,
    /// Applied to every agent on a generic drop broadcast
    pub drop_broadcast: f32,
    /// Applied to every agent when the episode times out
    pub timeout: f32,
    /// Per tick of sustained wall contact
    pub wall_contact: f32,
    /// Multiplied by seconds since the agent's previous step
    pub step_penalty_per_second: f32,
    /// Paid when the distance to the flag strictly decreased
    pub approach_flag: f32,
    /// Maximum carry-home bonus (at distance 0)
    pub carry_home_max: f32,
    /// Distance at which the carry-home bonus reaches 0
    pub carry_home_max_distance: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            capture: CaptureRewards::default(),
            score: ScoreRewards::default(),
            steal: StealRewards::default(),
            drop_broadcast: -0.1,
            timeout: -0.1,
            wall_contact: -0.05,
            step_penalty_per_second: 0.01,
            approach_flag: 0.001,
            carry_home_max: 0.002,
            carry_home_max_distance: 20.0,
        }
    }
}

impl RewardConfig {
    /// Doubled wall penalty.
    pub fn strict_walls() -> Self {
        Self { wall_contact: -0.1, ..Self::default() }
    }

    pub fn with_score_scale(mut self, scale: ScoreScale) -> Self {
        self.score = scale.rewards();
        self
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        let values = [
            ("capture.capturer", self.capture.capturer),
            ("capture.teammate", self.capture.teammate),
            ("capture.opponent", self.capture.opponent),
            ("score.scorer", self.score.scorer),
            ("score.teammate", self.score.teammate),
            ("score.opponent", self.score.opponent),
            ("steal.carrier", self.steal.carrier),
            ("steal.stealer", self.steal.stealer),
            ("drop_broadcast", self.drop_broadcast),
            ("timeout", self.timeout),
            ("wall_contact", self.wall_contact),
            ("step_penalty_per_second", self.step_penalty_per_second),
            ("approach_flag", self.approach_flag),
            ("carry_home_max", self.carry_home_max),
        ];
        if let Some((name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SetupError::InvalidConfig(format!("reward {} must be finite", name)));
        }
        if !(self.carry_home_max_distance.is_finite() && self.carry_home_max_distance > 0.0) {
            return Err(SetupError::InvalidConfig(
                "carry_home_max_distance must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
