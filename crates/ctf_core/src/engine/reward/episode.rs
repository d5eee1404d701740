//! EpisodeMetrics - per-episode statistics for training dashboards.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut metrics = EpisodeMetrics::new(episode);
//! metrics.record_tick(dt);
//! metrics.record_rewards(&deltas, &roster);
//! metrics.set_termination(TerminationReason::PointScored);
//! ```

use serde::{Deserialize, Serialize};

use super::{RewardCause, RewardDelta};
use crate::engine::roster::TeamRoster;
use crate::models::{Team, TerminationReason};

/// Statistics collected over one episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeMetrics {
    pub episode: u32,

    pub total_ticks: u64,

    /// Simulated seconds
    pub elapsed: f32,

    /// Sum of every delta paid to Team A agents
    pub reward_a: f32,

    /// Sum of every delta paid to Team B agents
    pub reward_b: f32,

    pub captures: u32,

    /// Drops caused by opponent collisions
    pub steals: u32,

    /// Generic drops
    pub drops: u32,

    pub respawns: u32,

    pub wall_contacts: u32,

    /// Final score at episode end `(a, b)`
    pub final_score: (u32, u32),

    pub termination_reason: TerminationReason,
}

impl EpisodeMetrics {
    pub fn new(episode: u32) -> Self {
        Self { episode, ..Self::default() }
    }

    pub fn record_tick(&mut self, dt: f32) {
        self.total_ticks += 1;
        self.elapsed += dt;
    }

    /// Fold reward deltas into the team totals and event counters.
    pub fn record_rewards(&mut self, deltas: &[RewardDelta], roster: &TeamRoster) {
        for d in deltas {
            match roster.team_of(d.agent) {
                Ok(Team::A) => self.reward_a += d.delta,
                Ok(Team::B) => self.reward_b += d.delta,
                Err(_) => {}
            }
            match d.cause {
                RewardCause::Capture => self.captures += 1,
                RewardCause::FlagStolen => self.steals += 1,
                RewardCause::WallContact => self.wall_contacts += 1,
                _ => {}
            }
        }
    }

    pub fn record_drop(&mut self) {
        self.drops += 1;
    }

    pub fn record_respawn(&mut self) {
        self.respawns += 1;
    }

    pub fn set_termination(&mut self, reason: TerminationReason, score: (u32, u32)) {
        self.termination_reason = reason;
        self.final_score = score;
    }

    pub fn total_reward(&self) -> f32 {
        self.reward_a + self.reward_b
    }
}
