//! RewardDispatcher - game events to per-agent reward deltas.
//!
//! ## Components
//!
//! - `RewardDispatcher`: sparse event rewards (capture, score, steal, drop,
//!   timeout, wall) plus the dense `ShapingSet`
//! - `ShapingTerm` trait: dense per-step terms (`StepEfficiency`,
//!   `ApproachFlag`, `CarryHome`)
//! - `EpisodeMetrics`: per-episode statistics
//!
//! The dispatcher is stateless: every method turns one event into a list of
//! `RewardDelta`s, and `apply` pushes them into the host's reward sink. The
//! engine never reads reward totals back.

mod episode;
mod shaping;

pub use episode::EpisodeMetrics;
pub use shaping::{
    AgentStep, ApproachFlag, CarryHome, ShapingContext, ShapingSet, ShapingTerm, StepEfficiency,
};

use serde::{Deserialize, Serialize};

use super::host::RewardSink;
use super::roster::{AgentRecord, TeamRoster};
use crate::config::RewardConfig;
use crate::models::{AgentId, Team};

/// Why a delta was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardCause {
    Capture,
    CaptureSupport,
    CaptureConceded,
    Score,
    ScoreSupport,
    ScoreConceded,
    /// Carrier lost the flag to an opponent
    FlagLost,
    /// Opponent knocked the flag loose
    FlagStolen,
    DropBroadcast,
    StepPenalty,
    ApproachFlag,
    CarryHome,
    WallContact,
    Timeout,
}

/// One reward payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardDelta {
    pub agent: AgentId,
    pub delta: f32,
    pub cause: RewardCause,
}

impl RewardDelta {
    pub fn new(agent: AgentId, delta: f32, cause: RewardCause) -> Self {
        Self { agent, delta, cause }
    }
}

// ============================================================================
// RewardDispatcher
// ============================================================================

#[derive(Debug)]
pub struct RewardDispatcher {
    config: RewardConfig,
    shaping: ShapingSet,
}

impl RewardDispatcher {
    pub fn new(config: RewardConfig) -> Self {
        let shaping = ShapingSet::from_config(&config);
        Self { config, shaping }
    }

    /// Replace the dense terms.
    pub fn with_shaping(mut self, shaping: ShapingSet) -> Self {
        self.shaping = shaping;
        self
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Capturer, then its teammates, then every opponent.
    pub fn flag_captured(
        &self,
        capturer: AgentId,
        team: Team,
        roster: &TeamRoster,
    ) -> Vec<RewardDelta> {
        let r = self.config.capture;
        Self::team_event(
            capturer,
            team,
            roster,
            (r.capturer, RewardCause::Capture),
            (r.teammate, RewardCause::CaptureSupport),
            (r.opponent, RewardCause::CaptureConceded),
        )
    }

    /// Scorer, then its teammates, then every opponent.
    pub fn point_scored(&self, scorer: AgentId, team: Team, roster: &TeamRoster) -> Vec<RewardDelta> {
        let r = self.config.score;
        Self::team_event(
            scorer,
            team,
            roster,
            (r.scorer, RewardCause::Score),
            (r.teammate, RewardCause::ScoreSupport),
            (r.opponent, RewardCause::ScoreConceded),
        )
    }

    /// Carrier penalty and stealer bonus.
    pub fn flag_stolen(&self, carrier: AgentId, stealer: AgentId) -> Vec<RewardDelta> {
        vec![
            RewardDelta::new(carrier, self.config.steal.carrier, RewardCause::FlagLost),
            RewardDelta::new(stealer, self.config.steal.stealer, RewardCause::FlagStolen),
        ]
    }

    /// Same penalty for every agent on both teams.
    pub fn drop_broadcast(&self, roster: &TeamRoster) -> Vec<RewardDelta> {
        Self::everyone(roster, self.config.drop_broadcast, RewardCause::DropBroadcast)
    }

    pub fn episode_timeout(&self, roster: &TeamRoster) -> Vec<RewardDelta> {
        Self::everyone(roster, self.config.timeout, RewardCause::Timeout)
    }

    pub fn wall_contact(&self, agent: AgentId) -> Vec<RewardDelta> {
        vec![RewardDelta::new(agent, self.config.wall_contact, RewardCause::WallContact)]
    }

    /// Dense shaping for one step report.
    pub fn agent_step(
        &self,
        record: &AgentRecord,
        step: &AgentStep,
        seconds_since_last_step: f32,
    ) -> Vec<RewardDelta> {
        self.shaping.compute(&ShapingContext { record, step, seconds_since_last_step })
    }

    /// Push deltas into the sink, in order.
    pub fn apply<S: RewardSink + ?Sized>(deltas: &[RewardDelta], sink: &mut S) {
        for d in deltas {
            sink.add_reward(d.agent, d.delta);
        }
    }

    fn team_event(
        agent: AgentId,
        team: Team,
        roster: &TeamRoster,
        own: (f32, RewardCause),
        mates: (f32, RewardCause),
        rivals: (f32, RewardCause),
    ) -> Vec<RewardDelta> {
        let mut deltas = vec![RewardDelta::new(agent, own.0, own.1)];
        deltas.extend(
            roster
                .members(team)
                .iter()
                .filter(|&&id| id != agent)
                .map(|&id| RewardDelta::new(id, mates.0, mates.1)),
        );
        deltas.extend(
            roster
                .members(team.opponent())
                .iter()
                .map(|&id| RewardDelta::new(id, rivals.0, rivals.1)),
        );
        deltas
    }

    fn everyone(roster: &TeamRoster, delta: f32, cause: RewardCause) -> Vec<RewardDelta> {
        roster.all().map(|id| RewardDelta::new(id, delta, cause)).collect()
    }
}

impl Default for RewardDispatcher {
    fn default() -> Self {
        Self::new(RewardConfig::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
