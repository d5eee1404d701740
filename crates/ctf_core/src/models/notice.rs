//! Telemetry notices.
//!
//! Human-readable game events handed to the logging/telemetry side.
//! Fire-and-forget: nothing in the engine reads them back.

use serde::{Deserialize, Serialize};

use super::geometry::Position;
use super::team::{AgentId, Team};

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Still running
    #[default]
    InProgress,
    /// `episode_timeout` elapsed without a score
    TimeUp,
    /// A carrier reached its home base
    PointScored,
    /// The score reached `max_score`
    MatchComplete,
    /// Host restarted mid-episode (`force_reset_episode`, `start_episode`)
    ForcedReset,
}

impl TerminationReason {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TerminationReason::InProgress)
    }
}

/// One game-level event, as reported to telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameNotice {
    EpisodeStarted {
        episode: u32,
    },
    FlagCaptured {
        agent: AgentId,
        team: Team,
    },
    /// Carrier knocked off the flag by an opponent.
    FlagStolen {
        carrier: AgentId,
        stealer: AgentId,
        position: Position,
    },
    /// Generic drop broadcast.
    FlagDropped {
        carrier: AgentId,
        position: Position,
    },
    FlagRespawned {
        position: Position,
    },
    PointScored {
        agent: AgentId,
        team: Team,
        score_a: u32,
        score_b: u32,
    },
    MatchComplete {
        winner: Team,
        score_a: u32,
        score_b: u32,
    },
    EpisodeEnded {
        episode: u32,
        reason: TerminationReason,
        elapsed: f32,
    },
}
