use super::episode::EpisodeState;
use super::flag::FlagLifecycle;
use super::roster::{AgentRecords, TeamRoster};
use super::scoreboard::ScoreBoard;
use crate::config::MatchConfig;
use crate::error::SetupError;
use crate::models::{MatchSetup, Position};

/// All mutable state of one match. Owned exclusively by its controller;
/// host collaborators are passed in per call, never stored.
#[derive(Debug, Clone)]
pub struct Match {
    pub(crate) episode: EpisodeState,
    pub(crate) flag: FlagLifecycle,
    pub(crate) scoreboard: ScoreBoard,
    pub(crate) roster: TeamRoster,
    pub(crate) agents: AgentRecords,
}

impl Match {
    pub fn new(setup: &MatchSetup, config: &MatchConfig) -> Result<Self, SetupError> {
        let (roster, agents) = TeamRoster::from_setup(setup, config.team_size)?;
        Ok(Self {
            episode: EpisodeState::new(config.episode_timeout),
            flag: FlagLifecycle::new(Position::ORIGIN, config.respawn_delay),
            scoreboard: ScoreBoard::new(config.max_score),
            roster,
            agents,
        })
    }

    pub fn episode(&self) -> &EpisodeState {
        &self.episode
    }

    pub fn flag(&self) -> &FlagLifecycle {
        &self.flag
    }

    pub fn scoreboard(&self) -> &ScoreBoard {
        &self.scoreboard
    }

    pub fn roster(&self) -> &TeamRoster {
        &self.roster
    }

    pub fn agents(&self) -> &AgentRecords {
        &self.agents
    }

    /// The flag holder and the set of agents with `has_flag` agree, and at
    /// most one agent carries.
    pub fn check_possession_invariant(&self) -> bool {
        let holders = self.agents.flag_holders();
        match self.flag.holder() {
            Some(holder) => holders == [holder],
            None => holders.is_empty(),
        }
    }
}
