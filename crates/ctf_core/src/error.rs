use thiserror::Error;

use crate::engine::flag::FlagPhase;
use crate::models::{AgentId, BaseId, Position, Team};

/// Match setup failures. Detected once at initialization and fatal: the
/// controller refuses to run until the setup is corrected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupError {
    #[error("{0} has no team assignment")]
    UnassignedTeam(AgentId),

    #[error("{0} has no agents")]
    EmptyTeam(Team),

    #[error("{0} appears more than once in the roster")]
    DuplicateAgent(AgentId),

    #[error("{0} has no home base reference")]
    MissingHomeBase(Team),

    #[error("both teams use {0} as their home base")]
    SharedHomeBase(BaseId),

    #[error("{team} has {found} agents, limit is {limit}")]
    TeamTooLarge { team: Team, found: usize, limit: usize },

    #[error("{what} spawn position {position} lies outside the arena")]
    SpawnOutOfBounds { what: String, position: Position },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Runtime inconsistencies. Logged and ignored; state is left unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("cannot {op} while the flag is {from}")]
    InvalidTransition { op: &'static str, from: FlagPhase },

    #[error("{agent} does not hold the flag")]
    NotHolder { agent: AgentId },

    #[error("{agent} touched {base}, which is not its home base")]
    NotAtHomeBase { agent: AgentId, base: BaseId },

    #[error("{agent} and {other} are teammates")]
    SameTeam { agent: AgentId, other: AgentId },

    #[error("unknown {0}")]
    UnknownAgent(AgentId),

    #[error("episode is not active")]
    EpisodeNotActive,

    #[error("controller has not been initialized")]
    NotInitialized,

    #[error("controller is disabled: {0}")]
    ControllerDisabled(SetupError),
}

impl TransitionError {
    /// Rejections that happen in normal play (events arriving during the
    /// restart delay, touching the wrong base). Logged at debug level.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            TransitionError::EpisodeNotActive
                | TransitionError::NotAtHomeBase { .. }
                | TransitionError::SameTeam { .. }
        )
    }

    /// Whether the rejection stems from a setup failure rather than from the
    /// event itself.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransitionError::ControllerDisabled(_) | TransitionError::NotInitialized)
    }
}

/// Crate-level error for fallible entry points (config loading, setup).
#[derive(Error, Debug)]
pub enum MatchError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MatchError>;
