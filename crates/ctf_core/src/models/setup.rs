//! Match setup description.
//!
//! A `MatchSetup` is the raw, unvalidated roster handed over by the host at
//! match start. `TeamRoster::from_setup` turns it into resolved, typed
//! references or rejects it with a `SetupError`.

use serde::{Deserialize, Serialize};

use super::team::{AgentId, BaseId, Team};

fn default_true() -> bool {
    true
}

/// One participant as declared by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: AgentId,
    /// `None` is a setup error, reported as `UnassignedTeam`.
    #[serde(default)]
    pub team: Option<Team>,
    /// Whether opponent collisions can knock the flag loose from this agent.
    ///
    /// Early training phases run with this off so carriers only get pushed.
    #[serde(default = "default_true")]
    pub supports_flag_drop: bool,
}

impl AgentSpec {
    pub fn new(id: u32, team: Team) -> Self {
        Self { id: AgentId(id), team: Some(team), supports_flag_drop: true }
    }

    pub fn without_flag_drop(mut self) -> Self {
        self.supports_flag_drop = false;
        self
    }
}

/// Full match roster plus home-base references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSetup {
    pub agents: Vec<AgentSpec>,
    #[serde(default)]
    pub home_base_a: Option<BaseId>,
    #[serde(default)]
    pub home_base_b: Option<BaseId>,
}

impl MatchSetup {
    pub fn new() -> Self {
        Self::default()
    }

    /// `team_size` agents per side with ids `1..` for A and `101..` for B,
    /// home bases `1` (A) and `2` (B).
    pub fn symmetric(team_size: u32) -> Self {
        let mut setup = Self::new().with_home_bases(BaseId(1), BaseId(2));
        for i in 1..=team_size {
            setup.agents.push(AgentSpec::new(i, Team::A));
        }
        for i in 1..=team_size {
            setup.agents.push(AgentSpec::new(100 + i, Team::B));
        }
        setup
    }

    pub fn with_agent(mut self, spec: AgentSpec) -> Self {
        self.agents.push(spec);
        self
    }

    pub fn with_home_bases(mut self, a: BaseId, b: BaseId) -> Self {
        self.home_base_a = Some(a);
        self.home_base_b = Some(b);
        self
    }

    pub fn home_base(&self, team: Team) -> Option<BaseId> {
        match team {
            Team::A => self.home_base_a,
            Team::B => self.home_base_b,
        }
    }
}
