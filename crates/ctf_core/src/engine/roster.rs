//! Team Roster & Agent Records
//!
//! `TeamRoster` is the static agent → team → home-base mapping, resolved once
//! from a `MatchSetup`. It never changes during a match.
//!
//! `AgentRecords` holds the mutable per-agent state (possession, collision
//! counter, shaping memory). One record per agent, kept in two team
//! collections, reset between episodes and never removed mid-match.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SetupError;
use crate::models::{AgentId, BaseId, MatchSetup, Team};

// ============================================================================
// AgentRecord
// ============================================================================

/// Variant capabilities selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCapabilities {
    /// Opponent collisions can knock the flag loose
    pub supports_flag_drop: bool,
}

impl Default for AgentCapabilities {
    fn default() -> Self {
        Self { supports_flag_drop: true }
    }
}

/// Mutable per-agent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub team: Team,
    pub home_base: BaseId,
    pub capabilities: AgentCapabilities,
    /// Set only through `FlagLifecycle`
    pub has_flag: bool,
    /// Opponent collisions absorbed while carrying, this episode
    pub collision_count: u32,
    /// Distance to the flag at the previous shaping step
    pub last_flag_distance: Option<f32>,
    /// Episode time of the previous shaping step
    pub last_step_at: f32,
}

impl AgentRecord {
    pub fn new(id: AgentId, team: Team, home_base: BaseId, capabilities: AgentCapabilities) -> Self {
        Self {
            id,
            team,
            home_base,
            capabilities,
            has_flag: false,
            collision_count: 0,
            last_flag_distance: None,
            last_step_at: 0.0,
        }
    }

    /// Episode-start reset. Identity, team and capabilities are kept.
    pub fn reset_for_episode(&mut self) {
        self.has_flag = false;
        self.collision_count = 0;
        self.last_flag_distance = None;
        self.last_step_at = 0.0;
    }
}

// ============================================================================
// AgentRecords
// ============================================================================

/// Both team collections of agent records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentRecords {
    team_a: Vec<AgentRecord>,
    team_b: Vec<AgentRecord>,
}

impl AgentRecords {
    fn team_vec_mut(&mut self, team: Team) -> &mut Vec<AgentRecord> {
        match team {
            Team::A => &mut self.team_a,
            Team::B => &mut self.team_b,
        }
    }

    /// Records of one team, in setup order.
    pub fn team(&self, team: Team) -> &[AgentRecord] {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }

    /// All records, Team A first.
    pub fn iter(&self) -> impl Iterator<Item = &AgentRecord> {
        self.team_a.iter().chain(self.team_b.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AgentRecord> {
        self.team_a.iter_mut().chain(self.team_b.iter_mut())
    }

    pub fn get(&self, id: AgentId) -> Option<&AgentRecord> {
        self.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut AgentRecord> {
        self.iter_mut().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.team_a.len() + self.team_b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Agents currently flagged as carrying.
    pub fn flag_holders(&self) -> Vec<AgentId> {
        self.iter().filter(|r| r.has_flag).map(|r| r.id).collect()
    }

    pub(crate) fn clear_flag(&mut self, id: AgentId) {
        if let Some(record) = self.get_mut(id) {
            record.has_flag = false;
        }
    }

    pub fn reset_all(&mut self) {
        for record in self.iter_mut() {
            record.reset_for_episode();
        }
    }
}

// ============================================================================
// TeamRoster
// ============================================================================

/// Static agent → team mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRoster {
    members: [Vec<AgentId>; 2],
    teams: BTreeMap<AgentId, Team>,
    home_bases: [BaseId; 2],
}

impl TeamRoster {
    /// Validate a setup and build the roster plus fresh agent records.
    ///
    /// # Errors
    /// * `UnassignedTeam` - an agent has no team
    /// * `DuplicateAgent` - an id appears twice
    /// * `EmptyTeam` - a side has no agents
    /// * `TeamTooLarge` - a side exceeds `team_size`
    /// * `MissingHomeBase` - a side has no base reference
    /// * `SharedHomeBase` - both sides reference the same base
    pub fn from_setup(
        setup: &MatchSetup,
        team_size: usize,
    ) -> Result<(Self, AgentRecords), SetupError> {
        let mut members: [Vec<AgentId>; 2] = [Vec::new(), Vec::new()];
        let mut teams = BTreeMap::new();

        for spec in &setup.agents {
            let team = spec.team.ok_or(SetupError::UnassignedTeam(spec.id))?;
            if teams.insert(spec.id, team).is_some() {
                return Err(SetupError::DuplicateAgent(spec.id));
            }
            members[team.index()].push(spec.id);
        }

        let mut home_bases = [BaseId(0); 2];
        for team in Team::ALL {
            let found = members[team.index()].len();
            if found == 0 {
                return Err(SetupError::EmptyTeam(team));
            }
            if found > team_size {
                return Err(SetupError::TeamTooLarge { team, found, limit: team_size });
            }
            home_bases[team.index()] =
                setup.home_base(team).ok_or(SetupError::MissingHomeBase(team))?;
        }
        if home_bases[0] == home_bases[1] {
            return Err(SetupError::SharedHomeBase(home_bases[0]));
        }

        let mut records = AgentRecords::default();
        for spec in &setup.agents {
            let team = teams[&spec.id];
            let capabilities =
                AgentCapabilities { supports_flag_drop: spec.supports_flag_drop };
            records
                .team_vec_mut(team)
                .push(AgentRecord::new(spec.id, team, home_bases[team.index()], capabilities));
        }

        Ok((Self { members, teams, home_bases }, records))
    }

    /// Agents of one team, in setup order.
    pub fn members(&self, team: Team) -> &[AgentId] {
        &self.members[team.index()]
    }

    pub fn home_base(&self, team: Team) -> BaseId {
        self.home_bases[team.index()]
    }

    /// All agents, Team A first.
    pub fn all(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.members[0].iter().chain(self.members[1].iter()).copied()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.teams.contains_key(&agent)
    }

    /// An agent unknown to the roster has no team.
    pub fn team_of(&self, agent: AgentId) -> Result<Team, SetupError> {
        self.teams.get(&agent).copied().ok_or(SetupError::UnassignedTeam(agent))
    }

    /// Same-team agents, excluding `agent` itself.
    pub fn teammates_of(&self, agent: AgentId) -> Result<Vec<AgentId>, SetupError> {
        let team = self.team_of(agent)?;
        Ok(self.members(team).iter().copied().filter(|&id| id != agent).collect())
    }

    pub fn opponents_of(&self, agent: AgentId) -> Result<&[AgentId], SetupError> {
        let team = self.team_of(agent)?;
        Ok(self.members(team.opponent()))
    }

    pub fn home_base_of(&self, agent: AgentId) -> Result<BaseId, SetupError> {
        Ok(self.home_base(self.team_of(agent)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgentSpec;

    #[test]
    fn test_lookup() {
        let (roster, records) = TeamRoster::from_setup(&MatchSetup::symmetric(3), 3).unwrap();

        assert_eq!(roster.len(), 6);
        assert_eq!(records.len(), 6);
        assert_eq!(roster.team_of(AgentId(2)).unwrap(), Team::A);
        assert_eq!(roster.team_of(AgentId(102)).unwrap(), Team::B);
        assert_eq!(roster.teammates_of(AgentId(1)).unwrap(), vec![AgentId(2), AgentId(3)]);
        assert_eq!(
            roster.opponents_of(AgentId(1)).unwrap(),
            &[AgentId(101), AgentId(102), AgentId(103)]
        );
        assert_eq!(roster.home_base_of(AgentId(103)).unwrap(), BaseId(2));
        assert_eq!(records.get(AgentId(101)).unwrap().home_base, BaseId(2));
    }

    #[test]
    fn test_unknown_agent_is_unassigned() {
        let (roster, _) = TeamRoster::from_setup(&MatchSetup::symmetric(1), 3).unwrap();
        assert_eq!(roster.team_of(AgentId(50)), Err(SetupError::UnassignedTeam(AgentId(50))));
        assert!(roster.opponents_of(AgentId(50)).is_err());
    }

    #[test]
    fn test_unassigned_team_rejected() {
        let mut setup = MatchSetup::symmetric(1);
        setup.agents[0].team = None;
        assert_eq!(
            TeamRoster::from_setup(&setup, 3).unwrap_err(),
            SetupError::UnassignedTeam(AgentId(1))
        );
    }

    #[test]
    fn test_setup_validation() {
        let setup = MatchSetup::symmetric(1).with_agent(AgentSpec::new(1, Team::B));
        assert_eq!(
            TeamRoster::from_setup(&setup, 3).unwrap_err(),
            SetupError::DuplicateAgent(AgentId(1))
        );

        let setup = MatchSetup::new()
            .with_home_bases(BaseId(1), BaseId(2))
            .with_agent(AgentSpec::new(1, Team::A));
        assert_eq!(TeamRoster::from_setup(&setup, 3).unwrap_err(), SetupError::EmptyTeam(Team::B));

        let mut setup = MatchSetup::symmetric(1);
        setup.home_base_b = None;
        assert_eq!(
            TeamRoster::from_setup(&setup, 3).unwrap_err(),
            SetupError::MissingHomeBase(Team::B)
        );

        let mut setup = MatchSetup::symmetric(1);
        setup.home_base_b = Some(BaseId(1));
        assert_eq!(
            TeamRoster::from_setup(&setup, 3).unwrap_err(),
            SetupError::SharedHomeBase(BaseId(1))
        );

        assert!(matches!(
            TeamRoster::from_setup(&MatchSetup::symmetric(4), 3),
            Err(SetupError::TeamTooLarge { team: Team::A, found: 4, limit: 3 })
        ));
    }

    #[test]
    fn test_capabilities_carried_over() {
        let setup = MatchSetup::new()
            .with_home_bases(BaseId(1), BaseId(2))
            .with_agent(AgentSpec::new(1, Team::A).without_flag_drop())
            .with_agent(AgentSpec::new(2, Team::B));
        let (_, records) = TeamRoster::from_setup(&setup, 3).unwrap();
        assert!(!records.get(AgentId(1)).unwrap().capabilities.supports_flag_drop);
        assert!(records.get(AgentId(2)).unwrap().capabilities.supports_flag_drop);
    }

    #[test]
    fn test_reset_all() {
        let (_, mut records) = TeamRoster::from_setup(&MatchSetup::symmetric(2), 3).unwrap();
        {
            let r = records.get_mut(AgentId(2)).unwrap();
            r.has_flag = true;
            r.collision_count = 1;
            r.last_flag_distance = Some(3.0);
        }
        assert_eq!(records.flag_holders(), vec![AgentId(2)]);

        records.reset_all();
        assert!(records.flag_holders().is_empty());
        assert!(records.iter().all(|r| r.collision_count == 0 && r.last_flag_distance.is_none()));
    }
}
