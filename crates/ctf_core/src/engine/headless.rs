//! Headless Host
//!
//! In-memory `Host` for training without a renderer, tests and the runner.
//! Spawns are sampled from per-team rectangles with a seeded ChaCha RNG, so
//! the same seed replays the same episode starts.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::host::{RewardSink, SpawnProvider, WorldBridge};
use crate::models::{AgentId, Position, Rotation, Team};

// ============================================================================
// Spawns
// ============================================================================

/// Rectangular spawn plane. Agents appear half a unit above it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnArea {
    pub center: Position,
    pub half_width: f32,
    pub half_length: f32,
}

impl SpawnArea {
    pub fn new(center: Position, half_width: f32, half_length: f32) -> Self {
        Self { center, half_width, half_length }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Position {
        let dx = if self.half_width > 0.0 {
            rng.gen_range(-self.half_width..=self.half_width)
        } else {
            0.0
        };
        let dz = if self.half_length > 0.0 {
            rng.gen_range(-self.half_length..=self.half_length)
        } else {
            0.0
        };
        Position::new(self.center.x + dx, self.center.y + 0.5, self.center.z + dz)
    }
}

/// Seeded spawn sampler with one area per team.
#[derive(Debug, Clone)]
pub struct RectSpawnProvider {
    areas: [SpawnArea; 2],
    flag_spawn: Position,
    rng: ChaCha8Rng,
}

impl RectSpawnProvider {
    pub fn new(team_a: SpawnArea, team_b: SpawnArea, flag_spawn: Position, seed: u64) -> Self {
        Self { areas: [team_a, team_b], flag_spawn, rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Teams on opposite ends of the x axis, flag at the center.
    pub fn default_arena(seed: u64) -> Self {
        Self::new(
            SpawnArea::new(Position::new(-15.0, 0.0, 0.0), 5.0, 5.0),
            SpawnArea::new(Position::new(15.0, 0.0, 0.0), 5.0, 5.0),
            Position::new(0.0, 0.5, 0.0),
            seed,
        )
    }

    pub fn area(&self, team: Team) -> &SpawnArea {
        &self.areas[team.index()]
    }
}

impl SpawnProvider for RectSpawnProvider {
    fn position_for(&mut self, team: Team) -> Position {
        self.areas[team.index()].sample(&mut self.rng)
    }

    fn flag_spawn_position(&self) -> Position {
        self.flag_spawn
    }

    fn rotation_for(&self, team: Team) -> Rotation {
        // Face the opposing side
        match team {
            Team::A => Rotation::from_yaw(90.0),
            Team::B => Rotation::from_yaw(-90.0),
        }
    }
}

// ============================================================================
// World
// ============================================================================

/// A world side effect, as requested by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WorldCommand {
    SetFlagActive { active: bool },
    TeleportAgent { agent: AgentId, position: Position, rotation: Rotation },
    TeleportFlag { position: Position },
    Repel { agent: AgentId, other: AgentId },
}

/// Records world commands instead of executing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingWorld {
    pub commands: Vec<WorldCommand>,
    pub flag_active: bool,
    pub flag_position: Option<Position>,
    pub agent_positions: BTreeMap<AgentId, Position>,
}

impl RecordingWorld {
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl WorldBridge for RecordingWorld {
    fn set_flag_active(&mut self, active: bool) {
        self.flag_active = active;
        self.commands.push(WorldCommand::SetFlagActive { active });
    }

    fn teleport_agent(&mut self, agent: AgentId, position: Position, rotation: Rotation) {
        self.agent_positions.insert(agent, position);
        self.commands.push(WorldCommand::TeleportAgent { agent, position, rotation });
    }

    fn teleport_flag(&mut self, position: Position) {
        self.flag_position = Some(position);
        self.commands.push(WorldCommand::TeleportFlag { position });
    }

    fn repel(&mut self, agent: AgentId, other: AgentId) {
        self.commands.push(WorldCommand::Repel { agent, other });
    }
}

// ============================================================================
// Rewards
// ============================================================================

/// Accumulated rewards per agent.
#[derive(Debug, Clone, Default)]
pub struct RewardLedger {
    totals: BTreeMap<AgentId, f32>,
    /// Every delta in arrival order
    pub history: Vec<(AgentId, f32)>,
    episodes_ended: BTreeMap<AgentId, u32>,
}

impl RewardLedger {
    /// Total reward since the ledger was created.
    pub fn total(&self, agent: AgentId) -> f32 {
        self.totals.get(&agent).copied().unwrap_or(0.0)
    }

    pub fn totals(&self) -> &BTreeMap<AgentId, f32> {
        &self.totals
    }

    /// Learning episodes terminated for `agent`.
    pub fn episodes_ended(&self, agent: AgentId) -> u32 {
        self.episodes_ended.get(&agent).copied().unwrap_or(0)
    }
}

impl RewardSink for RewardLedger {
    fn add_reward(&mut self, agent: AgentId, delta: f32) {
        *self.totals.entry(agent).or_insert(0.0) += delta;
        self.history.push((agent, delta));
    }

    fn end_episode(&mut self, agent: AgentId) {
        *self.episodes_ended.entry(agent).or_insert(0) += 1;
    }
}

// ============================================================================
// HeadlessHost
// ============================================================================

/// Spawns, world and rewards bundled into one `Host`.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    pub spawn: RectSpawnProvider,
    pub world: RecordingWorld,
    pub ledger: RewardLedger,
}

impl HeadlessHost {
    pub fn new(seed: u64) -> Self {
        Self::with_spawns(RectSpawnProvider::default_arena(seed))
    }

    pub fn with_spawns(spawn: RectSpawnProvider) -> Self {
        Self { spawn, world: RecordingWorld::default(), ledger: RewardLedger::default() }
    }
}

impl SpawnProvider for HeadlessHost {
    fn position_for(&mut self, team: Team) -> Position {
        self.spawn.position_for(team)
    }

    fn flag_spawn_position(&self) -> Position {
        self.spawn.flag_spawn_position()
    }

    fn rotation_for(&self, team: Team) -> Rotation {
        self.spawn.rotation_for(team)
    }
}

impl WorldBridge for HeadlessHost {
    fn set_flag_active(&mut self, active: bool) {
        self.world.set_flag_active(active);
    }

    fn teleport_agent(&mut self, agent: AgentId, position: Position, rotation: Rotation) {
        self.world.teleport_agent(agent, position, rotation);
    }

    fn teleport_flag(&mut self, position: Position) {
        self.world.teleport_flag(position);
    }

    fn repel(&mut self, agent: AgentId, other: AgentId) {
        self.world.repel(agent, other);
    }
}

impl RewardSink for HeadlessHost {
    fn add_reward(&mut self, agent: AgentId, delta: f32) {
        self.ledger.add_reward(agent, delta);
    }

    fn end_episode(&mut self, agent: AgentId) {
        self.ledger.end_episode(agent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = RectSpawnProvider::default_arena(7);
        let mut b = RectSpawnProvider::default_arena(7);
        for team in [Team::A, Team::B, Team::A] {
            assert_eq!(a.position_for(team), b.position_for(team));
        }
    }

    #[test]
    fn test_ledger_accumulates() {
        let mut ledger = RewardLedger::default();
        ledger.add_reward(AgentId(1), 0.5);
        ledger.add_reward(AgentId(1), -0.2);
        ledger.end_episode(AgentId(1));

        assert!((ledger.total(AgentId(1)) - 0.3).abs() < 1e-6);
        assert_eq!(ledger.total(AgentId(2)), 0.0);
        assert_eq!(ledger.history.len(), 2);
        assert_eq!(ledger.episodes_ended(AgentId(1)), 1);
    }

    #[test]
    fn test_recording_world() {
        let mut host = HeadlessHost::new(1);
        host.set_flag_active(false);
        host.teleport_flag(Position::ORIGIN);
        host.repel(AgentId(1), AgentId(2));

        assert!(!host.world.flag_active);
        assert_eq!(host.world.flag_position, Some(Position::ORIGIN));
        assert_eq!(host.world.commands.len(), 3);
    }

    proptest! {
        #[test]
        fn prop_spawns_stay_in_area(seed in any::<u64>()) {
            let mut spawns = RectSpawnProvider::default_arena(seed);
            for team in Team::ALL {
                let area = *spawns.area(team);
                let p = spawns.position_for(team);
                prop_assert!((p.x - area.center.x).abs() <= area.half_width);
                prop_assert!((p.z - area.center.z).abs() <= area.half_length);
                prop_assert_eq!(p.y, area.center.y + 0.5);
            }
        }
    }
}
