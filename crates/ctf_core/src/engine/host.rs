//! Host Interfaces
//!
//! The engine never touches physics or the learning framework directly. It
//! talks to the host through three narrow capabilities:
//!
//! - `SpawnProvider`: where agents and the flag appear at episode start
//! - `WorldBridge`: visual/physical side effects (teleport, hide, repel)
//! - `RewardSink`: per-agent reward accumulation and episode termination
//!
//! Any type implementing all three is a `Host`.

use crate::models::{AgentId, Position, Rotation, Team};

/// Spawn positions, supplied by the host.
pub trait SpawnProvider {
    /// A spawn position for one agent of `team`. May be randomized.
    ///
    /// Only the first sample per team is validated at `initialize`. Later
    /// samples outside the arena are clamped to the arena bounds (with a
    /// warning) before the agent is teleported.
    fn position_for(&mut self, team: Team) -> Position;

    /// Canonical flag spawn, used for every respawn.
    fn flag_spawn_position(&self) -> Position;

    fn rotation_for(&self, _team: Team) -> Rotation {
        Rotation::IDENTITY
    }
}

/// World side effects requested by the engine.
pub trait WorldBridge {
    /// Show or hide the flag.
    fn set_flag_active(&mut self, active: bool);

    fn teleport_agent(&mut self, agent: AgentId, position: Position, rotation: Rotation);

    fn teleport_flag(&mut self, position: Position);

    /// Push `agent` away from `other` after a collision.
    fn repel(&mut self, _agent: AgentId, _other: AgentId) {}
}

/// Learning-framework reward channel.
pub trait RewardSink {
    fn add_reward(&mut self, agent: AgentId, delta: f32);

    /// Terminate the agent's learning episode.
    fn end_episode(&mut self, _agent: AgentId) {}
}

/// Everything the controller needs from its host.
pub trait Host: SpawnProvider + WorldBridge + RewardSink {}

impl<T: SpawnProvider + WorldBridge + RewardSink + ?Sized> Host for T {}
