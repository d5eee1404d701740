//! Flag Lifecycle State Machine
//!
//! ```text
//!            capture                drop
//!  AtRest ───────────▶ Held ───────────────▶ Dropped
//!    ▲                  │                      │
//!    │     score        │   force_respawn      │ countdown ≤ 0 / force_respawn
//!    └──────────────────┴──────────────────────┘
//! ```
//!
//! Invariant: `Held { holder }` ⇔ exactly that holder's `has_flag` is set.
//! The holder lives inside the status variant, so a held flag without a
//! holder cannot be represented.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::roster::{AgentRecord, AgentRecords};
use crate::error::TransitionError;
use crate::models::{AgentId, Position};

/// Status discriminant without payload (for errors and logs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagPhase {
    AtRest,
    Held,
    Dropped,
}

impl fmt::Display for FlagPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FlagPhase::AtRest => write!(f, "at rest"),
            FlagPhase::Held => write!(f, "held"),
            FlagPhase::Dropped => write!(f, "dropped"),
        }
    }
}

/// Flag possession status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FlagStatus {
    /// At the canonical spawn, collectable
    AtRest,
    /// Carried by `holder`
    Held { holder: AgentId },
    /// Lying at `position`, uncollectable for `countdown` more seconds
    Dropped { position: Position, countdown: f32 },
}

impl FlagStatus {
    pub fn phase(&self) -> FlagPhase {
        match self {
            FlagStatus::AtRest => FlagPhase::AtRest,
            FlagStatus::Held { .. } => FlagPhase::Held,
            FlagStatus::Dropped { .. } => FlagPhase::Dropped,
        }
    }
}

/// The single flag of a match.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagLifecycle {
    status: FlagStatus,
    spawn: Position,
    respawn_delay: f32,
}

impl FlagLifecycle {
    pub fn new(spawn: Position, respawn_delay: f32) -> Self {
        Self { status: FlagStatus::AtRest, spawn, respawn_delay }
    }

    pub fn status(&self) -> FlagStatus {
        self.status
    }

    pub fn phase(&self) -> FlagPhase {
        self.status.phase()
    }

    pub fn holder(&self) -> Option<AgentId> {
        match self.status {
            FlagStatus::Held { holder } => Some(holder),
            _ => None,
        }
    }

    pub fn is_at_rest(&self) -> bool {
        matches!(self.status, FlagStatus::AtRest)
    }

    /// Canonical spawn position restored on every respawn.
    pub fn spawn_position(&self) -> Position {
        self.spawn
    }

    pub(crate) fn set_spawn_position(&mut self, spawn: Position) {
        self.spawn = spawn;
    }

    /// Where the flag lies, if it is not being carried.
    pub fn resting_position(&self) -> Option<Position> {
        match self.status {
            FlagStatus::AtRest => Some(self.spawn),
            FlagStatus::Dropped { position, .. } => Some(position),
            FlagStatus::Held { .. } => None,
        }
    }

    /// Seconds until a dropped flag respawns.
    pub fn respawn_countdown(&self) -> Option<f32> {
        match self.status {
            FlagStatus::Dropped { countdown, .. } => Some(countdown),
            _ => None,
        }
    }

    /// `AtRest` → `Held`.
    pub fn capture(&mut self, agent: &mut AgentRecord) -> Result<(), TransitionError> {
        if !self.is_at_rest() {
            return Err(TransitionError::InvalidTransition { op: "capture", from: self.phase() });
        }
        agent.has_flag = true;
        self.status = FlagStatus::Held { holder: agent.id };
        Ok(())
    }

    /// `Held` → `Dropped` at `position`, starting the respawn countdown.
    ///
    /// Returns the former holder.
    pub fn drop(
        &mut self,
        position: Position,
        records: &mut AgentRecords,
    ) -> Result<AgentId, TransitionError> {
        let FlagStatus::Held { holder } = self.status else {
            return Err(TransitionError::InvalidTransition { op: "drop", from: self.phase() });
        };
        records.clear_flag(holder);
        self.status = FlagStatus::Dropped { position, countdown: self.respawn_delay };
        Ok(holder)
    }

    /// `Held`/`Dropped` → `AtRest` immediately, bypassing the countdown.
    ///
    /// Returns the former holder when the flag was being carried.
    pub fn force_respawn(
        &mut self,
        records: &mut AgentRecords,
    ) -> Result<Option<AgentId>, TransitionError> {
        let holder = match self.status {
            FlagStatus::AtRest => {
                return Err(TransitionError::InvalidTransition {
                    op: "force respawn",
                    from: FlagPhase::AtRest,
                })
            }
            FlagStatus::Held { holder } => {
                records.clear_flag(holder);
                Some(holder)
            }
            FlagStatus::Dropped { .. } => None,
        };
        self.status = FlagStatus::AtRest;
        Ok(holder)
    }

    /// Advance the respawn countdown. Returns `true` on the tick the flag
    /// returns to `AtRest`.
    pub fn tick(&mut self, dt: f32) -> bool {
        if let FlagStatus::Dropped { countdown, .. } = &mut self.status {
            *countdown -= dt;
            if *countdown <= 0.0 {
                self.status = FlagStatus::AtRest;
                return true;
            }
        }
        false
    }

    /// `Held` → `AtRest` when the holder delivers the flag. The home-base
    /// check belongs to the caller.
    pub fn score_attempt(&mut self, agent: &mut AgentRecord) -> Result<(), TransitionError> {
        match self.status {
            FlagStatus::Held { holder } if holder == agent.id => {
                agent.has_flag = false;
                self.status = FlagStatus::AtRest;
                Ok(())
            }
            FlagStatus::Held { .. } => Err(TransitionError::NotHolder { agent: agent.id }),
            _ => Err(TransitionError::InvalidTransition { op: "score", from: self.phase() }),
        }
    }

    /// Episode-start reset: `AtRest` at the canonical spawn, nobody carrying.
    pub fn reset(&mut self, records: &mut AgentRecords) {
        for record in records.iter_mut() {
            record.has_flag = false;
        }
        self.status = FlagStatus::AtRest;
    }
}

// ============================================================================
// Tests
// ============================================================================
