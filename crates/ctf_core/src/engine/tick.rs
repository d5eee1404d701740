//! Per-step input and output.
//!
//! The physics layer reports raw contacts and agent step summaries in a
//! `TickInput`; the controller answers with a `TickReport` of notices and
//! reward deltas produced during that step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::reward::{AgentStep, RewardDelta};
use crate::error::TransitionError;
use crate::models::{AgentId, BaseId, GameNotice, Position};

/// What an agent touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContactTag {
    Flag,
    Base { base: BaseId },
    Agent { other: AgentId },
    Wall,
}

impl ContactTag {
    /// Processing class: flag interactions, then collisions, then walls.
    fn class(&self) -> u8 {
        match self {
            ContactTag::Flag | ContactTag::Base { .. } => 0,
            ContactTag::Agent { .. } => 1,
            ContactTag::Wall => 2,
        }
    }
}

/// One raw contact report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub agent: AgentId,
    pub target: ContactTag,
    /// Where it happened (used as the drop position for collisions)
    #[serde(default)]
    pub position: Position,
}

impl Contact {
    pub fn flag(agent: AgentId) -> Self {
        Self { agent, target: ContactTag::Flag, position: Position::ORIGIN }
    }

    pub fn base(agent: AgentId, base: BaseId) -> Self {
        Self { agent, target: ContactTag::Base { base }, position: Position::ORIGIN }
    }

    pub fn agent(agent: AgentId, other: AgentId, position: Position) -> Self {
        Self { agent, target: ContactTag::Agent { other }, position }
    }

    pub fn wall(agent: AgentId) -> Self {
        Self { agent, target: ContactTag::Wall, position: Position::ORIGIN }
    }
}

/// Everything the host observed during one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub steps: Vec<AgentStep>,
}

impl TickInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contacts.push(contact);
        self
    }

    pub fn with_step(mut self, step: AgentStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Contacts in processing order, stable within each class. A collision
    /// reported by both agents of a pair is kept once.
    pub fn ordered_contacts(&self) -> Vec<Contact> {
        let mut ordered = self.contacts.clone();
        ordered.sort_by_key(|c| c.target.class());

        let mut pairs = BTreeSet::new();
        ordered.retain(|c| match c.target {
            ContactTag::Agent { other } => {
                let key = if c.agent <= other { (c.agent, other) } else { (other, c.agent) };
                pairs.insert(key)
            }
            _ => true,
        });
        ordered
    }
}

/// What happened during one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub notices: Vec<GameNotice>,
    pub rewards: Vec<RewardDelta>,
    /// Events rejected as inconsistent with the current state
    pub ignored: usize,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty() && self.rewards.is_empty() && self.ignored == 0
    }

    /// Sum of rewards paid to one agent in this report.
    pub fn reward_for(&self, agent: AgentId) -> f32 {
        self.rewards.iter().filter(|d| d.agent == agent).map(|d| d.delta).sum()
    }
}

/// Result of one reported event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Applied,
    /// Rejected; state unchanged
    Ignored(TransitionError),
}

impl EventOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EventOutcome::Applied)
    }
}
