//! Dense per-step shaping terms.
//!
//! Each term looks at one agent's step report plus its shaping memory and
//! returns a raw value; `ShapingSet` scales and collects them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let set = ShapingSet::new()
//!     .add(Box::new(StepEfficiency::new(0.01)), 1.0)
//!     .add(Box::new(ApproachFlag::new(0.001)), 1.0);
//! let deltas = set.compute(&ctx);
//! ```

use serde::{Deserialize, Serialize};

use super::{RewardCause, RewardDelta};
use crate::config::RewardConfig;
use crate::engine::roster::AgentRecord;
use crate::models::{AgentId, Position};

/// Per-agent step report from the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentStep {
    pub agent: AgentId,
    pub position: Position,
    /// Current flag position as seen by the world
    pub flag_position: Position,
    /// Position of the agent's home base
    pub home_position: Position,
}

impl AgentStep {
    pub fn flag_distance(&self) -> f32 {
        self.position.distance(&self.flag_position)
    }

    pub fn home_distance(&self) -> f32 {
        self.position.distance(&self.home_position)
    }
}

/// Everything a shaping term may look at.
#[derive(Debug, Clone, Copy)]
pub struct ShapingContext<'a> {
    pub record: &'a AgentRecord,
    pub step: &'a AgentStep,
    pub seconds_since_last_step: f32,
}

// ============================================================================
// ShapingTerm Trait
// ============================================================================

/// One dense reward term.
pub trait ShapingTerm: Send + Sync {
    /// Raw value for this step (0.0 when the term does not apply).
    fn compute(&self, ctx: &ShapingContext<'_>) -> f32;

    /// Cause attached to the resulting delta.
    fn cause(&self) -> RewardCause;

    fn name(&self) -> &str;
}

/// Time pressure: `-penalty × seconds` since the previous step.
#[derive(Debug, Clone, Copy)]
pub struct StepEfficiency {
    penalty_per_second: f32,
}

impl StepEfficiency {
    pub fn new(penalty_per_second: f32) -> Self {
        Self { penalty_per_second }
    }
}

impl ShapingTerm for StepEfficiency {
    fn compute(&self, ctx: &ShapingContext<'_>) -> f32 {
        -self.penalty_per_second * ctx.seconds_since_last_step.max(0.0)
    }

    fn cause(&self) -> RewardCause {
        RewardCause::StepPenalty
    }

    fn name(&self) -> &str {
        "step_efficiency"
    }
}

/// Paid while not carrying, when the agent got strictly closer to the flag
/// than at its previous step.
#[derive(Debug, Clone, Copy)]
pub struct ApproachFlag {
    bonus: f32,
}

impl ApproachFlag {
    pub fn new(bonus: f32) -> Self {
        Self { bonus }
    }
}

impl ShapingTerm for ApproachFlag {
    fn compute(&self, ctx: &ShapingContext<'_>) -> f32 {
        if ctx.record.has_flag {
            return 0.0;
        }
        match ctx.record.last_flag_distance {
            Some(last) if ctx.step.flag_distance() < last => self.bonus,
            _ => 0.0,
        }
    }

    fn cause(&self) -> RewardCause {
        RewardCause::ApproachFlag
    }

    fn name(&self) -> &str {
        "approach_flag"
    }
}

/// Paid while carrying, growing linearly as the carrier nears home.
/// Zero at or beyond `max_distance`.
#[derive(Debug, Clone, Copy)]
pub struct CarryHome {
    max_bonus: f32,
    max_distance: f32,
}

impl CarryHome {
    pub fn new(max_bonus: f32, max_distance: f32) -> Self {
        Self { max_bonus, max_distance }
    }
}

impl ShapingTerm for CarryHome {
    fn compute(&self, ctx: &ShapingContext<'_>) -> f32 {
        if !ctx.record.has_flag || self.max_distance <= 0.0 {
            return 0.0;
        }
        let closeness = (self.max_distance - ctx.step.home_distance()) / self.max_distance;
        self.max_bonus * closeness.clamp(0.0, 1.0)
    }

    fn cause(&self) -> RewardCause {
        RewardCause::CarryHome
    }

    fn name(&self) -> &str {
        "carry_home"
    }
}

// ============================================================================
// ShapingSet
// ============================================================================

/// Weighted collection of shaping terms.
#[derive(Default)]
pub struct ShapingSet {
    terms: Vec<(Box<dyn ShapingTerm>, f32)>,
}

impl ShapingSet {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a term.
    ///
    /// # Arguments
    /// * `term` - shaping term
    /// * `weight` - multiplier (1.0 = raw value)
    pub fn add(mut self, term: Box<dyn ShapingTerm>, weight: f32) -> Self {
        self.terms.push((term, weight));
        self
    }

    /// Step efficiency, approach flag and carry home, from the reward table.
    pub fn from_config(config: &RewardConfig) -> Self {
        Self::new()
            .add(Box::new(StepEfficiency::new(config.step_penalty_per_second)), 1.0)
            .add(Box::new(ApproachFlag::new(config.approach_flag)), 1.0)
            .add(
                Box::new(CarryHome::new(config.carry_home_max, config.carry_home_max_distance)),
                1.0,
            )
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// One delta per term with a non-zero weighted value.
    pub fn compute(&self, ctx: &ShapingContext<'_>) -> Vec<RewardDelta> {
        self.terms
            .iter()
            .filter_map(|(term, weight)| {
                let delta = term.compute(ctx) * *weight;
                (delta != 0.0).then(|| RewardDelta::new(ctx.record.id, delta, term.cause()))
            })
            .collect()
    }
}

impl std::fmt::Debug for ShapingSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapingSet")
            .field(
                "terms",
                &self.terms.iter().map(|(term, weight)| (term.name(), *weight)).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::roster::AgentCapabilities;
    use crate::models::{BaseId, Team};

    fn record(has_flag: bool, last: Option<f32>) -> AgentRecord {
        let mut r = AgentRecord::new(AgentId(1), Team::A, BaseId(1), AgentCapabilities::default());
        r.has_flag = has_flag;
        r.last_flag_distance = last;
        r
    }

    fn step(x: f32) -> AgentStep {
        AgentStep {
            agent: AgentId(1),
            position: Position::new(x, 0.0, 0.0),
            flag_position: Position::ORIGIN,
            home_position: Position::new(-20.0, 0.0, 0.0),
        }
    }

    fn ctx<'a>(record: &'a AgentRecord, step: &'a AgentStep, dt: f32) -> ShapingContext<'a> {
        ShapingContext { record, step, seconds_since_last_step: dt }
    }

    #[test]
    fn test_step_efficiency() {
        let r = record(false, None);
        let s = step(5.0);
        let term = StepEfficiency::new(0.01);
        assert!((term.compute(&ctx(&r, &s, 2.0)) + 0.02).abs() < 1e-6);
        assert_eq!(term.compute(&ctx(&r, &s, -1.0)), 0.0);
    }

    #[test]
    fn test_approach_requires_strict_decrease() {
        let term = ApproachFlag::new(0.001);
        let s = step(5.0);

        assert_eq!(term.compute(&ctx(&record(false, None), &s, 0.1)), 0.0);
        assert_eq!(term.compute(&ctx(&record(false, Some(6.0)), &s, 0.1)), 0.001);
        assert_eq!(term.compute(&ctx(&record(false, Some(5.0)), &s, 0.1)), 0.0);
        assert_eq!(term.compute(&ctx(&record(true, Some(6.0)), &s, 0.1)), 0.0);
    }

    #[test]
    fn test_carry_home_scales_with_distance() {
        let term = CarryHome::new(0.002, 20.0);
        let r = record(true, None);

        // 10 from home -> half the bonus
        let s = step(-10.0);
        assert!((term.compute(&ctx(&r, &s, 0.1)) - 0.001).abs() < 1e-7);

        // beyond max distance -> nothing, never negative
        let s = step(15.0);
        assert_eq!(term.compute(&ctx(&r, &s, 0.1)), 0.0);

        assert_eq!(term.compute(&ctx(&record(false, None), &step(-20.0), 0.1)), 0.0);
    }

    #[test]
    fn test_set_skips_zero_terms() {
        let set = ShapingSet::from_config(&RewardConfig::default());
        assert_eq!(set.len(), 3);

        let r = record(false, Some(10.0));
        let s = step(5.0);
        let deltas = set.compute(&ctx(&r, &s, 1.0));
        let causes: Vec<_> = deltas.iter().map(|d| d.cause).collect();
        assert_eq!(causes, vec![RewardCause::StepPenalty, RewardCause::ApproachFlag]);
    }

    #[test]
    fn test_debug_lists_names() {
        let set = ShapingSet::new().add(Box::new(ApproachFlag::new(0.1)), 2.0);
        assert!(format!("{:?}", set).contains("approach_flag"));
    }
}
