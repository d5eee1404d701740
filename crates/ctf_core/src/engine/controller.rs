//! EpisodeController - top-level state machine.
//!
//! ```text
//!  Uninitialized ──initialize──▶ Running ──┐      (spawn check failed)
//!        │                                 │  Active ──timeout/score──▶ Ended
//!        └─────────────────▶ Disabled      │    ▲                         │
//!                                          └────┴──── reset_delay ────────┘
//! ```
//!
//! The controller owns the `Match` and wires flag, roster, scoreboard and
//! reward dispatch together in response to reported contacts. Host
//! collaborators are passed in per call.
//!
//! ## Usage
//!
//! ```rust
//! use ctf_core::config::MatchConfig;
//! use ctf_core::engine::{Contact, EpisodeController, HeadlessHost, TickInput};
//! use ctf_core::models::{AgentId, MatchSetup};
//!
//! let mut host = HeadlessHost::new(42);
//! let mut controller =
//!     EpisodeController::new(MatchConfig::default(), &MatchSetup::symmetric(3)).unwrap();
//! controller.initialize(&mut host).unwrap();
//!
//! let input = TickInput::new().with_contact(Contact::flag(AgentId(1)));
//! let report = controller.step(0.02, &input, &mut host);
//! assert_eq!(report.reward_for(AgentId(1)), 0.5);
//! ```
//!
//! Runtime inconsistencies (capturing a held flag, scoring without the
//! flag, events during the restart delay) never change state; they come
//! back as `EventOutcome::Ignored` and are logged.

use std::collections::VecDeque;
use tracing::{debug, info, warn};

use super::host::Host;
use super::match_state::Match;
use super::reward::{AgentStep, EpisodeMetrics, RewardDelta, RewardDispatcher};
use super::tick::{ContactTag, EventOutcome, TickInput, TickReport};
use super::timer::Countdown;
use crate::config::{DropRespawn, MatchConfig};
use crate::error::{SetupError, TransitionError};
use crate::models::{AgentId, BaseId, GameNotice, MatchSetup, Position, Team, TerminationReason};

/// Finished-episode metrics kept for inspection.
const METRICS_HISTORY: usize = 64;

/// Whether the controller may run.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerState {
    /// Built, `initialize` not yet called
    Uninitialized,
    Running,
    /// Spawn validation failed; every event is refused
    Disabled(SetupError),
}

#[derive(Debug)]
pub struct EpisodeController {
    config: MatchConfig,
    state: Match,
    dispatcher: RewardDispatcher,
    restart: Countdown,
    lifecycle: ControllerState,
    metrics: EpisodeMetrics,
    history: VecDeque<EpisodeMetrics>,
    matches_completed: u32,
    report: TickReport,
}

impl EpisodeController {
    /// Validate config and roster. Setup errors are fatal: no controller is
    /// built.
    pub fn new(config: MatchConfig, setup: &MatchSetup) -> Result<Self, SetupError> {
        config.validate()?;
        let state = Match::new(setup, &config)?;
        let dispatcher = RewardDispatcher::new(config.rewards.clone());
        Ok(Self {
            config,
            state,
            dispatcher,
            restart: Countdown::default(),
            lifecycle: ControllerState::Uninitialized,
            metrics: EpisodeMetrics::default(),
            history: VecDeque::new(),
            matches_completed: 0,
            report: TickReport::default(),
        })
    }

    /// Replace the reward dispatcher (custom shaping terms).
    pub fn with_dispatcher(mut self, dispatcher: RewardDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    // ========== Lifecycle ==========

    /// Check spawn references against the arena and start the first
    /// episode. On failure the controller is disabled for good. Calling it
    /// again on a running controller does nothing.
    pub fn initialize<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<(), SetupError> {
        match &self.lifecycle {
            ControllerState::Disabled(err) => return Err(err.clone()),
            ControllerState::Running => {
                debug!("controller already initialized");
                return Ok(());
            }
            ControllerState::Uninitialized => {}
        }

        match self.validate_spawns(host) {
            Ok(flag_spawn) => {
                self.state.flag.set_spawn_position(flag_spawn);
                self.lifecycle = ControllerState::Running;
                info!(agents = self.state.roster.len(), "controller initialized");
                self.begin_episode(host);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "match setup rejected, controller disabled");
                self.lifecycle = ControllerState::Disabled(err.clone());
                Err(err)
            }
        }
    }

    fn validate_spawns<H: Host + ?Sized>(&self, host: &mut H) -> Result<Position, SetupError> {
        let arena = self.config.arena;
        let flag_spawn = host.flag_spawn_position();
        if !arena.contains(flag_spawn) {
            return Err(SetupError::SpawnOutOfBounds {
                what: "flag".to_string(),
                position: flag_spawn,
            });
        }
        for team in Team::ALL {
            let position = host.position_for(team);
            if !arena.contains(position) {
                return Err(SetupError::SpawnOutOfBounds { what: team.to_string(), position });
            }
        }
        Ok(flag_spawn)
    }

    /// Start a new episode now, cancelling any pending restart. An episode
    /// still in progress is closed first (`ForcedReset`).
    pub fn start_episode<H: Host + ?Sized>(&mut self, host: &mut H) -> EventOutcome {
        let result = self.ensure_running().map(|_| self.restart_now(host));
        self.outcome("start episode", result)
    }

    /// End the current episode (if any) and start a new one immediately.
    pub fn force_reset_episode<H: Host + ?Sized>(&mut self, host: &mut H) -> EventOutcome {
        let result = self.ensure_running().map(|_| self.restart_now(host));
        self.outcome("force reset", result)
    }

    fn restart_now<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.restart.cancel();
        if self.state.episode.is_active() {
            let score = self.state.scoreboard.scores();
            self.finish_episode(TerminationReason::ForcedReset, score, host);
        }
        self.begin_episode(host);
    }

    fn begin_episode<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.restart.cancel();
        let episode = self.state.episode.begin();

        self.state.agents.reset_all();
        self.state.flag.reset(&mut self.state.agents);

        for team in Team::ALL {
            let rotation = host.rotation_for(team);
            for &agent in self.state.roster.members(team) {
                let mut position = host.position_for(team);
                if !self.config.arena.contains(position) {
                    let clamped = self.config.arena.clamp(position);
                    warn!(%agent, %position, %clamped, "spawn outside arena, clamped");
                    position = clamped;
                }
                host.teleport_agent(agent, position, rotation);
            }
        }

        host.teleport_flag(self.state.flag.spawn_position());
        host.set_flag_active(true);

        self.metrics = EpisodeMetrics::new(episode);
        self.report.notices.push(GameNotice::EpisodeStarted { episode });
        info!(episode, "episode started");
    }

    /// Close the episode without scheduling the next one.
    fn finish_episode<H: Host + ?Sized>(
        &mut self,
        reason: TerminationReason,
        score: (u32, u32),
        host: &mut H,
    ) {
        self.state.episode.end();
        for agent in self.state.roster.all() {
            host.end_episode(agent);
        }

        let episode = self.state.episode.episode();
        let elapsed = self.state.episode.elapsed();
        self.metrics.set_termination(reason, score);
        let finished = std::mem::take(&mut self.metrics);
        if self.history.len() == METRICS_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(finished);

        self.report.notices.push(GameNotice::EpisodeEnded { episode, reason, elapsed });
        info!(episode, ?reason, elapsed, "episode ended");
    }

    /// Close the episode and schedule the restart after `reset_delay`.
    fn end_episode<H: Host + ?Sized>(
        &mut self,
        reason: TerminationReason,
        score: (u32, u32),
        host: &mut H,
    ) {
        self.finish_episode(reason, score, host);
        if self.config.reset_delay <= 0.0 {
            self.begin_episode(host);
        } else {
            self.restart.start(self.config.reset_delay);
        }
    }

    // ========== Time ==========

    /// Advance timers: episode clock, flag respawn countdown, pending
    /// restart.
    pub fn tick<H: Host + ?Sized>(&mut self, dt: f32, host: &mut H) -> EventOutcome {
        let result = self.try_tick(dt, host);
        self.outcome("tick", result)
    }

    fn try_tick<H: Host + ?Sized>(&mut self, dt: f32, host: &mut H) -> Result<(), TransitionError> {
        self.ensure_running()?;
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        if self.state.episode.is_active() {
            self.metrics.record_tick(dt);
            if self.state.flag.tick(dt) {
                self.flag_respawned(host);
            }
            if self.state.episode.advance(dt) {
                let deltas = self.dispatcher.episode_timeout(&self.state.roster);
                self.pay(deltas, host);
                info!(episode = self.state.episode.episode(), "episode timed out");
                let score = self.state.scoreboard.scores();
                self.end_episode(TerminationReason::TimeUp, score, host);
            }
        } else if self.restart.tick(dt) {
            self.begin_episode(host);
        }
        Ok(())
    }

    fn flag_respawned<H: Host + ?Sized>(&mut self, host: &mut H) {
        let position = self.state.flag.spawn_position();
        host.teleport_flag(position);
        host.set_flag_active(true);
        self.metrics.record_respawn();
        self.report.notices.push(GameNotice::FlagRespawned { position });
        debug!(%position, "flag respawned");
    }

    // ========== Events ==========

    /// An agent touched the flag.
    pub fn on_flag_captured<H: Host + ?Sized>(&mut self, agent: AgentId, host: &mut H) -> EventOutcome {
        let result = self.try_capture(agent, host);
        self.outcome("capture", result)
    }

    fn try_capture<H: Host + ?Sized>(&mut self, agent: AgentId, host: &mut H) -> Result<(), TransitionError> {
        self.ensure_active()?;
        let record = self.state.agents.get_mut(agent).ok_or(TransitionError::UnknownAgent(agent))?;
        let team = record.team;
        self.state.flag.capture(record)?;

        host.set_flag_active(false);
        let deltas = self.dispatcher.flag_captured(agent, team, &self.state.roster);
        self.pay(deltas, host);
        self.report.notices.push(GameNotice::FlagCaptured { agent, team });
        info!(%agent, %team, "flag captured");
        Ok(())
    }

    /// Two agents collided at `position`.
    pub fn on_opponent_collision<H: Host + ?Sized>(
        &mut self,
        a: AgentId,
        b: AgentId,
        position: Position,
        host: &mut H,
    ) -> EventOutcome {
        let result = self.try_collision(a, b, position, host);
        self.outcome("collision", result)
    }

    fn try_collision<H: Host + ?Sized>(
        &mut self,
        a: AgentId,
        b: AgentId,
        position: Position,
        host: &mut H,
    ) -> Result<(), TransitionError> {
        self.ensure_active()?;
        let team_a = self.state.roster.team_of(a).map_err(|_| TransitionError::UnknownAgent(a))?;
        let team_b = self.state.roster.team_of(b).map_err(|_| TransitionError::UnknownAgent(b))?;
        if team_a == team_b {
            return Err(TransitionError::SameTeam { agent: a, other: b });
        }

        host.repel(a, b);
        host.repel(b, a);

        let (carrier, stealer) = match self.state.flag.holder() {
            Some(holder) if holder == a => (a, b),
            Some(holder) if holder == b => (b, a),
            _ => return Ok(()),
        };

        let limit = self.config.max_collisions_before_drop;
        let record =
            self.state.agents.get_mut(carrier).ok_or(TransitionError::UnknownAgent(carrier))?;
        if !record.capabilities.supports_flag_drop {
            return Ok(());
        }
        record.collision_count += 1;
        if record.collision_count < limit {
            debug!(%carrier, %stealer, count = record.collision_count, "carrier hit");
            return Ok(());
        }
        record.collision_count = 0;

        let immediate = self.config.drop_respawn == DropRespawn::Immediate;
        if immediate {
            self.state.flag.force_respawn(&mut self.state.agents)?;
        } else {
            self.state.flag.drop(position, &mut self.state.agents)?;
        }

        let deltas = self.dispatcher.flag_stolen(carrier, stealer);
        self.pay(deltas, host);
        self.report.notices.push(GameNotice::FlagStolen { carrier, stealer, position });
        info!(%carrier, %stealer, %position, "flag knocked loose");
        if immediate {
            self.flag_respawned(host);
        }
        Ok(())
    }

    /// An agent touched a base.
    pub fn on_score_attempt<H: Host + ?Sized>(
        &mut self,
        agent: AgentId,
        base: BaseId,
        host: &mut H,
    ) -> EventOutcome {
        let result = self.try_score(agent, base, host);
        self.outcome("score", result)
    }

    fn try_score<H: Host + ?Sized>(
        &mut self,
        agent: AgentId,
        base: BaseId,
        host: &mut H,
    ) -> Result<(), TransitionError> {
        self.ensure_active()?;
        let record = self.state.agents.get_mut(agent).ok_or(TransitionError::UnknownAgent(agent))?;
        if record.home_base != base {
            return Err(TransitionError::NotAtHomeBase { agent, base });
        }
        let team = record.team;
        self.state.flag.score_attempt(record)?;
        record.collision_count = 0;

        let complete = self.state.scoreboard.record_score(team);
        let (score_a, score_b) = self.state.scoreboard.scores();

        let deltas = self.dispatcher.point_scored(agent, team, &self.state.roster);
        self.pay(deltas, host);
        self.report.notices.push(GameNotice::PointScored { agent, team, score_a, score_b });
        info!(%agent, %team, score_a, score_b, "point scored");

        if complete {
            self.report.notices.push(GameNotice::MatchComplete { winner: team, score_a, score_b });
            info!(winner = %team, score_a, score_b, "match complete");
            self.state.scoreboard.reset();
            self.matches_completed += 1;
            self.end_episode(TerminationReason::MatchComplete, (score_a, score_b), host);
        } else {
            self.end_episode(TerminationReason::PointScored, (score_a, score_b), host);
        }
        Ok(())
    }

    /// Generic drop: the carrier lost the flag at `position` and every
    /// agent pays the broadcast penalty.
    pub fn on_flag_dropped<H: Host + ?Sized>(&mut self, position: Position, host: &mut H) -> EventOutcome {
        let result = self.try_drop(position, host);
        self.outcome("drop", result)
    }

    fn try_drop<H: Host + ?Sized>(&mut self, position: Position, host: &mut H) -> Result<(), TransitionError> {
        self.ensure_active()?;
        let immediate = self.config.drop_respawn == DropRespawn::Immediate;
        let carrier = if immediate {
            let holder = self.state.flag.holder().ok_or(TransitionError::InvalidTransition {
                op: "drop",
                from: self.state.flag.phase(),
            })?;
            self.state.flag.force_respawn(&mut self.state.agents)?;
            holder
        } else {
            self.state.flag.drop(position, &mut self.state.agents)?
        };
        if let Some(record) = self.state.agents.get_mut(carrier) {
            record.collision_count = 0;
        }

        self.metrics.record_drop();
        let deltas = self.dispatcher.drop_broadcast(&self.state.roster);
        self.pay(deltas, host);
        self.report.notices.push(GameNotice::FlagDropped { carrier, position });
        info!(%carrier, %position, "flag dropped");
        if immediate {
            self.flag_respawned(host);
        }
        Ok(())
    }

    /// One tick of sustained wall contact.
    pub fn on_wall_contact<H: Host + ?Sized>(&mut self, agent: AgentId, host: &mut H) -> EventOutcome {
        let result = self.ensure_active().and_then(|_| {
            if !self.state.roster.contains(agent) {
                return Err(TransitionError::UnknownAgent(agent));
            }
            let deltas = self.dispatcher.wall_contact(agent);
            self.pay(deltas, host);
            Ok(())
        });
        self.outcome("wall contact", result)
    }

    /// Dense shaping for one agent's step report.
    pub fn on_agent_step<H: Host + ?Sized>(&mut self, step: &AgentStep, host: &mut H) -> EventOutcome {
        let result = self.try_agent_step(step, host);
        self.outcome("agent step", result)
    }

    fn try_agent_step<H: Host + ?Sized>(&mut self, step: &AgentStep, host: &mut H) -> Result<(), TransitionError> {
        self.ensure_active()?;
        let elapsed = self.state.episode.elapsed();
        let record =
            self.state.agents.get(step.agent).ok_or(TransitionError::UnknownAgent(step.agent))?;
        let deltas = self.dispatcher.agent_step(record, step, elapsed - record.last_step_at);

        if let Some(record) = self.state.agents.get_mut(step.agent) {
            record.last_flag_distance =
                if record.has_flag { None } else { Some(step.flag_distance()) };
            record.last_step_at = elapsed;
        }
        self.pay(deltas, host);
        Ok(())
    }

    /// One simulation step: timers first, then contacts in processing
    /// order, then shaping steps.
    ///
    /// Every event in `input` belongs to the episode running after the
    /// timers advance. Once that episode ends (score, match complete) the
    /// rest of the step is dropped, even if `reset_delay` is zero and the
    /// next episode has already begun.
    pub fn step<H: Host + ?Sized>(&mut self, dt: f32, input: &TickInput, host: &mut H) -> TickReport {
        if let Err(err) = self.ensure_running() {
            self.ignore("step", err);
            return self.take_report();
        }

        self.tick(dt, host);
        let episode = self.state.episode.is_active().then(|| self.state.episode.episode());
        let contacts = input.ordered_contacts();
        let total = contacts.len() + input.steps.len();
        let mut handled = 0;

        for contact in contacts {
            if self.episode_closed_since(episode) {
                break;
            }
            handled += 1;
            match contact.target {
                ContactTag::Flag => {
                    self.on_flag_captured(contact.agent, host);
                }
                ContactTag::Base { base } => {
                    let carrying =
                        self.state.agents.get(contact.agent).is_some_and(|r| r.has_flag);
                    if carrying {
                        self.on_score_attempt(contact.agent, base, host);
                    }
                }
                ContactTag::Agent { other } => {
                    self.on_opponent_collision(contact.agent, other, contact.position, host);
                }
                ContactTag::Wall => {
                    self.on_wall_contact(contact.agent, host);
                }
            }
        }
        for step in &input.steps {
            if self.episode_closed_since(episode) {
                break;
            }
            handled += 1;
            self.on_agent_step(step, host);
        }
        if handled < total {
            debug!(skipped = total - handled, "episode ended mid-step, remaining events dropped");
        }
        self.take_report()
    }

    /// Whether `episode` (active when the step began) is over.
    fn episode_closed_since(&self, episode: Option<u32>) -> bool {
        episode.is_some_and(|episode| {
            !self.state.episode.is_active() || self.state.episode.episode() != episode
        })
    }

    // ========== Helpers ==========

    fn ensure_running(&self) -> Result<(), TransitionError> {
        match &self.lifecycle {
            ControllerState::Running => Ok(()),
            ControllerState::Uninitialized => Err(TransitionError::NotInitialized),
            ControllerState::Disabled(err) => Err(TransitionError::ControllerDisabled(err.clone())),
        }
    }

    fn ensure_active(&self) -> Result<(), TransitionError> {
        self.ensure_running()?;
        if !self.state.episode.is_active() {
            return Err(TransitionError::EpisodeNotActive);
        }
        Ok(())
    }

    fn pay<H: Host + ?Sized>(&mut self, deltas: Vec<RewardDelta>, host: &mut H) {
        RewardDispatcher::apply(&deltas, host);
        self.metrics.record_rewards(&deltas, &self.state.roster);
        self.report.rewards.extend(deltas);
    }

    fn outcome(&mut self, op: &'static str, result: Result<(), TransitionError>) -> EventOutcome {
        match result {
            Ok(()) => EventOutcome::Applied,
            Err(err) => {
                self.ignore(op, err.clone());
                EventOutcome::Ignored(err)
            }
        }
    }

    fn ignore(&mut self, op: &'static str, err: TransitionError) {
        if err.is_expected() {
            debug!(op, %err, "event ignored");
        } else {
            warn!(op, %err, "event rejected");
        }
        self.report.ignored += 1;
    }

    // ========== Accessors ==========

    /// Notices and rewards accumulated since the last call.
    pub fn take_report(&mut self) -> TickReport {
        std::mem::take(&mut self.report)
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn state(&self) -> &Match {
        &self.state
    }

    pub fn lifecycle(&self) -> &ControllerState {
        &self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == ControllerState::Running
    }

    /// Seconds until a scheduled restart.
    pub fn restart_pending(&self) -> Option<f32> {
        self.restart.remaining()
    }

    /// Metrics of the episode in progress.
    pub fn metrics(&self) -> &EpisodeMetrics {
        &self.metrics
    }

    /// Metrics of recently finished episodes, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &EpisodeMetrics> {
        self.history.iter()
    }

    pub fn matches_completed(&self) -> u32 {
        self.matches_completed
    }
}
