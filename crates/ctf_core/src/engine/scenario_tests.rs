//! End-to-end match scenarios driven through `EpisodeController::step`.

use proptest::prelude::*;

use super::*;
use crate::config::MatchConfig;
use crate::models::{AgentId, BaseId, GameNotice, MatchSetup, Position, Team, TerminationReason};

const A1: AgentId = AgentId(1);
const A2: AgentId = AgentId(2);
const A3: AgentId = AgentId(3);
const B1: AgentId = AgentId(101);
const B2: AgentId = AgentId(102);
const BASE_A: BaseId = BaseId(1);
const BASE_B: BaseId = BaseId(2);

const DT: f32 = 0.02;

fn start(config: MatchConfig) -> (EpisodeController, HeadlessHost) {
    let mut host = HeadlessHost::new(2024);
    let mut controller = EpisodeController::new(config, &MatchSetup::symmetric(3)).unwrap();
    controller.initialize(&mut host).unwrap();
    controller.take_report();
    (controller, host)
}

fn contact(controller: &mut EpisodeController, host: &mut HeadlessHost, c: Contact) -> TickReport {
    controller.step(DT, &TickInput::new().with_contact(c), host)
}

fn assert_close(actual: f32, expected: f32) {
    assert!((actual - expected).abs() < 1e-5, "expected {}, got {}", expected, actual);
}

// ========== Scenarios ==========

#[test]
fn scenario_capture_from_rest() {
    let (mut controller, mut host) = start(MatchConfig::default());
    let report = contact(&mut controller, &mut host, Contact::flag(A1));

    assert_eq!(controller.state().flag().status(), FlagStatus::Held { holder: A1 });
    assert!(controller.state().agents().get(A1).unwrap().has_flag);
    assert_close(report.reward_for(A1), 0.5);
    assert_close(report.reward_for(A2), 0.2);
    assert_close(report.reward_for(A3), 0.2);
    for b in controller.state().roster().members(Team::B).to_vec() {
        assert_close(report.reward_for(b), -0.2);
    }
    assert_eq!(report.notices, vec![GameNotice::FlagCaptured { agent: A1, team: Team::A }]);
}

#[test]
fn scenario_score_then_restart_after_delay() {
    let (mut controller, mut host) = start(MatchConfig::default());
    contact(&mut controller, &mut host, Contact::flag(A1));
    let report = contact(&mut controller, &mut host, Contact::base(A1, BASE_A));

    assert_eq!(controller.state().scoreboard().scores(), (1, 0));
    assert!(controller.state().flag().is_at_rest());
    assert!(!controller.state().agents().get(A1).unwrap().has_flag);
    assert!(!controller.state().episode().is_active());
    assert_close(report.reward_for(A1), 3.0);
    assert_close(report.reward_for(A2), 2.0);
    assert_close(report.reward_for(B2), -1.0);
    assert_eq!(host.ledger.episodes_ended(B1), 1);

    // Restart waits for reset_delay (2 s)
    controller.step(1.0, &TickInput::new(), &mut host);
    assert!(!controller.state().episode().is_active());
    let report = controller.step(1.0, &TickInput::new(), &mut host);
    assert!(controller.state().episode().is_active());
    assert_eq!(controller.state().episode().episode(), 2);
    assert_eq!(report.notices, vec![GameNotice::EpisodeStarted { episode: 2 }]);

    // Score survives the episode boundary
    assert_eq!(controller.state().scoreboard().scores(), (1, 0));
}

#[test]
fn scenario_second_collision_drops_flag() {
    let (mut controller, mut host) = start(MatchConfig::default());
    contact(&mut controller, &mut host, Contact::flag(A1));

    let hit = Position::new(3.0, 0.5, -2.0);
    let report = contact(&mut controller, &mut host, Contact::agent(A1, B1, hit));
    assert!(report.rewards.is_empty());
    assert_eq!(controller.state().flag().holder(), Some(A1));
    assert_eq!(controller.state().agents().get(A1).unwrap().collision_count, 1);

    let report = contact(&mut controller, &mut host, Contact::agent(B1, A1, hit));
    assert_eq!(
        controller.state().flag().status(),
        FlagStatus::Dropped { position: hit, countdown: 5.0 }
    );
    assert!(!controller.state().agents().get(A1).unwrap().has_flag);
    assert_close(report.reward_for(A1), -1.0);
    assert_close(report.reward_for(B1), 1.5);
    assert_eq!(report.rewards.len(), 2);
    assert_eq!(controller.state().agents().get(A1).unwrap().collision_count, 0);

    // Uncollectable while dropped, back at spawn once the countdown runs out
    let report = contact(&mut controller, &mut host, Contact::flag(B2));
    assert_eq!(report.ignored, 1);
    controller.step(5.0, &TickInput::new(), &mut host);
    assert!(controller.state().flag().is_at_rest());
    assert!(host.world.flag_active);
    assert_eq!(host.world.flag_position, Some(controller.state().flag().spawn_position()));
}

#[test]
fn scenario_symmetric_reports_count_once() {
    let (mut controller, mut host) = start(MatchConfig::default());
    contact(&mut controller, &mut host, Contact::flag(A1));

    let input = TickInput::new()
        .with_contact(Contact::agent(A1, B1, Position::ORIGIN))
        .with_contact(Contact::agent(B1, A1, Position::ORIGIN));
    controller.step(DT, &input, &mut host);

    assert_eq!(controller.state().flag().holder(), Some(A1));
    assert_eq!(controller.state().agents().get(A1).unwrap().collision_count, 1);
}

#[test]
fn scenario_timeout_penalizes_everyone() {
    let config = MatchConfig { episode_timeout: 1.0, ..MatchConfig::default() };
    let (mut controller, mut host) = start(config);

    controller.step(0.5, &TickInput::new(), &mut host);
    let report = controller.step(0.5, &TickInput::new(), &mut host);

    assert_eq!(report.rewards.len(), 6);
    for agent in controller.state().roster().all() {
        assert_close(report.reward_for(agent), -0.1);
    }
    assert_eq!(controller.state().episode().status(), EpisodeStatus::Ended);
    assert_eq!(
        controller.history().last().unwrap().termination_reason,
        TerminationReason::TimeUp
    );

    controller.step(2.0, &TickInput::new(), &mut host);
    assert!(controller.state().episode().is_active());
    assert_eq!(controller.state().episode().elapsed(), 0.0);
}

#[test]
fn scenario_match_complete_resets_scores() {
    let config = MatchConfig { max_score: 2, ..MatchConfig::default() };
    let (mut controller, mut host) = start(config);

    for round in 0..2 {
        contact(&mut controller, &mut host, Contact::flag(B2));
        let report = contact(&mut controller, &mut host, Contact::base(B2, BASE_B));
        if round == 0 {
            assert_eq!(controller.state().scoreboard().scores(), (0, 1));
        } else {
            assert!(report.notices.contains(&GameNotice::MatchComplete {
                winner: Team::B,
                score_a: 0,
                score_b: 2
            }));
        }
        controller.step(2.0, &TickInput::new(), &mut host);
        assert!(controller.state().episode().is_active());
    }

    assert_eq!(controller.state().scoreboard().scores(), (0, 0));
    assert_eq!(controller.matches_completed(), 1);
    assert_eq!(controller.state().episode().episode(), 3);
    let finished = controller.history().last().unwrap();
    assert_eq!(finished.termination_reason, TerminationReason::MatchComplete);
    assert_eq!(finished.final_score, (0, 2));
}

// ========== Ordering & edge cases ==========

#[test]
fn capture_and_score_in_one_step() {
    let (mut controller, mut host) = start(MatchConfig::default());
    // Flag and base share a class; report order decides
    let input = TickInput::new()
        .with_contact(Contact::flag(A1))
        .with_contact(Contact::base(A1, BASE_A));
    let report = controller.step(DT, &input, &mut host);

    assert_eq!(controller.state().scoreboard().scores(), (1, 0));
    assert_close(report.reward_for(A1), 0.5 + 3.0);
}

#[test]
fn events_after_score_stay_in_their_episode() {
    let config = MatchConfig { reset_delay: 0.0, ..MatchConfig::default() };
    let (mut controller, mut host) = start(config);
    let step = AgentStep {
        agent: B1,
        position: Position::new(10.0, 0.5, 0.0),
        flag_position: Position::new(0.0, 0.5, 0.0),
        home_position: Position::new(15.0, 0.0, 0.0),
    };
    let input = TickInput::new()
        .with_contact(Contact::flag(A1))
        .with_contact(Contact::base(A1, BASE_A))
        .with_contact(Contact::wall(B1))
        .with_step(step);
    let report = controller.step(DT, &input, &mut host);

    // Next episode already running, but the wall hit and step were not charged to it
    assert_eq!(controller.state().episode().episode(), 2);
    assert!(controller.state().episode().is_active());
    assert_eq!(controller.metrics().wall_contacts, 0);
    assert_eq!(report.ignored, 0);
    assert_close(report.reward_for(B1), -0.2 - 1.0);
    assert!(controller.state().agents().get(B1).unwrap().last_flag_distance.is_none());

    let finished = controller.history().last().unwrap();
    assert_eq!(finished.termination_reason, TerminationReason::PointScored);
    assert_eq!(finished.wall_contacts, 0);

    // The following step is processed normally
    let report = contact(&mut controller, &mut host, Contact::wall(B1));
    assert_close(report.reward_for(B1), -0.05);
    assert_eq!(controller.metrics().wall_contacts, 1);
}

#[test]
fn base_touch_without_flag_is_silent() {
    let (mut controller, mut host) = start(MatchConfig::default());
    let report = contact(&mut controller, &mut host, Contact::base(A2, BASE_A));
    assert!(report.is_empty());
}

#[test]
fn events_during_restart_delay_are_ignored() {
    let (mut controller, mut host) = start(MatchConfig::default());
    contact(&mut controller, &mut host, Contact::flag(A1));
    contact(&mut controller, &mut host, Contact::base(A1, BASE_A));

    let report = contact(&mut controller, &mut host, Contact::flag(B1));
    assert_eq!(report.ignored, 1);
    assert!(report.rewards.is_empty());
    assert!(controller.state().flag().is_at_rest());
}

#[test]
fn start_episode_resets_everything() {
    let (mut controller, mut host) = start(MatchConfig::default());
    contact(&mut controller, &mut host, Contact::flag(A1));
    contact(&mut controller, &mut host, Contact::agent(A1, B1, Position::ORIGIN));

    assert!(controller.start_episode(&mut host).is_applied());
    let state = controller.state();
    assert!(state.flag().is_at_rest());
    assert!(state.agents().iter().all(|r| !r.has_flag && r.collision_count == 0));
    assert_eq!(host.world.flag_position, Some(state.flag().spawn_position()));
    assert!(host.world.flag_active);
}

#[test]
fn shaping_steps_run_after_contacts() {
    let (mut controller, mut host) = start(MatchConfig::default());
    let step = AgentStep {
        agent: A1,
        position: Position::new(-10.0, 0.5, 0.0),
        flag_position: Position::new(0.0, 0.5, 0.0),
        home_position: Position::new(-10.0, 0.0, 0.0),
    };
    let input = TickInput::new().with_contact(Contact::flag(A1)).with_step(step);
    let report = controller.step(1.0, &input, &mut host);

    // Carrying half a unit from home: near-full carry bonus, no approach bonus
    let causes: Vec<_> = report.rewards.iter().filter(|d| d.agent == A1).map(|d| d.cause).collect();
    assert_eq!(causes, vec![RewardCause::Capture, RewardCause::StepPenalty, RewardCause::CarryHome]);
    assert_close(report.reward_for(A1), 0.5 - 0.01 + 0.002 * (1.0 - 0.5 / 20.0));
}

// ========== Properties ==========

#[derive(Debug, Clone)]
enum Op {
    Tick(f32),
    Capture(usize),
    Collide(usize, usize),
    Score(usize, u32),
    Drop,
    Wall(usize),
    ForceReset,
}

// Index 6 is an agent the roster does not know.
const AGENTS: [AgentId; 7] =
    [AgentId(1), AgentId(2), AgentId(3), AgentId(101), AgentId(102), AgentId(103), AgentId(999)];

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.0f32..3.0).prop_map(Op::Tick),
        (0usize..7).prop_map(Op::Capture),
        (0usize..7, 0usize..7).prop_map(|(a, b)| Op::Collide(a, b)),
        (0usize..7, 1u32..3).prop_map(|(a, base)| Op::Score(a, base)),
        Just(Op::Drop),
        (0usize..7).prop_map(Op::Wall),
        Just(Op::ForceReset),
    ]
}

fn apply(controller: &mut EpisodeController, host: &mut HeadlessHost, op: &Op) {
    match *op {
        Op::Tick(dt) => {
            controller.tick(dt, host);
        }
        Op::Capture(i) => {
            controller.on_flag_captured(AGENTS[i], host);
        }
        Op::Collide(a, b) => {
            controller.on_opponent_collision(AGENTS[a], AGENTS[b], Position::ORIGIN, host);
        }
        Op::Score(i, base) => {
            controller.on_score_attempt(AGENTS[i], BaseId(base), host);
        }
        Op::Drop => {
            controller.on_flag_dropped(Position::new(1.0, 0.5, 1.0), host);
        }
        Op::Wall(i) => {
            controller.on_wall_contact(AGENTS[i], host);
        }
        Op::ForceReset => {
            controller.force_reset_episode(host);
        }
    }
}

proptest! {
    /// Property: at most one carrier, and it is the flag holder
    #[test]
    fn prop_possession_invariant_holds(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let config = MatchConfig { max_score: 3, episode_timeout: 20.0, ..MatchConfig::default() };
        let (mut controller, mut host) = start(config);

        for op in &ops {
            apply(&mut controller, &mut host, op);
            prop_assert!(controller.state().check_possession_invariant(), "after {:?}", op);
            prop_assert!(controller.state().agents().flag_holders().len() <= 1);
        }
    }

    /// Property: scores never decrease except at match completion, and never
    /// sit at or above max_score
    #[test]
    fn prop_scores_monotone(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let config = MatchConfig { max_score: 3, ..MatchConfig::default() };
        let (mut controller, mut host) = start(config);
        let mut last = controller.state().scoreboard().scores();
        let mut matches = 0;

        for op in &ops {
            apply(&mut controller, &mut host, op);
            let now = controller.state().scoreboard().scores();
            if controller.matches_completed() == matches {
                prop_assert!(now.0 >= last.0 && now.1 >= last.1, "{:?} -> {:?}", last, now);
            } else {
                prop_assert_eq!(now, (0, 0));
                matches = controller.matches_completed();
            }
            prop_assert!(now.0 < 3 && now.1 < 3);
            last = now;
        }
    }

    /// Property: dropping a flag that is not held changes nothing
    #[test]
    fn prop_drop_is_idempotent(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (mut controller, mut host) = start(MatchConfig::default());
        for op in &ops {
            apply(&mut controller, &mut host, op);
        }
        controller.take_report();

        if controller.state().flag().holder().is_none() {
            let before = controller.state().flag().clone();
            let paid = host.ledger.history.len();
            let outcome = controller.on_flag_dropped(Position::ORIGIN, &mut host);
            prop_assert!(!outcome.is_applied());
            prop_assert_eq!(controller.state().flag(), &before);
            prop_assert_eq!(host.ledger.history.len(), paid);
        }
    }
}
