//! Rule engine: flag lifecycle, roster, scoreboard, rewards and the episode
//! controller, plus the host interfaces it drives.

pub mod controller;
pub mod episode;
pub mod flag;
pub mod headless;
pub mod host;
pub mod match_state;
pub mod reward;
pub mod roster;
pub mod scoreboard;
pub mod tick;
pub mod timer;

#[cfg(test)]
mod scenario_tests;

pub use controller::{ControllerState, EpisodeController};
pub use episode::{EpisodeState, EpisodeStatus};
pub use flag::{FlagLifecycle, FlagPhase, FlagStatus};
pub use headless::{
    HeadlessHost, RecordingWorld, RectSpawnProvider, RewardLedger, SpawnArea, WorldCommand,
};
pub use host::{Host, RewardSink, SpawnProvider, WorldBridge};
pub use match_state::Match;
pub use reward::{
    AgentStep, EpisodeMetrics, RewardCause, RewardDelta, RewardDispatcher, ShapingSet, ShapingTerm,
};
pub use roster::{AgentCapabilities, AgentRecord, AgentRecords, TeamRoster};
pub use scoreboard::ScoreBoard;
pub use tick::{Contact, ContactTag, EventOutcome, TickInput, TickReport};
pub use timer::Countdown;
