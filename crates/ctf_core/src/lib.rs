//! # ctf_core - Capture-the-Flag Rule Engine
//!
//! Rule engine for a two-team capture-the-flag simulation used to train
//! autonomous agents. Tracks flag possession, scoring and episode timing,
//! and turns game events into per-agent reward deltas.
//!
//! ## Features
//! - Typed flag and episode state machines
//! - Configurable reward table and dense shaping terms
//! - Host-agnostic: physics, spawns and learning run behind traits
//! - Deterministic headless host (same seed = same spawns)

pub mod config;
pub mod engine;
pub mod error;
pub mod models;

pub use config::{MatchConfig, RewardConfig, ScoreScale};
pub use engine::{EpisodeController, HeadlessHost, TickInput, TickReport};
pub use error::{MatchError, Result, SetupError, TransitionError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
