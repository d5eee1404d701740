//! Scenario Runner Library
//!
//! Replays a scripted JSON scenario (roster plus per-step contacts and agent
//! steps) through the rule engine on a headless host and summarizes the
//! outcome.
//!
//! ## Scenario format
//!
//! ```json
//! {
//!   "dt": 0.02,
//!   "ticks": [
//!     { "contacts": [{ "agent": 1, "target": { "kind": "flag" } }] },
//!     { "repeat": 100 },
//!     { "contacts": [{ "agent": 1, "target": { "kind": "base", "base": 1 } }] }
//!   ]
//! }
//! ```
//!
//! `setup` defaults to three agents per team (ids 1-3 and 101-103).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ctf_core::config::MatchConfig;
use ctf_core::engine::{EpisodeController, EpisodeMetrics, HeadlessHost, TickInput};
use ctf_core::models::{AgentId, GameNotice, MatchSetup};

fn default_dt() -> f32 {
    0.02
}

fn default_repeat() -> u32 {
    1
}

/// A scripted run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub setup: Option<MatchSetup>,
    /// Default step length in seconds
    #[serde(default = "default_dt")]
    pub dt: f32,
    pub ticks: Vec<ScriptedTick>,
}

/// One scripted step, optionally repeated with the same input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedTick {
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    /// Overrides the scenario `dt`
    #[serde(default)]
    pub dt: Option<f32>,
    #[serde(flatten)]
    pub input: TickInput,
}

/// Outcome of a scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub steps: u64,
    pub episodes: u32,
    pub matches_completed: u32,
    /// Current score `(a, b)`
    pub score: (u32, u32),
    /// Total reward per agent
    pub rewards: BTreeMap<AgentId, f32>,
    /// Events the engine rejected
    pub ignored: usize,
    pub notices: Vec<GameNotice>,
    pub episode_metrics: Vec<EpisodeMetrics>,
}

/// Load a scenario script from disk.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse scenario: {}", path.display()))
}

/// Load a config file, or fall back to defaults plus `CTF_SCORE_SCALE`.
pub fn load_config(path: Option<&Path>) -> Result<MatchConfig> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            MatchConfig::from_json_str(&json)
                .with_context(|| format!("Invalid config: {}", path.display()))
        }
        None => Ok(MatchConfig::from_env_or_default()),
    }
}

/// Run a scenario on a fresh headless host seeded with `seed`.
pub fn run_scenario(config: MatchConfig, scenario: &Scenario, seed: u64) -> Result<RunSummary> {
    let setup = scenario.setup.clone().unwrap_or_else(|| MatchSetup::symmetric(3));
    let mut host = HeadlessHost::new(seed);
    let mut controller = EpisodeController::new(config, &setup).context("Invalid match setup")?;
    controller.initialize(&mut host).context("Spawn validation failed")?;

    let mut notices = controller.take_report().notices;
    let mut ignored = 0;
    let mut steps = 0;

    for scripted in &scenario.ticks {
        let dt = scripted.dt.unwrap_or(scenario.dt);
        for _ in 0..scripted.repeat {
            let report = controller.step(dt, &scripted.input, &mut host);
            notices.extend(report.notices);
            ignored += report.ignored;
            steps += 1;
        }
    }
    tracing::debug!(steps, ignored, "scenario finished");

    Ok(RunSummary {
        steps,
        episodes: controller.state().episode().episode(),
        matches_completed: controller.matches_completed(),
        score: controller.state().scoreboard().scores(),
        rewards: host.ledger.totals().clone(),
        ignored,
        notices,
        episode_metrics: controller.history().cloned().collect(),
    })
}
