use serde::{Deserialize, Serialize};

/// Episode phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeStatus {
    Active,
    Ended,
}

/// Episode clock. Starts `Ended` until the controller begins the first
/// episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeState {
    status: EpisodeStatus,
    elapsed: f32,
    timeout: f32,
    episode: u32,
}

impl EpisodeState {
    pub fn new(timeout: f32) -> Self {
        Self { status: EpisodeStatus::Ended, elapsed: 0.0, timeout, episode: 0 }
    }

    /// Start the next episode. Returns its number (1-based).
    pub fn begin(&mut self) -> u32 {
        self.episode += 1;
        self.elapsed = 0.0;
        self.status = EpisodeStatus::Active;
        self.episode
    }

    /// Advance the clock. Returns `true` when the timeout is reached.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.status != EpisodeStatus::Active {
            return false;
        }
        self.elapsed += dt;
        self.elapsed >= self.timeout
    }

    pub fn end(&mut self) {
        self.status = EpisodeStatus::Ended;
    }

    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == EpisodeStatus::Active
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn timeout(&self) -> f32 {
        self.timeout
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout() {
        let mut state = EpisodeState::new(1.0);
        assert!(!state.advance(5.0));

        assert_eq!(state.begin(), 1);
        assert!(!state.advance(0.6));
        assert!(state.advance(0.4));

        state.end();
        assert!(!state.is_active());
        assert_eq!(state.begin(), 2);
        assert_eq!(state.elapsed(), 0.0);
    }
}
