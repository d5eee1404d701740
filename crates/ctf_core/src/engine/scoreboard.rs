use serde::{Deserialize, Serialize};

use crate::models::Team;

/// Per-team point totals for the current match.
///
/// Scores only increase by one per scoring event and only reset when the
/// match completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    score_a: u32,
    score_b: u32,
    max_score: u32,
}

impl ScoreBoard {
    pub fn new(max_score: u32) -> Self {
        Self { score_a: 0, score_b: 0, max_score }
    }

    /// Add one point to `team`. Returns `true` when that team reached
    /// `max_score`, which completes the match.
    pub fn record_score(&mut self, team: Team) -> bool {
        let score = match team {
            Team::A => &mut self.score_a,
            Team::B => &mut self.score_b,
        };
        *score += 1;
        *score >= self.max_score
    }

    pub fn score(&self, team: Team) -> u32 {
        match team {
            Team::A => self.score_a,
            Team::B => self.score_b,
        }
    }

    /// `(score_a, score_b)`
    pub fn scores(&self) -> (u32, u32) {
        (self.score_a, self.score_b)
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    /// Team strictly ahead, if any.
    pub fn leader(&self) -> Option<Team> {
        match self.score_a.cmp(&self.score_b) {
            std::cmp::Ordering::Greater => Some(Team::A),
            std::cmp::Ordering::Less => Some(Team::B),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn reset(&mut self) {
        self.score_a = 0;
        self.score_b = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_until_max() {
        let mut board = ScoreBoard::new(3);
        assert!(!board.record_score(Team::A));
        assert!(!board.record_score(Team::B));
        assert!(!board.record_score(Team::A));
        assert_eq!(board.scores(), (2, 1));
        assert_eq!(board.leader(), Some(Team::A));
        assert!(board.record_score(Team::A));
        assert_eq!(board.score(Team::A), 3);
    }

    #[test]
    fn test_reset() {
        let mut board = ScoreBoard::new(1);
        assert!(board.record_score(Team::B));
        board.reset();
        assert_eq!(board.scores(), (0, 0));
        assert_eq!(board.leader(), None);
        assert_eq!(board.max_score(), 1);
    }
}
