use serde::{Deserialize, Serialize};
use std::fmt;

/// Team side. Fixed per agent for the lifetime of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    /// Both sides in canonical processing order (A first).
    pub const ALL: [Team; 2] = [Team::A, Team::B];

    /// The opposing side.
    pub fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    /// Stable array index (A = 0, B = 1).
    pub fn index(self) -> usize {
        match self {
            Team::A => 0,
            Team::B => 1,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Team::A => write!(f, "Team A"),
            Team::B => write!(f, "Team B"),
        }
    }
}

/// Agent identity, resolved once at match setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Opaque home-base handle. The world layer owns the actual base object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseId(pub u32);

impl fmt::Display for BaseId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "base#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_involution() {
        for team in Team::ALL {
            assert_ne!(team, team.opponent());
            assert_eq!(team, team.opponent().opponent());
        }
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        assert_eq!(serde_json::to_string(&AgentId(7)).unwrap(), "7");
        assert_eq!(serde_json::from_str::<BaseId>("3").unwrap(), BaseId(3));
        assert_eq!(serde_json::to_string(&Team::B).unwrap(), "\"B\"");
    }
}
