pub mod geometry;
pub mod notice;
pub mod setup;
pub mod team;

pub use geometry::{ArenaBounds, Position, Rotation};
pub use notice::{GameNotice, TerminationReason};
pub use setup::{AgentSpec, MatchSetup};
pub use team::{AgentId, BaseId, Team};
