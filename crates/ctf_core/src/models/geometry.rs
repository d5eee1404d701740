//! World-space value types shared with the physics layer.
//!
//! The core never integrates motion. It only stores the canonical flag spawn,
//! checks spawn references against the arena bounds and measures distances
//! for reward shaping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// World position (meters). `y` is up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance.
    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Heading around the vertical axis, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw_deg: f32,
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation { yaw_deg: 0.0 };

    pub fn from_yaw(yaw_deg: f32) -> Self {
        Self { yaw_deg }
    }
}

/// Axis-aligned arena box. Every spawn reference must lie inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub min: Position,
    pub max: Position,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            min: Position::new(-25.0, -1.0, -25.0),
            max: Position::new(25.0, 10.0, 25.0),
        }
    }
}

impl ArenaBounds {
    pub fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    /// Inclusive containment check. Non-finite positions are never inside.
    pub fn contains(&self, p: Position) -> bool {
        p.is_finite()
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Nearest point inside the box. Non-finite components go to the
    /// center of their axis.
    pub fn clamp(&self, p: Position) -> Position {
        fn axis(v: f32, lo: f32, hi: f32) -> f32 {
            if v.is_finite() {
                v.clamp(lo, hi)
            } else {
                (lo + hi) * 0.5
            }
        }
        Position::new(
            axis(p.x, self.min.x, self.max.x),
            axis(p.y, self.min.y, self.max.y),
            axis(p.z, self.min.z, self.max.z),
        )
    }

    /// Whether `min` is strictly below `max` on every axis.
    pub fn is_well_formed(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.x < self.max.x
            && self.min.y < self.max.y
            && self.min.z < self.max.z
    }
}
