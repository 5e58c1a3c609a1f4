//! Core type definitions

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Which edge(s) of the grid a border mutation applies to
///
/// Placements combine with `|`, e.g. `BorderPlacement::TOP | BorderPlacement::BOTTOM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderPlacement(pub i32);

impl BorderPlacement {
    pub const TOP: Self = Self(1);
    pub const BOTTOM: Self = Self(2);
    pub const RIGHT: Self = Self(4);
    pub const LEFT: Self = Self(8);
    pub const UNKNOWN: Self = Self(16);

    pub const fn new(bits: i32) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> i32 {
        self.0
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parse a placement name (`top`, `bottom`, `right`, `left`, `unknown`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "top" => Some(Self::TOP),
            "bottom" => Some(Self::BOTTOM),
            "right" => Some(Self::RIGHT),
            "left" => Some(Self::LEFT),
            "unknown" => Some(Self::UNKNOWN),
            _ => None,
        }
    }
}

impl BitOr for BorderPlacement {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for BorderPlacement {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<i32> for BorderPlacement {
    fn from(bits: i32) -> Self {
        Self(bits)
    }
}

/// Roll, pitch and yaw as stored by the server
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Orientation {
    pub const fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }
}

impl From<(f64, f64, f64)> for Orientation {
    fn from((roll, pitch, yaw): (f64, f64, f64)) -> Self {
        Self { roll, pitch, yaw }
    }
}

/// Which received frames the client acknowledges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckMode {
    /// ACK only `CONTINUE` frames; an N-frame response costs N-1 ACKs
    #[default]
    ContinueOnly,

    /// ACK every frame including the terminal one
    ///
    /// The reference map server blocks for an ACK after each frame it sends,
    /// including the last, so talking to it requires this mode
    /// (`ackmode = every` in an options file).
    EveryFrame,
}

impl AckMode {
    /// Parse the option file spelling (`continue` / `every`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "continue" | "continueonly" | "continue_only" => Some(AckMode::ContinueOnly),
            "every" | "everyframe" | "every_frame" | "all" => Some(AckMode::EveryFrame),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AckMode::ContinueOnly => "continue",
            AckMode::EveryFrame => "every",
        }
    }
}
