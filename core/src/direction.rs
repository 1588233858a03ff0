//! The four compass directions a border can point in.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions in their natural order.
    /// Random draws and serialization both index into this order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East  => Direction::West,
            Direction::West  => Direction::East,
        }
    }

    /// Slot of this direction in a city's border table.
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East  => "east",
            Direction::South => "south",
            Direction::West  => "west",
        }
    }

    /// Case-insensitive parse of a canonical direction name.
    pub fn parse(text: &str) -> SimResult<Direction> {
        match text.to_ascii_lowercase().as_str() {
            "north" => Ok(Direction::North),
            "east"  => Ok(Direction::East),
            "south" => Ok(Direction::South),
            "west"  => Ok(Direction::West),
            _ => Err(SimError::InvalidDirection { token: text.to_string() }),
        }
    }
}

impl FromStr for Direction {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::parse(s)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
