//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One simulation iteration. Every active alien moves once per iteration.
pub type Iteration = u64;

/// Stable handle to a city inside a `CityMap`.
/// Handles are assigned in insertion order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CityId(pub usize);

/// Alien identity. Assigned by the engine, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlienId(pub u64);

impl fmt::Display for AlienId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
