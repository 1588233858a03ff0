//! Snapshot serialization — full simulation state to JSON.
//!
//! Taken at the end of a run for machine-readable reporting. It
//! captures every surviving city with its borders and every alien the
//! engine has ever landed.

use crate::{
    alien::AlienState,
    direction::Direction,
    types::{AlienId, Iteration},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub seed:      u64,
    pub iteration: Iteration,
    pub cities:    Vec<CitySnapshot>,
    pub aliens:    Vec<AlienSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub name:     String,
    pub occupant: Option<AlienId>,
    pub borders:  BTreeMap<Direction, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlienSnapshot {
    pub id:    AlienId,
    pub state: AlienState,
    /// Last city the alien stood in. May name a destroyed city.
    pub city:  String,
    pub steps: u64,
}
