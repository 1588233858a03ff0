//! The event log — every state change of a run, in order.
//!
//! RULE: The engine records an event for every observable change.
//! Reporting layers render events; they never inspect engine internals
//! to reconstruct what happened.

use crate::{
    direction::Direction,
    types::{AlienId, Iteration},
};
use serde::{Deserialize, Serialize};

/// Every event emitted during a simulation.
/// Variants are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Setup ──────────────────────────────────────
    RunInitialized {
        seed: u64,
    },
    MapLoaded {
        cities: usize,
    },
    AlienLanded {
        alien: AlienId,
        city:  String,
    },

    // ── Per-iteration ──────────────────────────────
    AlienMoved {
        iteration: Iteration,
        alien:     AlienId,
        direction: Direction,
        from:      String,
        to:        String,
    },
    AlienTrapped {
        iteration: Iteration,
        alien:     AlienId,
        city:      String,
    },
    CityDestroyed {
        iteration: Iteration,
        city:      String,
        attacker:  AlienId,
        defender:  AlienId,
    },
    IterationCompleted {
        iteration:  Iteration,
        casualties: usize,
        remaining:  usize,
    },

    // ── Termination ────────────────────────────────
    RunFinished {
        outcome:    RunOutcome,
        iterations: Iteration,
        survivors:  usize,
    },
}

/// How a run ended. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every alien has been killed or trapped.
    AllAgentsResolved,
    /// The iteration budget ran out with aliens still roaming.
    StepLimitReached,
    /// The cancel token fired between two iterations.
    Cancelled,
}

impl SimEvent {
    /// Stable string name of the variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::RunInitialized { .. }     => "run_initialized",
            SimEvent::MapLoaded { .. }          => "map_loaded",
            SimEvent::AlienLanded { .. }        => "alien_landed",
            SimEvent::AlienMoved { .. }         => "alien_moved",
            SimEvent::AlienTrapped { .. }       => "alien_trapped",
            SimEvent::CityDestroyed { .. }      => "city_destroyed",
            SimEvent::IterationCompleted { .. } => "iteration_completed",
            SimEvent::RunFinished { .. }        => "run_finished",
        }
    }
}
