//! A single node of the invasion map.

use crate::{
    direction::Direction,
    types::{AlienId, CityId},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub name: String,
    /// Current occupant. A back-link only; the engine owns the alien.
    pub(crate) occupant: Option<AlienId>,
    /// Border table indexed by `Direction::index()`.
    pub(crate) borders: [Option<CityId>; 4],
}

impl City {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            occupant: None,
            borders: [None; 4],
        }
    }

    pub fn occupant(&self) -> Option<AlienId> {
        self.occupant
    }

    pub fn neighbor(&self, dir: Direction) -> Option<CityId> {
        self.borders[dir.index()]
    }

    /// Directions with a real neighbor, in natural order.
    pub fn available_directions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|dir| self.borders[dir.index()].is_some())
            .collect()
    }

    /// (direction, neighbor) pairs, in natural order.
    pub fn borders(&self) -> impl Iterator<Item = (Direction, CityId)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| self.borders[dir.index()].map(|id| (dir, id)))
    }

    pub fn degree(&self) -> usize {
        self.borders.iter().flatten().count()
    }

    pub fn is_isolated(&self) -> bool {
        self.degree() == 0
    }
}
