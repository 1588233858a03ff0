//! The city graph: an owned slab of cities addressed by `CityId`.
//!
//! Cities never hold references to each other or to aliens, only
//! handles. Every operation that touches two cities at once (linking,
//! moving an occupant, destruction) lives here so that link symmetry
//! and the single-occupant rule are maintained in one place.

use crate::{
    city::City,
    direction::Direction,
    types::{AlienId, CityId},
};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct CityMap {
    slots: Vec<Option<City>>,
    by_name: HashMap<String, CityId>,
}

impl CityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cities still on the map.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn id_of(&self, name: &str) -> Option<CityId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: CityId) -> Option<&City> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&City> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Name of a live city. Panics on a removed or foreign handle.
    pub fn name(&self, id: CityId) -> &str {
        &self.city(id).name
    }

    pub fn get_or_create(&mut self, name: &str) -> CityId {
        if let Some(id) = self.id_of(name) {
            return id;
        }
        let id = CityId(self.slots.len());
        self.slots.push(Some(City::new(name)));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Every live city handle, in insertion order.
    pub fn all(&self) -> Vec<CityId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CityId, &City)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|city| (CityId(i), city)))
    }

    /// Link `from` to `to` in `dir`, and `to` back to `from` in the
    /// opposite direction. A neighbor displaced on either side loses its
    /// back-link too, so every link stays symmetric.
    pub fn link(&mut self, from: CityId, dir: Direction, to: CityId) {
        assert_ne!(from, to, "a city cannot border itself");
        self.unlink(from, dir);
        self.unlink(to, dir.opposite());
        self.city_mut(from).borders[dir.index()] = Some(to);
        self.city_mut(to).borders[dir.opposite().index()] = Some(from);
    }

    /// Drop the border of `id` in `dir` on both sides, if any.
    fn unlink(&mut self, id: CityId, dir: Direction) {
        let Some(neighbor) = self.city_mut(id).borders[dir.index()].take() else {
            return;
        };
        let back = &mut self.city_mut(neighbor).borders[dir.opposite().index()];
        if *back == Some(id) {
            *back = None;
        }
    }

    pub fn neighbor(&self, id: CityId, dir: Direction) -> Option<CityId> {
        self.city(id).neighbor(dir)
    }

    pub fn available_directions(&self, id: CityId) -> Vec<Direction> {
        self.city(id).available_directions()
    }

    pub fn occupant(&self, id: CityId) -> Option<AlienId> {
        self.city(id).occupant
    }

    pub(crate) fn set_occupant(&mut self, id: CityId, alien: Option<AlienId>) {
        self.city_mut(id).occupant = alien;
    }

    /// Push the occupant of `id` into its neighbor in `dir`.
    ///
    /// Returns `None` and changes nothing when there is no neighbor.
    /// Otherwise returns the target and whoever occupied it before the
    /// move. An occupied target does not block the move; the caller
    /// resolves the displaced occupant.
    pub fn move_occupant(
        &mut self,
        id: CityId,
        dir: Direction,
    ) -> Option<(CityId, Option<AlienId>)> {
        let target = self.neighbor(id, dir)?;
        let mover = self.city_mut(id).occupant.take();
        let previous = std::mem::replace(&mut self.city_mut(target).occupant, mover);
        Some((target, previous))
    }

    /// Unlink the city from all its neighbors and clear its occupant.
    /// Idempotent. The city keeps its name entry; see `remove`.
    pub fn destroy(&mut self, id: CityId) {
        let borders: Vec<(Direction, CityId)> = self.city(id).borders().collect();
        for (dir, neighbor) in borders {
            let back = &mut self.city_mut(neighbor).borders[dir.opposite().index()];
            if *back == Some(id) {
                *back = None;
            }
            self.city_mut(id).borders[dir.index()] = None;
        }
        self.city_mut(id).occupant = None;
    }

    /// Destroy the city and drop it from the map entirely.
    pub fn remove(&mut self, id: CityId) -> Option<City> {
        self.get(id)?;
        self.destroy(id);
        let city = self.slots[id.0].take()?;
        self.by_name.remove(&city.name);
        Some(city)
    }

    fn city(&self, id: CityId) -> &City {
        self.get(id)
            .unwrap_or_else(|| panic!("stale city handle {id:?}"))
    }

    fn city_mut(&mut self, id: CityId) -> &mut City {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("stale city handle {id:?}"))
    }
}
