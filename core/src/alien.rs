//! Alien agents and their movement rules.
//!
//! State machine:
//!   Alive -> Trapped   (no outgoing border from the current city)
//!   Alive -> Killed    (collision, resolved by the engine)
//! Neither terminal state is ever left.

use crate::{
    city_map::CityMap,
    direction::Direction,
    rng::SimRng,
    types::{AlienId, CityId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlienState {
    Alive,
    Trapped,
    Killed,
}

/// Result of a single move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The alien entered `to`. `victim` is whoever was already there.
    Moved {
        direction: Direction,
        from:      CityId,
        to:        CityId,
        victim:    Option<AlienId>,
    },
    /// No border in the requested direction; the alien is now trapped.
    Trapped,
    /// The alien was not alive; nothing happened.
    Inactive,
}

impl MoveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alien {
    pub id:    AlienId,
    pub city:  CityId,
    pub state: AlienState,
    pub steps: u64,
}

impl Alien {
    /// Drop a new alien into `city` and register it as the occupant.
    pub fn land(id: AlienId, city: CityId, map: &mut CityMap) -> Self {
        map.set_occupant(city, Some(id));
        Self {
            id,
            city,
            state: AlienState::Alive,
            steps: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state == AlienState::Alive
    }

    pub fn kill(&mut self) {
        self.state = AlienState::Killed;
    }

    pub fn move_to(&mut self, dir: Direction, map: &mut CityMap) -> MoveOutcome {
        if !self.is_alive() {
            return MoveOutcome::Inactive;
        }

        let from = self.city;
        match map.move_occupant(from, dir) {
            None => {
                self.state = AlienState::Trapped;
                MoveOutcome::Trapped
            }
            Some((to, victim)) => {
                self.city = to;
                self.steps += 1;
                MoveOutcome::Moved { direction: dir, from, to, victim }
            }
        }
    }

    /// Move through a border chosen uniformly from the current city's
    /// available directions, in natural direction order.
    pub fn random_move(&mut self, map: &mut CityMap, rng: &mut SimRng) -> MoveOutcome {
        if !self.is_alive() {
            return MoveOutcome::Inactive;
        }

        let dirs = map.available_directions(self.city);
        if dirs.is_empty() {
            self.state = AlienState::Trapped;
            return MoveOutcome::Trapped;
        }

        let dir = dirs[rng.index_below(dirs.len())];
        self.move_to(dir, map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, RngSlot};

    #[test]
    fn landing_registers_occupant() {
        let mut map = CityMap::new();
        let city = map.get_or_create("TestCity");
        let alien = Alien::land(AlienId(1), city, &mut map);

        assert_eq!(alien.city, city);
        assert_eq!(alien.state, AlienState::Alive);
        assert_eq!(map.occupant(city), Some(AlienId(1)));
    }

    #[test]
    fn move_follows_border() {
        let mut map = CityMap::new();
        let city = map.get_or_create("TestCity");
        let border = map.get_or_create("BorderCity");
        map.link(city, Direction::North, border);

        let mut alien = Alien::land(AlienId(1), city, &mut map);
        let outcome = alien.move_to(Direction::North, &mut map);

        assert_eq!(
            outcome,
            MoveOutcome::Moved { direction: Direction::North, from: city, to: border, victim: None }
        );
        assert_eq!(alien.city, border);
        assert_eq!(alien.steps, 1);
        assert_eq!(map.occupant(border), Some(AlienId(1)));
        assert_eq!(map.occupant(city), None);
    }

    #[test]
    fn move_without_border_traps() {
        let mut map = CityMap::new();
        let city = map.get_or_create("TestCity");
        let mut alien = Alien::land(AlienId(1), city, &mut map);

        assert_eq!(alien.move_to(Direction::East, &mut map), MoveOutcome::Trapped);
        assert_eq!(alien.state, AlienState::Trapped);
        assert_eq!(alien.city, city);
        assert_eq!(alien.steps, 0);
    }

    #[test]
    fn dead_or_trapped_aliens_do_not_move() {
        let mut map = CityMap::new();
        let city = map.get_or_create("a");
        let border = map.get_or_create("b");
        map.link(city, Direction::North, border);
        let mut rng = RngBank::new(3).for_slot(RngSlot::Movement);

        let mut alien = Alien::land(AlienId(1), city, &mut map);
        alien.kill();
        assert_eq!(alien.move_to(Direction::North, &mut map), MoveOutcome::Inactive);
        assert_eq!(alien.random_move(&mut map, &mut rng), MoveOutcome::Inactive);
        assert_eq!(alien.state, AlienState::Killed);
        assert_eq!(map.occupant(city), Some(AlienId(1)));

        alien.state = AlienState::Trapped;
        assert_eq!(alien.move_to(Direction::North, &mut map), MoveOutcome::Inactive);
        assert_eq!(alien.state, AlienState::Trapped);
    }

    #[test]
    fn kill_is_unconditional() {
        let mut map = CityMap::new();
        let city = map.get_or_create("a");
        let mut alien = Alien::land(AlienId(1), city, &mut map);

        alien.state = AlienState::Trapped;
        alien.kill();
        assert_eq!(alien.state, AlienState::Killed);
        alien.kill();
        assert_eq!(alien.state, AlienState::Killed);
    }

    #[test]
    fn random_move_from_isolated_city_traps() {
        let mut map = CityMap::new();
        let city = map.get_or_create("lonely");
        let mut rng = RngBank::new(3).for_slot(RngSlot::Movement);
        let mut alien = Alien::land(AlienId(1), city, &mut map);

        assert_eq!(alien.random_move(&mut map, &mut rng), MoveOutcome::Trapped);
        assert_eq!(alien.state, AlienState::Trapped);
    }

    #[test]
    fn random_move_is_a_uniform_draw_over_available_directions() {
        let mut map = CityMap::new();
        let hub = map.get_or_create("hub");
        let east = map.get_or_create("east");
        let west = map.get_or_create("west");
        let south = map.get_or_create("south");
        map.link(hub, Direction::East, east);
        map.link(hub, Direction::West, west);
        map.link(hub, Direction::South, south);

        let bank = RngBank::new(2024);
        let mut rng = bank.for_slot(RngSlot::Movement);
        let mut expected_rng = bank.for_slot(RngSlot::Movement);
        let available = [Direction::East, Direction::South, Direction::West];

        for _ in 0..50 {
            let mut alien = Alien::land(AlienId(1), hub, &mut map);
            let expected = map.neighbor(hub, available[expected_rng.index_below(3)]);

            match alien.random_move(&mut map, &mut rng) {
                MoveOutcome::Moved { to, .. } => assert_eq!(Some(to), expected),
                other => panic!("expected a move, got {other:?}"),
            }
            // Clear the target so the next landing starts from a clean hub.
            map.set_occupant(alien.city, None);
        }
    }
}
