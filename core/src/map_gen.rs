//! Procedural map generation.
//!
//! Cities are laid out on a `depth x depth` grid. A root city is dropped
//! on a random cell, then a depth-bounded walk fans out from it. Each
//! newly founded city continues the walk in a random, non-empty subset
//! of directions; walking into an already-founded cell just links the
//! two cities.

use crate::{
    city_map::CityMap,
    direction::Direction,
    error::{SimError, SimResult},
    rng::SimRng,
    types::CityId,
};

pub fn generate_random(depth: usize, rng: &mut SimRng) -> SimResult<CityMap> {
    if depth == 0 {
        return Err(SimError::InvalidDepth { depth });
    }

    let mut builder = Generator {
        depth,
        grid: vec![vec![None; depth]; depth],
        map: CityMap::new(),
        founded: 0,
        distance: 0,
    };

    let (x, y) = (rng.index_below(depth), rng.index_below(depth));
    let root = builder.found(x, y);
    for dir in Direction::ALL {
        builder.walk(rng, root, (x, y), dir);
    }

    log::debug!("generated map of depth {depth}: {} cities", builder.map.len());
    Ok(builder.map)
}

struct Generator {
    depth: usize,
    grid: Vec<Vec<Option<CityId>>>,
    map: CityMap,
    founded: usize,
    distance: usize,
}

impl Generator {
    fn found(&mut self, x: usize, y: usize) -> CityId {
        self.founded += 1;
        let id = self.map.get_or_create(&format!("city_{}", self.founded));
        self.grid[y][x] = Some(id);
        id
    }

    /// Grid cell one step from `(x, y)` in `dir`, if it is on the grid.
    /// North decreases x, east increases y.
    fn step(&self, (x, y): (usize, usize), dir: Direction) -> Option<(usize, usize)> {
        let (nx, ny) = match dir {
            Direction::North => (x.checked_sub(1)?, y),
            Direction::South => (x + 1, y),
            Direction::East  => (x, y + 1),
            Direction::West  => (x, y.checked_sub(1)?),
        };
        (nx < self.depth && ny < self.depth).then_some((nx, ny))
    }

    fn walk(&mut self, rng: &mut SimRng, from: CityId, pos: (usize, usize), dir: Direction) {
        if self.distance > self.depth {
            return;
        }
        let Some((x, y)) = self.step(pos, dir) else {
            return;
        };

        self.distance += 1;
        match self.grid[y][x] {
            Some(existing) => self.map.link(from, dir, existing),
            None => {
                let city = self.found(x, y);
                self.map.link(from, dir, city);

                let mut dirs = Direction::ALL;
                rng.shuffle(&mut dirs);
                let fan_out = 1 + rng.index_below(Direction::ALL.len() - 1);
                for next in dirs.into_iter().take(fan_out) {
                    self.walk(rng, city, (x, y), next);
                }
            }
        }
        self.distance -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, RngSlot};

    #[test]
    fn zero_depth_is_rejected() {
        let mut rng = RngBank::new(1).for_slot(RngSlot::MapGen);
        assert!(matches!(
            generate_random(0, &mut rng),
            Err(SimError::InvalidDepth { depth: 0 })
        ));
    }

    #[test]
    fn depth_one_is_a_single_city() {
        let mut rng = RngBank::new(1).for_slot(RngSlot::MapGen);
        let map = generate_random(1, &mut rng).unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains("city_1"));
    }

    #[test]
    fn generated_cities_stay_within_grid() {
        for seed in 0..20 {
            let mut rng = RngBank::new(seed).for_slot(RngSlot::MapGen);
            let map = generate_random(10, &mut rng).unwrap();
            assert!(map.len() <= 100, "seed {seed}: {} cities", map.len());
            assert!(map.len() > 1, "seed {seed}: root never expanded");
        }
    }
}
