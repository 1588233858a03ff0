//! The simulation engine — owns the map and every alien of a run.
//!
//! ITERATION ORDER (fixed, never reordered):
//!   Active aliens move in ascending `AlienId` order, which is also
//!   landing order. Each move is fully applied, collision and city
//!   destruction included, before the next alien moves.
//!
//! RULES:
//!   - All randomness flows through the RngBank.
//!   - All state changes are recorded in the event log.
//!   - Cancellation is only observed between iterations.

use crate::{
    alien::{Alien, MoveOutcome},
    cancel::CancelToken,
    city_map::CityMap,
    error::{SimError, SimResult},
    event::{RunOutcome, SimEvent},
    map_format, map_gen,
    rng::{RngBank, RngSlot, SimRng},
    snapshot::{AlienSnapshot, CitySnapshot, SimSnapshot},
    types::{AlienId, CityId, Iteration},
};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

pub struct SimEngine {
    rng_bank:      RngBank,
    placement_rng: SimRng,
    movement_rng:  SimRng,
    cities:        CityMap,
    /// Active aliens, keyed (and therefore iterated) by identity.
    aliens:        BTreeMap<AlienId, Alien>,
    /// Trapped and killed aliens, kept for reporting.
    retired:       BTreeMap<AlienId, Alien>,
    /// Names of cities removed from the map, by their former handle.
    destroyed:     BTreeMap<CityId, String>,
    next_alien_id: u64,
    iteration:     Iteration,
    events:        Vec<SimEvent>,
}

impl SimEngine {
    /// An engine with an empty map.
    pub fn new(seed: u64) -> Self {
        Self::with_map(CityMap::new(), seed)
    }

    /// An engine over an already-built map.
    pub fn with_map(cities: CityMap, seed: u64) -> Self {
        let rng_bank = RngBank::new(seed);
        Self {
            placement_rng: rng_bank.for_slot(RngSlot::Placement),
            movement_rng:  rng_bank.for_slot(RngSlot::Movement),
            rng_bank,
            cities,
            aliens:        BTreeMap::new(),
            retired:       BTreeMap::new(),
            destroyed:     BTreeMap::new(),
            next_alien_id: 0,
            iteration:     0,
            events:        vec![SimEvent::RunInitialized { seed }],
        }
    }

    /// Replace the map with one parsed from `reader`.
    /// On error the current map is left untouched.
    pub fn load<R: BufRead>(&mut self, reader: R) -> SimResult<()> {
        let cities = map_format::parse(reader)?;
        self.install_map(cities);
        log::info!("successfully parsed {} cities", self.cities.len());
        Ok(())
    }

    /// Replace the map with a randomly generated one.
    pub fn generate_map(&mut self, depth: usize) -> SimResult<()> {
        let mut rng = self.rng_bank.for_slot(RngSlot::MapGen);
        let cities = map_gen::generate_random(depth, &mut rng)?;
        self.install_map(cities);
        log::info!("generated {} cities at depth {depth}", self.cities.len());
        Ok(())
    }

    fn install_map(&mut self, cities: CityMap) {
        self.cities = cities;
        self.events.push(SimEvent::MapLoaded { cities: self.cities.len() });
    }

    /// Land `n` aliens on distinct, unoccupied cities.
    ///
    /// When `n` equals the number of free cities every one of them gets
    /// an alien, in map order. Otherwise the cities are sampled uniformly
    /// without replacement.
    pub fn generate_agents(&mut self, n: usize) -> SimResult<Vec<AlienId>> {
        let free: Vec<CityId> = self
            .cities
            .iter()
            .filter(|(_, city)| city.occupant().is_none())
            .map(|(id, _)| id)
            .collect();

        let targets = match n {
            n if n > free.len() => {
                return Err(SimError::TooManyAgents { requested: n, cities: free.len() })
            }
            n if n == free.len() => free,
            n => self.placement_rng.sample(&free, n),
        };

        let mut landed = Vec::with_capacity(targets.len());
        for city in targets {
            landed.push(self.land_alien(city)?);
        }
        log::info!("{} aliens landed on {} cities", landed.len(), self.cities.len());
        Ok(landed)
    }

    /// Land a single fresh alien in `city`.
    pub fn land_alien(&mut self, city: CityId) -> SimResult<AlienId> {
        if let Some(occupant) = self.cities.occupant(city) {
            return Err(SimError::CityOccupied {
                city:  self.cities.name(city).to_string(),
                alien: occupant.0,
            });
        }

        self.next_alien_id += 1;
        let id = AlienId(self.next_alien_id);
        let alien = Alien::land(id, city, &mut self.cities);
        self.aliens.insert(id, alien);

        log::debug!("alien `{id}` landed in `{}`", self.cities.name(city));
        self.events.push(SimEvent::AlienLanded {
            alien: id,
            city:  self.cities.name(city).to_string(),
        });
        Ok(id)
    }

    /// Move every active alien once. Returns this iteration's casualties,
    /// in the order they fell. Casualties stay in the active set until
    /// `run` retires them.
    pub fn run_iteration(&mut self) -> Vec<AlienId> {
        self.iteration += 1;
        let iteration = self.iteration;
        let mut casualties = Vec::new();

        let ids: Vec<AlienId> = self.aliens.keys().copied().collect();
        for id in ids {
            let Some(alien) = self.aliens.get_mut(&id) else {
                continue;
            };
            // Killed earlier in this iteration.
            if !alien.is_alive() {
                continue;
            }

            match alien.random_move(&mut self.cities, &mut self.movement_rng) {
                MoveOutcome::Inactive => {}
                MoveOutcome::Trapped => {
                    let city_id = alien.city;
                    let city = self.city_name(city_id);
                    log::debug!("alien `{id}` has been trapped in `{city}`");
                    self.events.push(SimEvent::AlienTrapped { iteration, alien: id, city });
                    casualties.push(id);
                }
                MoveOutcome::Moved { direction, from, to, victim } => {
                    let (from_name, to_name) = (self.city_name(from), self.city_name(to));
                    log::debug!("alien `{id}` moved from `{from_name}` to `{to_name}`");
                    self.events.push(SimEvent::AlienMoved {
                        iteration,
                        alien: id,
                        direction,
                        from: from_name,
                        to: to_name.clone(),
                    });

                    if let Some(victim) = victim {
                        self.fight(iteration, id, victim, to, to_name);
                        casualties.extend([id, victim]);
                    }
                }
            }
        }

        casualties
    }

    /// Both aliens die and the city they fought over is wiped off the map.
    fn fight(
        &mut self,
        iteration: Iteration,
        attacker: AlienId,
        defender: AlienId,
        city: CityId,
        name: String,
    ) {
        log::debug!("city `{name}` already occupied by alien `{defender}`");
        for id in [attacker, defender] {
            if let Some(alien) = self.aliens.get_mut(&id) {
                alien.kill();
            }
        }
        if let Some(removed) = self.cities.remove(city) {
            self.destroyed.insert(city, removed.name);
        }
        self.events.push(SimEvent::CityDestroyed { iteration, city: name, attacker, defender });
    }

    /// Iterate until every alien is resolved, `step_limit` iterations have
    /// run, or `cancel` fires. Cancellation is checked before each
    /// iteration, never during one.
    pub fn run(&mut self, step_limit: u64, cancel: &CancelToken) -> RunOutcome {
        let total = self.aliens.len() + self.retired.len();
        let mut steps: u64 = 0;

        let outcome = loop {
            if steps >= step_limit {
                break RunOutcome::StepLimitReached;
            }
            if cancel.is_cancelled() {
                break RunOutcome::Cancelled;
            }

            log::debug!("iteration: {}", self.iteration + 1);
            let casualties = self.run_iteration();
            steps += 1;
            self.retire(&casualties);

            if !casualties.is_empty() {
                log::info!(
                    "iteration[{}]: {}/{} aliens have been killed or trapped",
                    self.iteration,
                    self.retired.len(),
                    total
                );
            }
            self.events.push(SimEvent::IterationCompleted {
                iteration:  self.iteration,
                casualties: casualties.len(),
                remaining:  self.aliens.len(),
            });

            if self.aliens.is_empty() {
                break RunOutcome::AllAgentsResolved;
            }
        };

        log::info!("{}/{} aliens left after {steps} iterations: {outcome:?}", self.aliens.len(), total);
        self.events.push(SimEvent::RunFinished {
            outcome,
            iterations: self.iteration,
            survivors:  self.aliens.len(),
        });
        outcome
    }

    fn retire(&mut self, casualties: &[AlienId]) {
        for id in casualties {
            if let Some(alien) = self.aliens.remove(id) {
                self.retired.insert(*id, alien);
            }
        }
    }

    /// Write the current map in the text format.
    pub fn dump<W: Write>(&self, writer: &mut W) -> SimResult<()> {
        map_format::print(writer, &self.cities)?;
        Ok(())
    }

    pub fn snapshot(&self) -> SimSnapshot {
        let cities = self
            .cities
            .iter()
            .map(|(_, city)| CitySnapshot {
                name:     city.name.clone(),
                occupant: city.occupant(),
                borders:  city
                    .borders()
                    .map(|(dir, neighbor)| (dir, self.cities.name(neighbor).to_string()))
                    .collect(),
            })
            .collect();

        let mut aliens: Vec<AlienSnapshot> = self
            .aliens
            .values()
            .chain(self.retired.values())
            .map(|alien| AlienSnapshot {
                id:    alien.id,
                state: alien.state,
                city:  self.city_name(alien.city),
                steps: alien.steps,
            })
            .collect();
        aliens.sort_by_key(|a| a.id);

        SimSnapshot {
            seed: self.rng_bank.master_seed(),
            iteration: self.iteration,
            cities,
            aliens,
        }
    }

    /// Name of a live or destroyed city.
    fn city_name(&self, id: CityId) -> String {
        match self.cities.get(id) {
            Some(city) => city.name.clone(),
            None => self.destroyed.get(&id).cloned().unwrap_or_default(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.rng_bank.master_seed()
    }

    pub fn cities(&self) -> &CityMap {
        &self.cities
    }

    /// Aliens still roaming, in identity order.
    pub fn active_aliens(&self) -> impl Iterator<Item = &Alien> + '_ {
        self.aliens.values()
    }

    pub fn active_count(&self) -> usize {
        self.aliens.len()
    }

    /// Any alien this engine has landed, active or retired.
    pub fn alien(&self, id: AlienId) -> Option<&Alien> {
        self.aliens.get(&id).or_else(|| self.retired.get(&id))
    }

    /// Names of the cities destroyed so far, in map order.
    pub fn destroyed_cities(&self) -> impl Iterator<Item = &str> + '_ {
        self.destroyed.values().map(String::as_str)
    }

    pub fn iteration(&self) -> Iteration {
        self.iteration
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// The event log as JSON lines.
    pub fn events_json(&self) -> SimResult<Vec<String>> {
        self.events
            .iter()
            .map(|event| serde_json::to_string(event).map_err(SimError::from))
            .collect()
    }
}
