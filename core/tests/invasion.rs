//! End-to-end invasion scenarios driven through the engine API.

use invasion_core::{
    alien::AlienState,
    cancel::CancelToken,
    city_map::CityMap,
    direction::Direction,
    engine::SimEngine,
    error::SimError,
    event::{RunOutcome, SimEvent},
    map_format,
    types::AlienId,
};

fn engine_from(map: &str, seed: u64) -> SimEngine {
    let mut engine = SimEngine::new(seed);
    engine.load(map.as_bytes()).expect("valid map");
    engine
}

fn dump(engine: &SimEngine) -> String {
    let mut out = Vec::new();
    engine.dump(&mut out).expect("dump");
    String::from_utf8(out).expect("utf8")
}

#[test]
fn load_rejects_malformed_map_and_keeps_previous_one() {
    let mut engine = engine_from("City1 north=City2", 1);
    let err = engine.load("City1=City2".as_bytes()).unwrap_err();

    assert!(matches!(err, SimError::MalformedLine { .. }), "{err:?}");
    assert_eq!(engine.cities().len(), 2);
}

#[test]
fn too_many_aliens_is_rejected() {
    let mut engine = engine_from("a north=b", 1);
    let err = engine.generate_agents(3).unwrap_err();
    assert!(
        matches!(err, SimError::TooManyAgents { requested: 3, cities: 2 }),
        "{err:?}"
    );
    assert_eq!(engine.active_count(), 0);

    let mut empty = SimEngine::new(1);
    assert!(empty.generate_agents(10).is_err());
}

#[test]
fn one_alien_per_city_when_counts_match() {
    let mut engine = engine_from("a north=b south=c\nc east=d", 1);
    let landed = engine.generate_agents(4).unwrap();

    assert_eq!(landed, vec![AlienId(1), AlienId(2), AlienId(3), AlienId(4)]);
    for (_, city) in engine.cities().iter() {
        assert!(city.occupant().is_some(), "{} has no alien", city.name);
    }
}

#[test]
fn sampled_aliens_land_on_distinct_cities() {
    let mut engine = engine_from("city1 south=city2 north=city3 west=city4 east=city5", 8);
    engine.generate_agents(2).unwrap();

    assert_eq!(engine.active_count(), 2);
    let occupied = engine
        .cities()
        .iter()
        .filter(|(_, city)| city.occupant().is_some())
        .count();
    assert_eq!(occupied, 2);
    for alien in engine.active_aliens() {
        assert_eq!(engine.cities().occupant(alien.city), Some(alien.id));
    }
}

#[test]
fn landing_on_an_occupied_city_fails() {
    let mut engine = engine_from("a north=b", 1);
    let a = engine.cities().id_of("a").unwrap();
    engine.land_alien(a).unwrap();

    let err = engine.land_alien(a).unwrap_err();
    assert!(matches!(err, SimError::CityOccupied { alien: 1, .. }), "{err:?}");
}

#[test]
fn two_aliens_on_two_cities_destroy_the_contested_one() {
    let mut engine = engine_from("a north=b", 42);
    engine.generate_agents(2).unwrap();

    let outcome = engine.run(100, &CancelToken::new());

    assert_eq!(outcome, RunOutcome::AllAgentsResolved);
    assert_eq!(engine.active_count(), 0);
    assert_eq!(engine.iteration(), 1);

    // Alien 1 starts in `a`, moves first and lands on alien 2 in `b`.
    assert_eq!(engine.cities().len(), 1);
    assert!(engine.cities().contains("a"));
    assert!(!engine.cities().contains("b"));
    assert!(engine.cities().get_by_name("a").unwrap().is_isolated());
    assert_eq!(engine.destroyed_cities().collect::<Vec<_>>(), vec!["b"]);
    assert_eq!(dump(&engine), "a\n");

    for id in [AlienId(1), AlienId(2)] {
        assert_eq!(engine.alien(id).unwrap().state, AlienState::Killed);
    }
    assert!(engine.events().contains(&SimEvent::CityDestroyed {
        iteration: 1,
        city:      "b".into(),
        attacker:  AlienId(1),
        defender:  AlienId(2),
    }));
}

#[test]
fn lone_alien_keeps_wandering_until_step_limit() {
    let mut engine = engine_from("a north=b south=c east=d", 5);
    engine.generate_agents(1).unwrap();

    let outcome = engine.run(100, &CancelToken::new());

    assert_eq!(outcome, RunOutcome::StepLimitReached);
    assert_eq!(engine.active_count(), 1);
    assert_eq!(engine.iteration(), 100);
    assert_eq!(engine.cities().len(), 4);
    let alien = engine.active_aliens().next().unwrap();
    assert_eq!(alien.steps, 100);
    assert_eq!(alien.state, AlienState::Alive);
}

#[test]
fn single_alien_in_isolated_city_is_trapped() {
    let mut map = CityMap::new();
    map.get_or_create("lonely");
    let mut engine = SimEngine::with_map(map, 3);
    engine.generate_agents(1).unwrap();

    let outcome = engine.run(10, &CancelToken::new());

    assert_eq!(outcome, RunOutcome::AllAgentsResolved);
    assert_eq!(engine.iteration(), 1);
    assert_eq!(engine.alien(AlienId(1)).unwrap().state, AlienState::Trapped);
    // Trapped aliens do not destroy anything.
    assert!(engine.cities().contains("lonely"));
}

#[test]
fn trapped_alien_is_retired_while_others_keep_moving() {
    let mut map = map_format::parse_str("p north=q").unwrap();
    let lonely = map.get_or_create("x");
    let p = map.id_of("p").unwrap();
    let mut engine = SimEngine::with_map(map, 11);
    let trapped = engine.land_alien(lonely).unwrap();
    let roamer = engine.land_alien(p).unwrap();

    let outcome = engine.run(50, &CancelToken::new());

    assert_eq!(outcome, RunOutcome::StepLimitReached);
    assert_eq!(engine.active_count(), 1);
    assert_eq!(engine.alien(trapped).unwrap().state, AlienState::Trapped);
    assert_eq!(engine.alien(roamer).unwrap().state, AlienState::Alive);
    assert_eq!(engine.alien(roamer).unwrap().steps, 50);
    assert_eq!(engine.cities().len(), 3);
}

#[test]
fn zero_step_limit_runs_nothing() {
    let mut engine = engine_from("a north=b", 1);
    engine.generate_agents(2).unwrap();
    let before = dump(&engine);

    let outcome = engine.run(0, &CancelToken::new());

    assert_eq!(outcome, RunOutcome::StepLimitReached);
    assert_eq!(engine.iteration(), 0);
    assert_eq!(engine.active_count(), 2);
    assert_eq!(dump(&engine), before);
}

#[test]
fn cancelled_token_stops_before_the_first_iteration() {
    let mut engine = engine_from("a north=b", 1);
    engine.generate_agents(2).unwrap();
    let token = CancelToken::new();
    token.cancel();

    let outcome = engine.run(100, &token);

    assert_eq!(outcome, RunOutcome::Cancelled);
    assert_eq!(engine.iteration(), 0);
    assert_eq!(engine.cities().len(), 2);
    assert!(matches!(
        engine.events().last(),
        Some(SimEvent::RunFinished { outcome: RunOutcome::Cancelled, iterations: 0, survivors: 2 })
    ));
}

#[test]
fn map_stays_consistent_through_a_generated_invasion() {
    for seed in [1, 7, 42, 1234, 0xDEAD_BEEF] {
        let mut engine = SimEngine::new(seed);
        engine.generate_map(8).unwrap();
        let aliens = engine.cities().len() / 2;
        engine.generate_agents(aliens).unwrap();

        engine.run(500, &CancelToken::new());

        let map = engine.cities();
        for (id, city) in map.iter() {
            for (dir, neighbor) in city.borders() {
                assert!(map.get(neighbor).is_some(), "seed {seed}: link to removed city");
                assert_eq!(
                    map.neighbor(neighbor, dir.opposite()),
                    Some(id),
                    "seed {seed}: asymmetric link {} {dir}",
                    city.name
                );
            }
        }
        for alien in engine.active_aliens() {
            assert_eq!(alien.state, AlienState::Alive);
            assert_eq!(map.occupant(alien.city), Some(alien.id), "seed {seed}");
        }
        for name in engine.destroyed_cities() {
            assert!(!map.contains(name), "seed {seed}: {name} destroyed but still mapped");
        }
    }
}

#[test]
fn snapshot_reports_every_alien_and_surviving_city() {
    let mut engine = engine_from("a north=b", 42);
    engine.generate_agents(2).unwrap();
    engine.run(10, &CancelToken::new());

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.seed, 42);
    assert_eq!(snapshot.iteration, 1);
    assert_eq!(snapshot.cities.len(), 1);
    assert_eq!(snapshot.cities[0].name, "a");
    assert!(snapshot.cities[0].borders.is_empty());
    assert_eq!(snapshot.aliens.len(), 2);
    assert!(snapshot.aliens.iter().all(|a| a.state == AlienState::Killed && a.city == "b"));

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"killed\""), "{json}");
}

#[test]
fn conflicting_borders_never_leave_dangling_links() {
    // `b south=c` takes over the slot `a north=b` put on `b`.
    let mut engine = engine_from("a north=b\nb south=c", 9);
    let map = engine.cities();
    let (a, b, c) = (map.id_of("a").unwrap(), map.id_of("b").unwrap(), map.id_of("c").unwrap());
    assert!(map.get(a).unwrap().is_isolated());
    assert_eq!(map.neighbor(b, Direction::South), Some(c));
    assert_eq!(map.neighbor(c, Direction::North), Some(b));

    let attacker = engine.land_alien(c).unwrap();
    let defender = engine.land_alien(b).unwrap();
    let outcome = engine.run(10, &CancelToken::new());

    assert_eq!(outcome, RunOutcome::AllAgentsResolved);
    assert_eq!(engine.destroyed_cities().collect::<Vec<_>>(), vec!["b"]);
    assert_eq!(engine.alien(attacker).unwrap().state, AlienState::Killed);
    assert_eq!(engine.alien(defender).unwrap().state, AlienState::Killed);
    assert_eq!(dump(&engine), "a\nc\n");

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.cities.len(), 2);
    assert!(snapshot.cities.iter().all(|city| city.borders.is_empty()));
}
