//! Golden-file and record/replay tests over the full engine.

use pelagic_agent::AnimalTraits;
use pelagic_core::config::DispersalKind;
use pelagic_core::{RandomSource, SeededRandom, Vec2};
use pelagic_engine::{World, WorldConfig};
use pelagic_replay::{compare_trajectories, RecordingRandom, ReplayRandom, Trajectory, TrajectoryPoint};
use pelagic_test_utils::fixtures::{food_stripe, open_water};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("{FIXTURES}/{name}")).unwrap()
}

/// State of every living animal after the tick that just completed.
fn capture<R: RandomSource>(world: &World<R>, into: &mut Trajectory) {
    let tick = world.tick().0 - 1;
    into.extend(world.population().iter().map(|a| TrajectoryPoint {
        tick,
        id: a.id().0,
        x: a.position().x,
        y: a.position().y,
        heading: a.heading(),
        energy: a.energy(),
    }));
}

#[test]
fn one_animal_one_tick_matches_golden_trajectory() {
    let mut config = WorldConfig::new(open_water(20, 20, 20.0));
    config.simulation.dispersal.kind = DispersalKind::Off;
    let rng = ReplayRandom::parse(&fixture("golden_one_animal.draws")).unwrap();
    let mut world = World::with_random(config, rng).unwrap();
    world.add_animal(
        Vec2::new(10.0, 10.0),
        AnimalTraits {
            heading: 0.0,
            age: 1.0,
            energy: 10.0,
            mating_day: 225,
            preferred_distance_km: 300.0,
        },
    );

    world.step().unwrap();
    let mut actual = Trajectory::new();
    capture(&world, &mut actual);

    let expected = Trajectory::parse(&fixture("golden_one_animal.trajectory")).unwrap();
    let report = compare_trajectories(&expected, &actual, 1e-9);
    assert!(report.is_clean(), "{:?}", report.divergences);
    assert_eq!(report.compared, 1);
    assert_eq!(world.into_random().finish().unwrap(), 4);
}

fn stripe_config() -> WorldConfig {
    let mut config = WorldConfig::new(food_stripe(25, 25, 12, 0.6));
    config.initial_population = 12;
    config.seed = 2024;
    config
}

#[test]
fn recorded_run_replays_exactly() {
    let ticks = 48 * 3;

    let rng = RecordingRandom::new(SeededRandom::new(2024), Vec::new());
    let mut world = World::with_random(stripe_config(), rng).unwrap();
    let mut recorded = Trajectory::new();
    for _ in 0..ticks {
        world.step().unwrap();
        capture(&world, &mut recorded);
    }
    let (_, draws) = world.into_random().finish().unwrap();

    let rng = ReplayRandom::open(draws.as_slice()).unwrap();
    let mut world = World::with_random(stripe_config(), rng).unwrap();
    let mut replayed = Trajectory::new();
    for _ in 0..ticks {
        world.step().unwrap();
        capture(&world, &mut replayed);
    }

    let report = compare_trajectories(&recorded, &replayed, 0.0);
    assert!(report.is_clean(), "first divergence: {:?}", report.first());
    assert!(report.compared > 0);
    world.into_random().finish().unwrap();
}

#[test]
fn recording_does_not_perturb_the_run() {
    let mut plain = World::new(stripe_config()).unwrap();
    let rng = RecordingRandom::new(SeededRandom::new(2024), std::io::sink());
    let mut recording = World::with_random(stripe_config(), rng).unwrap();
    plain.run(96).unwrap();
    recording.run(96).unwrap();

    let a: Vec<_> = plain.population().iter().map(|x| (x.id(), x.position())).collect();
    let b: Vec<_> = recording.population().iter().map(|x| (x.id(), x.position())).collect();
    assert_eq!(a, b);
}

#[test]
fn truncated_recording_is_detected() {
    let rng = RecordingRandom::new(SeededRandom::new(5), Vec::new());
    let mut world = World::with_random(stripe_config(), rng).unwrap();
    world.run(10).unwrap();
    let (_, draws) = world.into_random().finish().unwrap();
    let text = String::from_utf8(draws).unwrap();
    let half: Vec<&str> = text.lines().take(text.lines().count() / 2).collect();

    let rng = ReplayRandom::parse(&half.join("\n")).unwrap();
    let mut world = World::with_random(stripe_config(), rng).unwrap();
    // The neutral fallbacks keep the run going; the error surfaces at the end.
    let _ = world.run(10);
    assert!(world.into_random().finish().is_err());
}
