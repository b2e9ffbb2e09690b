//! The standard tasks run by [`Scheduler::standard`](crate::Scheduler::standard).
//!
//! | priority | task             | cadence       |
//! |----------|------------------|---------------|
//! | 0        | `quarter_switch` | quarter start |
//! | 10       | `food_growth`    | day start     |
//! | 20       | `daily_life`     | day start     |
//! | 30       | `deterrence`     | every tick    |
//! | 40       | `movement`       | every tick    |
//! | 50       | `reaper`         | every tick    |
//! | 60       | `report`         | day start     |
//!
//! Animals act in id order. Spatial queries return ids in bucket order,
//! so every loop that draws random numbers sorts its ids first.

use pelagic_agent::deterrence::{detection_radius_m, fixed_source_push, ship_push};
use pelagic_agent::deterrence::sources::{KNOT_M_PER_S, TICK_SECONDS};
use pelagic_agent::{Animal, StepContext};
use pelagic_core::{NoiseSource, RandomSource, StepError};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::metrics::StepMetrics;
use crate::report::PopulationReport;
use crate::scheduler::{Cadence, Task};
use crate::world::WorldState;

/// Ids found near one source; most sources reach only a handful.
type Nearby = SmallVec<[pelagic_core::AnimalId; 16]>;

// ── QuarterSwitch ──────────────────────────────────────────────────

/// Switches the landscape's seasonal layers at each quarter.
pub struct QuarterSwitch;

impl Task for QuarterSwitch {
    fn name(&self) -> &str {
        "quarter_switch"
    }

    fn cadence(&self) -> Cadence {
        Cadence::QuarterStart
    }

    fn priority(&self) -> i32 {
        0
    }

    fn run(&self, state: &mut WorldState, _: &mut dyn RandomSource, _: &mut StepMetrics) -> Result<(), StepError> {
        let quarter = state.context.tick().quarter();
        state.landscape.set_quarter(quarter);
        debug!(quarter, "landscape quarter switched");
        Ok(())
    }
}

// ── FoodGrowth ─────────────────────────────────────────────────────

/// Daily logistic regrowth of every food patch.
pub struct FoodGrowth;

impl Task for FoodGrowth {
    fn name(&self) -> &str {
        "food_growth"
    }

    fn cadence(&self) -> Cadence {
        Cadence::DayStart
    }

    fn priority(&self) -> i32 {
        10
    }

    fn run(
        &self,
        state: &mut WorldState,
        _: &mut dyn RandomSource,
        metrics: &mut StepMetrics,
    ) -> Result<(), StepError> {
        let summary = state.food.grow(&mut state.landscape);
        if !summary.grown.is_finite() {
            return Err(StepError::TaskFailed {
                name: self.name().to_string(),
                reason: format!("regrowth produced {}", summary.grown),
            });
        }
        metrics.food_grown = summary.grown;
        metrics.extra_growth_events = summary.extra_growth_events;
        Ok(())
    }
}

// ── DailyLife ──────────────────────────────────────────────────────

/// Daily energetics, reproduction and dispersal triggers; spawns weaned
/// female calves.
pub struct DailyLife;

impl Task for DailyLife {
    fn name(&self) -> &str {
        "daily_life"
    }

    fn cadence(&self) -> Cadence {
        Cadence::DayStart
    }

    fn priority(&self) -> i32 {
        20
    }

    fn run(
        &self,
        state: &mut WorldState,
        rng: &mut dyn RandomSource,
        metrics: &mut StepMetrics,
    ) -> Result<(), StepError> {
        let tick = state.context.tick();
        let WorldState {
            config,
            landscape,
            field,
            population,
            context,
            diagnostics,
            ..
        } = state;
        let mut ctx = StepContext::new(landscape, field, config, rng, diagnostics, tick);

        let mut offspring = Vec::new();
        for id in population.ids() {
            let Some(animal) = population.get_mut(id) else {
                continue;
            };
            let report = animal.daily(&mut ctx);
            metrics.births += u32::from(report.born);
            metrics.weaned += u32::from(report.weaned);
            metrics.dispersal_started += u32::from(report.dispersal_started);
            metrics.dispersal_stopped += u32::from(report.dispersal_stopped);
            if let Some(cause) = report.death {
                metrics.record_death(cause);
            }
            offspring.extend(report.offspring);
        }

        for calf in offspring {
            let id = context.allocate_id();
            let mut animal = Animal::spawn(id, calf.position, 0.0, &mut ctx);
            if let Some(memory) = calf.memory {
                animal = animal.with_memory(memory);
            }
            population.insert(animal);
            metrics.spawned += 1;
        }
        Ok(())
    }
}

// ── Deterrence ─────────────────────────────────────────────────────

/// Decays existing deterrence, then offers new pushes from active fixed
/// sources and ships.
pub struct Deterrence;

impl Task for Deterrence {
    fn name(&self) -> &str {
        "deterrence"
    }

    fn cadence(&self) -> Cadence {
        Cadence::EveryTick
    }

    fn priority(&self) -> i32 {
        30
    }

    fn run(
        &self,
        state: &mut WorldState,
        rng: &mut dyn RandomSource,
        metrics: &mut StepMetrics,
    ) -> Result<(), StepError> {
        if !state.config.deterrence.enabled {
            return Ok(());
        }
        let tick = state.context.tick();
        let missing_before = state.diagnostics.acoustic_inputs_missing;
        let WorldState {
            config,
            landscape,
            field,
            ships,
            fixed_sources,
            population,
            diagnostics,
            ..
        } = state;

        let decay = config.deterrence.decay_percent;
        for id in population.ids() {
            if let Some(a) = population.get_mut(id) {
                a.decay_deterrence(decay);
            }
        }

        let mut ctx = StepContext::new(landscape, field, config, rng, diagnostics, tick);
        let cell_m = config.cell_size_m;

        for source in fixed_sources.iter() {
            let Some(at) = source.position(tick) else {
                continue;
            };
            let radius = detection_radius_m(source.impact(), &config.deterrence) / cell_m;
            let mut near: Nearby = population.index().query_radius_in(field, at, radius).into();
            near.sort_unstable();
            for id in near {
                let Some(animal) = population.get_mut(id) else {
                    continue;
                };
                if !animal.is_alive() {
                    continue;
                }
                if let Some((strength, push)) = fixed_source_push(source, tick, animal.position(), &ctx) {
                    if animal.deter_from(strength, push, source.impact()) {
                        metrics.deterrences += 1;
                    }
                }
            }
        }

        if config.deterrence.ships.enabled {
            let reach = config.deterrence.ships.max_distance_km * 1000.0 / cell_m;
            let t0 = tick.0 as f64;
            for ship in ships.iter_mut() {
                ship.advance(tick);
                // The ship may depart or arrive mid-tick; centre the search
                // on whichever ends of the tick's track exist.
                let (a, b) = (ship.state_at(t0), ship.state_at(t0 + 1.0));
                let (centre, travel) = match (a, b) {
                    (Some(a), Some(b)) => ((a.position + b.position) * 0.5, a.position.distance(b.position) * 0.5),
                    (Some(s), None) | (None, Some(s)) => {
                        let max_leg = s.speed_knots * KNOT_M_PER_S * TICK_SECONDS / cell_m;
                        (s.position, max_leg)
                    }
                    (None, None) => continue,
                };
                let source_level = ship.source_level(tick);
                let mut near: Nearby = population
                    .index()
                    .query_radius_in(field, centre, reach + travel)
                    .into();
                near.sort_unstable();
                for id in near {
                    let Some(animal) = population.get_mut(id) else {
                        continue;
                    };
                    if !animal.is_alive() {
                        continue;
                    }
                    if let Some((strength, push)) = ship_push(ship, tick, animal.position(), &mut ctx) {
                        if animal.deter_from(strength, push, source_level) {
                            metrics.deterrences += 1;
                        }
                    }
                }
            }
        }

        let missing = ctx.diagnostics().acoustic_inputs_missing - missing_before;
        if missing > 0 {
            warn!(tick = tick.0, missing, "ship propagation skipped for missing acoustic inputs");
        }
        Ok(())
    }
}

// ── Movement ───────────────────────────────────────────────────────

/// One behaviour step per living animal: move, eat, pay energy, survive.
pub struct Movement;

impl Task for Movement {
    fn name(&self) -> &str {
        "movement"
    }

    fn cadence(&self) -> Cadence {
        Cadence::EveryTick
    }

    fn priority(&self) -> i32 {
        40
    }

    fn run(
        &self,
        state: &mut WorldState,
        rng: &mut dyn RandomSource,
        metrics: &mut StepMetrics,
    ) -> Result<(), StepError> {
        let tick = state.context.tick();
        let WorldState {
            config,
            landscape,
            field,
            movement,
            population,
            diagnostics,
            ..
        } = state;
        let mut ctx = StepContext::new(landscape, field, config, rng, diagnostics, tick);
        for id in population.ids() {
            let Some(animal) = population.get_mut(id) else {
                continue;
            };
            if !animal.is_alive() {
                continue;
            }
            let outcome = animal.step(movement, &mut ctx)?;
            metrics.calves_abandoned += u32::from(outcome.calf_abandoned);
            if let Some(cause) = outcome.death {
                metrics.record_death(cause);
            }
            population.relocate(id);
        }
        Ok(())
    }
}

// ── Reaper ─────────────────────────────────────────────────────────

/// Removes animals that died this tick.
pub struct Reaper;

impl Task for Reaper {
    fn name(&self) -> &str {
        "reaper"
    }

    fn cadence(&self) -> Cadence {
        Cadence::EveryTick
    }

    fn priority(&self) -> i32 {
        50
    }

    fn run(&self, state: &mut WorldState, _: &mut dyn RandomSource, _: &mut StepMetrics) -> Result<(), StepError> {
        let tick = state.context.tick();
        let removed = state.population.reap(tick);
        if removed > 0 {
            debug!(tick = tick.0, removed, remaining = state.population.len(), "reaped");
        }
        Ok(())
    }
}

// ── Report ─────────────────────────────────────────────────────────

/// Appends a [`PopulationReport`] each day and logs a yearly summary.
pub struct Report;

impl Task for Report {
    fn name(&self) -> &str {
        "report"
    }

    fn cadence(&self) -> Cadence {
        Cadence::DayStart
    }

    fn priority(&self) -> i32 {
        60
    }

    fn run(&self, state: &mut WorldState, _: &mut dyn RandomSource, _: &mut StepMetrics) -> Result<(), StepError> {
        let tick = state.context.tick();
        let report = PopulationReport::collect(tick, &state.population, state.landscape.total_food());
        if tick.is_year_start() && tick.year() > 0 {
            info!(
                year = tick.year(),
                size = report.size,
                mean_energy = report.mean_energy,
                dispersing = report.dispersing,
                food = report.food_total,
                "year completed"
            );
        }
        state.reports.push(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::world::World;
    use pelagic_agent::{AnimalTraits, FixedSource};
    use pelagic_core::{SourceId, TickId, Vec2};
    use pelagic_test_utils::fixtures::open_water;

    fn traits() -> AnimalTraits {
        AnimalTraits {
            heading: 90.0,
            age: 4.0,
            energy: 12.0,
            mating_day: 225,
            preferred_distance_km: 300.0,
        }
    }

    #[test]
    fn turbine_deters_nearby_animals() {
        let mut config = WorldConfig::new(open_water(30, 30, 20.0));
        config.fixed_sources.push(FixedSource::turbine(
            SourceId(0),
            Vec2::new(15.0, 15.0),
            220.0,
            TickId(0),
            TickId(1000),
        ));
        let mut world = World::new(config).unwrap();
        let near = world.add_animal(Vec2::new(15.5, 15.0), traits());
        let far = world.add_animal(Vec2::new(1.0, 1.0), traits());
        let metrics = world.step().unwrap();
        assert_eq!(metrics.deterrences, 1);
        let near = world.population().get(near).unwrap();
        let far = world.population().get(far).unwrap();
        assert!(near.deterrence().is_active());
        assert!(!far.deterrence().is_active());
    }

    #[test]
    fn disabled_deterrence_does_nothing() {
        let mut config = WorldConfig::new(open_water(30, 30, 20.0));
        config.simulation.deterrence.enabled = false;
        config.fixed_sources.push(FixedSource::turbine(
            SourceId(0),
            Vec2::new(15.0, 15.0),
            220.0,
            TickId(0),
            TickId(1000),
        ));
        let mut world = World::new(config).unwrap();
        world.add_animal(Vec2::new(15.5, 15.0), traits());
        assert_eq!(world.step().unwrap().deterrences, 0);
    }

    #[test]
    fn reports_are_daily() {
        let mut world = World::new(WorldConfig::new(open_water(10, 10, 20.0))).unwrap();
        world.add_animal(Vec2::new(5.0, 5.0), traits());
        world.run(48 * 3).unwrap();
        let ticks: Vec<_> = world.reports().iter().map(|r| r.tick.0).collect();
        assert_eq!(ticks, vec![0, 48, 96]);
        assert_eq!(world.reports()[0].size, 1);
    }
}
