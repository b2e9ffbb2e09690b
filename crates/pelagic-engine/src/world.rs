//! The simulation world: state, schedule and random source.
//!
//! [`World`] is the user-facing entry point. It is built from a
//! [`WorldConfig`], seeds the initial population, and advances one tick
//! per [`step()`](World::step) call by running the [`Scheduler`] over its
//! [`WorldState`].
//!
//! # Ownership model
//!
//! The random source is held beside the state rather than inside it, so
//! tasks can borrow both mutably at once. It is generic so that replay
//! runs can substitute a scripted or recording source and take it back
//! afterwards with [`into_random()`](World::into_random).

use std::mem;
use std::time::Instant;

use pelagic_agent::{
    Animal, AnimalTraits, Diagnostics, FixedSource, MovementModel, Ship, StepContext,
};
use pelagic_core::{AnimalId, Landscape, RandomSource, SeededRandom, SimulationConfig, StepError, TickId, Vec2};
use pelagic_food::FoodGrowthEngine;
use pelagic_space::{GridLandscape, SpatialField};
use tracing::{info, warn};

use crate::config::{ConfigError, WorldConfig};
use crate::context::SimulationContext;
use crate::metrics::StepMetrics;
use crate::population::{DeadMarker, Population};
use crate::report::PopulationReport;
use crate::scheduler::Scheduler;

// ── WorldState ─────────────────────────────────────────────────────

/// Everything the tasks operate on.
pub struct WorldState {
    pub(crate) config: SimulationConfig,
    pub(crate) landscape: GridLandscape,
    pub(crate) field: SpatialField,
    pub(crate) movement: MovementModel,
    pub(crate) food: FoodGrowthEngine,
    pub(crate) ships: Vec<Ship>,
    pub(crate) fixed_sources: Vec<FixedSource>,
    pub(crate) population: Population,
    pub(crate) context: SimulationContext,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) reports: Vec<PopulationReport>,
}

impl WorldState {
    fn build(config: WorldConfig) -> Result<Self, ConfigError> {
        let WorldConfig {
            simulation,
            landscape,
            x_edge,
            y_edge,
            ships,
            fixed_sources,
            ..
        } = config;
        let field = SpatialField::new(landscape.width(), landscape.height(), x_edge, y_edge)?;
        let ships = ships
            .into_iter()
            .map(|spec| Ship::new(spec, simulation.cell_size_m))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            movement: MovementModel::new(&simulation),
            food: FoodGrowthEngine::new(&simulation.food),
            population: Population::new(simulation.index_bucket_size)?,
            config: simulation,
            landscape,
            field,
            ships,
            fixed_sources,
            context: SimulationContext::new(),
            diagnostics: Diagnostics::default(),
            reports: Vec::new(),
        })
    }

    /// Place `count` animals on random food-bearing water cells, with ages
    /// uniform in `[0, max_age)`.
    fn seed(&mut self, count: usize, max_age: f64, rng: &mut dyn RandomSource) {
        let cells: Vec<_> = self.landscape.food_cells().collect();
        if cells.is_empty() {
            return;
        }
        let tick = self.context.tick();
        for _ in 0..count {
            let pick = rng.int_range(0, cells.len() as i64).clamp(0, cells.len() as i64 - 1);
            let cell = cells[pick as usize];
            let pos = Vec2::new(cell.x as f64 + rng.uniform(), cell.y as f64 + rng.uniform());
            let age = rng.uniform() * max_age;
            let id = self.context.allocate_id();
            let mut ctx = StepContext::new(
                &mut self.landscape,
                &self.field,
                &self.config,
                rng,
                &mut self.diagnostics,
                tick,
            );
            let animal = Animal::spawn(id, pos, age, &mut ctx);
            self.population.insert(animal);
        }
    }

    /// Tick being executed.
    pub fn tick(&self) -> TickId {
        self.context.tick()
    }

    /// Behaviour parameters.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The landscape.
    pub fn landscape(&self) -> &GridLandscape {
        &self.landscape
    }

    /// Field geometry.
    pub fn field(&self) -> &SpatialField {
        &self.field
    }

    /// The population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Ships, in configuration order.
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Fixed noise sources, in configuration order.
    pub fn fixed_sources(&self) -> &[FixedSource] {
        &self.fixed_sources
    }

    /// Daily reports collected so far.
    pub fn reports(&self) -> &[PopulationReport] {
        &self.reports
    }

    /// Split the state into what a custom task needs to drive animal
    /// behaviour: the population, the movement model, and a context over
    /// the landscape that records into this tick's diagnostics.
    pub fn behaviour<'a>(
        &'a mut self,
        rng: &'a mut dyn RandomSource,
    ) -> (&'a mut Population, &'a MovementModel, StepContext<'a>) {
        let tick = self.context.tick();
        let ctx = StepContext::new(
            &mut self.landscape,
            &self.field,
            &self.config,
            rng,
            &mut self.diagnostics,
            tick,
        );
        (&mut self.population, &self.movement, ctx)
    }
}

// ── World ──────────────────────────────────────────────────────────

/// A running simulation.
///
/// # Example
///
/// ```
/// use pelagic_engine::{World, WorldConfig};
/// use pelagic_space::{GridLandscape, LandscapeLayers};
///
/// let landscape = GridLandscape::from_layers(LandscapeLayers::filled(8, 8, 20.0)).unwrap();
/// let mut world = World::new(WorldConfig::new(landscape)).unwrap();
/// world.run(48).unwrap();
/// assert_eq!(world.tick().0, 48);
/// ```
pub struct World<R: RandomSource = SeededRandom> {
    state: WorldState,
    scheduler: Scheduler,
    rng: R,
    last_metrics: StepMetrics,
}

impl World<SeededRandom> {
    /// Build a world with the standard schedule and a generator seeded
    /// from `config.seed`.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        let rng = SeededRandom::new(config.seed);
        Self::with_random(config, rng)
    }
}

impl<R: RandomSource> World<R> {
    /// Build a world with the standard schedule and a caller-supplied
    /// random source.
    pub fn with_random(config: WorldConfig, rng: R) -> Result<Self, ConfigError> {
        Self::with_scheduler(config, Scheduler::standard(), rng)
    }

    /// Build a world with a custom schedule.
    ///
    /// Validates the configuration, builds the field, ships and index, and
    /// seeds the initial population (drawing from `rng`).
    pub fn with_scheduler(config: WorldConfig, scheduler: Scheduler, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let count = config.initial_population;
        let max_age = config.max_initial_age;
        let seed = config.seed;
        let mut state = WorldState::build(config)?;
        state.seed(count, max_age, &mut rng);
        info!(
            seed,
            animals = state.population.len(),
            width = state.field.width(),
            height = state.field.height(),
            ships = state.ships.len(),
            fixed_sources = state.fixed_sources.len(),
            "world created"
        );
        Ok(Self {
            state,
            scheduler,
            rng,
            last_metrics: StepMetrics::default(),
        })
    }

    /// Add an animal with explicit traits at `position` (resolved against
    /// the field borders). Makes no random draws.
    pub fn add_animal(&mut self, position: Vec2, traits: AnimalTraits) -> AnimalId {
        let id = self.state.context.allocate_id();
        let pos = self.state.field.resolve(position);
        let animal = Animal::new(id, pos, traits, &self.state.config, self.state.field.width());
        self.state.population.insert(animal);
        id
    }

    /// Execute one tick.
    ///
    /// On error the tick is abandoned part-way: the clock does not
    /// advance and the world should be discarded.
    pub fn step(&mut self) -> Result<&StepMetrics, StepError> {
        let start = Instant::now();
        let mut metrics = StepMetrics::default();
        let result = self.scheduler.run_tick(&mut self.state, &mut self.rng, &mut metrics);
        metrics.diagnostics = mem::take(&mut self.state.diagnostics);
        metrics.total_us = start.elapsed().as_micros() as u64;
        if let Err(e) = result {
            warn!(tick = self.state.tick().0, error = %e, "tick failed");
            return Err(e);
        }
        self.state.context.advance();
        self.last_metrics = metrics;
        Ok(&self.last_metrics)
    }

    /// Execute `ticks` ticks, stopping at the first error.
    pub fn run(&mut self, ticks: u64) -> Result<(), StepError> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    /// Next tick to execute.
    pub fn tick(&self) -> TickId {
        self.state.tick()
    }

    /// The world state.
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// The population.
    pub fn population(&self) -> &Population {
        &self.state.population
    }

    /// The landscape.
    pub fn landscape(&self) -> &GridLandscape {
        &self.state.landscape
    }

    /// Field geometry.
    pub fn field(&self) -> &SpatialField {
        &self.state.field
    }

    /// Behaviour parameters.
    pub fn config(&self) -> &SimulationConfig {
        &self.state.config
    }

    /// Daily reports collected so far.
    pub fn reports(&self) -> &[PopulationReport] {
        &self.state.reports
    }

    /// Metrics of the last successful tick.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Animals removed in the last tick or the one before.
    pub fn dead_markers(&self) -> &[DeadMarker] {
        self.state.population.dead_markers()
    }

    /// The task schedule.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The random source.
    pub fn random(&self) -> &R {
        &self.rng
    }

    /// Consume the world, returning its random source.
    pub fn into_random(self) -> R {
        self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pelagic_test_utils::fixtures::food_stripe;

    fn config(population: usize) -> WorldConfig {
        let mut c = WorldConfig::new(food_stripe(12, 12, 6, 0.5));
        c.initial_population = population;
        c.seed = 7;
        c
    }

    #[test]
    fn seeds_on_food_cells() {
        let world = World::new(config(25)).unwrap();
        assert_eq!(world.population().len(), 25);
        for a in world.population().iter() {
            assert_eq!(a.position().y.floor(), 6.0);
        }
        assert!(world.population().is_consistent());
    }

    #[test]
    fn add_animal_allocates_fresh_ids() {
        let mut world = World::new(config(3)).unwrap();
        let traits = AnimalTraits {
            heading: 0.0,
            age: 2.0,
            energy: 10.0,
            mating_day: 225,
            preferred_distance_km: 300.0,
        };
        let id = world.add_animal(Vec2::new(6.5, 6.5), traits);
        assert_eq!(id, AnimalId(3));
        assert_eq!(world.population().len(), 4);
    }

    #[test]
    fn step_advances_the_clock_and_records_metrics() {
        let mut world = World::new(config(5)).unwrap();
        let metrics = world.step().unwrap();
        assert!(metrics.task_time_us("movement").is_some());
        assert!(metrics.task_time_us("food_growth").is_some());
        world.step().unwrap();
        assert_eq!(world.tick(), TickId(2));
        assert!(world.last_metrics().task_time_us("food_growth").is_none());
        assert_eq!(world.reports().len(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut c = config(1);
        c.max_initial_age = f64::NAN;
        assert!(matches!(
            World::new(c),
            Err(ConfigError::InvalidInitialAge { .. })
        ));
    }
}
