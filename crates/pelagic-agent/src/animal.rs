//! The simulated animal.
//!
//! An [`Animal`] composes an [`Entity`] with the behaviour state that
//! drives it: the random-walk correlation, position and food histories,
//! energetics, spatial memories, dispersal machine and deterrence. The
//! engine calls [`Animal::step`] every tick and [`Animal::daily`] at the
//! first tick of each day.

use crate::context::StepContext;
use crate::deterrence::DeterrenceState;
use crate::dispersal::{DisperseOutcome, Dispersal, DispersalInput};
use crate::energetics::{DeathCause, Energetics, PregnancyStatus, Survival};
use crate::memory::PersistentSpatialMemory;
use crate::movement::{CrwState, MovementModel};
use pelagic_core::{AnimalId, Deterrable, Draw, Entity, RingBuffer, SimulationConfig, StepError, Vec2};
use tracing::{debug, trace};

/// Values that individualise a new animal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimalTraits {
    /// Initial heading (degrees).
    pub heading: f64,
    /// Age (years).
    pub age: f64,
    /// Initial energy.
    pub energy: f64,
    /// Day of year on which the animal mates.
    pub mating_day: u64,
    /// Preferred dispersal distance (km).
    pub preferred_distance_km: f64,
}

/// What happened to an animal during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickOutcome {
    /// Distance moved (grid units).
    pub distance: f64,
    /// Food eaten.
    pub eaten: f64,
    /// Whether the animal moved by dispersal rather than the random walk.
    pub dispersed: bool,
    /// Death this tick.
    pub death: Option<DeathCause>,
    /// Whether a calf was abandoned this tick.
    pub calf_abandoned: bool,
}

/// A weaned female calf the engine should add to the population.
#[derive(Clone, Debug)]
pub struct Offspring {
    /// Birth position (the mother's position).
    pub position: Vec2,
    /// Memory inherited from the mother's calf ledger.
    pub memory: Option<PersistentSpatialMemory>,
}

/// What happened to an animal during its daily update.
#[derive(Clone, Debug, Default)]
pub struct DailyReport {
    /// Death from bycatch or old age.
    pub death: Option<DeathCause>,
    /// A calf was born.
    pub born: bool,
    /// A calf was weaned.
    pub weaned: bool,
    /// A weaned female calf to spawn.
    pub offspring: Option<Offspring>,
    /// Dispersal started today.
    pub dispersal_started: bool,
    /// Dispersal stopped today.
    pub dispersal_stopped: bool,
}

/// One simulated animal.
#[derive(Clone, Debug)]
pub struct Animal {
    entity: Entity<AnimalId>,
    crw: CrwState,
    positions: RingBuffer<Vec2>,
    food_history: RingBuffer<f64>,
    energetics: Energetics,
    memory: PersistentSpatialMemory,
    calf_memory: Option<PersistentSpatialMemory>,
    dispersal: Dispersal,
    preferred_distance_km: f64,
    deterrence: DeterrenceState,
    ignore_deterrence: u32,
    death: Option<DeathCause>,
}

impl Animal {
    /// Create an animal from explicit traits. Makes no random draws.
    pub fn new(id: AnimalId, position: Vec2, traits: AnimalTraits, config: &SimulationConfig, field_width: u32) -> Self {
        let history = config.movement.history_len;
        Self {
            entity: Entity::new(id, position, traits.heading),
            crw: CrwState::default(),
            positions: RingBuffer::new(history),
            food_history: RingBuffer::new(history),
            energetics: Energetics::new(traits.energy, traits.age, traits.mating_day, &config.energetics),
            memory: PersistentSpatialMemory::new(config.dispersal.psm.memory_cell_size, field_width),
            calf_memory: None,
            dispersal: Dispersal::new(&config.dispersal),
            preferred_distance_km: traits.preferred_distance_km,
            deterrence: DeterrenceState::new(config.deterrence.decay_ticks),
            ignore_deterrence: 0,
            death: None,
        }
    }

    /// Create an animal of `age` years, drawing its heading, energy,
    /// mating day and preferred dispersal distance.
    pub fn spawn(id: AnimalId, position: Vec2, age: f64, ctx: &mut StepContext<'_>) -> Self {
        let config = ctx.config();
        let e = &config.energetics;
        let heading = ctx.rng().uniform() * 360.0;
        let energy = ctx.rng().normal(Draw::InitialEnergy, e.initial_energy.mean, e.initial_energy.sd);
        let mating_day = ctx.rng().normal(Draw::MatingDay, e.mating_day.mean, e.mating_day.sd);
        let psm = &config.dispersal.psm;
        let preferred = ctx.rng().normal(
            Draw::PreferredDistance,
            psm.preferred_distance_km.mean,
            psm.preferred_distance_km.sd,
        );
        let traits = AnimalTraits {
            heading,
            age,
            energy,
            mating_day: mating_day.round().clamp(0.0, 359.0) as u64,
            preferred_distance_km: preferred.max(0.0),
        };
        Self::new(id, position, traits, config, ctx.field().width())
    }

    /// Replace the spatial memory, e.g. with one inherited from the mother.
    pub fn with_memory(mut self, memory: PersistentSpatialMemory) -> Self {
        self.memory = memory;
        self
    }

    // ── accessors ──────────────────────────────────────────────────

    /// Identifier.
    pub fn id(&self) -> AnimalId {
        self.entity.id
    }

    /// Current position.
    pub fn position(&self) -> Vec2 {
        self.entity.position
    }

    /// Current heading.
    pub fn heading(&self) -> f64 {
        self.entity.heading()
    }

    /// Identity, position and heading.
    pub fn entity(&self) -> &Entity<AnimalId> {
        &self.entity
    }

    /// Random-walk correlation state.
    pub fn crw(&self) -> CrwState {
        self.crw
    }

    /// Positions of the last ticks, most recent first.
    pub fn positions(&self) -> &RingBuffer<Vec2> {
        &self.positions
    }

    /// Food found at those positions.
    pub fn food_history(&self) -> &RingBuffer<f64> {
        &self.food_history
    }

    /// Energetics and reproduction.
    pub fn energetics(&self) -> &Energetics {
        &self.energetics
    }

    /// Current energy.
    pub fn energy(&self) -> f64 {
        self.energetics.energy()
    }

    /// The animal's own spatial memory.
    pub fn memory(&self) -> &PersistentSpatialMemory {
        &self.memory
    }

    /// Memory of the calf being nursed.
    pub fn calf_memory(&self) -> Option<&PersistentSpatialMemory> {
        self.calf_memory.as_ref()
    }

    /// Dispersal state machine.
    pub fn dispersal(&self) -> &Dispersal {
        &self.dispersal
    }

    /// Whether a dispersal trip is under way.
    pub fn is_dispersing(&self) -> bool {
        self.dispersal.is_dispersing()
    }

    /// Preferred dispersal distance (km).
    pub fn preferred_distance_km(&self) -> f64 {
        self.preferred_distance_km
    }

    /// Deterrence state.
    pub fn deterrence(&self) -> &DeterrenceState {
        &self.deterrence
    }

    /// Remaining ticks during which deterrence is ignored.
    pub fn ignore_deterrence_ticks(&self) -> u32 {
        self.ignore_deterrence
    }

    /// Whether the animal is alive.
    pub fn is_alive(&self) -> bool {
        self.death.is_none()
    }

    /// Cause of death, once dead.
    pub fn death_cause(&self) -> Option<DeathCause> {
        self.death
    }

    // ── behaviour ──────────────────────────────────────────────────

    fn die(&mut self, cause: DeathCause) {
        if self.death.is_none() {
            trace!(animal = %self.entity.id, %cause, age = self.energetics.age(), "animal died");
            self.death = Some(cause);
            self.dispersal.deactivate();
        }
    }

    /// Offer a deterrence, recording the level of the source behind it.
    ///
    /// An accepted offer ends any dispersal trip.
    pub fn deter_from(&mut self, strength: f64, vector: Vec2, source_level: f64) -> bool {
        if !self.is_alive() {
            return false;
        }
        let accepted = self.deterrence.offer(strength, vector, source_level);
        if accepted && self.dispersal.is_dispersing() {
            debug!(animal = %self.entity.id, strength, "deterrence ended dispersal");
            self.dispersal.deactivate();
        }
        accepted
    }

    /// One tick of deterrence decay.
    pub fn decay_deterrence(&mut self, percent: f64) {
        self.deterrence.decay(percent);
    }

    /// One tick: move, eat at the cell just left, pay the energy cost and
    /// face the survival check.
    pub fn step(&mut self, movement: &MovementModel, ctx: &mut StepContext<'_>) -> Result<TickOutcome, StepError> {
        let mut out = TickOutcome::default();
        if !self.is_alive() {
            return Ok(out);
        }
        let config = ctx.config();
        let old = self.entity.position;

        let dispersal = if self.dispersal.is_dispersing() {
            self.dispersal.disperse(&mut self.entity, &self.positions, ctx)
        } else {
            DisperseOutcome::Idle
        };
        out.distance = match dispersal {
            DisperseOutcome::Moved(d) | DisperseOutcome::Finished(d) => {
                out.dispersed = true;
                d
            }
            DisperseOutcome::Idle | DisperseOutcome::Aborted => {
                let deterrence = if self.ignore_deterrence == 0 && self.deterrence.is_active() {
                    Some(self.deterrence.vector())
                } else {
                    None
                };
                movement
                    .step(
                        &mut self.entity,
                        &mut self.crw,
                        &self.positions,
                        &self.food_history,
                        deterrence,
                        ctx,
                    )
                    .distance
            }
        };

        if let Some(cell) = ctx.cell_at(old) {
            out.eaten = self.energetics.eat(ctx.landscape_mut(), cell, &config.energetics);
        }
        self.positions.push(old);
        self.food_history.push(out.eaten);
        self.memory.update_memory(old, out.eaten);
        if self.energetics.is_lactating() {
            if let Some(calf) = self.calf_memory.as_mut() {
                calf.update_memory(old, out.eaten);
            }
        }

        let km = config.cells_to_m(out.distance) / 1000.0;
        self.energetics.consume(km, ctx.tick(), &config.energetics);
        match self.energetics.survive(ctx.rng(), &config.energetics) {
            Survival::Alive => {}
            Survival::CalfAbandoned => {
                debug!(animal = %self.entity.id, "calf abandoned");
                self.calf_memory = None;
                out.calf_abandoned = true;
            }
            Survival::Died(cause) => {
                self.die(cause);
                out.death = Some(cause);
            }
        }

        self.update_ignore_countdown(config, ctx);
        self.check_finite()?;
        Ok(out)
    }

    fn update_ignore_countdown(&mut self, config: &SimulationConfig, ctx: &StepContext<'_>) {
        if self.ignore_deterrence > 0 {
            self.ignore_deterrence -= 1;
            return;
        }
        let d = &config.deterrence;
        if !self.deterrence.is_active() {
            return;
        }
        if let Some(then) = self.positions.get(d.stuck_ticks) {
            let moved_m = config.cells_to_m(ctx.field().distance(self.entity.position, *then));
            if moved_m < d.stuck_distance_m {
                debug!(animal = %self.entity.id, moved_m, "stuck while deterred, ignoring deterrence");
                self.ignore_deterrence = d.ignore_ticks;
            }
        }
    }

    fn check_finite(&self) -> Result<(), StepError> {
        let animal = self.entity.id;
        if !self.energetics.energy().is_finite() {
            return Err(StepError::NonFiniteState { animal, quantity: "energy" });
        }
        if !self.entity.position.is_finite() {
            return Err(StepError::NonFiniteState { animal, quantity: "position" });
        }
        Ok(())
    }

    /// Daily update: roll accumulators, age, reproduction, dispersal
    /// triggers and non-energetic mortality.
    pub fn daily(&mut self, ctx: &mut StepContext<'_>) -> DailyReport {
        let mut report = DailyReport::default();
        if !self.is_alive() {
            return report;
        }
        let config = ctx.config();
        let out = self.energetics.daily(ctx.tick(), ctx.rng(), &config.energetics);
        if let Some(cause) = out.death {
            self.die(cause);
            report.death = Some(cause);
            return report;
        }
        if out.born {
            report.born = true;
            self.calf_memory = Some(PersistentSpatialMemory::new(
                config.dispersal.psm.memory_cell_size,
                ctx.field().width(),
            ));
        }
        if let Some(female) = out.weaned {
            report.weaned = true;
            let calf = self.calf_memory.take();
            if female {
                report.offspring = Some(Offspring {
                    position: self.entity.position,
                    memory: calf.filter(|_| config.dispersal.psm.inherit_calf_memory),
                });
            }
        }

        let cfg = &config.dispersal;
        if self.dispersal.is_dispersing() {
            if self.energetics.energy_recovered(cfg.stop_days) {
                self.dispersal.deactivate();
                report.dispersal_stopped = true;
            }
        } else if !self.deterrence.is_active() && self.energetics.energy_declining(cfg.trigger_days) {
            let memory = select_memory(
                &self.memory,
                self.calf_memory.as_ref(),
                self.energetics.is_lactating(),
                config,
            );
            let input = DispersalInput {
                id: self.entity.id,
                position: self.entity.position,
                heading: self.entity.heading(),
                memory,
                preferred_distance_km: self.preferred_distance_km,
            };
            report.dispersal_started = self.dispersal.activate(&input, ctx);
        }
        report
    }

    /// The memory that currently drives dispersal decisions.
    ///
    /// While nursing, the calf's memory takes over when configured to.
    pub fn active_memory(&self, config: &SimulationConfig) -> &PersistentSpatialMemory {
        select_memory(
            &self.memory,
            self.calf_memory.as_ref(),
            self.energetics.is_lactating(),
            config,
        )
    }

    /// Reproductive state.
    pub fn pregnancy_status(&self) -> PregnancyStatus {
        self.energetics.status()
    }
}

// Free function so callers can hold the memory while mutating other fields.
fn select_memory<'m>(
    own: &'m PersistentSpatialMemory,
    calf: Option<&'m PersistentSpatialMemory>,
    nursing: bool,
    config: &SimulationConfig,
) -> &'m PersistentSpatialMemory {
    match calf {
        Some(calf) if nursing && config.dispersal.psm.calf_memory_substitutes => calf,
        _ => own,
    }
}

impl Deterrable for Animal {
    fn deter(&mut self, strength: f64, away: Vec2) -> bool {
        let level = self.deterrence.last_source_level();
        self.deter_from(strength, away, level)
    }

    fn is_deterred(&self) -> bool {
        self.deterrence.is_active()
    }
}
