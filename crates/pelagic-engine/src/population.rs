//! The set of living animals and their spatial index.
//!
//! Animals are kept in id order (ids only grow, and insertion appends),
//! which fixes the order in which they act and therefore the order of
//! random draws. Dead animals stay in place, inert, until the reaper
//! removes them at the end of the tick; each one leaves a [`DeadMarker`]
//! that survives exactly one further tick.

use indexmap::IndexMap;
use pelagic_agent::{Animal, DeathCause};
use pelagic_core::{AnimalId, TickId, Vec2};
use pelagic_space::{SpaceError, SpatialIndex};

/// Where and why an animal died, kept for reporting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeadMarker {
    /// The dead animal.
    pub id: AnimalId,
    /// Position at death.
    pub position: Vec2,
    /// Cause of death.
    pub cause: DeathCause,
    /// Tick of removal.
    pub tick: TickId,
}

/// Living animals plus their index.
#[derive(Clone, Debug)]
pub struct Population {
    animals: IndexMap<AnimalId, Animal>,
    index: SpatialIndex,
    dead: Vec<DeadMarker>,
}

impl Population {
    /// An empty population indexed with buckets of `bucket_size`.
    pub fn new(bucket_size: f64) -> Result<Self, SpaceError> {
        Ok(Self {
            animals: IndexMap::new(),
            index: SpatialIndex::new(bucket_size)?,
            dead: Vec::new(),
        })
    }

    /// Number of animals, including ones that died this tick.
    pub fn len(&self) -> usize {
        self.animals.len()
    }

    /// Whether there are no animals.
    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }

    /// Add an animal and index it.
    pub fn insert(&mut self, animal: Animal) {
        self.index.insert(animal.id(), animal.position());
        self.animals.insert(animal.id(), animal);
    }

    /// Look up an animal.
    pub fn get(&self, id: AnimalId) -> Option<&Animal> {
        self.animals.get(&id)
    }

    /// Look up an animal mutably. Callers that move it must call
    /// [`relocate`](Self::relocate) afterwards.
    pub fn get_mut(&mut self, id: AnimalId) -> Option<&mut Animal> {
        self.animals.get_mut(&id)
    }

    /// Animals in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.animals.values()
    }

    /// Snapshot of the ids, for loops that mutate the population.
    pub fn ids(&self) -> Vec<AnimalId> {
        self.animals.keys().copied().collect()
    }

    /// Bring the index up to date with an animal's position.
    pub fn relocate(&mut self, id: AnimalId) {
        if let Some(a) = self.animals.get(&id) {
            self.index.relocate(id, a.position());
        }
    }

    /// The spatial index.
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Animals that died this tick or last tick, in removal order.
    pub fn dead_markers(&self) -> &[DeadMarker] {
        &self.dead
    }

    /// Drop last tick's markers, then remove every dead animal from the
    /// map and the index, leaving a marker for each. Returns how many
    /// were removed.
    pub fn reap(&mut self, tick: TickId) -> usize {
        self.dead.retain(|m| m.tick == tick);
        let before = self.dead.len();
        let index = &mut self.index;
        let dead = &mut self.dead;
        self.animals.retain(|id, a| match a.death_cause() {
            None => true,
            Some(cause) => {
                index.remove(*id);
                dead.push(DeadMarker {
                    id: *id,
                    position: a.position(),
                    cause,
                    tick,
                });
                false
            }
        });
        self.dead.len() - before
    }

    /// Whether the index matches the animals' positions exactly.
    pub fn is_consistent(&self) -> bool {
        self.index
            .is_consistent(self.animals.values().map(|a| (a.id(), a.position())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pelagic_agent::{AnimalTraits, Diagnostics, StepContext};
    use pelagic_core::{SeededRandom, SimulationConfig};
    use pelagic_test_utils::fixtures::{bounce_field, open_water};

    fn animal(id: u64, x: f64, energy: f64) -> Animal {
        let traits = AnimalTraits {
            heading: 0.0,
            age: 5.0,
            energy,
            mating_day: 225,
            preferred_distance_km: 300.0,
        };
        Animal::new(AnimalId(id), Vec2::new(x, 5.0), traits, &SimulationConfig::default(), 20)
    }

    #[test]
    fn insert_keeps_id_order_and_indexes() {
        let mut p = Population::new(5.0).unwrap();
        p.insert(animal(0, 1.0, 10.0));
        p.insert(animal(1, 12.0, 10.0));
        assert_eq!(p.ids(), vec![AnimalId(0), AnimalId(1)]);
        assert!(p.is_consistent());
        assert_eq!(p.index().query_neighbourhood(Vec2::new(1.0, 5.0)), vec![AnimalId(0)]);
    }

    #[test]
    fn markers_last_one_tick() {
        let mut land = open_water(20, 20, 20.0);
        let field = bounce_field(20, 20);
        let config = SimulationConfig::default();
        let mut rng = SeededRandom::new(1);
        let mut diag = Diagnostics::default();
        let mut ctx = StepContext::new(&mut land, &field, &config, &mut rng, &mut diag, TickId(0));
        let movement = pelagic_agent::MovementModel::new(&config);

        let mut p = Population::new(5.0).unwrap();
        p.insert(animal(0, 3.0, 10.0));
        // Hopeless energy: the per-tick survival draw always fails.
        p.insert(animal(1, 8.0, -1.0e6));
        for id in p.ids() {
            p.get_mut(id).unwrap().step(&movement, &mut ctx).unwrap();
            p.relocate(id);
        }
        assert_eq!(p.reap(TickId(0)), 1);
        assert_eq!(p.len(), 1);
        assert_eq!(p.dead_markers()[0].id, AnimalId(1));
        assert_eq!(p.dead_markers()[0].cause, DeathCause::Starvation);
        assert!(p.is_consistent());

        assert_eq!(p.reap(TickId(1)), 0);
        assert!(p.dead_markers().is_empty());
    }
}
