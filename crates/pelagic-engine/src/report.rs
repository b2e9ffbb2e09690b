//! Daily population summary.

use crate::population::Population;
use pelagic_core::TickId;

/// Snapshot of the population taken once a day.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PopulationReport {
    /// Tick of the snapshot.
    pub tick: TickId,
    /// Living animals.
    pub size: usize,
    /// Mean energy of the living animals (0 when none).
    pub mean_energy: f64,
    /// Animals on a dispersal trip.
    pub dispersing: usize,
    /// Animals under an active deterrence.
    pub deterred: usize,
    /// Animals nursing a calf.
    pub lactating: usize,
    /// Deaths still marked (this tick and last).
    pub recently_dead: usize,
    /// Food summed over all patches.
    pub food_total: f64,
}

impl PopulationReport {
    /// Summarise `population` at `tick`.
    pub fn collect(tick: TickId, population: &Population, food_total: f64) -> Self {
        let mut r = Self {
            tick,
            food_total,
            recently_dead: population.dead_markers().len(),
            ..Default::default()
        };
        let mut energy = 0.0;
        for a in population.iter().filter(|a| a.is_alive()) {
            r.size += 1;
            energy += a.energy();
            r.dispersing += usize::from(a.is_dispersing());
            r.deterred += usize::from(a.deterrence().is_active());
            r.lactating += usize::from(a.energetics().is_lactating());
        }
        if r.size > 0 {
            r.mean_energy = energy / r.size as f64;
        }
        r
    }
}
