//! Logistic growth kernel and the chunked fork/join driver.

use pelagic_core::config::FoodConfig;
use pelagic_core::is_valid;
use pelagic_space::{FoodParts, FoodPatch, GridLandscape};
use rayon::prelude::*;

/// Further iterations applied when the first step changes food by more
/// than the significance threshold; together with the first step they
/// cover the 48 half-hour steps of a day.
pub const EXTRA_ITERATIONS: usize = 47;

/// One logistic step `f + r f (1 - f / k)`, floored at zero.
///
/// ```
/// let f = pelagic_food::logistic_step(0.5, 0.10, 1.0);
/// assert!((f - 0.525).abs() < 1e-12);
/// ```
pub fn logistic_step(food: f64, rate: f64, capacity: f64) -> f64 {
    (food + rate * food * (1.0 - food / capacity)).max(0.0)
}

/// Totals of one growth pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GrowthSummary {
    /// Net food added over all patches.
    pub grown: f64,
    /// Patches that needed the finer-resolution iterations.
    pub extra_growth_events: u64,
    /// Patches visited.
    pub patches: usize,
}

impl GrowthSummary {
    fn merge(mut self, other: GrowthSummary) -> GrowthSummary {
        self.grown += other.grown;
        self.extra_growth_events += other.extra_growth_events;
        self.patches += other.patches;
        self
    }
}

/// Grows every food patch once per day.
#[derive(Clone, Debug)]
pub struct FoodGrowthEngine {
    rate: f64,
    max_u: f64,
    significance: f64,
    chunk_size: usize,
}

impl FoodGrowthEngine {
    /// Build from the food section of the configuration.
    pub fn new(config: &FoodConfig) -> Self {
        Self {
            rate: config.growth_rate,
            max_u: config.max_u,
            significance: config.regrowth_significance,
            chunk_size: config.chunk_size.max(1),
        }
    }

    /// Patches handed to one worker.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Grow all patches of `landscape`, blocking until every chunk is done.
    pub fn grow(&self, landscape: &mut GridLandscape) -> GrowthSummary {
        self.grow_parts(landscape.food_parts_mut())
    }

    /// Grow a borrowed patch set.
    ///
    /// Chunk totals are summed in chunk order so the summary does not
    /// depend on how the pool schedules work.
    pub fn grow_parts(&self, parts: FoodParts<'_>) -> GrowthSummary {
        let FoodParts {
            patches,
            max_ent,
            mean_max_ent,
        } = parts;
        if patches.is_empty() || !is_valid(mean_max_ent) || mean_max_ent <= 0.0 {
            return GrowthSummary {
                patches: patches.len(),
                ..Default::default()
            };
        }
        let totals: Vec<GrowthSummary> = patches
            .par_chunks_mut(self.chunk_size)
            .map(|chunk| self.grow_chunk(chunk, max_ent, mean_max_ent))
            .collect();
        totals
            .into_iter()
            .fold(GrowthSummary::default(), GrowthSummary::merge)
    }

    fn grow_chunk(&self, chunk: &mut [FoodPatch], max_ent: &[f64], mean: f64) -> GrowthSummary {
        let mut summary = GrowthSummary {
            patches: chunk.len(),
            ..Default::default()
        };
        for patch in chunk {
            let m = max_ent
                .get(patch.cell_index as usize)
                .copied()
                .unwrap_or(pelagic_core::NO_DATA);
            if !is_valid(m) || m <= 0.0 {
                continue;
            }
            let capacity = self.max_u * m / mean;
            let before = patch.food;
            let mut f = logistic_step(before, self.rate, capacity);
            if (f - before).abs() > self.significance {
                for _ in 0..EXTRA_ITERATIONS {
                    f = logistic_step(f, self.rate, capacity);
                }
                summary.extra_growth_events += 1;
            }
            patch.food = f;
            summary.grown += f - before;
        }
        summary
    }
}
