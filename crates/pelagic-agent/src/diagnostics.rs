//! Counters for bounded fallbacks taken during behaviour steps.
//!
//! Rejection-sampling loops never fail; when they hit their iteration
//! cap they fall back to a calibrated value and bump a counter here.

/// Fallback and degradation counters, accumulated over one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Turning-angle draws that fell back to +-90 degrees.
    pub angle_fallbacks: u64,
    /// Step-dependent turn draws that fell back to a uniform 90..110.
    pub turn_fallbacks: u64,
    /// Step-length draws that fell back to the maximum step.
    pub step_fallbacks: u64,
    /// Land-avoidance searches that hit their iteration cap.
    pub land_avoidance_escapes: u64,
    /// Moves cancelled because the destination was dry.
    pub dry_destination_retreats: u64,
    /// Dispersal targets found by random probing instead of memory.
    pub dispersal_random_targets: u64,
    /// Dispersal activations abandoned for lack of any target.
    pub dispersal_target_failures: u64,
    /// Dispersal trips aborted by water, depth or bounds checks.
    pub dispersal_aborts: u64,
    /// Transmission-loss calculations skipped for missing inputs.
    pub acoustic_inputs_missing: u64,
}

impl Diagnostics {
    /// Add another set of counters into this one.
    pub fn absorb(&mut self, other: &Diagnostics) {
        self.angle_fallbacks += other.angle_fallbacks;
        self.turn_fallbacks += other.turn_fallbacks;
        self.step_fallbacks += other.step_fallbacks;
        self.land_avoidance_escapes += other.land_avoidance_escapes;
        self.dry_destination_retreats += other.dry_destination_retreats;
        self.dispersal_random_targets += other.dispersal_random_targets;
        self.dispersal_target_failures += other.dispersal_target_failures;
        self.dispersal_aborts += other.dispersal_aborts;
        self.acoustic_inputs_missing += other.acoustic_inputs_missing;
    }

    /// Total number of fallbacks of the movement sampler.
    pub fn sampler_fallbacks(&self) -> u64 {
        self.angle_fallbacks + self.turn_fallbacks + self.step_fallbacks
    }
}
