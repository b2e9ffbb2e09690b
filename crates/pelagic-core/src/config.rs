//! Simulation configuration, defaults and validation.
//!
//! [`SimulationConfig`] is built once at startup, validated with
//! [`validate()`](SimulationConfig::validate), and then passed by shared
//! reference to every component. Nothing mutates it after validation.
//!
//! Distances inside the behaviour model are measured in grid units unless
//! a field name says otherwise (`_m`, `_km`). Step lengths of the random
//! walk are in units of 100 m, matching the calibration of the movement
//! coefficients.

use crate::geometry::Vec2;
use std::error::Error;
use std::fmt;

// ── NormalParams ───────────────────────────────────────────────────

/// Mean and standard deviation of a normal draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalParams {
    /// Mean.
    pub mean: f64,
    /// Standard deviation (must be >= 0).
    pub sd: f64,
}

impl NormalParams {
    /// Construct normal parameters.
    pub const fn new(mean: f64, sd: f64) -> Self {
        Self { mean, sd }
    }
}

// ── MovementConfig ─────────────────────────────────────────────────

/// Correlated-random-walk coefficients.
#[derive(Clone, Debug)]
pub struct MovementConfig {
    /// Autocorrelation of the turning angle with the previous one.
    pub corr_angle_base: f64,
    /// Depth term of the turning-angle scale.
    pub corr_angle_bathy: f64,
    /// Salinity term of the turning-angle scale.
    pub corr_angle_salinity: f64,
    /// Constant term of the turning-angle scale.
    pub corr_angle_base_sd: f64,
    /// Turning-angle noise (degrees).
    pub angle_noise: NormalParams,
    /// Increment added to the turning angle after short steps (degrees).
    pub turn_with_step: NormalParams,
    /// Step length (100 m units) above which turning no longer grows.
    pub turn_step_limit: f64,
    /// Autocorrelation of log10 step length.
    pub corr_logmov_length: f64,
    /// Depth term of log10 step length.
    pub corr_logmov_bathy: f64,
    /// Salinity term of log10 step length.
    pub corr_logmov_salinity: f64,
    /// Log10 step-length noise.
    pub step_noise: NormalParams,
    /// Upper bound on log10 step length.
    pub max_mov: f64,
    /// Weight of the random-walk direction against remembered food.
    pub inertia_const: f64,
    /// Sub-step (100 m units) at which the path ahead is probed for water.
    pub water_check_step: f64,
    /// Length of the position and food histories.
    pub history_len: usize,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            corr_angle_base: -0.024,
            corr_angle_bathy: 0.0,
            corr_angle_salinity: 0.0,
            corr_angle_base_sd: 1.0,
            angle_noise: NormalParams::new(0.0, 38.0),
            turn_with_step: NormalParams::new(96.0, 28.0),
            turn_step_limit: 5.5,
            corr_logmov_length: 0.35,
            corr_logmov_bathy: 0.0005,
            corr_logmov_salinity: -0.02,
            step_noise: NormalParams::new(0.42, 0.48),
            max_mov: 1.18,
            inertia_const: 0.001,
            water_check_step: 0.1,
            history_len: 120,
        }
    }
}

// ── AttractionConfig ───────────────────────────────────────────────

/// Reference-memory attraction towards previously profitable places.
#[derive(Clone, Debug)]
pub struct AttractionConfig {
    /// Whether remembered food pulls the animal at all.
    pub enabled: bool,
    /// Logistic decay rate of the reference-memory weights.
    pub ref_mem_decay: f64,
}

impl Default for AttractionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ref_mem_decay: 0.10,
        }
    }
}

// ── DeterrenceConfig ───────────────────────────────────────────────

/// Logistic response probability and log-linear response magnitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResponseCoefficients {
    /// Intercept of the logit of the response probability.
    pub prob_intercept: f64,
    /// Slope of the logit per dB of received level.
    pub prob_slope: f64,
    /// Intercept of the natural log of the displacement (metres).
    pub magnitude_intercept: f64,
    /// Slope of the log displacement per dB of received level.
    pub magnitude_slope: f64,
}

/// Response of animals to passing ships.
#[derive(Clone, Debug)]
pub struct ShipResponseConfig {
    /// Whether ships deter at all.
    pub enabled: bool,
    /// Centre frequency of the modelled band (kHz).
    pub frequency_khz: f64,
    /// Frequency-weighting constant added to the received level (dB).
    pub weighting_db: f64,
    /// Ships farther than this are ignored (km).
    pub max_distance_km: f64,
    /// Coefficients applied between 06:00 and 18:00.
    pub day: ResponseCoefficients,
    /// Coefficients applied at night.
    pub night: ResponseCoefficients,
}

impl Default for ShipResponseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency_khz: 0.125,
            weighting_db: 0.0,
            max_distance_km: 20.0,
            day: ResponseCoefficients {
                prob_intercept: -8.0,
                prob_slope: 0.07,
                magnitude_intercept: -2.0,
                magnitude_slope: 0.06,
            },
            night: ResponseCoefficients {
                prob_intercept: -9.0,
                prob_slope: 0.07,
                magnitude_intercept: -2.5,
                magnitude_slope: 0.06,
            },
        }
    }
}

/// Deterrence by noise sources.
#[derive(Clone, Debug)]
pub struct DeterrenceConfig {
    /// Whether deterrence vectors affect movement.
    pub enabled: bool,
    /// Received level above which animals respond (dB).
    pub response_threshold: f64,
    /// Geometric spreading coefficient of the simple propagation law.
    pub beta_hat: f64,
    /// Linear absorption coefficient (dB per metre).
    pub alpha_hat: f64,
    /// Fixed sources farther than this are ignored (km).
    pub max_distance_km: f64,
    /// Scales deterrence strength into a displacement (grid units per dB).
    pub deter_coeff: f64,
    /// Percentage lost by the deterrence each tick.
    pub decay_percent: f64,
    /// Ticks a deterrence lasts before snapping to zero.
    pub decay_ticks: i32,
    /// Window (ticks) over which a deterred animal is checked for being stuck.
    pub stuck_ticks: usize,
    /// Net displacement (m) below which a deterred animal counts as stuck.
    pub stuck_distance_m: f64,
    /// Ticks during which deterrence is ignored once stuck.
    pub ignore_ticks: u32,
    /// Ship response parameters.
    pub ships: ShipResponseConfig,
}

impl Default for DeterrenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            response_threshold: 158.0,
            beta_hat: 20.0,
            alpha_hat: 0.0,
            max_distance_km: 50.0,
            deter_coeff: 0.07,
            decay_percent: 50.0,
            decay_ticks: 5,
            stuck_ticks: 6,
            stuck_distance_m: 200.0,
            ignore_ticks: 96,
            ships: ShipResponseConfig::default(),
        }
    }
}

// ── DispersalConfig ────────────────────────────────────────────────

/// Which dispersal strategy animals use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispersalKind {
    /// Never disperse.
    Off,
    /// Flag-only baseline strategy.
    Undirected,
    /// Memory target, logistic step-fraction deceleration.
    PsmType1,
    /// Memory target, random heading perturbation.
    PsmType2,
    /// Memory target, sigmoid heading correction around the half-way point.
    PsmType3,
    /// Two-phase region-specific strategy for enclosed waters.
    InnerWaters,
}

/// Persistent-spatial-memory dispersal parameters.
#[derive(Clone, Debug)]
pub struct PsmConfig {
    /// Preferred dispersal distance drawn once per animal (km).
    pub preferred_distance_km: NormalParams,
    /// Half-width of the accepted distance band around the preference (km).
    pub tolerance_km: f64,
    /// Visited memory cells required before memory targets are used.
    pub min_memory_cells: usize,
    /// Side of a memory cell (grid units).
    pub memory_cell_size: f64,
    /// Maximum heading perturbation of type 2 (degrees).
    pub angle_deg: f64,
    /// Steepness of the logistic curves of types 2 and 3.
    pub logistic_k: f64,
    /// Steepness of the type 1 step-fraction curve.
    pub q1: f64,
    /// Block ids never chosen as random targets.
    pub masked_blocks: Vec<i32>,
    /// A weaned calf inherits the memory it accumulated with its mother.
    pub inherit_calf_memory: bool,
    /// While a calf depends on its mother, target search uses the calf memory.
    pub calf_memory_substitutes: bool,
}

impl Default for PsmConfig {
    fn default() -> Self {
        Self {
            preferred_distance_km: NormalParams::new(300.0, 100.0),
            tolerance_km: 5.0,
            min_memory_cells: 50,
            memory_cell_size: 5.0,
            angle_deg: 20.0,
            logistic_k: 10.0,
            q1: 0.02,
            masked_blocks: Vec::new(),
            inherit_calf_memory: true,
            calf_memory_substitutes: false,
        }
    }
}

/// A candidate target region of the inner-waters strategy.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockTarget {
    /// Block id as reported by the landscape.
    pub block: i32,
    /// Centre of the block (grid units).
    pub center: Vec2,
    /// Relative habitat quality; selection weight.
    pub quality: f64,
}

/// Region-specific two-phase dispersal parameters.
#[derive(Clone, Debug)]
pub struct InnerWatersConfig {
    /// Candidate target blocks.
    pub blocks: Vec<BlockTarget>,
    /// Blocks closer than this are not chosen as targets (km).
    pub min_target_distance_km: f64,
    /// Phase 1 ends within this distance of the target (km).
    pub target_reach_km: f64,
    /// Offsets (degrees) probed either side of the desired heading.
    pub probe_angles_deg: Vec<f64>,
    /// Phase 1 ends when the animal moved less than this over a day (km).
    pub stuck_distance_km: f64,
    /// Tolerated relative deviation from the followed coast distance.
    pub contour_tolerance: f64,
}

impl Default for InnerWatersConfig {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            min_target_distance_km: 20.0,
            target_reach_km: 5.0,
            probe_angles_deg: vec![0.0, 20.0, 40.0, 60.0, 90.0],
            stuck_distance_km: 2.0,
            contour_tolerance: 0.25,
        }
    }
}

/// Long-range dispersal.
#[derive(Clone, Debug)]
pub struct DispersalConfig {
    /// Strategy used by every animal.
    pub kind: DispersalKind,
    /// Consecutive days of declining energy that start dispersal.
    pub trigger_days: usize,
    /// Days of net energy gain that stop dispersal.
    pub stop_days: usize,
    /// Minimum depth (m) along a dispersal step.
    pub min_depth: f64,
    /// Distance covered per dispersal tick (km).
    pub step_km: f64,
    /// Distance ahead (km) that must be water to keep dispersing.
    pub water_ahead_km: f64,
    /// Persistent-spatial-memory parameters.
    pub psm: PsmConfig,
    /// Inner-waters parameters.
    pub inner_waters: InnerWatersConfig,
}

impl Default for DispersalConfig {
    fn default() -> Self {
        Self {
            kind: DispersalKind::PsmType2,
            trigger_days: 3,
            stop_days: 8,
            min_depth: 4.0,
            step_km: 1.05,
            water_ahead_km: 1.0,
            psm: PsmConfig::default(),
            inner_waters: InnerWatersConfig::default(),
        }
    }
}

// ── EnergeticsConfig ───────────────────────────────────────────────

/// Energy balance, survival and reproduction.
#[derive(Clone, Debug)]
pub struct EnergeticsConfig {
    /// Energy of a newly created animal.
    pub initial_energy: NormalParams,
    /// Basal energy use per half hour (scaled by 0.001).
    pub e_use_per_30_min: f64,
    /// Energy use per km swum.
    pub e_use_per_km: f64,
    /// Warm-season multiplier (April to September).
    pub e_warm: f64,
    /// Lactation multiplier.
    pub e_lact: f64,
    /// Energy level at which animals stop eating.
    pub max_energy: f64,
    /// Divisor of the eaten fraction `(max_energy - energy) / divisor`.
    pub food_fraction_divisor: f64,
    /// Upper bound on the eaten fraction.
    pub max_food_fraction: f64,
    /// Food floor left behind in an eaten cell.
    pub artificial_food: f64,
    /// Scale of the energy-dependent yearly mortality.
    pub m_mort_prob_const: f64,
    /// Energy sensitivity of yearly survival.
    pub x_survival_prob_const: f64,
    /// Yearly bycatch probability.
    pub bycatch_prob: f64,
    /// Animals die of old age beyond this (years).
    pub max_age: f64,
    /// Age of sexual maturity (years).
    pub maturity_age: f64,
    /// Probability of conceiving on the mating day.
    pub conceive_prob: f64,
    /// Gestation length (days).
    pub gestation_days: u32,
    /// Nursing length (days).
    pub nursing_days: u32,
    /// Mating day of year.
    pub mating_day: NormalParams,
    /// Probability that a weaned calf is female (and thus simulated).
    pub female_prob: f64,
    /// Starvation, bycatch and old-age mortality.
    pub mortality_enabled: bool,
    /// Pregnancy, birth and weaning.
    pub reproduction_enabled: bool,
}

impl Default for EnergeticsConfig {
    fn default() -> Self {
        Self {
            initial_energy: NormalParams::new(10.0, 1.0),
            e_use_per_30_min: 4.5,
            e_use_per_km: 0.0,
            e_warm: 1.3,
            e_lact: 1.4,
            max_energy: 20.0,
            food_fraction_divisor: 10.0,
            max_food_fraction: 0.99,
            artificial_food: 0.01,
            m_mort_prob_const: 1.0,
            x_survival_prob_const: 0.15,
            bycatch_prob: 0.0,
            max_age: 30.0,
            maturity_age: 3.44,
            conceive_prob: 0.68,
            gestation_days: 300,
            nursing_days: 240,
            mating_day: NormalParams::new(225.0, 20.0),
            female_prob: 0.5,
            mortality_enabled: true,
            reproduction_enabled: true,
        }
    }
}

// ── FoodConfig ─────────────────────────────────────────────────────

/// Daily logistic regrowth of food patches.
#[derive(Clone, Debug)]
pub struct FoodConfig {
    /// Logistic growth rate per step.
    pub growth_rate: f64,
    /// Maximum food level at average habitat suitability.
    pub max_u: f64,
    /// Single-step change above which the finer-resolution iterations run.
    pub regrowth_significance: f64,
    /// Patches per parallel work chunk.
    pub chunk_size: usize,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            growth_rate: 0.10,
            max_u: 1.0,
            regrowth_significance: 0.001,
            chunk_size: 4096,
        }
    }
}

// ── SimulationConfig ───────────────────────────────────────────────

/// Immutable parameters of a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Side of one landscape cell (m).
    pub cell_size_m: f64,
    /// Side of one spatial-index bucket (grid units).
    pub index_bucket_size: f64,
    /// Random-walk movement.
    pub movement: MovementConfig,
    /// Reference-memory attraction.
    pub attraction: AttractionConfig,
    /// Noise deterrence.
    pub deterrence: DeterrenceConfig,
    /// Long-range dispersal.
    pub dispersal: DispersalConfig,
    /// Energetics and life history.
    pub energetics: EnergeticsConfig,
    /// Food regrowth.
    pub food: FoodConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cell_size_m: 400.0,
            index_bucket_size: 10.0,
            movement: MovementConfig::default(),
            attraction: AttractionConfig::default(),
            deterrence: DeterrenceConfig::default(),
            dispersal: DispersalConfig::default(),
            energetics: EnergeticsConfig::default(),
            food: FoodConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Grid units per metre.
    pub fn cells_per_m(&self) -> f64 {
        1.0 / self.cell_size_m
    }

    /// Convert a random-walk step (100 m units) to grid units.
    pub fn step_to_cells(&self, step: f64) -> f64 {
        step * 100.0 / self.cell_size_m
    }

    /// Convert kilometres to grid units.
    pub fn km_to_cells(&self, km: f64) -> f64 {
        km * 1000.0 / self.cell_size_m
    }

    /// Convert grid units to metres.
    pub fn cells_to_m(&self, cells: f64) -> f64 {
        cells * self.cell_size_m
    }

    /// Check structural invariants.
    ///
    /// Called once before any component is constructed; a failure here
    /// aborts the run with a descriptive message.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("cell_size_m", self.cell_size_m)?;
        positive("index_bucket_size", self.index_bucket_size)?;

        let m = &self.movement;
        non_negative("movement.angle_noise.sd", m.angle_noise.sd)?;
        non_negative("movement.turn_with_step.sd", m.turn_with_step.sd)?;
        non_negative("movement.step_noise.sd", m.step_noise.sd)?;
        positive("movement.turn_step_limit", m.turn_step_limit)?;
        finite("movement.max_mov", m.max_mov)?;
        positive("movement.water_check_step", m.water_check_step)?;
        if m.history_len < 2 {
            return Err(ConfigError::InvalidParameter {
                name: "movement.history_len",
                reason: format!("must be at least 2, got {}", m.history_len),
            });
        }

        probability("attraction.ref_mem_decay", self.attraction.ref_mem_decay)?;

        let d = &self.deterrence;
        finite("deterrence.response_threshold", d.response_threshold)?;
        non_negative("deterrence.max_distance_km", d.max_distance_km)?;
        positive("deterrence.deter_coeff", d.deter_coeff)?;
        if !(0.0..=100.0).contains(&d.decay_percent) {
            return Err(ConfigError::InvalidParameter {
                name: "deterrence.decay_percent",
                reason: format!("must be within [0, 100], got {}", d.decay_percent),
            });
        }
        if d.decay_ticks < 0 {
            return Err(ConfigError::InvalidParameter {
                name: "deterrence.decay_ticks",
                reason: format!("must be >= 0, got {}", d.decay_ticks),
            });
        }
        if d.stuck_ticks == 0 || d.stuck_ticks >= m.history_len {
            return Err(ConfigError::InconsistentParameters {
                reason: format!(
                    "deterrence.stuck_ticks ({}) must be within [1, movement.history_len ({}))",
                    d.stuck_ticks, m.history_len
                ),
            });
        }
        positive("deterrence.ships.frequency_khz", d.ships.frequency_khz)?;
        non_negative("deterrence.ships.max_distance_km", d.ships.max_distance_km)?;

        let disp = &self.dispersal;
        if disp.trigger_days == 0 || disp.trigger_days >= 10 {
            return Err(ConfigError::InvalidParameter {
                name: "dispersal.trigger_days",
                reason: format!("must be within [1, 9], got {}", disp.trigger_days),
            });
        }
        if disp.stop_days == 0 || disp.stop_days >= 10 {
            return Err(ConfigError::InvalidParameter {
                name: "dispersal.stop_days",
                reason: format!("must be within [1, 9], got {}", disp.stop_days),
            });
        }
        positive("dispersal.step_km", disp.step_km)?;
        non_negative("dispersal.water_ahead_km", disp.water_ahead_km)?;
        positive("dispersal.psm.memory_cell_size", disp.psm.memory_cell_size)?;
        non_negative("dispersal.psm.tolerance_km", disp.psm.tolerance_km)?;
        non_negative(
            "dispersal.psm.preferred_distance_km.sd",
            disp.psm.preferred_distance_km.sd,
        )?;
        for b in &disp.inner_waters.blocks {
            if !b.quality.is_finite() || b.quality < 0.0 {
                return Err(ConfigError::InvalidParameter {
                    name: "dispersal.inner_waters.blocks",
                    reason: format!("block {} has invalid quality {}", b.block, b.quality),
                });
            }
        }
        if disp.kind == DispersalKind::InnerWaters && disp.inner_waters.blocks.is_empty() {
            return Err(ConfigError::InconsistentParameters {
                reason: "inner-waters dispersal needs at least one target block".into(),
            });
        }

        let e = &self.energetics;
        non_negative("energetics.initial_energy.sd", e.initial_energy.sd)?;
        positive("energetics.max_energy", e.max_energy)?;
        positive("energetics.food_fraction_divisor", e.food_fraction_divisor)?;
        probability("energetics.max_food_fraction", e.max_food_fraction)?;
        non_negative("energetics.artificial_food", e.artificial_food)?;
        probability("energetics.bycatch_prob", e.bycatch_prob)?;
        probability("energetics.conceive_prob", e.conceive_prob)?;
        probability("energetics.female_prob", e.female_prob)?;
        positive("energetics.max_age", e.max_age)?;
        non_negative("energetics.maturity_age", e.maturity_age)?;

        let f = &self.food;
        non_negative("food.growth_rate", f.growth_rate)?;
        positive("food.max_u", f.max_u)?;
        non_negative("food.regrowth_significance", f.regrowth_significance)?;
        if f.chunk_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "food.chunk_size",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

fn finite(name: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be finite, got {v}"),
        })
    }
}

fn positive(name: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be finite and > 0, got {v}"),
        })
    }
}

fn non_negative(name: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be finite and >= 0, got {v}"),
        })
    }
}

fn probability(name: &'static str, v: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be within [0, 1], got {v}"),
        })
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimulationConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A single parameter is out of range.
    InvalidParameter {
        /// Dotted parameter path.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// Parameters are individually valid but contradict each other.
    InconsistentParameters {
        /// Description of the conflict.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter '{name}': {reason}")
            }
            Self::InconsistentParameters { reason } => {
                write!(f, "inconsistent parameters: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        SimulationConfig::default().validate().unwrap();
    }

    #[test]
    fn unit_conversions() {
        let c = SimulationConfig::default();
        assert_eq!(c.step_to_cells(4.0), 1.0);
        assert_eq!(c.km_to_cells(1.0), 2.5);
        assert_eq!(c.cells_to_m(2.0), 800.0);
    }

    #[test]
    fn rejects_non_positive_cell_size() {
        let c = SimulationConfig {
            cell_size_m: 0.0,
            ..Default::default()
        };
        match c.validate() {
            Err(ConfigError::InvalidParameter { name, .. }) => assert_eq!(name, "cell_size_m"),
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn rejects_decay_percent_out_of_range() {
        let mut c = SimulationConfig::default();
        c.deterrence.decay_percent = 150.0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InvalidParameter {
                name: "deterrence.decay_percent",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_deter_coeff() {
        let mut c = SimulationConfig::default();
        c.deterrence.deter_coeff = 0.0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InvalidParameter {
                name: "deterrence.deter_coeff",
                ..
            })
        ));
    }

    #[test]
    fn rejects_probability_above_one() {
        let mut c = SimulationConfig::default();
        c.energetics.conceive_prob = 1.5;
        assert!(c.validate().is_err());
    }

    #[test]
    fn inner_waters_requires_blocks() {
        let mut c = SimulationConfig::default();
        c.dispersal.kind = DispersalKind::InnerWaters;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InconsistentParameters { .. })
        ));
        c.dispersal.inner_waters.blocks.push(BlockTarget {
            block: 1,
            center: Vec2::new(10.0, 10.0),
            quality: 1.0,
        });
        c.validate().unwrap();
    }

    #[test]
    fn stuck_window_must_fit_history() {
        let mut c = SimulationConfig::default();
        c.deterrence.stuck_ticks = 500;
        assert!(c.validate().is_err());
    }

    #[test]
    fn error_display() {
        let e = ConfigError::InvalidParameter {
            name: "food.max_u",
            reason: "must be finite and > 0, got 0".into(),
        };
        assert_eq!(
            e.to_string(),
            "invalid parameter 'food.max_u': must be finite and > 0, got 0"
        );
    }
}
