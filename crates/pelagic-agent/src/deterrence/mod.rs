//! Noise deterrence: how loud sources push animals away.
//!
//! Each animal carries a [`DeterrenceState`]. Sources offer deterrences
//! every tick; the strongest one wins and is never summed with others.
//! Between offers the deterrence decays geometrically and expires after a
//! fixed number of ticks.

pub mod acoustics;
pub mod sources;

use crate::context::StepContext;
use acoustics::{transmission_loss, PropagationInputs};
use pelagic_core::config::{DeterrenceConfig, ResponseCoefficients};
use pelagic_core::{NoiseSource, TickId, Vec2};
use sources::{FixedSource, Ship};

/// Sub-steps along a ship's track within one tick.
pub const SHIP_SUB_STEPS: usize = 30;

/// Current deterrence of one animal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeterrenceState {
    strength: f64,
    vector: Vec2,
    ticks_left: i32,
    last_source_level: f64,
    decay_ticks: i32,
}

impl DeterrenceState {
    /// No deterrence; fresh offers last `decay_ticks` ticks.
    pub fn new(decay_ticks: i32) -> Self {
        Self {
            strength: 0.0,
            vector: Vec2::ZERO,
            ticks_left: 0,
            last_source_level: 0.0,
            decay_ticks,
        }
    }

    /// Current strength (dB above the response threshold).
    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Displacement per tick (grid units).
    pub fn vector(&self) -> Vec2 {
        self.vector
    }

    /// Ticks until the deterrence snaps to zero.
    pub fn ticks_left(&self) -> i32 {
        self.ticks_left
    }

    /// Source level of the source behind the current deterrence.
    pub fn last_source_level(&self) -> f64 {
        self.last_source_level
    }

    /// Whether a deterrence is in effect.
    pub fn is_active(&self) -> bool {
        self.strength > 0.0
    }

    /// Offer a deterrence. It replaces the current one only when stronger.
    pub fn offer(&mut self, strength: f64, vector: Vec2, source_level: f64) -> bool {
        if !(strength > 0.0) || strength <= self.strength || !vector.is_finite() {
            return false;
        }
        self.strength = strength;
        self.vector = vector;
        self.ticks_left = self.decay_ticks;
        self.last_source_level = source_level;
        true
    }

    /// One tick of decay by `percent`.
    ///
    /// The vector shrinks twice as fast as the strength.
    pub fn decay(&mut self, percent: f64) {
        if self.ticks_left <= 0 {
            self.strength = 0.0;
            self.vector = Vec2::ZERO;
            self.ticks_left = 0;
            return;
        }
        self.ticks_left -= 1;
        let keep = (100.0 - percent) / 100.0;
        self.strength *= keep;
        self.vector = self.vector * (keep / 2.0);
    }
}

/// Received level excess `impact - (beta log10 d + alpha d) - threshold`
/// of a fixed source at `distance_m`.
pub fn fixed_source_excess(impact: f64, distance_m: f64, cfg: &DeterrenceConfig) -> f64 {
    let d = distance_m.max(1.0);
    impact - (cfg.beta_hat * d.log10() + cfg.alpha_hat * d) - cfg.response_threshold
}

/// Distance (m) within which a fixed source of `impact` deters, capped by
/// the configured maximum.
pub fn detection_radius_m(impact: f64, cfg: &DeterrenceConfig) -> f64 {
    let r = 10f64.powf((impact - cfg.response_threshold) / 20.0);
    r.min(cfg.max_distance_km * 1000.0)
}

/// Deterrence offered by a fixed source to an animal at `animal`.
///
/// Returns `(strength, displacement)` or `None` when out of range or
/// below threshold.
pub fn fixed_source_push(
    source: &FixedSource,
    tick: TickId,
    animal: Vec2,
    ctx: &StepContext<'_>,
) -> Option<(f64, Vec2)> {
    let cfg = &ctx.config().deterrence;
    let at = source.position(tick)?;
    let field = ctx.field();
    let delta = field.delta(at, animal);
    let dist_m = ctx.config().cells_to_m(delta.length());
    if dist_m > detection_radius_m(source.impact(), cfg) {
        return None;
    }
    let excess = fixed_source_excess(source.impact(), dist_m, cfg);
    if excess <= 0.0 {
        return None;
    }
    let away = delta.normalized().unwrap_or_else(|| Vec2::from_heading(0.0));
    Some((excess, away * (excess * cfg.deter_coeff)))
}

/// Logistic response probability for a received level.
pub fn response_probability(c: &ResponseCoefficients, received_level: f64) -> f64 {
    1.0 / (1.0 + (-(c.prob_intercept + c.prob_slope * received_level)).exp())
}

/// Displacement (m) of one response to a received level.
pub fn response_magnitude_m(c: &ResponseCoefficients, received_level: f64) -> f64 {
    (c.magnitude_intercept + c.magnitude_slope * received_level).exp()
}

/// Deterrence offered by a ship to an animal at `animal` during `tick`.
///
/// The ship's track over the tick is split into sub-steps; at each one
/// the animal responds with the logistic probability of the received
/// level and is displaced away from the ship. Returns the strength and
/// the summed displacement (grid units), or `None` when the animal never
/// responded or the responses cancelled out.
///
/// The strength is on the fixed-source scale: the excess over the
/// response threshold that a fixed source would need to produce the same
/// displacement, so ships and turbines compete like for like.
pub fn ship_push(ship: &Ship, tick: TickId, animal: Vec2, ctx: &mut StepContext<'_>) -> Option<(f64, Vec2)> {
    let config = ctx.config();
    let cfg = &config.deterrence.ships;
    if !cfg.enabled {
        return None;
    }
    let coeffs = if tick.is_daytime() { cfg.day } else { cfg.night };
    let cell = ctx.cell_at(animal)?;
    let (depth, grain, temperature, salinity) = {
        let l = ctx.landscape();
        (
            l.depth(cell),
            l.sediment_grain_size(cell),
            l.temperature(cell),
            l.salinity(cell),
        )
    };
    let t0 = tick.0 as f64;
    let mut displacement = Vec2::ZERO;
    for s in 0..SHIP_SUB_STEPS {
        let Some(state) = ship.state_at(t0 + s as f64 / SHIP_SUB_STEPS as f64) else {
            continue;
        };
        let Some(sl) = ship.source_level_at_speed(state.speed_knots) else {
            continue;
        };
        let delta = ctx.field().delta(state.position, animal);
        let range_m = config.cells_to_m(delta.length());
        if range_m > cfg.max_distance_km * 1000.0 {
            continue;
        }
        let tl = transmission_loss(&PropagationInputs {
            range_m,
            depth_m: depth,
            grain_phi: grain,
            temperature_c: temperature,
            salinity,
            f_khz: cfg.frequency_khz,
        });
        if tl == 0.0 {
            ctx.diagnostics().acoustic_inputs_missing += 1;
            continue;
        }
        let rl = sl - tl + cfg.weighting_db;
        let p = response_probability(&coeffs, rl);
        if ctx.rng().uniform() >= p {
            continue;
        }
        let away = delta
            .normalized()
            .unwrap_or_else(|| Vec2::from_heading(ship.heading() + 90.0));
        displacement += away * (response_magnitude_m(&coeffs, rl) / config.cell_size_m);
    }
    let strength = ship_strength(displacement, &config.deterrence);
    (strength > 0.0).then_some((strength, displacement))
}

/// Fixed-source strength equivalent to a ship `displacement`.
pub fn ship_strength(displacement: Vec2, cfg: &DeterrenceConfig) -> f64 {
    let s = displacement.length() / cfg.deter_coeff;
    if s.is_finite() {
        s
    } else {
        0.0
    }
}
