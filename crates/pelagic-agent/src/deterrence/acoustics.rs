//! Underwater sound source levels and propagation loss.
//!
//! Ship source levels follow the JOMOPANS-ECHO spectrum model in one
//! third-octave band. Transmission loss combines geometric spreading
//! (spherical until the range reaches the water depth, cylindrical
//! beyond), Ainslie-McColm volume absorption and a bottom loss that grows
//! with sediment grain size in phi units (finer sediment absorbs more).

use crate::deterrence::sources::VesselClass;
use pelagic_core::is_valid;

/// Spectrum constant `K` (dB).
const JOMOPANS_K: f64 = 191.0;
/// Spectrum corner frequency `f1` (Hz).
const JOMOPANS_F1_HZ: f64 = 480.0;
/// Spectrum damping `D`.
const JOMOPANS_D: f64 = 3.0;
/// Reference vessel length (300 ft, in metres).
const REFERENCE_LENGTH_M: f64 = 91.44;

/// Horizontal distance between bottom reflections in units of depth,
/// for a 10 degree grazing ray: `2 / tan(10 deg)`.
const BOUNCE_SPACING: f64 = 11.342_563_4;

/// Ship source level (dB re 1 uPa @ 1 m) in the third-octave band
/// centred on `f_khz`.
///
/// Returns `None` for a vessel that is not moving or has no length.
pub fn ship_source_level(class: VesselClass, speed_knots: f64, length_m: f64, f_khz: f64) -> Option<f64> {
    if !(speed_knots > 0.0 && length_m > 0.0 && f_khz > 0.0) {
        return None;
    }
    let f_hz = f_khz * 1000.0;
    let baseline = JOMOPANS_K
        - 20.0 * JOMOPANS_F1_HZ.log10()
        - 10.0 * ((1.0 - f_hz / JOMOPANS_F1_HZ).powi(2) + JOMOPANS_D * JOMOPANS_D).log10();
    let speed = 60.0 * (speed_knots / class.reference_speed_knots()).log10();
    let length = 20.0 * (length_m / REFERENCE_LENGTH_M).log10();
    let bandwidth_hz = f_hz * (2f64.powf(1.0 / 6.0) - 2f64.powf(-1.0 / 6.0));
    Some(baseline + speed + length + 10.0 * bandwidth_hz.log10())
}

/// Ainslie-McColm seawater absorption (dB/km) at pH 8.
pub fn absorption_db_per_km(f_khz: f64, temperature_c: f64, salinity: f64, depth_m: f64) -> f64 {
    let t = temperature_c;
    let s = salinity;
    let z = depth_m / 1000.0;
    let f2 = f_khz * f_khz;
    let boric_f = 0.78 * (s / 35.0).sqrt() * (t / 26.0).exp();
    let mgso4_f = 42.0 * (t / 17.0).exp();
    let boric = 0.106 * boric_f * f2 / (boric_f * boric_f + f2);
    let mgso4 = 0.52 * (1.0 + t / 43.0) * (s / 35.0) * mgso4_f * f2 / (mgso4_f * mgso4_f + f2)
        * (-z / 6.0).exp();
    let water = 0.00049 * f2 * (-(t / 27.0 + z / 17.0)).exp();
    boric + mgso4 + water
}

/// Bottom reflection loss per bounce (dB) for grain size `phi`.
pub fn bottom_loss_per_bounce(phi: f64) -> f64 {
    0.5 + 0.5 * phi.clamp(0.0, 9.0)
}

/// Inputs of one transmission-loss evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropagationInputs {
    /// Horizontal range (m).
    pub range_m: f64,
    /// Water depth (m).
    pub depth_m: f64,
    /// Sediment grain size (phi).
    pub grain_phi: f64,
    /// Temperature (degrees C).
    pub temperature_c: f64,
    /// Salinity (PSU).
    pub salinity: f64,
    /// Band centre frequency (kHz).
    pub f_khz: f64,
}

impl PropagationInputs {
    fn all_valid(&self) -> bool {
        [
            self.range_m,
            self.depth_m,
            self.grain_phi,
            self.temperature_c,
            self.salinity,
            self.f_khz,
        ]
        .into_iter()
        .all(is_valid)
            && self.range_m >= 0.0
            && self.depth_m > 0.0
            && self.salinity >= 0.0
            && self.f_khz > 0.0
    }
}

/// Transmission loss (dB) between a source and a receiver.
///
/// Returns 0 when any input is missing or out of range; callers treat a
/// zero loss as "no sound reaches the receiver".
pub fn transmission_loss(inputs: &PropagationInputs) -> f64 {
    if !inputs.all_valid() {
        return 0.0;
    }
    let r = inputs.range_m.max(1.0);
    let h = inputs.depth_m.max(1.0);
    let spreading = if r <= h {
        20.0 * r.log10()
    } else {
        20.0 * h.log10() + 10.0 * (r / h).log10()
    };
    let absorption =
        absorption_db_per_km(inputs.f_khz, inputs.temperature_c, inputs.salinity, inputs.depth_m) * r
            / 1000.0;
    let bounces = ((r - h) / (BOUNCE_SPACING * h)).max(0.0);
    let bottom = bounces * bottom_loss_per_bounce(inputs.grain_phi);
    // Below 1 m the loss would round to zero and read as "no sound".
    (spreading + absorption + bottom).max(f64::MIN_POSITIVE)
}
