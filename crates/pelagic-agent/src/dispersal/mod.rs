//! Long-range dispersal state machine.
//!
//! [`Dispersal`] is a tagged enum with one variant per strategy; each
//! variant owns its trip state. An inactive machine has no target. While
//! active, [`Dispersal::disperse`] replaces the random walk for the tick
//! (except for the flag-only [`Undirected`](Dispersal::Undirected)
//! strategy, which leaves movement to the random walk).

pub mod inner_waters;
pub mod psm;

use crate::context::StepContext;
use crate::memory::PersistentSpatialMemory;
use inner_waters::InnerWatersDispersal;
use pelagic_core::config::{DispersalConfig, DispersalKind};
use pelagic_core::{is_valid, AnimalId, Entity, RingBuffer, Vec2};
use psm::{PsmDispersal, PsmKind};
use tracing::debug;

/// What one call to [`Dispersal::disperse`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DisperseOutcome {
    /// Not dispersing in a way that moves the animal; run the random walk.
    Idle,
    /// Moved this many grid units and keeps dispersing.
    Moved(f64),
    /// Moved this many grid units and reached the end of the trip.
    Finished(f64),
    /// The step was unsafe; the trip was abandoned without moving.
    Aborted,
}

impl DisperseOutcome {
    /// Grid units moved.
    pub fn distance(&self) -> f64 {
        match self {
            Self::Moved(d) | Self::Finished(d) => *d,
            Self::Idle | Self::Aborted => 0.0,
        }
    }
}

/// What a strategy may look at when a trip starts.
pub struct DispersalInput<'m> {
    /// The dispersing animal.
    pub id: AnimalId,
    /// Current position.
    pub position: Vec2,
    /// Current heading.
    pub heading: f64,
    /// The authoritative spatial memory.
    pub memory: &'m PersistentSpatialMemory,
    /// Preferred trip length (km).
    pub preferred_distance_km: f64,
}

/// Flag-only strategy state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UndirectedState {
    active: bool,
}

/// Dispersal state machine.
#[derive(Clone, Debug, PartialEq)]
pub enum Dispersal {
    /// Never disperses.
    Off,
    /// Raises the dispersing flag only.
    Undirected(UndirectedState),
    /// Persistent-spatial-memory dispersal.
    Psm(PsmDispersal),
    /// Two-phase dispersal for enclosed waters.
    InnerWaters(InnerWatersDispersal),
}

impl Dispersal {
    /// An inactive machine of the configured kind.
    pub fn new(cfg: &DispersalConfig) -> Self {
        match cfg.kind {
            DispersalKind::Off => Self::Off,
            DispersalKind::Undirected => Self::Undirected(UndirectedState::default()),
            DispersalKind::PsmType1 => Self::Psm(PsmDispersal::new(PsmKind::Type1)),
            DispersalKind::PsmType2 => Self::Psm(PsmDispersal::new(PsmKind::Type2)),
            DispersalKind::PsmType3 => Self::Psm(PsmDispersal::new(PsmKind::Type3)),
            DispersalKind::InnerWaters => Self::InnerWaters(InnerWatersDispersal::default()),
        }
    }

    /// Whether a trip is under way.
    pub fn is_dispersing(&self) -> bool {
        match self {
            Self::Off => false,
            Self::Undirected(s) => s.active,
            Self::Psm(p) => p.is_active(),
            Self::InnerWaters(w) => w.is_active(),
        }
    }

    /// Start a trip. Returns whether the machine is now dispersing.
    pub fn activate(&mut self, input: &DispersalInput<'_>, ctx: &mut StepContext<'_>) -> bool {
        if self.is_dispersing() {
            return true;
        }
        let started = match self {
            Self::Off => false,
            Self::Undirected(s) => {
                s.active = true;
                true
            }
            Self::Psm(p) => p.activate(input, ctx),
            Self::InnerWaters(w) => w.activate(input, ctx),
        };
        if started {
            debug!(
                animal = %input.id,
                target = ?self.target_position(),
                "dispersal started"
            );
        }
        started
    }

    /// Stop dispersing. Safe to call when inactive.
    pub fn deactivate(&mut self) {
        match self {
            Self::Off => {}
            Self::Undirected(s) => s.active = false,
            Self::Psm(p) => p.deactivate(),
            Self::InnerWaters(w) => w.deactivate(),
        }
    }

    /// Take one dispersal step, moving and turning `entity`.
    pub fn disperse(
        &mut self,
        entity: &mut Entity<AnimalId>,
        positions: &RingBuffer<Vec2>,
        ctx: &mut StepContext<'_>,
    ) -> DisperseOutcome {
        let outcome = match self {
            Self::Off | Self::Undirected(_) => DisperseOutcome::Idle,
            Self::Psm(p) => p.disperse(entity, ctx),
            Self::InnerWaters(w) => w.disperse(entity, positions, ctx),
        };
        match outcome {
            DisperseOutcome::Aborted => {
                ctx.diagnostics().dispersal_aborts += 1;
                debug!(animal = %entity.id, "dispersal aborted");
            }
            DisperseOutcome::Finished(_) => debug!(animal = %entity.id, "dispersal finished"),
            _ => {}
        }
        outcome
    }

    /// Target of the current trip.
    pub fn target_position(&self) -> Option<Vec2> {
        match self {
            Self::Off | Self::Undirected(_) => None,
            Self::Psm(p) => p.target(),
            Self::InnerWaters(w) => w.target(),
        }
    }

    /// Distance still to cover on the current trip (grid units).
    pub fn distance_left_to_travel(&self) -> Option<f64> {
        match self {
            Self::Psm(p) => p.distance_left(),
            _ => None,
        }
    }
}

// ── shared step checks ─────────────────────────────────────────────

/// Spacing (km) of depth probes along a dispersal step.
const PROBE_SPACING_KM: f64 = 0.1;

/// Whether a dispersal step from `from` along `heading` over `step`
/// grid units stays in bounds, stays at least `min_depth` deep, and
/// leaves water ahead.
pub(crate) fn step_is_safe(from: Vec2, heading: f64, step: f64, ctx: &StepContext<'_>) -> bool {
    let config = ctx.config();
    let cfg = &config.dispersal;
    let dir = Vec2::from_heading(heading);
    let probe = config.km_to_cells(PROBE_SPACING_KM);
    let n = (step / probe).ceil().max(1.0) as usize;
    for i in 1..=n {
        let d = (i as f64 * probe).min(step);
        let depth = ctx.depth_at(from + dir * d);
        if !is_valid(depth) || depth < cfg.min_depth {
            return false;
        }
    }
    let ahead = step + config.km_to_cells(cfg.water_ahead_km);
    ctx.is_water_at(from + dir * ahead)
}
