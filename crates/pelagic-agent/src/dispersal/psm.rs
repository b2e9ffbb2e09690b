//! Persistent-spatial-memory dispersal.
//!
//! A trip heads for the most attractive remembered cell at roughly the
//! animal's preferred distance, or for a random water point at that
//! distance when memory is too thin. Three variants differ in how the
//! heading and step length evolve along the way.

use super::{step_is_safe, DisperseOutcome, DispersalInput};
use crate::context::StepContext;
use crate::memory::PersistentSpatialMemory;
use pelagic_core::{angle_difference, AnimalId, Draw, Entity, Vec2};
use pelagic_space::SpatialField;

/// Random probes tried before giving up on a target.
pub const MAX_TARGET_PROBES: usize = 1000;

/// How the heading and step evolve during a trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PsmKind {
    /// Straight at the target; steps shrink logistically once past the
    /// half-way point.
    Type1,
    /// Towards the target with a heading perturbation that grows with
    /// the distance travelled.
    Type2,
    /// Starts on the target bearing and is corrected back towards it
    /// ever more strongly; stops on distance from the start (or on
    /// reaching the target).
    Type3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PsmTrip {
    target: Vec2,
    start: Vec2,
    target_distance: f64,
    travelled: f64,
    heading_before: f64,
    last_position: Vec2,
}

/// PSM dispersal state.
#[derive(Clone, Debug, PartialEq)]
pub struct PsmDispersal {
    kind: PsmKind,
    trip: Option<PsmTrip>,
}

impl PsmDispersal {
    /// An inactive machine.
    pub fn new(kind: PsmKind) -> Self {
        Self { kind, trip: None }
    }

    /// Strategy variant.
    pub fn kind(&self) -> PsmKind {
        self.kind
    }

    /// Whether a trip is under way.
    pub fn is_active(&self) -> bool {
        self.trip.is_some()
    }

    /// Current target.
    pub fn target(&self) -> Option<Vec2> {
        self.trip.map(|t| t.target)
    }

    /// Distance between the last dispersal position and the target.
    pub fn distance_left(&self) -> Option<f64> {
        self.trip.map(|t| t.last_position.distance(t.target))
    }

    /// Abandon the trip.
    pub fn deactivate(&mut self) {
        self.trip = None;
    }

    /// Pick a target and start a trip.
    pub(crate) fn activate(&mut self, input: &DispersalInput<'_>, ctx: &mut StepContext<'_>) -> bool {
        let config = ctx.config();
        let cfg = &config.dispersal.psm;
        let preferred = config.km_to_cells(input.preferred_distance_km);
        let tolerance = config.km_to_cells(cfg.tolerance_km);
        let remembered = if input.memory.len() >= cfg.min_memory_cells {
            find_most_attractive_mem_cell(input.memory, input.position, preferred, tolerance, ctx.field())
        } else {
            None
        };
        let target = match remembered {
            Some(t) => t,
            None => match random_target(input.id, input.position, preferred, ctx) {
                Some(t) => {
                    ctx.diagnostics().dispersal_random_targets += 1;
                    t
                }
                None => {
                    ctx.diagnostics().dispersal_target_failures += 1;
                    return false;
                }
            },
        };
        let field = ctx.field();
        let target_distance = field.distance(input.position, target);
        if target_distance <= 0.0 {
            return false;
        }
        self.trip = Some(PsmTrip {
            target,
            start: input.position,
            target_distance,
            travelled: 0.0,
            heading_before: input.heading,
            last_position: input.position,
        });
        true
    }

    /// One dispersal step.
    pub(crate) fn disperse(&mut self, entity: &mut Entity<AnimalId>, ctx: &mut StepContext<'_>) -> DisperseOutcome {
        let Some(mut trip) = self.trip else {
            return DisperseOutcome::Idle;
        };
        let config = ctx.config();
        let cfg = &config.dispersal;
        let field = ctx.field();
        let pos = entity.position;
        let step = config.km_to_cells(cfg.step_km);
        let to_target = field.delta(pos, trip.target);
        let left = to_target.length();
        let bearing = to_target.heading();
        let progress = trip.travelled / trip.target_distance;

        let (heading, step_len) = match self.kind {
            PsmKind::Type1 => {
                let fraction = type1_step_fraction(left / trip.target_distance, cfg.psm.q1);
                (bearing, (step * fraction).min(left))
            }
            PsmKind::Type2 => {
                let spread = logistic(cfg.psm.logistic_k * (progress - 0.5));
                let noise = ctx.rng().normal(Draw::DispersalAngle, 0.0, cfg.psm.angle_deg);
                (bearing + noise * spread, step.min(left))
            }
            PsmKind::Type3 => {
                let c = logistic(cfg.psm.logistic_k * (progress - 0.5));
                let noise = ctx.rng().normal(Draw::DispersalAngle, 0.0, cfg.psm.angle_deg);
                let base = if trip.travelled == 0.0 { bearing } else { entity.heading() };
                let h = base + noise * (1.0 - c);
                (h + c * angle_difference(h, bearing), step)
            }
        };

        if !step_is_safe(pos, heading, step_len, ctx) {
            entity.set_heading(trip.heading_before);
            self.trip = None;
            return DisperseOutcome::Aborted;
        }

        entity.set_heading(heading);
        entity.position = field.resolve(entity.ahead(step_len));
        trip.travelled += step_len;
        trip.last_position = entity.position;

        let done = match self.kind {
            PsmKind::Type1 | PsmKind::Type2 => {
                trip.travelled >= trip.target_distance
                    || field.distance(entity.position, trip.target) <= step * 0.5
            }
            PsmKind::Type3 => {
                field.distance(trip.start, entity.position) >= trip.target_distance
                    || field.distance(entity.position, trip.target) <= step * 0.5
            }
        };
        if done {
            self.trip = None;
            DisperseOutcome::Finished(step_len)
        } else {
            self.trip = Some(trip);
            DisperseOutcome::Moved(step_len)
        }
    }
}

/// Fraction of the nominal step a type-1 trip takes with `ratio_left` of
/// its target distance still to go.
///
/// Past the half-way point the fraction collapses towards zero, so a
/// type-1 trip crawls rather than arrives; it ends when the daily
/// recovery check or a deterrence stops it.
pub fn type1_step_fraction(ratio_left: f64, q1: f64) -> f64 {
    1.0 / (1.0 + (-(ratio_left - 0.5) / q1).exp())
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Centre of the remembered cell with the highest energy expectation whose
/// distance from `pos` lies within `preferred +- tolerance` (grid units).
///
/// Ties go to the lower cell number.
pub fn find_most_attractive_mem_cell(
    memory: &PersistentSpatialMemory,
    pos: Vec2,
    preferred: f64,
    tolerance: f64,
    field: &SpatialField,
) -> Option<Vec2> {
    let mut best: Option<(f64, i64)> = None;
    for cell in memory.cells() {
        let centre = memory.calc_mem_cell_center_point(cell.id);
        let d = field.distance(pos, centre);
        if (d - preferred).abs() > tolerance {
            continue;
        }
        let ee = cell.energy_expectation();
        let better = match best {
            None => true,
            Some((b, id)) => ee > b || (ee == b && cell.id < id),
        };
        if better {
            best = Some((ee, cell.id));
        }
    }
    best.map(|(_, id)| memory.calc_mem_cell_center_point(id))
}

/// A random water point `distance` grid units away.
///
/// Probes random headings until the point is inside the field, over
/// water, outside every masked block and has positive habitat value.
pub fn random_target(id: AnimalId, pos: Vec2, distance: f64, ctx: &mut StepContext<'_>) -> Option<Vec2> {
    let masked = &ctx.config().dispersal.psm.masked_blocks;
    for _ in 0..MAX_TARGET_PROBES {
        let heading = ctx.rng().uniform() * 360.0;
        let p = pos + Vec2::from_heading(heading) * distance;
        let Some(cell) = ctx.cell_at(p) else {
            continue;
        };
        let land = ctx.landscape();
        if land.is_water(cell) && !masked.contains(&land.block_id(cell)) && land.max_ent(cell) > 0.0 {
            return Some(ctx.field().resolve(p));
        }
    }
    tracing::debug!(animal = %id, distance, "no random dispersal target found");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use pelagic_core::{SeededRandom, SimulationConfig, TickId};
    use pelagic_space::{EdgeBehavior, GridLandscape, LandscapeLayers};

    fn field(n: u32) -> SpatialField {
        SpatialField::new(n, n, EdgeBehavior::Bounce, EdgeBehavior::Bounce).unwrap()
    }

    #[test]
    fn most_attractive_cell_respects_distance_band() {
        let mut m = PersistentSpatialMemory::new(5.0, 200);
        // Near, very rich: outside the band.
        m.update_memory(Vec2::new(2.0, 2.0), 10.0);
        // Two cells about 100 units away.
        m.update_memory(Vec2::new(102.0, 2.0), 1.0);
        m.update_memory(Vec2::new(2.0, 102.0), 3.0);
        let t = find_most_attractive_mem_cell(&m, Vec2::new(2.5, 2.5), 100.0, 5.0, &field(200)).unwrap();
        assert_eq!(t, Vec2::new(2.5, 102.5));
        assert_eq!(
            find_most_attractive_mem_cell(&m, Vec2::new(2.5, 2.5), 50.0, 5.0, &field(200)),
            None
        );
    }

    #[test]
    fn ties_go_to_lower_cell_number() {
        let mut m = PersistentSpatialMemory::new(5.0, 200);
        m.update_memory(Vec2::new(2.0, 102.0), 1.0);
        m.update_memory(Vec2::new(102.0, 2.0), 1.0);
        let t = find_most_attractive_mem_cell(&m, Vec2::new(2.5, 2.5), 100.0, 5.0, &field(200)).unwrap();
        assert_eq!(t, Vec2::new(102.5, 2.5));
    }

    /// Drive a trip over open water towards a remembered cell 100 units
    /// east for at most `max_steps` steps.
    ///
    /// Returns the steps taken, whether the trip finished, the end point,
    /// the target and the length of the last step.
    fn drive(kind: PsmKind, max_steps: usize) -> (usize, bool, Vec2, Vec2, f64) {
        let mut config = SimulationConfig::default();
        config.dispersal.psm.min_memory_cells = 1;
        config.dispersal.psm.angle_deg = 5.0;
        let mut land = GridLandscape::from_layers(LandscapeLayers::filled(200, 200, 30.0)).unwrap();
        let f = field(200);
        let mut rng = SeededRandom::new(11);
        let mut diag = Diagnostics::default();
        let mut ctx = StepContext::new(&mut land, &f, &config, &mut rng, &mut diag, TickId(0));

        let mut memory = PersistentSpatialMemory::new(5.0, 200);
        memory.update_memory(Vec2::new(152.0, 52.0), 1.0);
        let start = Vec2::new(52.5, 52.5);
        // 40 km at 400 m cells is 100 grid units.
        let input = DispersalInput {
            id: AnimalId(1),
            position: start,
            heading: 0.0,
            memory: &memory,
            preferred_distance_km: 40.0,
        };
        let mut psm = PsmDispersal::new(kind);
        assert!(psm.activate(&input, &mut ctx));
        let target = psm.target().unwrap();
        let mut e = Entity::new(AnimalId(1), start, 0.0);
        let mut last = 0.0;
        for steps in 1..=max_steps {
            match psm.disperse(&mut e, &mut ctx) {
                DisperseOutcome::Moved(d) => {
                    assert!(d > 0.0);
                    last = d;
                }
                DisperseOutcome::Finished(d) => {
                    assert!(!psm.is_active());
                    return (steps, true, e.position, target, d);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(psm.is_active());
        (max_steps, false, e.position, target, last)
    }

    fn run_trip(kind: PsmKind) -> (usize, Vec2, Vec2) {
        let (steps, finished, end, target, _) = drive(kind, 1000);
        assert!(finished, "{kind:?} still under way after {steps} steps");
        (steps, end, target)
    }

    #[test]
    fn type1_step_fraction_is_the_raw_logistic() {
        let q1 = SimulationConfig::default().dispersal.psm.q1;
        assert_eq!(type1_step_fraction(0.5, q1), 0.5);
        assert!(type1_step_fraction(1.0, q1) > 0.999_999);
        // e^-10 past the half-way point: no floor props it up.
        let near_end = type1_step_fraction(0.3, q1);
        assert!((near_end - 1.0 / (1.0 + 10f64.exp())).abs() < 1e-15);
        assert!(near_end < 1e-4);
        let at_target = type1_step_fraction(0.0, q1);
        assert!(at_target > 0.0 && at_target < 1e-10);
    }

    #[test]
    fn type1_crawls_past_half_way() {
        let (steps, finished, end, target, last) = drive(PsmKind::Type1, 200);
        assert!(!finished);
        assert_eq!(steps, 200);
        // Full steps to about half way, then ever smaller ones.
        let left = end.distance(target);
        assert!(left > 30.0 && left < 50.0, "{left}");
        assert!(last < 0.05, "{last}");
        assert!((end.y - 52.5).abs() < 1e-9);
    }

    #[test]
    fn type2_and_type3_make_progress() {
        for kind in [PsmKind::Type2, PsmKind::Type3] {
            let (_, end, target) = run_trip(kind);
            assert!(end.distance(Vec2::new(52.5, 52.5)) > 50.0, "{kind:?} {end:?} {target:?}");
        }
    }

    #[test]
    fn shallow_water_aborts_and_restores_heading() {
        let config = SimulationConfig::default();
        let mut layers = LandscapeLayers::filled(200, 200, 30.0);
        for y in 0..200 {
            layers.depth[y * 200 + 54] = 1.0;
        }
        let mut land = GridLandscape::from_layers(layers).unwrap();
        let f = field(200);
        let mut rng = SeededRandom::new(5);
        let mut diag = Diagnostics::default();
        let mut ctx = StepContext::new(&mut land, &f, &config, &mut rng, &mut diag, TickId(0));

        let start = Vec2::new(52.5, 100.5);
        let mut psm = PsmDispersal::new(PsmKind::Type1);
        psm.trip = Some(PsmTrip {
            target: Vec2::new(152.5, 100.5),
            start,
            target_distance: 100.0,
            travelled: 0.0,
            heading_before: 33.0,
            last_position: start,
        });
        let mut e = Entity::new(AnimalId(1), start, 0.0);
        assert_eq!(psm.disperse(&mut e, &mut ctx), DisperseOutcome::Aborted);
        assert_eq!(e.position, start);
        assert_eq!(e.heading(), 33.0);
        assert!(!psm.is_active());
    }

    #[test]
    fn thin_memory_falls_back_to_random_target() {
        let config = SimulationConfig::default();
        let mut land = GridLandscape::from_layers(LandscapeLayers::filled(400, 400, 30.0)).unwrap();
        let f = field(400);
        let mut rng = SeededRandom::new(2);
        let mut diag = Diagnostics::default();
        let mut ctx = StepContext::new(&mut land, &f, &config, &mut rng, &mut diag, TickId(0));
        let memory = PersistentSpatialMemory::new(5.0, 400);
        let input = DispersalInput {
            id: AnimalId(4),
            position: Vec2::new(200.0, 200.0),
            heading: 0.0,
            memory: &memory,
            preferred_distance_km: 40.0,
        };
        let mut psm = PsmDispersal::new(PsmKind::Type2);
        assert!(psm.activate(&input, &mut ctx));
        let t = psm.target().unwrap();
        assert!((t.distance(Vec2::new(200.0, 200.0)) - 100.0).abs() < 1e-9);
        drop(ctx);
        assert_eq!(diag.dispersal_random_targets, 1);
    }

    #[test]
    fn no_water_anywhere_fails_activation() {
        let config = SimulationConfig::default();
        let mut land = GridLandscape::from_layers(LandscapeLayers::filled(50, 50, 0.0)).unwrap();
        let f = field(50);
        let mut rng = SeededRandom::new(2);
        let mut diag = Diagnostics::default();
        let mut ctx = StepContext::new(&mut land, &f, &config, &mut rng, &mut diag, TickId(0));
        let memory = PersistentSpatialMemory::new(5.0, 50);
        let input = DispersalInput {
            id: AnimalId(4),
            position: Vec2::new(25.0, 25.0),
            heading: 0.0,
            memory: &memory,
            preferred_distance_km: 4.0,
        };
        let mut psm = PsmDispersal::new(PsmKind::Type1);
        assert!(!psm.activate(&input, &mut ctx));
        drop(ctx);
        assert_eq!(diag.dispersal_target_failures, 1);
    }
}
