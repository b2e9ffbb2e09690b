//! Correlated random walk with land avoidance.
//!
//! Each tick the animal draws a turning angle correlated with its previous
//! turn, damps it by the previous step length, draws a log10 step length
//! correlated with the previous one, steers away from land, and finally
//! blends the walk with reference-memory attraction and any deterrence.
//!
//! Every rejection loop is bounded; hitting a bound selects a calibrated
//! fallback and bumps a counter in [`Diagnostics`](crate::diagnostics::Diagnostics).

use crate::attraction::ReferenceMemory;
use crate::context::StepContext;
use pelagic_core::{is_valid, AnimalId, Draw, Entity, RingBuffer, SimulationConfig, Vec2};
use tracing::debug;

/// Attempts of each rejection-sampling loop before falling back.
pub const MAX_DRAWS: usize = 200;
/// Iterations of the land-avoidance search.
pub const MAX_AVOIDANCE_ITERATIONS: usize = 100;
/// Remembered positions searched for water when the turn ladder fails.
pub const HISTORY_SEARCH: usize = 20;
/// Base offsets (degrees) of the land-avoidance turn ladder.
pub const LADDER: [f64; 3] = [40.0, 70.0, 120.0];

/// Correlation state carried from one tick to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CrwState {
    /// Signed turn of the previous tick (degrees).
    pub prev_angle: f64,
    /// Log10 step length of the previous tick (100 m units).
    pub prev_log_mov: f64,
}

/// Outcome of one movement step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveResult {
    /// Distance actually moved (grid units).
    pub distance: f64,
    /// Random-walk step length (100 m units).
    pub pres_mov: f64,
    /// Whether the move was cancelled because the destination was dry.
    pub retreated: bool,
}

/// Movement engine shared by all animals.
#[derive(Clone, Debug)]
pub struct MovementModel {
    reference: ReferenceMemory,
}

impl MovementModel {
    /// Build the engine, precomputing the reference-memory weights.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            reference: ReferenceMemory::new(config.attraction.ref_mem_decay, config.movement.history_len),
        }
    }

    /// Reference-memory weights.
    pub fn reference(&self) -> &ReferenceMemory {
        &self.reference
    }

    /// Signed turning angle in `[-180, 180]`.
    pub fn draw_turn_angle(&self, prev_angle: f64, depth: f64, salinity: f64, ctx: &mut StepContext<'_>) -> f64 {
        let m = &ctx.config().movement;
        let scale = m.corr_angle_bathy * depth + m.corr_angle_salinity * salinity + m.corr_angle_base_sd;
        let mut angle = 0.0;
        for _ in 0..MAX_DRAWS {
            let noise = ctx.rng().normal(Draw::CrwAngle, m.angle_noise.mean, m.angle_noise.sd);
            angle = (m.corr_angle_base * prev_angle + noise) * scale;
            if angle.abs() <= 180.0 {
                return angle;
            }
        }
        ctx.diagnostics().angle_fallbacks += 1;
        debug!(angle, "turning angle fell back to a right angle");
        if angle.is_finite() && angle != 0.0 {
            angle * 90.0 / angle.abs()
        } else {
            90.0
        }
    }

    /// Magnitude of the turn after damping by the previous step length.
    ///
    /// Short previous steps allow wider turns; past the step limit the
    /// angle is kept as drawn.
    pub fn draw_turn_with_step(&self, angle: f64, prev_log_mov: f64, ctx: &mut StepContext<'_>) -> f64 {
        let m = &ctx.config().movement;
        let limit = m.turn_step_limit;
        for _ in 0..MAX_DRAWS {
            let tmp = if prev_log_mov <= limit.log10() {
                let rnd = ctx
                    .rng()
                    .normal(Draw::CrwTurnWithStep, m.turn_with_step.mean, m.turn_with_step.sd);
                angle + rnd - rnd * 10f64.powf(prev_log_mov) / limit
            } else {
                angle
            };
            if tmp < 180.0 {
                return tmp;
            }
        }
        ctx.diagnostics().turn_fallbacks += 1;
        debug!(angle, prev_log_mov, "turn fell back to a uniform draw");
        ctx.rng().int_range(90, 110) as f64
    }

    /// Log10 step length, capped at the configured maximum.
    pub fn draw_log_step(&self, prev_log_mov: f64, depth: f64, salinity: f64, ctx: &mut StepContext<'_>) -> f64 {
        let m = &ctx.config().movement;
        let base = m.corr_logmov_length * prev_log_mov + m.corr_logmov_bathy * depth + m.corr_logmov_salinity * salinity;
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for _ in 0..MAX_DRAWS {
            let log_mov = base + ctx.rng().normal(Draw::CrwStepLength, m.step_noise.mean, m.step_noise.sd);
            if log_mov <= m.max_mov {
                return log_mov;
            }
            lo = lo.min(log_mov);
            hi = hi.max(log_mov);
        }
        ctx.diagnostics().step_fallbacks += 1;
        debug!(min = lo, max = hi, max_mov = m.max_mov, "step length fell back to the maximum");
        m.max_mov
    }

    /// Whether every sub-step of a move of `step` grid units from `from`
    /// along `heading` is over water.
    pub fn path_is_wet(&self, from: Vec2, heading: f64, step: f64, ctx: &StepContext<'_>) -> bool {
        let config = ctx.config();
        let sub = config.step_to_cells(config.movement.water_check_step);
        let dir = Vec2::from_heading(heading);
        let n = (step / sub).ceil().max(1.0) as usize;
        (1..=n).all(|i| ctx.is_water_at(from + dir * (i as f64 * sub).min(step)))
    }

    /// Turn `entity` until a step of `step` grid units stays in water.
    ///
    /// Tries the turn ladder on both sides, preferring the deeper probe
    /// (ties to the one farther from the coast), then faces the most
    /// recent remembered position over water. Gives up after
    /// [`MAX_AVOIDANCE_ITERATIONS`] keeping the current heading.
    pub fn avoid_land(
        &self,
        entity: &mut Entity<AnimalId>,
        step: f64,
        positions: &RingBuffer<Vec2>,
        ctx: &mut StepContext<'_>,
    ) {
        let pos = entity.position;
        for _ in 0..MAX_AVOIDANCE_ITERATIONS {
            if self.path_is_wet(pos, entity.heading(), step, ctx) {
                return;
            }
            let jitter = ctx.rng().int_range(0, 10) as f64;
            if let Some(h) = self.ladder(pos, entity.heading(), step, jitter, ctx) {
                entity.set_heading(h);
                continue;
            }
            let field = ctx.field();
            let remembered = positions
                .iter()
                .take(HISTORY_SEARCH)
                .find(|p| field.distance(pos, **p) > 0.0 && ctx.is_water_at(**p));
            if let Some(p) = remembered {
                entity.set_heading(field.delta(pos, *p).heading());
                return;
            }
        }
        ctx.diagnostics().land_avoidance_escapes += 1;
        debug!(animal = %entity.id, x = pos.x, y = pos.y, "land avoidance gave up");
    }

    fn ladder(&self, pos: Vec2, heading: f64, step: f64, jitter: f64, ctx: &StepContext<'_>) -> Option<f64> {
        for base in LADDER {
            let offset = base + jitter;
            let mut best: Option<(f64, f64, f64)> = None;
            for h in [heading + offset, heading - offset] {
                if !self.path_is_wet(pos, h, step, ctx) {
                    continue;
                }
                let end = pos + Vec2::from_heading(h) * step;
                let depth = ctx.depth_at(end);
                let coast = ctx.coast_distance_at(end);
                let better = match best {
                    None => true,
                    Some((_, d, c)) => depth > d || (depth == d && coast > c),
                };
                if better {
                    best = Some((h, depth, coast));
                }
            }
            if let Some((h, _, _)) = best {
                return Some(h);
            }
        }
        None
    }

    /// One full random-walk step of `entity`.
    ///
    /// `deterrence` is the displacement of an active deterrence, or `None`
    /// when there is none or the animal is ignoring it.
    pub fn step(
        &self,
        entity: &mut Entity<AnimalId>,
        crw: &mut CrwState,
        positions: &RingBuffer<Vec2>,
        food: &RingBuffer<f64>,
        deterrence: Option<Vec2>,
        ctx: &mut StepContext<'_>,
    ) -> MoveResult {
        let config = ctx.config();
        let field = ctx.field();
        let pos = entity.position;
        let (depth, salinity) = match ctx.cell_at(pos) {
            Some(c) => {
                let l = ctx.landscape();
                (l.depth(c), l.salinity(c))
            }
            None => (0.0, 0.0),
        };
        let depth = if is_valid(depth) { depth } else { 0.0 };
        let salinity = if is_valid(salinity) { salinity } else { 0.0 };

        let angle = self.draw_turn_angle(crw.prev_angle, depth, salinity, ctx);
        let sign = if angle < 0.0 { -1.0 } else { 1.0 };
        let turn = sign * self.draw_turn_with_step(angle.abs(), crw.prev_log_mov, ctx);
        entity.turn(turn);
        crw.prev_angle = turn;

        let log_mov = self.draw_log_step(crw.prev_log_mov, depth, salinity, ctx);
        crw.prev_log_mov = log_mov;
        let pres_mov = 10f64.powf(log_mov);
        let step = config.step_to_cells(pres_mov);

        self.avoid_land(entity, step, positions, ctx);

        let attraction = if config.attraction.enabled {
            self.reference.attraction(pos, positions, food, field).unwrap_or(Vec2::ZERO)
        } else {
            Vec2::ZERO
        };
        let expected = self.reference.expected_value(food);
        let deter = deterrence.unwrap_or(Vec2::ZERO);
        let forward = Vec2::from_heading(entity.heading());
        let blended = forward * (config.movement.inertia_const + pres_mov * expected) + attraction + deter;
        if attraction != Vec2::ZERO || deter != Vec2::ZERO {
            if let Some(dir) = blended.normalized() {
                entity.set_heading(dir.heading());
            }
        }

        let distance = step + deter.length();
        let dest = field.resolve(entity.ahead(distance));
        if ctx.is_water_at(dest) {
            entity.position = dest;
            return MoveResult {
                distance: field.distance(pos, dest),
                pres_mov,
                retreated: false,
            };
        }
        ctx.diagnostics().dry_destination_retreats += 1;
        let back = positions.get(0).copied().unwrap_or(pos);
        entity.position = back;
        MoveResult {
            distance: field.distance(pos, back),
            pres_mov,
            retreated: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use pelagic_core::{SeededRandom, TickId};
    use pelagic_space::{EdgeBehavior, GridLandscape, LandscapeLayers, SpatialField};
    use pelagic_test_utils::ScriptedRandom;

    struct Fixture {
        land: GridLandscape,
        field: SpatialField,
        config: SimulationConfig,
        diag: Diagnostics,
    }

    impl Fixture {
        fn new(layers: LandscapeLayers) -> Self {
            let (w, h) = (layers.width, layers.height);
            Self {
                land: GridLandscape::from_layers(layers).unwrap(),
                field: SpatialField::new(w, h, EdgeBehavior::Bounce, EdgeBehavior::Bounce).unwrap(),
                config: SimulationConfig::default(),
                diag: Diagnostics::default(),
            }
        }
    }

    #[test]
    fn scripted_step_follows_the_walk_equations() {
        let mut layers = LandscapeLayers::filled(20, 20, 20.0);
        layers.salinity = vec![30.0; 400];
        let mut fx = Fixture::new(layers);
        let mut rng = ScriptedRandom::new()
            .normal(Draw::CrwAngle, 10.0)
            .normal(Draw::CrwTurnWithStep, 96.0)
            .normal(Draw::CrwStepLength, 0.42);
        let mut ctx = StepContext::new(&mut fx.land, &fx.field, &fx.config, &mut rng, &mut fx.diag, TickId(0));
        let model = MovementModel::new(ctx.config());
        let mut e = Entity::new(AnimalId(1), Vec2::new(10.0, 10.0), 0.0);
        let mut crw = CrwState::default();
        let r = model.step(&mut e, &mut crw, &RingBuffer::new(120), &RingBuffer::new(120), None, &mut ctx);

        let heading = 10.0 + 96.0 - 96.0 / 5.5;
        assert!((e.heading() - heading).abs() < 1e-9);
        assert!((crw.prev_angle - heading).abs() < 1e-9);
        assert!((crw.prev_log_mov - (-0.17)).abs() < 1e-12);
        let d = 10f64.powf(-0.17) * 0.25;
        assert!((r.distance - d).abs() < 1e-9);
        let expected = Vec2::new(10.0, 10.0) + Vec2::from_heading(heading) * d;
        assert!(e.position.distance(expected) < 1e-9);
        assert!(!r.retreated);
    }

    #[test]
    fn angle_falls_back_after_too_many_draws() {
        let mut fx = Fixture::new(LandscapeLayers::filled(5, 5, 10.0));
        let mut rng = ScriptedRandom::new().repeat_normal(Draw::CrwAngle, -500.0, MAX_DRAWS);
        let mut ctx = StepContext::new(&mut fx.land, &fx.field, &fx.config, &mut rng, &mut fx.diag, TickId(0));
        let model = MovementModel::new(ctx.config());
        assert_eq!(model.draw_turn_angle(0.0, 10.0, 30.0, &mut ctx), -90.0);
        drop(ctx);
        assert_eq!(fx.diag.angle_fallbacks, 1);
    }

    #[test]
    fn long_previous_step_keeps_the_angle() {
        let mut fx = Fixture::new(LandscapeLayers::filled(5, 5, 10.0));
        let mut rng = ScriptedRandom::new();
        let mut ctx = StepContext::new(&mut fx.land, &fx.field, &fx.config, &mut rng, &mut fx.diag, TickId(0));
        let model = MovementModel::new(ctx.config());
        // log10(5.5) < 1.0, so no draw is made.
        assert_eq!(model.draw_turn_with_step(42.0, 1.0, &mut ctx), 42.0);
    }

    #[test]
    fn step_length_falls_back_to_maximum() {
        let mut fx = Fixture::new(LandscapeLayers::filled(5, 5, 10.0));
        let mut rng = ScriptedRandom::new().repeat_normal(Draw::CrwStepLength, 5.0, MAX_DRAWS);
        let mut ctx = StepContext::new(&mut fx.land, &fx.field, &fx.config, &mut rng, &mut fx.diag, TickId(0));
        let model = MovementModel::new(ctx.config());
        assert_eq!(model.draw_log_step(0.0, 10.0, 30.0, &mut ctx), 1.18);
        drop(ctx);
        assert_eq!(fx.diag.step_fallbacks, 1);
    }

    #[test]
    fn ladder_turns_towards_deeper_water() {
        // Land wall east of x = 12; deeper water to the north.
        let mut layers = LandscapeLayers::filled(30, 30, 10.0);
        for y in 0..30 {
            for x in 0..30 {
                let i = y * 30 + x;
                if x >= 12 {
                    layers.depth[i] = 0.0;
                } else if y > 10 {
                    layers.depth[i] = 30.0;
                }
            }
        }
        let mut fx = Fixture::new(layers);
        let mut rng = ScriptedRandom::new().int_range(0);
        let mut ctx = StepContext::new(&mut fx.land, &fx.field, &fx.config, &mut rng, &mut fx.diag, TickId(0));
        let model = MovementModel::new(ctx.config());
        let mut e = Entity::new(AnimalId(1), Vec2::new(10.5, 10.5), 90.0);
        model.avoid_land(&mut e, 2.0, &RingBuffer::new(4), &mut ctx);
        // The 40 degree rung hits the wall. On the 70 degree rung, 20 heads
        // north into deeper water and 160 heads south into shallower water.
        assert!((e.heading() - 20.0).abs() < 1e-9, "{}", e.heading());
    }

    #[test]
    fn dry_destination_retreats_to_last_position() {
        let mut layers = LandscapeLayers::filled(10, 10, 10.0);
        layers.depth[5 * 10 + 6] = 0.0;
        let mut fx = Fixture::new(layers);
        // Heading east with a tiny walk step; the deterrence jump lands
        // on the dry cell (6, 5).
        let mut rng = ScriptedRandom::new()
            .normal(Draw::CrwAngle, 0.0)
            .normal(Draw::CrwStepLength, -5.0);
        let mut ctx = StepContext::new(&mut fx.land, &fx.field, &fx.config, &mut rng, &mut fx.diag, TickId(0));
        let model = MovementModel::new(ctx.config());
        let mut e = Entity::new(AnimalId(1), Vec2::new(5.5, 5.5), 90.0);
        let mut positions = RingBuffer::new(4);
        positions.push(Vec2::new(4.5, 5.5));
        let mut crw = CrwState { prev_angle: 0.0, prev_log_mov: 1.0 };
        let r = model.step(
            &mut e,
            &mut crw,
            &positions,
            &RingBuffer::new(4),
            Some(Vec2::new(1.0, 0.0)),
            &mut ctx,
        );
        assert!(r.retreated);
        assert_eq!(e.position, Vec2::new(4.5, 5.5));
        drop(ctx);
        assert_eq!(fx.diag.dry_destination_retreats, 1);
    }

    #[test]
    fn all_land_search_terminates() {
        let mut fx = Fixture::new(LandscapeLayers::filled(10, 10, 0.0));
        let mut rng = SeededRandom::new(4);
        let mut ctx = StepContext::new(&mut fx.land, &fx.field, &fx.config, &mut rng, &mut fx.diag, TickId(0));
        let model = MovementModel::new(ctx.config());
        let mut e = Entity::new(AnimalId(1), Vec2::new(5.0, 5.0), 0.0);
        model.avoid_land(&mut e, 1.0, &RingBuffer::new(4), &mut ctx);
        drop(ctx);
        assert_eq!(fx.diag.land_avoidance_escapes, 1);
    }
}
