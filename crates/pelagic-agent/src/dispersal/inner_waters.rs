//! Two-phase dispersal for enclosed waters.
//!
//! Phase one heads for a block chosen with probability proportional to
//! its quality, steering around obstacles by probing a fan of offsets
//! around the bearing. Near the target, when stuck or when every probe is
//! blocked, phase two follows the coast-distance contour found at the
//! switch, moving away from where the animal was a day ago.

use super::{step_is_safe, DisperseOutcome, DispersalInput};
use crate::context::StepContext;
use pelagic_core::config::BlockTarget;
use pelagic_core::{is_valid, AnimalId, Entity, RingBuffer, Vec2, TICKS_PER_DAY};
use smallvec::SmallVec;

/// Age in the position history used as the "a day ago" reference.
const LOOKBACK: usize = TICKS_PER_DAY as usize - 1;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Idle,
    Heading { target: Vec2, block: i32, heading_before: f64 },
    Contour { coast_m: f64, heading_before: f64 },
}

/// Inner-waters dispersal state.
#[derive(Clone, Debug, PartialEq)]
pub struct InnerWatersDispersal {
    phase: Phase,
}

impl Default for InnerWatersDispersal {
    fn default() -> Self {
        Self { phase: Phase::Idle }
    }
}

impl InnerWatersDispersal {
    /// Whether a trip is under way.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Whether the trip has switched to contour following.
    pub fn is_following_contour(&self) -> bool {
        matches!(self.phase, Phase::Contour { .. })
    }

    /// Target block of phase one.
    pub fn target_block(&self) -> Option<i32> {
        match self.phase {
            Phase::Heading { block, .. } => Some(block),
            _ => None,
        }
    }

    /// Target position of phase one.
    pub fn target(&self) -> Option<Vec2> {
        match self.phase {
            Phase::Heading { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Abandon the trip.
    pub fn deactivate(&mut self) {
        self.phase = Phase::Idle;
    }

    pub(crate) fn activate(&mut self, input: &DispersalInput<'_>, ctx: &mut StepContext<'_>) -> bool {
        let config = ctx.config();
        let cfg = &config.dispersal.inner_waters;
        let min_distance = config.km_to_cells(cfg.min_target_distance_km);
        let field = ctx.field();
        let candidates: SmallVec<[&BlockTarget; 16]> = cfg
            .blocks
            .iter()
            .filter(|b| b.quality > 0.0 && field.distance(input.position, b.center) >= min_distance)
            .collect();
        let total: f64 = candidates.iter().map(|b| b.quality).sum();
        if candidates.is_empty() || !(total > 0.0) {
            ctx.diagnostics().dispersal_target_failures += 1;
            return false;
        }
        let mut pick = ctx.rng().uniform() * total;
        let mut chosen = candidates[candidates.len() - 1];
        for &b in &candidates {
            if pick < b.quality {
                chosen = b;
                break;
            }
            pick -= b.quality;
        }
        self.phase = Phase::Heading {
            target: chosen.center,
            block: chosen.block,
            heading_before: input.heading,
        };
        true
    }

    pub(crate) fn disperse(
        &mut self,
        entity: &mut Entity<AnimalId>,
        positions: &RingBuffer<Vec2>,
        ctx: &mut StepContext<'_>,
    ) -> DisperseOutcome {
        let config = ctx.config();
        let cfg = &config.dispersal.inner_waters;
        let field = ctx.field();
        let step = config.km_to_cells(config.dispersal.step_km);

        if let Phase::Heading { target, heading_before, .. } = self.phase {
            let pos = entity.position;
            let reached = field.distance(pos, target) <= config.km_to_cells(cfg.target_reach_km);
            let stuck = positions
                .get(LOOKBACK)
                .is_some_and(|p| field.distance(*p, pos) < config.km_to_cells(cfg.stuck_distance_km));
            let bearing = field.delta(pos, target).heading();
            let next = if reached || stuck {
                None
            } else {
                best_probe(pos, bearing, step, &cfg.probe_angles_deg, ctx)
            };
            match next {
                Some(heading) => {
                    entity.set_heading(heading);
                    entity.position = field.resolve(entity.ahead(step));
                    return DisperseOutcome::Moved(step);
                }
                None => {
                    let coast_m = ctx.coast_distance_at(pos);
                    if !is_valid(coast_m) {
                        entity.set_heading(heading_before);
                        self.phase = Phase::Idle;
                        return DisperseOutcome::Aborted;
                    }
                    tracing::debug!(animal = %entity.id, coast_m, reached, stuck, "following coast contour");
                    self.phase = Phase::Contour { coast_m, heading_before };
                }
            }
        }

        let Phase::Contour { coast_m, heading_before } = self.phase else {
            return DisperseOutcome::Idle;
        };
        let pos = entity.position;
        let away = positions
            .get(LOOKBACK)
            .and_then(|p| field.delta(*p, pos).normalized())
            .map_or(entity.heading(), Vec2::heading);
        match contour_probe(pos, away, step, coast_m, &cfg.probe_angles_deg, cfg.contour_tolerance, ctx) {
            Some(heading) => {
                entity.set_heading(heading);
                entity.position = field.resolve(entity.ahead(step));
                DisperseOutcome::Moved(step)
            }
            None => {
                entity.set_heading(heading_before);
                self.phase = Phase::Idle;
                DisperseOutcome::Aborted
            }
        }
    }
}

/// Headings `base`, then `base +- offset` for each nonzero offset.
fn fan(base: f64, offsets: &[f64]) -> SmallVec<[SmallVec<[f64; 2]>; 8]> {
    offsets
        .iter()
        .map(|&o| {
            if o == 0.0 {
                SmallVec::from_slice(&[base])
            } else {
                SmallVec::from_slice(&[base + o, base - o])
            }
        })
        .collect()
}

/// First offset level with a safe step, preferring the deeper end point
/// and then the one farther from the coast.
fn best_probe(pos: Vec2, bearing: f64, step: f64, offsets: &[f64], ctx: &StepContext<'_>) -> Option<f64> {
    for level in fan(bearing, offsets) {
        let mut best: Option<(f64, f64, f64)> = None;
        for h in level {
            if !step_is_safe(pos, h, step, ctx) {
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

/// First offset level with a safe step that stays on the contour,
/// preferring the end point closest to it.
fn contour_probe(
    pos: Vec2,
    away: f64,
    step: f64,
    coast_m: f64,
    offsets: &[f64],
    tolerance: f64,
    ctx: &StepContext<'_>,
) -> Option<f64> {
    let band = tolerance * coast_m.abs().max(1.0);
    for level in fan(away, offsets) {
        let mut best: Option<(f64, f64)> = None;
        for h in level {
            if !step_is_safe(pos, h, step, ctx) {
                continue;
            }
            let coast = ctx.coast_distance_at(pos + Vec2::from_heading(h) * step);
            if !is_valid(coast) {
                continue;
            }
            let off = (coast - coast_m).abs();
            if off > band {
                continue;
            }
            if best.is_none_or(|(_, b)| off < b) {
                best = Some((h, off));
            }
        }
        if let Some((h, _)) = best {
            return Some(h);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::memory::PersistentSpatialMemory;
    use pelagic_core::{angle_difference, SeededRandom, SimulationConfig, TickId};
    use pelagic_space::{EdgeBehavior, GridLandscape, LandscapeLayers, SpatialField};

    fn config_with_blocks(blocks: Vec<BlockTarget>) -> SimulationConfig {
        let mut c = SimulationConfig::default();
        c.dispersal.kind = pelagic_core::config::DispersalKind::InnerWaters;
        c.dispersal.inner_waters.blocks = blocks;
        c
    }

    fn coastal_layers(n: u32) -> LandscapeLayers {
        let mut l = LandscapeLayers::filled(n, n, 30.0);
        // Coast distance grows northwards: 400 m per row.
        for y in 0..n as usize {
            for x in 0..n as usize {
                l.distance_to_coast[y * n as usize + x] = 400.0 * (y as f64 + 1.0);
            }
        }
        l
    }

    #[test]
    fn picks_only_distant_blocks() {
        let config = config_with_blocks(vec![
            BlockTarget { block: 1, center: Vec2::new(55.0, 50.0), quality: 100.0 },
            BlockTarget { block: 2, center: Vec2::new(150.0, 50.0), quality: 1.0 },
        ]);
        let mut land = GridLandscape::from_layers(coastal_layers(200)).unwrap();
        let field = SpatialField::new(200, 200, EdgeBehavior::Bounce, EdgeBehavior::Bounce).unwrap();
        let mut rng = SeededRandom::new(1);
        let mut diag = Diagnostics::default();
        let mut ctx = StepContext::new(&mut land, &field, &config, &mut rng, &mut diag, TickId(0));
        let memory = PersistentSpatialMemory::new(5.0, 200);
        let input = DispersalInput {
            id: AnimalId(1),
            position: Vec2::new(50.0, 50.0),
            heading: 0.0,
            memory: &memory,
            preferred_distance_km: 0.0,
        };
        let mut w = InnerWatersDispersal::default();
        assert!(w.activate(&input, &mut ctx));
        assert_eq!(w.target_block(), Some(2));
    }

    #[test]
    fn heads_to_target_then_follows_contour() {
        let config = config_with_blocks(vec![BlockTarget {
            block: 7,
            center: Vec2::new(150.5, 60.5),
            quality: 1.0,
        }]);
        let mut land = GridLandscape::from_layers(coastal_layers(200)).unwrap();
        let field = SpatialField::new(200, 200, EdgeBehavior::Bounce, EdgeBehavior::Bounce).unwrap();
        let mut rng = SeededRandom::new(1);
        let mut diag = Diagnostics::default();
        let mut ctx = StepContext::new(&mut land, &field, &config, &mut rng, &mut diag, TickId(0));
        let memory = PersistentSpatialMemory::new(5.0, 200);
        let start = Vec2::new(50.5, 60.5);
        let input = DispersalInput {
            id: AnimalId(1),
            position: start,
            heading: 0.0,
            memory: &memory,
            preferred_distance_km: 0.0,
        };
        let mut w = InnerWatersDispersal::default();
        assert!(w.activate(&input, &mut ctx));

        let mut e = Entity::new(AnimalId(1), start, 0.0);
        let mut positions = RingBuffer::new(120);
        for _ in 0..60 {
            positions.push(e.position);
            let out = w.disperse(&mut e, &positions, &mut ctx);
            assert!(matches!(out, DisperseOutcome::Moved(_)), "{out:?}");
            if w.is_following_contour() {
                break;
            }
        }
        assert!(w.is_following_contour());
        // Switched within reach, then took one contour step.
        assert!(e.position.distance(Vec2::new(150.5, 60.5)) <= 12.5 + 2.625 + 1e-9);
        let row = e.position.y.floor();
        for _ in 0..5 {
            positions.push(e.position);
            assert!(matches!(w.disperse(&mut e, &positions, &mut ctx), DisperseOutcome::Moved(_)));
        }
        // The contour is a row band; 25% of ~24 km allows ~15 rows.
        assert!((e.position.y.floor() - row).abs() <= 15.0);
    }

    #[test]
    fn blocked_everywhere_aborts() {
        let config = config_with_blocks(vec![BlockTarget {
            block: 7,
            center: Vec2::new(150.5, 60.5),
            quality: 1.0,
        }]);
        let mut layers = coastal_layers(200);
        for d in layers.depth.iter_mut() {
            *d = 2.0;
        }
        let mut land = GridLandscape::from_layers(layers).unwrap();
        let field = SpatialField::new(200, 200, EdgeBehavior::Bounce, EdgeBehavior::Bounce).unwrap();
        let mut rng = SeededRandom::new(1);
        let mut diag = Diagnostics::default();
        let mut ctx = StepContext::new(&mut land, &field, &config, &mut rng, &mut diag, TickId(0));
        let memory = PersistentSpatialMemory::new(5.0, 200);
        let start = Vec2::new(50.5, 60.5);
        let input = DispersalInput {
            id: AnimalId(1),
            position: start,
            heading: 12.0,
            memory: &memory,
            preferred_distance_km: 0.0,
        };
        let mut w = InnerWatersDispersal::default();
        assert!(w.activate(&input, &mut ctx));
        let mut e = Entity::new(AnimalId(1), start, 0.0);
        let out = w.disperse(&mut e, &RingBuffer::new(120), &mut ctx);
        assert_eq!(out, DisperseOutcome::Aborted);
        assert!(!w.is_active());
        assert_eq!(e.heading(), 12.0);
        assert_eq!(e.position, start);
    }

    #[test]
    fn fan_orders_offsets() {
        let f = fan(10.0, &[0.0, 20.0]);
        assert_eq!(f.len(), 2);
        assert_eq!(f[0].as_slice(), &[10.0]);
        assert_eq!(angle_difference(10.0, f[1][1]), -20.0);
    }
}
