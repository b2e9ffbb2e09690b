//! Trajectory comparison.
//!
//! Points are matched by `(tick, id)`. Positions and energy are compared
//! by absolute difference, headings by the smallest angle between them,
//! so 359.9 and 0.1 differ by 0.2 degrees.

use indexmap::IndexMap;
use pelagic_core::angle_difference;

use crate::trajectory::{Trajectory, TrajectoryPoint};

/// How one point diverged.
#[derive(Clone, Debug, PartialEq)]
pub enum DivergenceKind {
    /// The expected point has no counterpart in the actual trajectory.
    Missing,
    /// The actual trajectory has a point that was not expected.
    Unexpected,
    /// A quantity differs by more than the tolerance.
    Value {
        /// `x`, `y`, `heading` or `energy`.
        quantity: &'static str,
        /// Expected value.
        expected: f64,
        /// Actual value.
        actual: f64,
    },
}

/// A divergence at one `(tick, id)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Divergence {
    /// Tick of the point.
    pub tick: u64,
    /// Animal id.
    pub id: u64,
    /// What went wrong.
    pub kind: DivergenceKind,
}

/// Result of comparing two trajectories.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DivergenceReport {
    /// Points present in both trajectories.
    pub compared: usize,
    /// Divergences in expected-trajectory order, unexpected points last.
    pub divergences: Vec<Divergence>,
}

impl DivergenceReport {
    /// Whether the trajectories agree.
    pub fn is_clean(&self) -> bool {
        self.divergences.is_empty()
    }

    /// The earliest divergence, if any.
    pub fn first(&self) -> Option<&Divergence> {
        self.divergences.first()
    }
}

/// Compare `actual` against `expected` within `tolerance`.
pub fn compare_trajectories(expected: &Trajectory, actual: &Trajectory, tolerance: f64) -> DivergenceReport {
    let mut remaining: IndexMap<(u64, u64), &TrajectoryPoint> =
        actual.points().iter().map(|p| ((p.tick, p.id), p)).collect();
    let mut report = DivergenceReport::default();

    for e in expected.points() {
        let Some(a) = remaining.shift_remove(&(e.tick, e.id)) else {
            report.divergences.push(Divergence {
                tick: e.tick,
                id: e.id,
                kind: DivergenceKind::Missing,
            });
            continue;
        };
        report.compared += 1;
        let diffs = [
            ("x", e.x, a.x, (e.x - a.x).abs()),
            ("y", e.y, a.y, (e.y - a.y).abs()),
            ("heading", e.heading, a.heading, angle_difference(e.heading, a.heading).abs()),
            ("energy", e.energy, a.energy, (e.energy - a.energy).abs()),
        ];
        for (quantity, expected, actual, diff) in diffs {
            // NaN differences never pass.
            if !(diff <= tolerance) {
                report.divergences.push(Divergence {
                    tick: e.tick,
                    id: e.id,
                    kind: DivergenceKind::Value {
                        quantity,
                        expected,
                        actual,
                    },
                });
            }
        }
    }

    for ((tick, id), _) in remaining {
        report.divergences.push(Divergence {
            tick,
            id,
            kind: DivergenceKind::Unexpected,
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(tick: u64, id: u64, heading: f64) -> TrajectoryPoint {
        TrajectoryPoint {
            tick,
            id,
            x: 1.0,
            y: 2.0,
            heading,
            energy: 10.0,
        }
    }

    #[test]
    fn identical_trajectories_are_clean() {
        let t: Trajectory = [point(0, 0, 10.0), point(0, 1, 20.0)].into_iter().collect();
        let r = compare_trajectories(&t, &t, 0.0);
        assert!(r.is_clean());
        assert_eq!(r.compared, 2);
    }

    #[test]
    fn headings_compare_across_north() {
        let e: Trajectory = [point(0, 0, 359.95)].into_iter().collect();
        let a: Trajectory = [point(0, 0, 0.05)].into_iter().collect();
        assert!(compare_trajectories(&e, &a, 0.2).is_clean());
        assert!(!compare_trajectories(&e, &a, 0.05).is_clean());
    }

    #[test]
    fn reports_missing_unexpected_and_values() {
        let e: Trajectory = [point(0, 0, 10.0), point(1, 0, 10.0)].into_iter().collect();
        let mut moved = point(0, 0, 10.0);
        moved.x = 1.5;
        let a: Trajectory = [moved, point(0, 9, 10.0)].into_iter().collect();
        let r = compare_trajectories(&e, &a, 1e-9);
        assert_eq!(r.compared, 1);
        assert_eq!(
            r.first().map(|d| &d.kind),
            Some(&DivergenceKind::Value {
                quantity: "x",
                expected: 1.0,
                actual: 1.5
            })
        );
        assert_eq!(r.divergences[1].kind, DivergenceKind::Missing);
        assert_eq!((r.divergences[2].id, &r.divergences[2].kind), (9, &DivergenceKind::Unexpected));
    }

    #[test]
    fn nan_never_matches() {
        let e: Trajectory = [point(0, 0, 10.0)].into_iter().collect();
        let mut bad = point(0, 0, 10.0);
        bad.energy = f64::NAN;
        let a: Trajectory = [bad].into_iter().collect();
        assert_eq!(compare_trajectories(&e, &a, 1.0).divergences.len(), 1);
    }
}
