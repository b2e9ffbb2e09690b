//! Composition building blocks for simulated entities.
//!
//! Instead of an inheritance tree of agents, concrete types embed an
//! [`Entity`] and implement the capability traits they need.

use crate::geometry::{normalize_heading, Vec2};
use crate::id::{SourceId, TickId};

/// Identity, position and heading shared by every simulated entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entity<I> {
    /// Entity identifier.
    pub id: I,
    /// Continuous position in grid units.
    pub position: Vec2,
    heading: f64,
}

impl<I: Copy> Entity<I> {
    /// Create an entity; the heading is normalized.
    pub fn new(id: I, position: Vec2, heading: f64) -> Self {
        Self {
            id,
            position,
            heading: normalize_heading(heading),
        }
    }

    /// Heading in `[0, 360)`.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Set the heading (normalized).
    pub fn set_heading(&mut self, heading: f64) {
        self.heading = normalize_heading(heading);
    }

    /// Turn clockwise by `degrees` (negative turns left).
    pub fn turn(&mut self, degrees: f64) {
        self.set_heading(self.heading + degrees);
    }

    /// Turn to face a point. Facing the current position is a no-op.
    pub fn face(&mut self, target: Vec2) {
        let d = target - self.position;
        if d.x != 0.0 || d.y != 0.0 {
            self.heading = d.heading();
        }
    }

    /// The point `distance` ahead along the current heading.
    pub fn ahead(&self, distance: f64) -> Vec2 {
        self.position + Vec2::from_heading(self.heading) * distance
    }

    /// The point `distance` ahead along `heading + offset`.
    pub fn ahead_at(&self, offset: f64, distance: f64) -> Vec2 {
        self.position + Vec2::from_heading(self.heading + offset) * distance
    }
}

/// Something that emits underwater noise.
pub trait NoiseSource {
    /// Source identifier.
    fn source_id(&self) -> SourceId;

    /// Whether the source emits at `tick`.
    fn is_active(&self, tick: TickId) -> bool;

    /// Position at `tick`, or `None` when inactive.
    fn position(&self, tick: TickId) -> Option<Vec2>;

    /// Broadband source level (dB re 1 µPa @ 1 m) at `tick`.
    fn source_level(&self, tick: TickId) -> f64;
}

/// Something that can be frightened away from a noise source.
pub trait Deterrable {
    /// Offer a deterrence of the given strength pushing along `away`.
    ///
    /// Returns `true` when the offer replaced the current deterrence
    /// (stronger sources win; deterrence is never additive).
    fn deter(&mut self, strength: f64, away: Vec2) -> bool;

    /// Whether any deterrence is currently in effect.
    fn is_deterred(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_turns_and_faces() {
        let mut e = Entity::new(1u32, Vec2::new(0.0, 0.0), -90.0);
        assert_eq!(e.heading(), 270.0);
        e.turn(100.0);
        assert!((e.heading() - 10.0).abs() < 1e-9);
        e.face(Vec2::new(5.0, 0.0));
        assert!((e.heading() - 90.0).abs() < 1e-9);
        e.face(Vec2::new(0.0, 0.0));
        assert!((e.heading() - 90.0).abs() < 1e-9);
        let p = e.ahead(2.0);
        assert!((p.x - 2.0).abs() < 1e-9 && p.y.abs() < 1e-9);
        let q = e.ahead_at(-90.0, 1.0);
        assert!(q.x.abs() < 1e-9 && (q.y - 1.0).abs() < 1e-9);
    }
}
