//! Reference-memory attraction towards recently profitable positions.
//!
//! Weights fall off logistically with age: `w[0] = 0.999` and
//! `w[j] = w[j-1] - decay * w[j-1] * (1 - w[j-1])`. Remembered positions
//! where food was found pull the animal with strength `food * w / dist`.

use pelagic_core::{RingBuffer, Vec2};
use pelagic_space::SpatialField;

/// Weight of the most recent memory.
pub const FIRST_WEIGHT: f64 = 0.999;

/// Precomputed memory weights.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceMemory {
    weights: Vec<f64>,
}

impl ReferenceMemory {
    /// Precompute `len` weights for the given decay rate.
    pub fn new(decay: f64, len: usize) -> Self {
        let mut weights = Vec::with_capacity(len);
        let mut w = FIRST_WEIGHT;
        for _ in 0..len {
            weights.push(w);
            w -= decay * w * (1.0 - w);
        }
        Self { weights }
    }

    /// Weight of a memory `age` ticks old; zero beyond the horizon.
    pub fn weight(&self, age: usize) -> f64 {
        self.weights.get(age).copied().unwrap_or(0.0)
    }

    /// All weights, most recent first.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Expected food value `sum(food[i] * w[i])` of the food history.
    pub fn expected_value(&self, food: &RingBuffer<f64>) -> f64 {
        food.iter()
            .enumerate()
            .map(|(i, f)| f * self.weight(i))
            .sum()
    }

    /// Attraction vector at `pos` towards remembered positions with food.
    ///
    /// Returns `None` when a remembered food position coincides with
    /// `pos`: there is no direction to be attracted in, so the animal
    /// gets no attraction this tick.
    pub fn attraction(
        &self,
        pos: Vec2,
        positions: &RingBuffer<Vec2>,
        food: &RingBuffer<f64>,
        field: &SpatialField,
    ) -> Option<Vec2> {
        let mut v = Vec2::ZERO;
        for (i, (p, f)) in positions.iter().zip(food.iter()).enumerate() {
            if *f <= 0.0 {
                continue;
            }
            let w = self.weight(i);
            if w <= 0.0 {
                continue;
            }
            let d = field.delta(pos, *p);
            let dist = d.length();
            let unit = d.normalized()?;
            v += unit * (f * w / dist);
        }
        Some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pelagic_space::EdgeBehavior;

    fn field() -> SpatialField {
        SpatialField::new(100, 100, EdgeBehavior::Wrap, EdgeBehavior::Wrap).unwrap()
    }

    #[test]
    fn weights_follow_logistic_decay() {
        let m = ReferenceMemory::new(0.1, 3);
        assert_eq!(m.weight(0), 0.999);
        let w1 = 0.999 - 0.1 * 0.999 * 0.001;
        assert!((m.weight(1) - w1).abs() < 1e-15);
        assert!((m.weight(2) - (w1 - 0.1 * w1 * (1.0 - w1))).abs() < 1e-15);
        assert_eq!(m.weight(3), 0.0);
        assert!(m.weights().windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn expected_value_weights_food() {
        let m = ReferenceMemory::new(0.1, 120);
        let mut food = RingBuffer::new(120);
        food.push(1.0);
        food.push(2.0);
        let ev = m.expected_value(&food);
        assert!((ev - (2.0 * m.weight(0) + 1.0 * m.weight(1))).abs() < 1e-12);
    }

    #[test]
    fn attraction_points_at_food_across_seam() {
        let m = ReferenceMemory::new(0.1, 120);
        let mut pos = RingBuffer::new(120);
        let mut food = RingBuffer::new(120);
        pos.push(Vec2::new(98.0, 50.0));
        food.push(1.0);
        pos.push(Vec2::new(20.0, 20.0));
        food.push(0.0);
        let v = m.attraction(Vec2::new(2.0, 50.0), &pos, &food, &field()).unwrap();
        assert!(v.x < 0.0 && v.y.abs() < 1e-12);
        let expected = 1.0 * m.weight(1) / 4.0;
        assert!((v.length() - expected).abs() < 1e-12);
    }

    #[test]
    fn coincident_food_position_gives_no_attraction() {
        let m = ReferenceMemory::new(0.1, 120);
        let mut pos = RingBuffer::new(120);
        let mut food = RingBuffer::new(120);
        pos.push(Vec2::new(5.0, 5.0));
        food.push(0.3);
        assert_eq!(m.attraction(Vec2::new(5.0, 5.0), &pos, &food, &field()), None);
    }

    #[test]
    fn no_food_means_zero_vector() {
        let m = ReferenceMemory::new(0.1, 120);
        let pos = RingBuffer::filled(120, Vec2::new(1.0, 1.0));
        let food = RingBuffer::filled(120, 0.0);
        assert_eq!(
            m.attraction(Vec2::new(5.0, 5.0), &pos, &food, &field()),
            Some(Vec2::ZERO)
        );
    }
}
