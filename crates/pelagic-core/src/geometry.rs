//! Planar vectors and heading arithmetic.
//!
//! Headings follow the compass convention: degrees clockwise from north,
//! so heading 0 moves along `+y` and heading 90 along `+x`. A unit step
//! along heading `h` is `(sin h, cos h)`.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A 2D vector in continuous grid units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    /// East component.
    pub x: f64,
    /// North component.
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Construct a vector.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along a compass heading (degrees).
    pub fn from_heading(heading: f64) -> Self {
        let rad = heading.to_radians();
        Self::new(rad.sin(), rad.cos())
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Distance to another point (no wrap-around; see `SpatialField`).
    pub fn distance(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    pub fn normalized(self) -> Option<Vec2> {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }

    /// Compass heading of this vector in `[0, 360)`.
    ///
    /// The zero vector has heading 0.
    pub fn heading(self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 {
            return 0.0;
        }
        normalize_heading(self.x.atan2(self.y).to_degrees())
    }

    /// Whether both components are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Normalize a heading in degrees into `[0, 360)`.
///
/// Non-finite input maps to 0. The function is idempotent.
pub fn normalize_heading(heading: f64) -> f64 {
    if !heading.is_finite() {
        return 0.0;
    }
    let h = heading.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0.
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// Signed turn from heading `from` to heading `to`, in `(-180, 180]`.
///
/// Positive values are clockwise (right) turns.
pub fn angle_difference(from: f64, to: f64) -> f64 {
    let d = normalize_heading(to - from);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}
