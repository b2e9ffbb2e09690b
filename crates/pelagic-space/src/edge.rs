//! Border policy of the continuous field.

/// What happens to a position that leaves the field along one axis.
///
/// # Examples
///
/// ```
/// use pelagic_space::EdgeBehavior;
///
/// assert_eq!(EdgeBehavior::Wrap.resolve(10.5, 10.0), 0.5);
/// assert_eq!(EdgeBehavior::Bounce.resolve(10.5, 10.0), 9.5);
/// assert_eq!(EdgeBehavior::Bounce.resolve(-2.0, 10.0), 2.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeBehavior {
    /// Reflect off the border back into the field.
    Bounce,
    /// Re-enter from the opposite side (periodic).
    Wrap,
}

impl EdgeBehavior {
    /// Map a coordinate into `[0, extent)` under this policy.
    ///
    /// Non-finite coordinates map to 0.
    pub fn resolve(self, v: f64, extent: f64) -> f64 {
        if !v.is_finite() || extent <= 0.0 {
            return 0.0;
        }
        match self {
            Self::Wrap => {
                let r = v.rem_euclid(extent);
                if r >= extent {
                    0.0
                } else {
                    r
                }
            }
            Self::Bounce => {
                let period = 2.0 * extent;
                let r = v.rem_euclid(period);
                let reflected = if r >= extent { period - r } else { r };
                // An exact hit on the far border stays just inside.
                if reflected >= extent {
                    extent * (1.0 - f64::EPSILON)
                } else {
                    reflected
                }
            }
        }
    }

    /// Shortest signed displacement from `a` to `b` along one axis.
    pub fn delta(self, a: f64, b: f64, extent: f64) -> f64 {
        let d = b - a;
        match self {
            Self::Bounce => d,
            Self::Wrap => {
                let half = extent / 2.0;
                if d > half {
                    d - extent
                } else if d < -half {
                    d + extent
                } else {
                    d
                }
            }
        }
    }
}
