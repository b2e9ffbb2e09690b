//! The continuous plane animals move on.

use crate::edge::EdgeBehavior;
use crate::error::SpaceError;
use pelagic_core::{Cell, Vec2};

/// A bounded continuous plane covering a `width` x `height` cell raster.
///
/// Positions are in grid units: cell `(i, j)` spans `[i, i+1) x [j, j+1)`.
/// Each axis has its own [`EdgeBehavior`]; distances and displacements on
/// a wrapped axis take the short way round.
///
/// # Examples
///
/// ```
/// use pelagic_core::{Cell, Vec2};
/// use pelagic_space::{EdgeBehavior, SpatialField};
///
/// let f = SpatialField::new(10, 10, EdgeBehavior::Wrap, EdgeBehavior::Bounce).unwrap();
/// assert_eq!(f.to_cell(Vec2::new(3.7, 2.1)), Some(Cell::new(3, 2)));
/// assert_eq!(f.to_cell(Vec2::new(-0.5, 2.0)), Some(Cell::new(9, 2)));
/// assert_eq!(f.to_cell(Vec2::new(2.0, 11.0)), None);
/// assert_eq!(f.distance(Vec2::new(0.5, 5.0), Vec2::new(9.5, 5.0)), 1.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialField {
    width: u32,
    height: u32,
    x_edge: EdgeBehavior,
    y_edge: EdgeBehavior,
}

impl SpatialField {
    /// Largest accepted extent; cells use `i32` coordinates.
    pub const MAX_DIM: u32 = i32::MAX as u32;

    /// Create a field.
    ///
    /// Returns `Err(SpaceError::EmptySpace)` when either extent is zero.
    pub fn new(
        width: u32,
        height: u32,
        x_edge: EdgeBehavior,
        y_edge: EdgeBehavior,
    ) -> Result<Self, SpaceError> {
        if width == 0 || height == 0 {
            return Err(SpaceError::EmptySpace);
        }
        for (name, value) in [("width", width), ("height", height)] {
            if value > Self::MAX_DIM {
                return Err(SpaceError::DimensionTooLarge {
                    name,
                    value,
                    max: Self::MAX_DIM,
                });
            }
        }
        Ok(Self {
            width,
            height,
            x_edge,
            y_edge,
        })
    }

    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Border policy of the x axis.
    pub fn x_edge(&self) -> EdgeBehavior {
        self.x_edge
    }

    /// Border policy of the y axis.
    pub fn y_edge(&self) -> EdgeBehavior {
        self.y_edge
    }

    /// Whether the position lies inside the field without any border policy.
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x < self.width as f64 && pos.y < self.height as f64
    }

    /// Apply the border policy so the result lies inside the field.
    pub fn resolve(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            self.x_edge.resolve(pos.x, self.width as f64),
            self.y_edge.resolve(pos.y, self.height as f64),
        )
    }

    /// The cell containing `pos`.
    ///
    /// Wrapped axes are folded back into the field first; outside a
    /// bounce axis there is no cell.
    pub fn to_cell(&self, pos: Vec2) -> Option<Cell> {
        if !pos.is_finite() {
            return None;
        }
        let x = match self.x_edge {
            EdgeBehavior::Wrap => self.x_edge.resolve(pos.x, self.width as f64),
            EdgeBehavior::Bounce => pos.x,
        };
        let y = match self.y_edge {
            EdgeBehavior::Wrap => self.y_edge.resolve(pos.y, self.height as f64),
            EdgeBehavior::Bounce => pos.y,
        };
        let p = Vec2::new(x, y);
        if self.contains(p) {
            Some(Cell::new(p.x.floor() as i32, p.y.floor() as i32))
        } else {
            None
        }
    }

    /// Centre point of a cell.
    pub fn cell_center(&self, cell: Cell) -> Vec2 {
        Vec2::new(cell.x as f64 + 0.5, cell.y as f64 + 0.5)
    }

    /// Shortest displacement from `from` to `to`.
    pub fn delta(&self, from: Vec2, to: Vec2) -> Vec2 {
        Vec2::new(
            self.x_edge.delta(from.x, to.x, self.width as f64),
            self.y_edge.delta(from.y, to.y, self.height as f64),
        )
    }

    /// Shortest distance between two positions.
    pub fn distance(&self, a: Vec2, b: Vec2) -> f64 {
        self.delta(a, b).length()
    }

    /// Whether any axis wraps.
    pub fn wraps(&self) -> bool {
        self.x_edge == EdgeBehavior::Wrap || self.y_edge == EdgeBehavior::Wrap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded() -> SpatialField {
        SpatialField::new(20, 10, EdgeBehavior::Bounce, EdgeBehavior::Bounce).unwrap()
    }

    #[test]
    fn empty_field_rejected() {
        assert_eq!(
            SpatialField::new(0, 5, EdgeBehavior::Wrap, EdgeBehavior::Wrap),
            Err(SpaceError::EmptySpace)
        );
    }

    #[test]
    fn bounce_field_has_no_cell_outside() {
        let f = bounded();
        assert_eq!(f.to_cell(Vec2::new(19.99, 9.99)), Some(Cell::new(19, 9)));
        assert_eq!(f.to_cell(Vec2::new(20.0, 5.0)), None);
        assert_eq!(f.to_cell(Vec2::new(-0.01, 5.0)), None);
        assert_eq!(f.to_cell(Vec2::new(f64::NAN, 5.0)), None);
    }

    #[test]
    fn resolve_keeps_positions_inside() {
        let f = bounded();
        let p = f.resolve(Vec2::new(21.0, -1.0));
        assert_eq!(p, Vec2::new(19.0, 1.0));
        assert!(f.contains(p));
    }

    #[test]
    fn wrapped_delta_crosses_seam() {
        let f = SpatialField::new(20, 10, EdgeBehavior::Wrap, EdgeBehavior::Wrap).unwrap();
        let d = f.delta(Vec2::new(19.0, 9.0), Vec2::new(1.0, 1.0));
        assert_eq!(d, Vec2::new(2.0, 2.0));
        assert!(f.wraps());
        assert!(!bounded().wraps());
    }

    #[test]
    fn cell_center_is_half_offset() {
        assert_eq!(bounded().cell_center(Cell::new(2, 3)), Vec2::new(2.5, 3.5));
    }
}
