//! The landscape collaborator trait.
//!
//! Raster loading is an external concern; the simulation only needs cell
//! lookups by grid coordinate. Lookups never fail: cells outside the
//! raster or without data return [`NO_DATA`] (or [`NO_BLOCK`]).

use crate::id::Cell;

/// Sentinel returned for out-of-range or no-data cells.
pub const NO_DATA: f64 = -9999.0;

/// Sentinel block id for cells outside every block.
pub const NO_BLOCK: i32 = -9999;

/// Whether a raster value carries data.
pub fn is_valid(value: f64) -> bool {
    value.is_finite() && value != NO_DATA
}

/// Per-cell environmental data consumed by the behaviour model.
///
/// Depth is positive in water; land and no-data cells are never water.
/// Food level is the only mutable layer: animals eat from it on the
/// movement thread and the food-growth pass regrows it once a day.
pub trait Landscape {
    /// Raster width in cells.
    fn width(&self) -> u32;

    /// Raster height in cells.
    fn height(&self) -> u32;

    /// Water depth in metres (positive in water).
    fn depth(&self, cell: Cell) -> f64;

    /// Salinity in PSU.
    fn salinity(&self, cell: Cell) -> f64;

    /// Distance to the nearest coast in metres.
    fn distance_to_coast(&self, cell: Cell) -> f64;

    /// Probability that the cell bears food; zero for barren cells.
    fn food_probability(&self, cell: Cell) -> f64;

    /// Current food level.
    fn food_level(&self, cell: Cell) -> f64;

    /// Overwrite the food level. Ignored for barren or out-of-range cells.
    fn set_food_level(&mut self, cell: Cell, value: f64);

    /// Seasonal habitat suitability.
    fn max_ent(&self, cell: Cell) -> f64;

    /// Mean habitat suitability over the current quarter's raster.
    fn mean_max_ent(&self) -> f64;

    /// Coarse region id used by region-specific dispersal.
    fn block_id(&self, cell: Cell) -> i32;

    /// Median sediment grain size (phi units).
    fn sediment_grain_size(&self, _cell: Cell) -> f64 {
        NO_DATA
    }

    /// Water temperature in degrees Celsius.
    fn temperature(&self, _cell: Cell) -> f64 {
        NO_DATA
    }

    /// Whether the cell is inside the raster.
    fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width() && (cell.y as u32) < self.height()
    }

    /// Whether the cell holds water.
    fn is_water(&self, cell: Cell) -> bool {
        let d = self.depth(cell);
        is_valid(d) && d > 0.0
    }
}
