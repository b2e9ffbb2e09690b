//! Persistent spatial memory of profitable foraging areas.
//!
//! The field is tiled with square memory cells (5 grid units by default).
//! A cell is created the first time the animal eats inside it and then
//! accumulates food and time spent. Dispersal uses the remembered energy
//! expectation to pick distant targets.

use indexmap::IndexMap;
use pelagic_core::Vec2;

/// What an animal remembers about one memory cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemoryCell {
    /// Cell number, see [`PersistentSpatialMemory::calc_mem_cell_number`].
    pub id: i64,
    /// Cumulative food obtained in the cell.
    pub food: f64,
    /// Ticks spent in the cell since it was first visited with food.
    pub ticks: u32,
}

impl MemoryCell {
    /// Mean food per tick spent.
    pub fn energy_expectation(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.food / self.ticks as f64
        }
    }
}

/// Ledger of visited memory cells.
///
/// # Examples
///
/// ```
/// use pelagic_agent::memory::PersistentSpatialMemory;
/// use pelagic_core::Vec2;
///
/// let mut m = PersistentSpatialMemory::new(5.0, 100);
/// let id = m.calc_mem_cell_number(Vec2::new(12.0, 7.0));
/// assert_eq!(id, 2 + 1 * 20);
/// assert!(m.is_point_in_mem_cell(id, Vec2::new(12.0, 7.0)));
/// m.update_memory(Vec2::new(12.0, 7.0), 0.4);
/// assert_eq!(m.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PersistentSpatialMemory {
    cell_size: f64,
    cells_per_row: i64,
    cells: IndexMap<i64, MemoryCell>,
}

impl PersistentSpatialMemory {
    /// Create an empty memory over a field `field_width` cells wide.
    pub fn new(cell_size: f64, field_width: u32) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        let cells_per_row = ((field_width as f64 / cell_size).ceil() as i64).max(1);
        Self {
            cell_size,
            cells_per_row,
            cells: IndexMap::new(),
        }
    }

    /// Side of one memory cell (grid units).
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of remembered cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Remembered cells in order of first visit.
    pub fn cells(&self) -> impl Iterator<Item = &MemoryCell> + '_ {
        self.cells.values()
    }

    /// Look up one cell.
    pub fn cell(&self, id: i64) -> Option<&MemoryCell> {
        self.cells.get(&id)
    }

    /// Cell number `floor(x / size) + floor(y / size) * cells_per_row`.
    pub fn calc_mem_cell_number(&self, pos: Vec2) -> i64 {
        let col = (pos.x / self.cell_size).floor() as i64;
        let row = (pos.y / self.cell_size).floor() as i64;
        col + row * self.cells_per_row
    }

    /// Centre point of a cell.
    pub fn calc_mem_cell_center_point(&self, id: i64) -> Vec2 {
        let col = id.rem_euclid(self.cells_per_row);
        let row = id.div_euclid(self.cells_per_row);
        Vec2::new(
            (col as f64 + 0.5) * self.cell_size,
            (row as f64 + 0.5) * self.cell_size,
        )
    }

    /// Whether `pos` lies inside cell `id`.
    pub fn is_point_in_mem_cell(&self, id: i64, pos: Vec2) -> bool {
        self.calc_mem_cell_number(pos) == id
    }

    /// Record food eaten at `pos`.
    ///
    /// Ticks without food leave the memory untouched, so a cell's
    /// expectation only averages over the ticks it fed the animal.
    pub fn update_memory(&mut self, pos: Vec2, food_eaten: f64) {
        if !(food_eaten > 0.0) {
            return;
        }
        let id = self.calc_mem_cell_number(pos);
        let cell = self.cells.entry(id).or_insert(MemoryCell { id, food: 0.0, ticks: 0 });
        cell.food += food_eaten;
        cell.ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn cells_appear_only_with_food() {
        let mut m = PersistentSpatialMemory::new(5.0, 50);
        m.update_memory(Vec2::new(1.0, 1.0), 0.0);
        assert!(m.is_empty());
        m.update_memory(Vec2::new(1.0, 1.0), 0.5);
        m.update_memory(Vec2::new(2.0, 3.0), 0.0);
        assert_eq!(m.len(), 1);
        let c = m.cells().next().unwrap();
        assert_eq!(c.ticks, 1);
        assert_eq!(c.energy_expectation(), 0.5);
    }

    #[test]
    fn empty_ticks_do_not_dilute_expectation() {
        let mut m = PersistentSpatialMemory::new(5.0, 50);
        m.update_memory(Vec2::new(1.0, 1.0), 1.0);
        for _ in 0..9 {
            m.update_memory(Vec2::new(1.0, 1.0), 0.0);
        }
        m.update_memory(Vec2::new(2.0, 2.0), f64::NAN);
        let c = m.cells().next().unwrap();
        assert_eq!((c.ticks, c.food), (1, 1.0));
        assert_eq!(c.energy_expectation(), 1.0);

        m.update_memory(Vec2::new(4.0, 0.5), 0.5);
        let c = m.cells().next().unwrap();
        assert_eq!(c.ticks, 2);
        assert_eq!(c.energy_expectation(), 0.75);
    }

    #[test]
    fn center_point_lies_in_its_cell() {
        let m = PersistentSpatialMemory::new(5.0, 48);
        assert_eq!(m.calc_mem_cell_center_point(11), Vec2::new(7.5, 7.5));
        for id in 0..200 {
            assert!(m.is_point_in_mem_cell(id, m.calc_mem_cell_center_point(id)));
        }
    }

    proptest! {
        #[test]
        fn cell_number_inverse(x in 0.0f64..1000.0, y in 0.0f64..1000.0, size in 1.0f64..20.0) {
            let m = PersistentSpatialMemory::new(size, 1000);
            let p = Vec2::new(x, y);
            prop_assert!(m.is_point_in_mem_cell(m.calc_mem_cell_number(p), p));
            let c = m.calc_mem_cell_center_point(m.calc_mem_cell_number(p));
            prop_assert!((c.x - p.x).abs() <= size / 2.0 + 1e-9);
            prop_assert!((c.y - p.y).abs() <= size / 2.0 + 1e-9);
        }
    }
}
