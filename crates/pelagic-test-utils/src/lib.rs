//! Test utilities and mock types for pelagic development.
//!
//! Provides a scripted [`RandomSource`] ([`ScriptedRandom`]), a sparse
//! [`Landscape`] mock ([`MockLandscape`]) and ready-made landscape and
//! field fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::{HashMap, VecDeque};

use pelagic_core::{Cell, Draw, Landscape, RandomSource, NO_BLOCK, NO_DATA};

/// One scripted draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scripted {
    Uniform(f64),
    IntRange(i64),
    PlusMinusOne(f64),
    Normal(Draw, f64),
}

/// Random source that hands out a fixed script of values.
///
/// Each call must match the kind (and, for normal draws, the name) of
/// the next scripted entry; mismatches and exhaustion panic with the
/// position in the script, so a test fails at the first divergent draw.
/// Normal draws ignore mean and standard deviation.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    script: VecDeque<Scripted>,
    consumed: usize,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a uniform draw.
    pub fn uniform(mut self, value: f64) -> Self {
        self.script.push_back(Scripted::Uniform(value));
        self
    }

    /// Append an integer draw.
    pub fn int_range(mut self, value: i64) -> Self {
        self.script.push_back(Scripted::IntRange(value));
        self
    }

    /// Append a sign draw.
    pub fn plus_minus_one(mut self, value: f64) -> Self {
        self.script.push_back(Scripted::PlusMinusOne(value));
        self
    }

    /// Append a named normal draw.
    pub fn normal(mut self, draw: Draw, value: f64) -> Self {
        self.script.push_back(Scripted::Normal(draw, value));
        self
    }

    /// Append `n` identical normal draws.
    pub fn repeat_normal(mut self, draw: Draw, value: f64, n: usize) -> Self {
        for _ in 0..n {
            self.script.push_back(Scripted::Normal(draw, value));
        }
        self
    }

    /// Draws not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Whether every scripted draw was consumed.
    pub fn is_exhausted(&self) -> bool {
        self.script.is_empty()
    }

    fn next(&mut self, wanted: &str) -> Scripted {
        let at = self.consumed;
        self.consumed += 1;
        match self.script.pop_front() {
            Some(s) => s,
            None => panic!("script exhausted at draw {at} (wanted {wanted})"),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform(&mut self) -> f64 {
        match self.next("uniform") {
            Scripted::Uniform(v) => v,
            other => panic!("draw {}: wanted uniform, script has {other:?}", self.consumed - 1),
        }
    }

    fn int_range(&mut self, lo: i64, hi: i64) -> i64 {
        match self.next("int_range") {
            Scripted::IntRange(v) => {
                assert!(hi <= lo || (lo..hi).contains(&v), "scripted {v} outside {lo}..{hi}");
                v
            }
            other => panic!("draw {}: wanted int_range, script has {other:?}", self.consumed - 1),
        }
    }

    fn normal(&mut self, draw: Draw, _mean: f64, _sd: f64) -> f64 {
        match self.next(draw.name()) {
            Scripted::Normal(d, v) if d == draw => v,
            other => panic!("draw {}: wanted {}, script has {other:?}", self.consumed - 1, draw.name()),
        }
    }

    fn plus_minus_one(&mut self) -> f64 {
        match self.next("plus_minus_one") {
            Scripted::PlusMinusOne(v) => v,
            other => panic!("draw {}: wanted plus_minus_one, script has {other:?}", self.consumed - 1),
        }
    }
}

/// Sparse landscape mock.
///
/// Every in-range cell has the default values unless overridden. Food is
/// stored per cell and only exists where a food probability was set.
#[derive(Clone, Debug)]
pub struct MockLandscape {
    width: u32,
    height: u32,
    depth: f64,
    salinity: f64,
    coast: f64,
    depth_overrides: HashMap<Cell, f64>,
    coast_overrides: HashMap<Cell, f64>,
    food_probability: HashMap<Cell, f64>,
    food: HashMap<Cell, f64>,
    blocks: HashMap<Cell, i32>,
    max_ent: f64,
    temperature: f64,
    sediment: f64,
}

impl MockLandscape {
    /// Uniform water of the given depth.
    pub fn new(width: u32, height: u32, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
            salinity: 30.0,
            coast: 10_000.0,
            depth_overrides: HashMap::new(),
            coast_overrides: HashMap::new(),
            food_probability: HashMap::new(),
            food: HashMap::new(),
            blocks: HashMap::new(),
            max_ent: 1.0,
            temperature: NO_DATA,
            sediment: NO_DATA,
        }
    }

    pub fn with_salinity(mut self, salinity: f64) -> Self {
        self.salinity = salinity;
        self
    }

    /// Give every cell acoustic inputs.
    pub fn with_acoustics(mut self, temperature: f64, sediment: f64) -> Self {
        self.temperature = temperature;
        self.sediment = sediment;
        self
    }

    pub fn set_depth(&mut self, cell: Cell, depth: f64) {
        self.depth_overrides.insert(cell, depth);
    }

    pub fn set_coast_distance(&mut self, cell: Cell, metres: f64) {
        self.coast_overrides.insert(cell, metres);
    }

    pub fn set_block(&mut self, cell: Cell, block: i32) {
        self.blocks.insert(cell, block);
    }

    /// Make `cell` a food patch holding `food`.
    pub fn add_patch(&mut self, cell: Cell, probability: f64, food: f64) {
        self.food_probability.insert(cell, probability);
        self.food.insert(cell, food);
    }

    /// Sum of all food.
    pub fn total_food(&self) -> f64 {
        self.food.values().sum()
    }
}

impl Landscape for MockLandscape {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn depth(&self, cell: Cell) -> f64 {
        if !self.contains(cell) {
            return NO_DATA;
        }
        self.depth_overrides.get(&cell).copied().unwrap_or(self.depth)
    }

    fn salinity(&self, cell: Cell) -> f64 {
        if self.contains(cell) {
            self.salinity
        } else {
            NO_DATA
        }
    }

    fn distance_to_coast(&self, cell: Cell) -> f64 {
        if !self.contains(cell) {
            return NO_DATA;
        }
        self.coast_overrides.get(&cell).copied().unwrap_or(self.coast)
    }

    fn food_probability(&self, cell: Cell) -> f64 {
        self.food_probability.get(&cell).copied().unwrap_or(0.0)
    }

    fn food_level(&self, cell: Cell) -> f64 {
        if !self.contains(cell) {
            return NO_DATA;
        }
        self.food.get(&cell).copied().unwrap_or(0.0)
    }

    fn set_food_level(&mut self, cell: Cell, value: f64) {
        if let Some(f) = self.food.get_mut(&cell) {
            *f = value;
        }
    }

    fn max_ent(&self, cell: Cell) -> f64 {
        if self.contains(cell) {
            self.max_ent
        } else {
            NO_DATA
        }
    }

    fn mean_max_ent(&self) -> f64 {
        self.max_ent
    }

    fn block_id(&self, cell: Cell) -> i32 {
        self.blocks.get(&cell).copied().unwrap_or(NO_BLOCK)
    }

    fn sediment_grain_size(&self, cell: Cell) -> f64 {
        if self.contains(cell) {
            self.sediment
        } else {
            NO_DATA
        }
    }

    fn temperature(&self, cell: Cell) -> f64 {
        if self.contains(cell) {
            self.temperature
        } else {
            NO_DATA
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_is_consumed_in_order() {
        let mut r = ScriptedRandom::new()
            .uniform(0.25)
            .normal(Draw::CrwAngle, 12.0)
            .int_range(3);
        assert_eq!(r.remaining(), 3);
        assert_eq!(RandomSource::uniform(&mut r), 0.25);
        assert_eq!(RandomSource::normal(&mut r, Draw::CrwAngle, 0.0, 38.0), 12.0);
        assert_eq!(RandomSource::int_range(&mut r, 0, 10), 3);
        assert!(r.is_exhausted());
    }

    #[test]
    #[should_panic(expected = "wanted crw_step_length")]
    fn mismatched_draw_panics() {
        let mut r = ScriptedRandom::new().normal(Draw::CrwAngle, 1.0);
        RandomSource::normal(&mut r, Draw::CrwStepLength, 0.0, 1.0);
    }

    #[test]
    fn mock_landscape_overrides_and_patches() {
        let mut l = MockLandscape::new(4, 4, 10.0);
        l.set_depth(Cell::new(1, 1), 0.0);
        l.add_patch(Cell::new(2, 2), 0.5, 0.3);
        assert!(!l.is_water(Cell::new(1, 1)));
        assert!(l.is_water(Cell::new(0, 0)));
        assert_eq!(l.depth(Cell::new(9, 0)), NO_DATA);
        l.set_food_level(Cell::new(0, 0), 5.0);
        assert_eq!(l.food_level(Cell::new(0, 0)), 0.0);
        l.set_food_level(Cell::new(2, 2), 0.1);
        assert_eq!(l.total_food(), 0.1);
    }
}
