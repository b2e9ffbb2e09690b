//! In-memory raster landscape.
//!
//! Layers are row-major with row 0 at the southern edge, so the flat index
//! of cell `(x, y)` is `y * width + x`. Parsing raster files is the
//! caller's business; [`GridLandscape::from_layers`] only checks shapes.
//!
//! Food is not stored per cell. Cells with a positive food probability
//! become [`FoodPatch`] entries in one contiguous vector, and a per-cell
//! lookup maps back into it. The regrowth pass borrows the patch slice
//! mutably through [`GridLandscape::food_parts_mut`] and may split it
//! into disjoint chunks without any locking.

use crate::error::LandscapeError;
use crate::error::SpaceError;
use pelagic_core::{is_valid, Cell, Landscape, NO_BLOCK, NO_DATA};

const NO_PATCH: u32 = u32::MAX;

/// One food-bearing cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoodPatch {
    /// Flat index of the cell.
    pub cell_index: u32,
    /// Current food level.
    pub food: f64,
}

/// Raw layers used to assemble a [`GridLandscape`].
#[derive(Clone, Debug)]
pub struct LandscapeLayers {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Depth in metres, positive in water.
    pub depth: Vec<f64>,
    /// Salinity (PSU).
    pub salinity: Vec<f64>,
    /// Distance to coast (m).
    pub distance_to_coast: Vec<f64>,
    /// Probability that a cell bears food.
    pub food_probability: Vec<f64>,
    /// Initial food level; defaults to the food probability.
    pub initial_food: Option<Vec<f64>>,
    /// Habitat suitability: one raster, or one per quarter.
    pub max_ent: Vec<Vec<f64>>,
    /// Region ids.
    pub block_id: Vec<i32>,
    /// Median sediment grain size (phi).
    pub sediment: Option<Vec<f64>>,
    /// Water temperature (degrees C).
    pub temperature: Option<Vec<f64>>,
}

impl LandscapeLayers {
    /// Uniform water of the given depth: salinity 30, 10 km from any
    /// coast, no food, suitability 1 and no blocks.
    pub fn filled(width: u32, height: u32, depth: f64) -> Self {
        let n = width as usize * height as usize;
        Self {
            width,
            height,
            depth: vec![depth; n],
            salinity: vec![30.0; n],
            distance_to_coast: vec![10_000.0; n],
            food_probability: vec![0.0; n],
            initial_food: None,
            max_ent: vec![vec![1.0; n]],
            block_id: vec![NO_BLOCK; n],
            sediment: None,
            temperature: None,
        }
    }
}

/// Mutable food patches plus the habitat suitability they grow towards.
pub struct FoodParts<'a> {
    /// All food patches.
    pub patches: &'a mut [FoodPatch],
    /// Active habitat suitability raster (flat, per cell).
    pub max_ent: &'a [f64],
    /// Mean of the active suitability raster.
    pub mean_max_ent: f64,
}

/// Raster-backed [`Landscape`].
#[derive(Clone, Debug)]
pub struct GridLandscape {
    width: u32,
    height: u32,
    depth: Vec<f64>,
    salinity: Vec<f64>,
    distance_to_coast: Vec<f64>,
    food_probability: Vec<f64>,
    max_ent: Vec<Vec<f64>>,
    mean_max_ent: Vec<f64>,
    quarter: usize,
    block_id: Vec<i32>,
    sediment: Option<Vec<f64>>,
    temperature: Option<Vec<f64>>,
    uniform_temperature: Option<f64>,
    patches: Vec<FoodPatch>,
    patch_of: Vec<u32>,
}

impl GridLandscape {
    /// Assemble a landscape, checking every layer has `width * height` values.
    pub fn from_layers(layers: LandscapeLayers) -> Result<Self, LandscapeError> {
        if layers.width == 0 || layers.height == 0 {
            return Err(SpaceError::EmptySpace.into());
        }
        let n = layers.width as usize * layers.height as usize;
        if n >= NO_PATCH as usize {
            return Err(SpaceError::DimensionTooLarge {
                name: "cells",
                value: layers.width.saturating_mul(layers.height),
                max: NO_PATCH - 1,
            }
            .into());
        }
        check_len("depth", n, layers.depth.len())?;
        check_len("salinity", n, layers.salinity.len())?;
        check_len("distance_to_coast", n, layers.distance_to_coast.len())?;
        check_len("food_probability", n, layers.food_probability.len())?;
        check_len("block_id", n, layers.block_id.len())?;
        if let Some(v) = &layers.initial_food {
            check_len("initial_food", n, v.len())?;
        }
        if let Some(v) = &layers.sediment {
            check_len("sediment", n, v.len())?;
        }
        if let Some(v) = &layers.temperature {
            check_len("temperature", n, v.len())?;
        }
        if layers.max_ent.len() != 1 && layers.max_ent.len() != 4 {
            return Err(LandscapeError::InvalidQuarterCount {
                count: layers.max_ent.len(),
            });
        }
        for raster in &layers.max_ent {
            check_len("max_ent", n, raster.len())?;
        }

        let mut patches = Vec::new();
        let mut patch_of = vec![NO_PATCH; n];
        for (i, &p) in layers.food_probability.iter().enumerate() {
            if !is_valid(p) || p <= 0.0 {
                continue;
            }
            if p > 1.0 {
                return Err(LandscapeError::InvalidFoodProbability { index: i, value: p });
            }
            let food = layers
                .initial_food
                .as_ref()
                .map_or(p, |v| if is_valid(v[i]) { v[i].max(0.0) } else { 0.0 });
            patch_of[i] = patches.len() as u32;
            patches.push(FoodPatch {
                cell_index: i as u32,
                food,
            });
        }

        let mean_max_ent = layers.max_ent.iter().map(|r| mean_of_valid(r)).collect();

        Ok(Self {
            width: layers.width,
            height: layers.height,
            depth: layers.depth,
            salinity: layers.salinity,
            distance_to_coast: layers.distance_to_coast,
            food_probability: layers.food_probability,
            max_ent: layers.max_ent,
            mean_max_ent,
            quarter: 0,
            block_id: layers.block_id,
            sediment: layers.sediment,
            temperature: layers.temperature,
            uniform_temperature: None,
            patches,
            patch_of,
        })
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if self.contains(cell) {
            Some(cell.y as usize * self.width as usize + cell.x as usize)
        } else {
            None
        }
    }

    fn layer(&self, layer: &[f64], cell: Cell) -> f64 {
        self.index(cell).map_or(NO_DATA, |i| layer[i])
    }

    /// Cell of a flat index.
    pub fn cell_of_index(&self, index: usize) -> Cell {
        let w = self.width as usize;
        Cell::new((index % w) as i32, (index / w) as i32)
    }

    /// Select the habitat suitability raster of a quarter (`0..4`).
    ///
    /// A landscape built with a single raster ignores the call.
    pub fn set_quarter(&mut self, quarter: u32) {
        if self.max_ent.len() == 4 {
            self.quarter = (quarter % 4) as usize;
        }
    }

    /// Active quarter.
    pub fn quarter(&self) -> u32 {
        self.quarter as u32
    }

    /// Use one temperature everywhere, overriding any raster.
    pub fn set_uniform_temperature(&mut self, celsius: f64) {
        self.uniform_temperature = Some(celsius);
    }

    /// Food patches in cell order.
    pub fn patches(&self) -> &[FoodPatch] {
        &self.patches
    }

    /// Split borrow for the regrowth pass.
    pub fn food_parts_mut(&mut self) -> FoodParts<'_> {
        FoodParts {
            patches: &mut self.patches,
            max_ent: &self.max_ent[self.quarter],
            mean_max_ent: self.mean_max_ent[self.quarter],
        }
    }

    /// Sum of all food.
    pub fn total_food(&self) -> f64 {
        self.patches.iter().map(|p| p.food).sum()
    }

    /// Cells that hold water and may bear food; candidates for seeding
    /// animals.
    pub fn food_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.patches
            .iter()
            .map(|p| self.cell_of_index(p.cell_index as usize))
            .filter(|c| self.is_water(*c))
    }
}

fn check_len(layer: &'static str, expected: usize, actual: usize) -> Result<(), LandscapeError> {
    if expected == actual {
        Ok(())
    } else {
        Err(LandscapeError::LayerSizeMismatch {
            layer,
            expected,
            actual,
        })
    }
}

fn mean_of_valid(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|v| is_valid(**v))
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

impl Landscape for GridLandscape {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn depth(&self, cell: Cell) -> f64 {
        self.layer(&self.depth, cell)
    }

    fn salinity(&self, cell: Cell) -> f64 {
        self.layer(&self.salinity, cell)
    }

    fn distance_to_coast(&self, cell: Cell) -> f64 {
        self.layer(&self.distance_to_coast, cell)
    }

    fn food_probability(&self, cell: Cell) -> f64 {
        self.layer(&self.food_probability, cell)
    }

    fn food_level(&self, cell: Cell) -> f64 {
        match self.index(cell) {
            None => NO_DATA,
            Some(i) => match self.patch_of[i] {
                NO_PATCH => 0.0,
                p => self.patches[p as usize].food,
            },
        }
    }

    fn set_food_level(&mut self, cell: Cell, value: f64) {
        if let Some(i) = self.index(cell) {
            let p = self.patch_of[i];
            if p != NO_PATCH {
                self.patches[p as usize].food = value;
            }
        }
    }

    fn max_ent(&self, cell: Cell) -> f64 {
        self.layer(&self.max_ent[self.quarter], cell)
    }

    fn mean_max_ent(&self) -> f64 {
        self.mean_max_ent[self.quarter]
    }

    fn block_id(&self, cell: Cell) -> i32 {
        self.index(cell).map_or(NO_BLOCK, |i| self.block_id[i])
    }

    fn sediment_grain_size(&self, cell: Cell) -> f64 {
        match &self.sediment {
            Some(layer) => self.layer(layer, cell),
            None => NO_DATA,
        }
    }

    fn temperature(&self, cell: Cell) -> f64 {
        if !self.contains(cell) {
            return NO_DATA;
        }
        if let Some(t) = self.uniform_temperature {
            return t;
        }
        match &self.temperature {
            Some(layer) => self.layer(layer, cell),
            None => NO_DATA,
        }
    }
}
