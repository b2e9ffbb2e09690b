//! Reusable landscape and field fixtures.
//!
//! - [`open_water`]: uniform water, no food.
//! - [`all_land`]: every cell dry.
//! - [`coastal_gradient`]: land along the western edge, depth and coast
//!   distance increasing eastwards.
//! - [`food_stripe`]: open water with one row of food patches.
//! - [`bounce_field`] / [`wrap_field`]: matching field geometry.

use pelagic_space::{EdgeBehavior, GridLandscape, LandscapeLayers, SpatialField};

/// Build a landscape from layers the fixture itself produced.
fn build(layers: LandscapeLayers) -> GridLandscape {
    GridLandscape::from_layers(layers).expect("fixture layers are well-formed")
}

/// Uniform water `depth` metres deep.
pub fn open_water(width: u32, height: u32, depth: f64) -> GridLandscape {
    build(LandscapeLayers::filled(width, height, depth))
}

/// A landscape without a single wet cell.
pub fn all_land(width: u32, height: u32) -> GridLandscape {
    build(LandscapeLayers::filled(width, height, 0.0))
}

/// Land in columns `0..land_cols`; water elsewhere, one metre deeper and
/// one cell (`cell_size_m` metres) further from the coast per column.
pub fn coastal_gradient(width: u32, height: u32, land_cols: u32, cell_size_m: f64) -> GridLandscape {
    let mut layers = LandscapeLayers::filled(width, height, 0.0);
    for y in 0..height {
        for x in 0..width {
            let i = (y * width + x) as usize;
            if x >= land_cols {
                let k = f64::from(x - land_cols + 1);
                layers.depth[i] = k;
                layers.distance_to_coast[i] = k * cell_size_m;
            } else {
                layers.distance_to_coast[i] = 0.0;
            }
        }
    }
    build(layers)
}

/// Open water with food patches along row `row`, each holding `food`.
pub fn food_stripe(width: u32, height: u32, row: u32, food: f64) -> GridLandscape {
    let mut layers = LandscapeLayers::filled(width, height, 20.0);
    let mut initial = vec![0.0; layers.depth.len()];
    for x in 0..width {
        let i = (row * width + x) as usize;
        layers.food_probability[i] = 0.5;
        initial[i] = food;
    }
    layers.initial_food = Some(initial);
    build(layers)
}

/// Field with bounce borders on both axes.
pub fn bounce_field(width: u32, height: u32) -> SpatialField {
    SpatialField::new(width, height, EdgeBehavior::Bounce, EdgeBehavior::Bounce)
        .expect("fixture field is non-empty")
}

/// Field with wrap borders on both axes.
pub fn wrap_field(width: u32, height: u32) -> SpatialField {
    SpatialField::new(width, height, EdgeBehavior::Wrap, EdgeBehavior::Wrap)
        .expect("fixture field is non-empty")
}
