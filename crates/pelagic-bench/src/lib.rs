//! Benchmark profiles for the pelagic movement engine.
//!
//! Provides pre-built [`WorldConfig`] profiles for benchmarking:
//!
//! - [`reference_profile`]: 100x100 sea (10K cells), 200 animals, one
//!   turbine and one ship
//! - [`stress_profile`]: 316x316 sea (~100K cells), 2,000 animals
//! - [`coastal_sea`]: the deterministic landscape both profiles use

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use pelagic_agent::{FixedSource, ShipSpec, VesselClass, Waypoint};
use pelagic_core::{SourceId, TickId, Vec2};
use pelagic_engine::WorldConfig;
use pelagic_space::{GridLandscape, LandscapeLayers};

/// Deterministic per-cell hash in `[0, 1)`.
fn cell_noise(seed: u64, i: usize) -> f64 {
    let h = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add((i as u64).wrapping_mul(1442695040888963407));
    (h >> 11) as f64 / (1u64 << 53) as f64
}

/// A sea with land along the western edge, depth growing eastwards and
/// scattered food patches.
///
/// The westmost tenth of the columns is land. Roughly a fifth of the water
/// cells bear food, chosen by a hash of `seed`.
pub fn coastal_sea(width: u32, height: u32, seed: u64) -> LandscapeLayers {
    let mut layers = LandscapeLayers::filled(width, height, 0.0);
    let land = width / 10;
    let mut food = vec![0.0; layers.depth.len()];
    for y in 0..height {
        for x in 0..width {
            let i = (y * width + x) as usize;
            if x < land {
                layers.distance_to_coast[i] = 0.0;
                continue;
            }
            let offshore = (x - land + 1) as f64;
            layers.depth[i] = 5.0 + offshore * 0.5;
            layers.distance_to_coast[i] = offshore * 400.0;
            let n = cell_noise(seed, i);
            if n < 0.2 {
                layers.food_probability[i] = 0.2 + n * 4.0;
                food[i] = layers.food_probability[i];
            }
            layers.max_ent[0][i] = 0.5 + cell_noise(seed ^ 0x9e37_79b9, i);
        }
    }
    layers.initial_food = Some(food);
    layers
}

fn profile(width: u32, height: u32, animals: usize, seed: u64) -> WorldConfig {
    // Layers built above always have matching shapes.
    let landscape = match GridLandscape::from_layers(coastal_sea(width, height, seed)) {
        Ok(l) => l,
        Err(e) => panic!("benchmark landscape is malformed: {e}"),
    };
    let mut config = WorldConfig::new(landscape);
    config.seed = seed;
    config.initial_population = animals;
    let (w, h) = (width as f64, height as f64);
    config.fixed_sources.push(FixedSource::turbine(
        SourceId(0),
        Vec2::new(w * 0.6, h * 0.5),
        200.0,
        TickId(0),
        TickId(u64::MAX),
    ));
    config.ships.push(ShipSpec {
        id: SourceId(1),
        class: VesselClass::Containership,
        length_m: 300.0,
        route: vec![
            Waypoint {
                position: Vec2::new(w * 0.2, 1.0),
                speed_knots: 16.0,
                pause_ticks: 0,
            },
            Waypoint {
                position: Vec2::new(w * 0.9, h - 1.0),
                speed_knots: 16.0,
                pause_ticks: 0,
            },
        ],
        start: TickId(0),
        band_khz: 0.125,
    });
    config
}

/// 100x100 sea with 200 animals, one turbine and one ship.
pub fn reference_profile(seed: u64) -> WorldConfig {
    profile(100, 100, 200, seed)
}

/// 316x316 sea with 2,000 animals, one turbine and one ship.
pub fn stress_profile(seed: u64) -> WorldConfig {
    profile(316, 316, 2_000, seed)
}
