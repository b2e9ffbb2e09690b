//! Pelagic: an individual-based simulation of marine mammal movement,
//! energetics and responses to underwater noise.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all pelagic sub-crates. For most users, adding `pelagic` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use pelagic::prelude::*;
//! use pelagic::space::LandscapeLayers;
//!
//! // A 30x30 sea, 20 m deep, with food on every cell of row 15.
//! let mut layers = LandscapeLayers::filled(30, 30, 20.0);
//! for x in 0..30 {
//!     layers.food_probability[15 * 30 + x] = 0.5;
//! }
//! let landscape = GridLandscape::from_layers(layers).unwrap();
//!
//! let mut config = WorldConfig::new(landscape);
//! config.seed = 42;
//! config.initial_population = 10;
//!
//! let mut world = World::new(config).unwrap();
//! world.run(48).unwrap();
//! assert_eq!(world.tick(), TickId(48));
//! assert_eq!(world.reports().len(), 1);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `pelagic-core` | IDs, geometry, calendar, configuration, collaborator traits |
//! | [`space`] | `pelagic-space` | Field geometry, spatial index, raster landscape |
//! | [`food`] | `pelagic-food` | Daily logistic food regrowth |
//! | [`agent`] | `pelagic-agent` | Animal behaviour: movement, memory, dispersal, deterrence, energetics |
//! | [`engine`] | `pelagic-engine` | World, scheduler, population bookkeeping |
//! | [`replay`] | `pelagic-replay` | Draw recording and replay, trajectory comparison |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`pelagic-core`).
///
/// Contains the tick calendar, planar geometry, the immutable
/// [`types::SimulationConfig`], and the collaborator traits
/// ([`types::Landscape`], [`types::RandomSource`]).
pub use pelagic_core as types;

/// Spatial structures (`pelagic-space`).
///
/// [`space::SpatialField`] for borders and distances,
/// [`space::SpatialIndex`] for neighbour queries, and
/// [`space::GridLandscape`] for raster layers.
pub use pelagic_space as space;

/// Food regrowth (`pelagic-food`).
pub use pelagic_food as food;

/// Animal behaviour (`pelagic-agent`).
///
/// [`agent::Animal`] and the models it composes.
pub use pelagic_agent as agent;

/// Simulation engine (`pelagic-engine`).
///
/// [`engine::World`] runs the [`engine::Scheduler`] one tick at a time.
pub use pelagic_engine as engine;

/// Deterministic replay (`pelagic-replay`).
///
/// Record draws with [`replay::RecordingRandom`], serve them back with
/// [`replay::ReplayRandom`], and compare runs with
/// [`replay::compare_trajectories`].
pub use pelagic_replay as replay;

/// Common imports for typical pelagic usage.
///
/// ```rust
/// use pelagic::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use pelagic_core::{
        AnimalId, Cell, Draw, Landscape, RandomSource, SeededRandom, SimulationConfig, SourceId,
        TickId, Vec2,
    };

    // Errors
    pub use pelagic_core::StepError;
    pub use pelagic_engine::ConfigError;

    // Space
    pub use pelagic_space::{EdgeBehavior, GridLandscape, SpatialField};

    // Agents and sources
    pub use pelagic_agent::{Animal, AnimalTraits, FixedSource, ShipSpec, VesselClass, Waypoint};

    // Engine
    pub use pelagic_engine::{
        PopulationReport, Scheduler, StepMetrics, Task, World, WorldConfig, WorldState,
    };
}
