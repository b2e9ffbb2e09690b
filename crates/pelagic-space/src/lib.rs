//! Spatial structures for pelagic simulations.
//!
//! - [`SpatialField`]: the continuous plane animals move on, with a
//!   per-axis [`EdgeBehavior`] (bounce or wrap).
//! - [`SpatialIndex`]: bucketed animal lookup for neighbourhood and radius
//!   queries.
//! - [`GridLandscape`]: in-memory raster layers implementing
//!   [`pelagic_core::Landscape`], with food kept in compact
//!   [`FoodPatch`] storage for the parallel regrowth pass.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod edge;
pub mod error;
pub mod field;
pub mod index;
pub mod raster;

pub use edge::EdgeBehavior;
pub use error::{LandscapeError, SpaceError};
pub use field::SpatialField;
pub use index::{Bucket, SpatialIndex};
pub use raster::{FoodParts, FoodPatch, GridLandscape, LandscapeLayers};
