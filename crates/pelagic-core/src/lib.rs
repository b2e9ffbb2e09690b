//! Core types and traits for the pelagic simulation engine.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! vocabulary shared by every other crate in the workspace: identifiers,
//! planar geometry and heading arithmetic, the tick calendar, the
//! [`Landscape`] and [`RandomSource`] collaborator traits, the bounded
//! [`RingBuffer`], and the immutable [`SimulationConfig`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod landscape;
pub mod random;
pub mod ring;
pub mod traits;

pub use clock::{Clock, TICKS_PER_DAY, TICKS_PER_YEAR};
pub use config::{ConfigError, NormalParams, SimulationConfig};
pub use error::StepError;
pub use geometry::{angle_difference, normalize_heading, Vec2};
pub use id::{AnimalId, Cell, SourceId, TickId};
pub use landscape::{is_valid, Landscape, NO_BLOCK, NO_DATA};
pub use random::{Draw, RandomSource, SeededRandom};
pub use ring::RingBuffer;
pub use traits::{Deterrable, Entity, NoiseSource};
