//! Deterministic replay for pelagic simulations.
//!
//! Every stochastic decision in a run goes through a named draw, so a run
//! is fully described by its configuration plus the sequence of draws it
//! consumed. This crate records and replays that sequence and compares
//! the resulting animal trajectories against golden files.
//!
//! # Architecture
//!
//! - [`RecordingRandom`] wraps a source and writes each draw to a sink
//! - [`ReplayRandom`] serves a recording back in call order
//! - [`Trajectory`] reads and writes per-tick animal states as text
//! - [`compare_trajectories`] matches points by tick and id within a
//!   tolerance
//!
//! # Format
//!
//! Both file kinds are line-oriented text with `#` comments:
//!
//! ```text
//! crw_angle 10            <draw name> <value>
//! 0 0 10.17 10.00 88.5 9.99   <tick> <id> <x> <y> <heading> <energy>
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod compare;
pub mod error;
pub mod reader;
pub mod trajectory;
pub mod writer;

pub use compare::{compare_trajectories, Divergence, DivergenceKind, DivergenceReport};
pub use error::ReplayError;
pub use reader::ReplayRandom;
pub use trajectory::{Trajectory, TrajectoryPoint};
pub use writer::RecordingRandom;
