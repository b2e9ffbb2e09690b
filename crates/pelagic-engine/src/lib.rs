//! Simulation engine for the pelagic movement model.
//!
//! - [`World`]: builds the run from a [`WorldConfig`] and advances it one
//!   tick at a time.
//! - [`Scheduler`] and [`Task`]: the fixed, deterministic order of work
//!   within a tick (food growth, daily life, deterrence, movement,
//!   removal of the dead, reporting).
//! - [`Population`]: animals in id order plus their spatial index.
//! - [`StepMetrics`] and [`PopulationReport`]: what happened per tick and
//!   per day.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod metrics;
pub mod population;
pub mod report;
pub mod scheduler;
pub mod tasks;
pub mod world;

pub use config::{ConfigError, WorldConfig};
pub use context::SimulationContext;
pub use metrics::StepMetrics;
pub use population::{DeadMarker, Population};
pub use report::PopulationReport;
pub use scheduler::{Cadence, Scheduler, SchedulerError, Task};
pub use world::{World, WorldState};
