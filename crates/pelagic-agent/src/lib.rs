//! Animal behaviour for the pelagic simulation engine.
//!
//! An [`Animal`] moves by a correlated random walk that avoids land and is
//! pulled towards remembered food ([`movement`], [`attraction`]), switches
//! to long-range [`dispersal`] when its energy keeps falling, is pushed
//! away from ships and fixed noise sources ([`deterrence`]), and eats,
//! ages, reproduces and dies ([`energetics`]). All collaborators are
//! reached through a [`StepContext`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod animal;
pub mod attraction;
pub mod context;
pub mod deterrence;
pub mod diagnostics;
pub mod dispersal;
pub mod energetics;
pub mod memory;
pub mod movement;

pub use animal::{Animal, AnimalTraits, DailyReport, Offspring, TickOutcome};
pub use attraction::ReferenceMemory;
pub use context::StepContext;
pub use deterrence::sources::{FixedSource, FixedSourceKind, Ship, ShipSpec, SourceError, VesselClass, Waypoint};
pub use deterrence::DeterrenceState;
pub use diagnostics::Diagnostics;
pub use dispersal::{Dispersal, DisperseOutcome};
pub use energetics::{DeathCause, Energetics, PregnancyStatus};
pub use memory::{MemoryCell, PersistentSpatialMemory};
pub use movement::{CrwState, MovementModel};
