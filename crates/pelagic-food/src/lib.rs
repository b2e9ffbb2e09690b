//! Daily regrowth of food patches.
//!
//! The only parallel region of a tick. [`FoodGrowthEngine::grow`] splits
//! the landscape's compact patch storage into fixed-size chunks, grows
//! each chunk on the rayon pool, and returns after every chunk has
//! joined. Callers run it before any animal eats in the same tick.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod growth;

pub use growth::{logistic_step, FoodGrowthEngine, GrowthSummary, EXTRA_ITERATIONS};
