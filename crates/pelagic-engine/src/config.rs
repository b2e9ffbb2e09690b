//! World configuration, validation, and error types.
//!
//! [`WorldConfig`] is the builder-input for constructing a
//! [`World`](crate::World). It bundles the immutable behaviour parameters
//! with everything the run operates on: the landscape, the border policy
//! of the field, the noise sources, the seed and the initial population.
//! [`validate()`](WorldConfig::validate) checks structural invariants at
//! startup; `World::new` calls it before building anything.

use std::error::Error;
use std::fmt;

use pelagic_agent::{FixedSource, ShipSpec, SourceError};
use pelagic_core::{ConfigError as ParameterError, SimulationConfig};
use pelagic_space::{EdgeBehavior, GridLandscape, SpaceError};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a [`WorldConfig`] or building a world
/// from it.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Behaviour parameters failed validation.
    Parameters(ParameterError),
    /// The field or spatial index could not be built.
    Space(SpaceError),
    /// A ship route is malformed.
    Source(SourceError),
    /// Animals were requested but no cell can host them.
    NoSeedCells {
        /// Requested initial population.
        requested: usize,
    },
    /// `max_initial_age` is NaN, infinite or negative.
    InvalidInitialAge {
        /// The invalid value.
        value: f64,
    },
    /// A fixed source sits outside the landscape.
    SourceOutOfBounds {
        /// Index into `fixed_sources`.
        index: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameters(e) => write!(f, "parameters: {e}"),
            Self::Space(e) => write!(f, "space: {e}"),
            Self::Source(e) => write!(f, "source: {e}"),
            Self::NoSeedCells { requested } => {
                write!(f, "{requested} animals requested but no water cell bears food")
            }
            Self::InvalidInitialAge { value } => {
                write!(f, "max_initial_age must be finite and >= 0, got {value}")
            }
            Self::SourceOutOfBounds { index } => {
                write!(f, "fixed source {index} lies outside the landscape")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parameters(e) => Some(e),
            Self::Space(e) => Some(e),
            Self::Source(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParameterError> for ConfigError {
    fn from(e: ParameterError) -> Self {
        Self::Parameters(e)
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<SourceError> for ConfigError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

// ── WorldConfig ────────────────────────────────────────────────────

/// Complete description of a simulation run.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Behaviour parameters.
    pub simulation: SimulationConfig,
    /// Raster layers; the world takes ownership.
    pub landscape: GridLandscape,
    /// Border policy along x.
    pub x_edge: EdgeBehavior,
    /// Border policy along y.
    pub y_edge: EdgeBehavior,
    /// Ships, built at startup.
    pub ships: Vec<ShipSpec>,
    /// Turbines and other stationary sources.
    pub fixed_sources: Vec<FixedSource>,
    /// Seed of the default random source.
    pub seed: u64,
    /// Animals placed at startup.
    pub initial_population: usize,
    /// Seeded animals are aged uniformly in `[0, max_initial_age)` years.
    pub max_initial_age: f64,
}

impl WorldConfig {
    /// A run over `landscape` with default parameters, bounce borders,
    /// no sources and no animals.
    pub fn new(landscape: GridLandscape) -> Self {
        Self {
            simulation: SimulationConfig::default(),
            landscape,
            x_edge: EdgeBehavior::Bounce,
            y_edge: EdgeBehavior::Bounce,
            ships: Vec::new(),
            fixed_sources: Vec::new(),
            seed: 0,
            initial_population: 0,
            max_initial_age: 10.0,
        }
    }

    /// Check structural invariants.
    ///
    /// Ship routes are checked when the world builds them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        use pelagic_core::Landscape;

        self.simulation.validate()?;
        if !(self.max_initial_age.is_finite() && self.max_initial_age >= 0.0) {
            return Err(ConfigError::InvalidInitialAge {
                value: self.max_initial_age,
            });
        }
        let (w, h) = (
            f64::from(self.landscape.width()),
            f64::from(self.landscape.height()),
        );
        for (index, s) in self.fixed_sources.iter().enumerate() {
            let p = s.location();
            if !(p.x >= 0.0 && p.y >= 0.0 && p.x < w && p.y < h) {
                return Err(ConfigError::SourceOutOfBounds { index });
            }
        }
        if self.initial_population > 0 && self.landscape.food_cells().next().is_none() {
            return Err(ConfigError::NoSeedCells {
                requested: self.initial_population,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pelagic_core::{SourceId, TickId, Vec2};
    use pelagic_test_utils::fixtures::{food_stripe, open_water};

    #[test]
    fn default_world_validates() {
        WorldConfig::new(open_water(10, 10, 20.0)).validate().unwrap();
    }

    #[test]
    fn population_needs_food_cells() {
        let mut c = WorldConfig::new(open_water(10, 10, 20.0));
        c.initial_population = 5;
        assert_eq!(c.validate(), Err(ConfigError::NoSeedCells { requested: 5 }));
        c.landscape = food_stripe(10, 10, 3, 0.5);
        c.validate().unwrap();
    }

    #[test]
    fn rejects_bad_parameters_and_ages() {
        let mut c = WorldConfig::new(open_water(10, 10, 20.0));
        c.simulation.cell_size_m = -1.0;
        assert!(matches!(c.validate(), Err(ConfigError::Parameters(_))));
        c.simulation.cell_size_m = 400.0;
        c.max_initial_age = f64::NAN;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidInitialAge { .. })));
    }

    #[test]
    fn rejects_sources_off_the_map() {
        let mut c = WorldConfig::new(open_water(10, 10, 20.0));
        c.fixed_sources.push(FixedSource::turbine(
            SourceId(1),
            Vec2::new(12.0, 3.0),
            200.0,
            TickId(0),
            TickId(100),
        ));
        assert_eq!(c.validate(), Err(ConfigError::SourceOutOfBounds { index: 0 }));
    }

    #[test]
    fn error_chain_exposes_source() {
        let e = ConfigError::from(SpaceError::EmptySpace);
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("space: "));
    }
}
