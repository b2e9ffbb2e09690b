//! Error types for spatial construction and raster loading.

use std::fmt;

/// Errors arising from field or index construction.
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceError {
    /// Attempted to construct a field with zero cells.
    EmptySpace,
    /// A dimension does not fit the coordinate type.
    DimensionTooLarge {
        /// Which dimension.
        name: &'static str,
        /// The offending value.
        value: u32,
        /// Largest accepted value.
        max: u32,
    },
    /// Bucket size must be finite and positive.
    InvalidBucketSize {
        /// The rejected size.
        size: f64,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySpace => write!(f, "space must have at least one cell"),
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} = {value} exceeds maximum {max}")
            }
            Self::InvalidBucketSize { size } => {
                write!(f, "bucket size must be finite and > 0, got {size}")
            }
        }
    }
}

impl std::error::Error for SpaceError {}

/// Errors arising from assembling a [`GridLandscape`](crate::GridLandscape).
#[derive(Debug, Clone, PartialEq)]
pub enum LandscapeError {
    /// The raster extent itself is invalid.
    Space(SpaceError),
    /// A layer does not have `width * height` values.
    LayerSizeMismatch {
        /// Layer name.
        layer: &'static str,
        /// Expected number of values.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
    /// Habitat suitability must come as one raster or one per quarter.
    InvalidQuarterCount {
        /// Number of rasters supplied.
        count: usize,
    },
    /// A food probability outside `[0, 1]`.
    InvalidFoodProbability {
        /// Flat cell index.
        index: usize,
        /// The offending value.
        value: f64,
    },
}

impl fmt::Display for LandscapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Space(e) => write!(f, "invalid raster extent: {e}"),
            Self::LayerSizeMismatch {
                layer,
                expected,
                actual,
            } => write!(
                f,
                "layer '{layer}' has {actual} values, expected {expected}"
            ),
            Self::InvalidQuarterCount { count } => write!(
                f,
                "expected 1 or 4 habitat suitability rasters, got {count}"
            ),
            Self::InvalidFoodProbability { index, value } => {
                write!(f, "food probability {value} at cell {index} is outside [0, 1]")
            }
        }
    }
}

impl std::error::Error for LandscapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Space(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SpaceError> for LandscapeError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}
