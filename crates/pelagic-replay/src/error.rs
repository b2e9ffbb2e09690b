//! Error types for the replay system.

use std::fmt;
use std::io;

use pelagic_core::Draw;

/// Errors that can occur during recording, playback, or trajectory I/O.
#[derive(Debug)]
pub enum ReplayError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// A line could not be parsed.
    Malformed {
        /// 1-based line number.
        line: usize,
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A draw name is not one of the known draws.
    UnknownDraw {
        /// 1-based line number.
        line: usize,
        /// The unrecognised name.
        name: String,
    },
    /// The simulation asked for a different draw than the one recorded.
    DrawMismatch {
        /// 0-based index of the draw in the recording.
        index: usize,
        /// Draw found in the recording.
        recorded: Draw,
        /// Draw the simulation asked for.
        requested: Draw,
    },
    /// A recorded integer lies outside the requested range.
    OutOfRange {
        /// 0-based index of the draw in the recording.
        index: usize,
        /// The recorded value.
        value: f64,
        /// Requested lower bound (inclusive).
        lo: i64,
        /// Requested upper bound (exclusive).
        hi: i64,
    },
    /// The simulation asked for more draws than were recorded.
    Exhausted {
        /// Draws consumed before running out.
        consumed: usize,
        /// The draw that could not be served.
        requested: Draw,
    },
    /// The run finished with recorded draws left over.
    Unconsumed {
        /// Draws left.
        remaining: usize,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Malformed { line, detail } => write!(f, "line {line}: {detail}"),
            Self::UnknownDraw { line, name } => write!(f, "line {line}: unknown draw '{name}'"),
            Self::DrawMismatch {
                index,
                recorded,
                requested,
            } => write!(
                f,
                "draw {index}: recorded {} but {} was requested",
                recorded.name(),
                requested.name()
            ),
            Self::OutOfRange { index, value, lo, hi } => {
                write!(f, "draw {index}: value {value} outside {lo}..{hi}")
            }
            Self::Exhausted { consumed, requested } => write!(
                f,
                "recording exhausted after {consumed} draws, {} requested",
                requested.name()
            ),
            Self::Unconsumed { remaining } => {
                write!(f, "{remaining} recorded draws were never requested")
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
