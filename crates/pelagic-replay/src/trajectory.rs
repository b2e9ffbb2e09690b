//! Trajectory text codec.
//!
//! A trajectory file holds one [`TrajectoryPoint`] per line as six
//! whitespace-separated fields:
//!
//! ```text
//! # tick id x y heading energy
//! 0 0 10.168966281542922 10.004290402368964 88.54545454545455 9.9955
//! ```
//!
//! `tick` is the tick that had just completed when the point was taken.

use std::io::{BufRead, Write};

use crate::error::ReplayError;

/// The observable state of one animal after one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectoryPoint {
    /// Completed tick.
    pub tick: u64,
    /// Animal id.
    pub id: u64,
    /// Position, x (grid units).
    pub x: f64,
    /// Position, y (grid units).
    pub y: f64,
    /// Heading (degrees).
    pub heading: f64,
    /// Energy.
    pub energy: f64,
}

impl TrajectoryPoint {
    fn parse(line_no: usize, line: &str) -> Result<Self, ReplayError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let &[tick, id, x, y, heading, energy] = fields.as_slice() else {
            return Err(ReplayError::Malformed {
                line: line_no,
                detail: format!("expected 6 fields, got {}", fields.len()),
            });
        };
        let int = |s: &str| {
            s.parse::<u64>().map_err(|e| ReplayError::Malformed {
                line: line_no,
                detail: format!("bad integer '{s}': {e}"),
            })
        };
        let float = |s: &str| {
            s.parse::<f64>().map_err(|e| ReplayError::Malformed {
                line: line_no,
                detail: format!("bad number '{s}': {e}"),
            })
        };
        Ok(Self {
            tick: int(tick)?,
            id: int(id)?,
            x: float(x)?,
            y: float(y)?,
            heading: float(heading)?,
            energy: float(energy)?,
        })
    }
}

/// An ordered list of trajectory points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    /// An empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point.
    pub fn push(&mut self, point: TrajectoryPoint) {
        self.points.push(point);
    }

    /// Points in recording order.
    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Read a trajectory, skipping blank and `#` lines.
    pub fn read<R: BufRead>(reader: R) -> Result<Self, ReplayError> {
        let mut t = Self::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            t.push(TrajectoryPoint::parse(i + 1, trimmed)?);
        }
        Ok(t)
    }

    /// Parse a trajectory held in memory.
    pub fn parse(text: &str) -> Result<Self, ReplayError> {
        Self::read(text.as_bytes())
    }

    /// Write the trajectory with a header line.
    pub fn write<W: Write>(&self, mut sink: W) -> Result<(), ReplayError> {
        writeln!(sink, "# tick id x y heading energy")?;
        for p in &self.points {
            writeln!(sink, "{} {} {} {} {} {}", p.tick, p.id, p.x, p.y, p.heading, p.energy)?;
        }
        sink.flush()?;
        Ok(())
    }
}

impl FromIterator<TrajectoryPoint> for Trajectory {
    fn from_iter<I: IntoIterator<Item = TrajectoryPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl Extend<TrajectoryPoint> for Trajectory {
    fn extend<I: IntoIterator<Item = TrajectoryPoint>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}
