//! Replay playback source.
//!
//! [`ReplayRandom`] serves recorded draws back in call order. The file
//! format is one draw per line:
//!
//! ```text
//! # comment
//! crw_angle 10
//! crw_turn_with_step 96
//! uniform 0.5
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::io::BufRead;

use pelagic_core::{Draw, RandomSource};

use crate::error::ReplayError;

/// Parse one non-comment line into a draw.
pub(crate) fn parse_line(line_no: usize, line: &str) -> Result<Option<(Draw, f64)>, ReplayError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut parts = line.split_whitespace();
    let (Some(name), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ReplayError::Malformed {
            line: line_no,
            detail: format!("expected '<draw> <value>', got '{line}'"),
        });
    };
    let draw = Draw::from_name(name).ok_or_else(|| ReplayError::UnknownDraw {
        line: line_no,
        name: name.to_string(),
    })?;
    let value = value.parse::<f64>().map_err(|e| ReplayError::Malformed {
        line: line_no,
        detail: format!("bad value '{value}': {e}"),
    })?;
    Ok(Some((draw, value)))
}

/// A [`RandomSource`] that hands back recorded draws in order.
///
/// The trait cannot fail, so the first problem (a draw of the wrong kind,
/// an out-of-range integer, running out of values) is kept as a sticky
/// error. From then on every request returns a neutral value: `0.0` for
/// uniforms, `lo` for integer ranges, the mean for normals and `1.0` for
/// signs. Call [`finish()`](ReplayRandom::finish) after the run to surface
/// it.
#[derive(Debug)]
pub struct ReplayRandom {
    draws: Vec<(Draw, f64)>,
    next: usize,
    error: Option<ReplayError>,
}

impl ReplayRandom {
    /// Read a recording from any buffered source.
    pub fn open<R: BufRead>(reader: R) -> Result<Self, ReplayError> {
        let mut draws = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            if let Some(d) = parse_line(i + 1, &line?)? {
                draws.push(d);
            }
        }
        Ok(Self::from_draws(draws))
    }

    /// Parse a recording held in memory.
    pub fn parse(text: &str) -> Result<Self, ReplayError> {
        Self::open(text.as_bytes())
    }

    /// Replay an explicit list of draws.
    pub fn from_draws(draws: Vec<(Draw, f64)>) -> Self {
        Self {
            draws,
            next: 0,
            error: None,
        }
    }

    /// Draws served so far.
    pub fn consumed(&self) -> usize {
        self.next
    }

    /// Draws not yet served.
    pub fn remaining(&self) -> usize {
        self.draws.len() - self.next
    }

    /// The sticky error, if one occurred.
    pub fn error(&self) -> Option<&ReplayError> {
        self.error.as_ref()
    }

    /// End the replay. Fails with the sticky error, or with
    /// [`ReplayError::Unconsumed`] if draws are left; otherwise returns the
    /// number of draws served.
    pub fn finish(self) -> Result<usize, ReplayError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let remaining = self.draws.len() - self.next;
        if remaining > 0 {
            return Err(ReplayError::Unconsumed { remaining });
        }
        Ok(self.next)
    }

    fn take(&mut self, requested: Draw) -> Option<f64> {
        if self.error.is_some() {
            return None;
        }
        let Some(&(recorded, value)) = self.draws.get(self.next) else {
            self.error = Some(ReplayError::Exhausted {
                consumed: self.next,
                requested,
            });
            return None;
        };
        if recorded != requested {
            self.error = Some(ReplayError::DrawMismatch {
                index: self.next,
                recorded,
                requested,
            });
            return None;
        }
        self.next += 1;
        Some(value)
    }
}

impl RandomSource for ReplayRandom {
    fn uniform(&mut self) -> f64 {
        self.take(Draw::Uniform).unwrap_or(0.0)
    }

    fn int_range(&mut self, lo: i64, hi: i64) -> i64 {
        let index = self.next;
        let Some(value) = self.take(Draw::IntRange) else {
            return lo;
        };
        let int = value as i64;
        let in_range = value.fract() == 0.0 && ((hi <= lo && int == lo) || (lo..hi).contains(&int));
        if !in_range {
            self.error = Some(ReplayError::OutOfRange { index, value, lo, hi });
            return lo;
        }
        int
    }

    fn normal(&mut self, draw: Draw, mean: f64, _sd: f64) -> f64 {
        self.take(draw).unwrap_or(mean)
    }

    fn plus_minus_one(&mut self) -> f64 {
        self.take(Draw::PlusMinusOne).unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_draws_in_order() {
        let mut r = ReplayRandom::parse("# header\n\ncrw_angle 10\nuniform 0.5\nint_range 3\nplus_minus_one -1\n").unwrap();
        assert_eq!(r.remaining(), 4);
        assert_eq!(r.normal(Draw::CrwAngle, 0.0, 38.0), 10.0);
        assert_eq!(r.uniform(), 0.5);
        assert_eq!(r.int_range(0, 10), 3);
        assert_eq!(r.plus_minus_one(), -1.0);
        assert_eq!(r.finish().unwrap(), 4);
    }

    #[test]
    fn mismatch_is_sticky() {
        let mut r = ReplayRandom::parse("uniform 0.25\nuniform 0.75\n").unwrap();
        assert_eq!(r.normal(Draw::CrwStepLength, 0.42, 0.48), 0.42);
        // Later requests do not consume anything.
        assert_eq!(r.uniform(), 0.0);
        assert_eq!(r.consumed(), 0);
        assert!(matches!(
            r.finish(),
            Err(ReplayError::DrawMismatch {
                index: 0,
                recorded: Draw::Uniform,
                requested: Draw::CrwStepLength
            })
        ));
    }

    #[test]
    fn exhaustion_and_leftovers_fail_finish() {
        let mut r = ReplayRandom::parse("uniform 0.1\n").unwrap();
        r.uniform();
        r.uniform();
        assert!(matches!(r.finish(), Err(ReplayError::Exhausted { consumed: 1, .. })));

        let r = ReplayRandom::parse("uniform 0.1\n").unwrap();
        assert!(matches!(r.finish(), Err(ReplayError::Unconsumed { remaining: 1 })));
    }

    #[test]
    fn integer_out_of_range() {
        let mut r = ReplayRandom::parse("int_range 12\n").unwrap();
        assert_eq!(r.int_range(0, 10), 0);
        assert!(matches!(r.error(), Some(ReplayError::OutOfRange { value, .. }) if *value == 12.0));
    }

    #[test]
    fn parse_errors_carry_line_numbers() {
        let err = ReplayRandom::parse("uniform 0.1\nwobble 2\n").unwrap_err();
        assert!(matches!(err, ReplayError::UnknownDraw { line: 2, .. }));
        let err = ReplayRandom::parse("uniform\n").unwrap_err();
        assert!(matches!(err, ReplayError::Malformed { line: 1, .. }));
        let err = ReplayRandom::parse("uniform x\n").unwrap_err();
        assert!(matches!(err, ReplayError::Malformed { line: 1, .. }));
    }
}
