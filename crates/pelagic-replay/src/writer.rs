//! Recording source.
//!
//! [`RecordingRandom`] wraps another [`RandomSource`] and writes every
//! draw it serves to a sink, in the line format [`ReplayRandom`] reads.
//!
//! [`ReplayRandom`]: crate::ReplayRandom

use std::io::{self, Write};

use pelagic_core::{Draw, RandomSource};

use crate::error::ReplayError;

/// Records every draw of an inner source.
///
/// Values are written with Rust's shortest round-trip formatting, so a
/// replay reproduces them bit for bit. Write errors are kept and
/// reported by [`finish()`](RecordingRandom::finish); after the first one
/// nothing more is written but draws keep flowing.
pub struct RecordingRandom<R, W: Write> {
    inner: R,
    sink: W,
    written: usize,
    error: Option<io::Error>,
}

impl<R: RandomSource, W: Write> RecordingRandom<R, W> {
    /// Record draws of `inner` into `sink`.
    pub fn new(inner: R, sink: W) -> Self {
        Self {
            inner,
            sink,
            written: 0,
            error: None,
        }
    }

    /// Write a `#` comment line, e.g. the scenario and seed.
    pub fn comment(&mut self, text: &str) {
        if self.error.is_none() {
            if let Err(e) = writeln!(self.sink, "# {text}") {
                self.error = Some(e);
            }
        }
    }

    /// Draws recorded so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush the sink and hand back the inner source and the sink.
    pub fn finish(mut self) -> Result<(R, W), ReplayError> {
        if let Some(e) = self.error.take() {
            return Err(e.into());
        }
        self.sink.flush()?;
        Ok((self.inner, self.sink))
    }

    fn record(&mut self, draw: Draw, value: impl std::fmt::Display) {
        if self.error.is_some() {
            return;
        }
        match writeln!(self.sink, "{} {value}", draw.name()) {
            Ok(()) => self.written += 1,
            Err(e) => self.error = Some(e),
        }
    }
}

impl<R: RandomSource, W: Write> RandomSource for RecordingRandom<R, W> {
    fn uniform(&mut self) -> f64 {
        let v = self.inner.uniform();
        self.record(Draw::Uniform, v);
        v
    }

    fn int_range(&mut self, lo: i64, hi: i64) -> i64 {
        let v = self.inner.int_range(lo, hi);
        self.record(Draw::IntRange, v);
        v
    }

    fn normal(&mut self, draw: Draw, mean: f64, sd: f64) -> f64 {
        let v = self.inner.normal(draw, mean, sd);
        self.record(draw, v);
        v
    }

    fn plus_minus_one(&mut self) -> f64 {
        let v = self.inner.plus_minus_one();
        self.record(Draw::PlusMinusOne, v);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReplayRandom;
    use pelagic_core::SeededRandom;

    #[test]
    fn writes_one_line_per_draw() {
        let mut rec = RecordingRandom::new(SeededRandom::new(3), Vec::new());
        rec.comment("seed 3");
        rec.uniform();
        rec.int_range(5, 6);
        rec.normal(Draw::MatingDay, 225.0, 0.0);
        assert_eq!(rec.written(), 3);
        let (_, sink) = rec.finish().unwrap();
        let text = String::from_utf8(sink).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "# seed 3");
        assert!(lines[1].starts_with("uniform "));
        assert_eq!(lines[2], "int_range 5");
        assert_eq!(lines[3], "mating_day 225");
    }

    #[test]
    fn replay_reproduces_recorded_values_exactly() {
        let mut rec = RecordingRandom::new(SeededRandom::new(11), Vec::new());
        let values: Vec<f64> = (0..50)
            .map(|i| match i % 3 {
                0 => rec.uniform(),
                1 => rec.normal(Draw::CrwAngle, 0.0, 38.0),
                _ => rec.plus_minus_one(),
            })
            .collect();
        let (_, sink) = rec.finish().unwrap();

        let mut replay = ReplayRandom::open(sink.as_slice()).unwrap();
        for (i, v) in values.iter().enumerate() {
            let r = match i % 3 {
                0 => replay.uniform(),
                1 => replay.normal(Draw::CrwAngle, 0.0, 38.0),
                _ => replay.plus_minus_one(),
            };
            assert_eq!(r.to_bits(), v.to_bits());
        }
        assert_eq!(replay.finish().unwrap(), 50);
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("full"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_surface_at_finish() {
        let mut rec = RecordingRandom::new(SeededRandom::new(1), Broken);
        let a = rec.uniform();
        assert!((0.0..1.0).contains(&a));
        assert_eq!(rec.written(), 0);
        assert!(matches!(rec.finish(), Err(ReplayError::Io(_))));
    }
}
