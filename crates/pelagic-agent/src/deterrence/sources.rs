//! Noise sources: ships following routes and stationary sources.

use crate::deterrence::acoustics::ship_source_level;
use pelagic_core::{Entity, NoiseSource, SourceId, TickId, Vec2};
use std::fmt;

/// Metres per second in one knot.
pub const KNOT_M_PER_S: f64 = 0.514_444;
/// Seconds in one tick.
pub const TICK_SECONDS: f64 = 1800.0;

// ── VesselClass ────────────────────────────────────────────────────

/// Vessel categories with their reference speeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VesselClass {
    /// Fishing vessels.
    Fishing,
    /// Tugs.
    Tug,
    /// Naval vessels.
    Naval,
    /// Recreational craft.
    Recreational,
    /// Research vessels.
    Research,
    /// Cruise ships.
    Cruise,
    /// Passenger ferries.
    Passenger,
    /// Bulk carriers.
    Bulker,
    /// Container ships.
    Containership,
    /// Vehicle carriers.
    VehicleCarrier,
    /// Tankers.
    Tanker,
    /// Dredgers.
    Dredger,
    /// Anything else.
    Other,
}

impl VesselClass {
    /// Reference speed (knots) of the source-level model.
    pub fn reference_speed_knots(self) -> f64 {
        match self {
            Self::Fishing => 6.4,
            Self::Tug => 3.7,
            Self::Naval => 11.1,
            Self::Recreational => 10.6,
            Self::Research => 8.0,
            Self::Cruise => 17.1,
            Self::Passenger => 9.7,
            Self::Bulker => 13.9,
            Self::Containership => 18.0,
            Self::VehicleCarrier => 15.8,
            Self::Tanker => 12.4,
            Self::Dredger => 9.5,
            Self::Other => 7.4,
        }
    }
}

// ── SourceError ────────────────────────────────────────────────────

/// Errors constructing a noise source.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceError {
    /// A route needs at least two waypoints.
    RouteTooShort {
        /// Source id.
        source: SourceId,
        /// Waypoints supplied.
        waypoints: usize,
    },
    /// A leg speed is not finite and positive.
    InvalidSpeed {
        /// Source id.
        source: SourceId,
        /// Index of the offending waypoint.
        waypoint: usize,
        /// The speed.
        speed_knots: f64,
    },
    /// Vessel length must be finite and positive.
    InvalidLength {
        /// Source id.
        source: SourceId,
        /// The length.
        length_m: f64,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RouteTooShort { source, waypoints } => {
                write!(f, "ship {source}: route needs at least 2 waypoints, got {waypoints}")
            }
            Self::InvalidSpeed {
                source,
                waypoint,
                speed_knots,
            } => write!(
                f,
                "ship {source}: leg from waypoint {waypoint} has invalid speed {speed_knots} kn"
            ),
            Self::InvalidLength { source, length_m } => {
                write!(f, "ship {source}: invalid length {length_m} m")
            }
        }
    }
}

impl std::error::Error for SourceError {}

// ── Ship ───────────────────────────────────────────────────────────

/// A route point. The ship pauses here, then leaves at `speed_knots`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    /// Position in grid units.
    pub position: Vec2,
    /// Speed of the leg leaving this waypoint (ignored on the last one).
    pub speed_knots: f64,
    /// Ticks spent stationary here before departing.
    pub pause_ticks: u32,
}

/// Construction parameters of a [`Ship`].
#[derive(Clone, Debug)]
pub struct ShipSpec {
    /// Source id.
    pub id: SourceId,
    /// Vessel class.
    pub class: VesselClass,
    /// Length overall (m).
    pub length_m: f64,
    /// Route, visited in order.
    pub route: Vec<Waypoint>,
    /// Tick at which the ship sets off from the first waypoint.
    pub start: TickId,
    /// Band centre frequency of its source level (kHz).
    pub band_khz: f64,
}

#[derive(Clone, Copy, Debug)]
enum Segment {
    Pause { at: Vec2, ticks: f64 },
    Leg { from: Vec2, to: Vec2, ticks: f64, speed_knots: f64 },
}

impl Segment {
    fn ticks(&self) -> f64 {
        match self {
            Segment::Pause { ticks, .. } | Segment::Leg { ticks, .. } => *ticks,
        }
    }
}

/// Where a ship is at some instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShipState {
    /// Position in grid units.
    pub position: Vec2,
    /// Speed over ground (knots); zero while paused.
    pub speed_knots: f64,
}

/// A vessel travelling a fixed route once.
#[derive(Clone, Debug)]
pub struct Ship {
    entity: Entity<SourceId>,
    class: VesselClass,
    length_m: f64,
    start: TickId,
    band_khz: f64,
    segments: Vec<Segment>,
    duration: f64,
}

impl Ship {
    /// Build a ship, precomputing the timing of each route segment.
    pub fn new(spec: ShipSpec, cell_size_m: f64) -> Result<Self, SourceError> {
        if spec.route.len() < 2 {
            return Err(SourceError::RouteTooShort {
                source: spec.id,
                waypoints: spec.route.len(),
            });
        }
        if !(spec.length_m.is_finite() && spec.length_m > 0.0) {
            return Err(SourceError::InvalidLength {
                source: spec.id,
                length_m: spec.length_m,
            });
        }
        let mut segments = Vec::with_capacity(spec.route.len() * 2);
        for (i, pair) in spec.route.windows(2).enumerate() {
            let (a, b) = (pair[0], pair[1]);
            if !(a.speed_knots.is_finite() && a.speed_knots > 0.0) {
                return Err(SourceError::InvalidSpeed {
                    source: spec.id,
                    waypoint: i,
                    speed_knots: a.speed_knots,
                });
            }
            if a.pause_ticks > 0 {
                segments.push(Segment::Pause {
                    at: a.position,
                    ticks: a.pause_ticks as f64,
                });
            }
            let metres = a.position.distance(b.position) * cell_size_m;
            let ticks = metres / (a.speed_knots * KNOT_M_PER_S) / TICK_SECONDS;
            segments.push(Segment::Leg {
                from: a.position,
                to: b.position,
                ticks,
                speed_knots: a.speed_knots,
            });
        }
        let duration = segments.iter().map(Segment::ticks).sum();
        let first = spec.route[0].position;
        Ok(Self {
            entity: Entity::new(spec.id, first, 0.0),
            class: spec.class,
            length_m: spec.length_m,
            start: spec.start,
            band_khz: spec.band_khz,
            segments,
            duration,
        })
    }

    /// Vessel class.
    pub fn class(&self) -> VesselClass {
        self.class
    }

    /// Length overall (m).
    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    /// Ticks from departure to arrival at the last waypoint.
    pub fn duration_ticks(&self) -> f64 {
        self.duration
    }

    /// Position and speed at a fractional tick, or `None` outside the
    /// voyage.
    pub fn state_at(&self, tick: f64) -> Option<ShipState> {
        let mut t = tick - self.start.0 as f64;
        if t < 0.0 || t > self.duration {
            return None;
        }
        for seg in &self.segments {
            let len = seg.ticks();
            if t <= len {
                return Some(match *seg {
                    Segment::Pause { at, .. } => ShipState {
                        position: at,
                        speed_knots: 0.0,
                    },
                    Segment::Leg {
                        from,
                        to,
                        ticks,
                        speed_knots,
                    } => {
                        let frac = if ticks > 0.0 { t / ticks } else { 1.0 };
                        ShipState {
                            position: from + (to - from) * frac,
                            speed_knots,
                        }
                    }
                });
            }
            t -= len;
        }
        None
    }

    /// Move the embedded entity to its position at `tick`.
    pub fn advance(&mut self, tick: TickId) {
        if let Some(s) = self.state_at(tick.0 as f64) {
            self.entity.face(s.position);
            self.entity.position = s.position;
        }
    }

    /// Heading of the last [`advance`](Self::advance).
    pub fn heading(&self) -> f64 {
        self.entity.heading()
    }

    /// Source level at a given speed.
    pub fn source_level_at_speed(&self, speed_knots: f64) -> Option<f64> {
        ship_source_level(self.class, speed_knots, self.length_m, self.band_khz)
    }
}

impl NoiseSource for Ship {
    fn source_id(&self) -> SourceId {
        self.entity.id
    }

    fn is_active(&self, tick: TickId) -> bool {
        self.state_at(tick.0 as f64)
            .is_some_and(|s| s.speed_knots > 0.0)
    }

    fn position(&self, tick: TickId) -> Option<Vec2> {
        self.state_at(tick.0 as f64).map(|s| s.position)
    }

    fn source_level(&self, tick: TickId) -> f64 {
        self.state_at(tick.0 as f64)
            .and_then(|s| self.source_level_at_speed(s.speed_knots))
            .unwrap_or(0.0)
    }
}

// ── FixedSource ────────────────────────────────────────────────────

/// What a stationary source is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FixedSourceKind {
    /// Wind turbine construction or operation.
    Turbine,
    /// Any other stationary source.
    Generic,
}

/// A stationary source with a constant impact over an active window.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedSource {
    entity: Entity<SourceId>,
    kind: FixedSourceKind,
    impact: f64,
    active_from: TickId,
    active_until: TickId,
}

impl FixedSource {
    /// A source active on ticks `active_from..=active_until`.
    pub fn new(
        id: SourceId,
        kind: FixedSourceKind,
        position: Vec2,
        impact: f64,
        active_from: TickId,
        active_until: TickId,
    ) -> Self {
        Self {
            entity: Entity::new(id, position, 0.0),
            kind,
            impact,
            active_from,
            active_until,
        }
    }

    /// A turbine.
    pub fn turbine(id: SourceId, position: Vec2, impact: f64, active_from: TickId, active_until: TickId) -> Self {
        Self::new(id, FixedSourceKind::Turbine, position, impact, active_from, active_until)
    }

    /// Kind of source.
    pub fn kind(&self) -> FixedSourceKind {
        self.kind
    }

    /// Source level (dB re 1 uPa @ 1 m).
    pub fn impact(&self) -> f64 {
        self.impact
    }

    /// Where the source stands, active or not.
    pub fn location(&self) -> Vec2 {
        self.entity.position
    }
}

impl NoiseSource for FixedSource {
    fn source_id(&self) -> SourceId {
        self.entity.id
    }

    fn is_active(&self, tick: TickId) -> bool {
        tick >= self.active_from && tick <= self.active_until
    }

    fn position(&self, tick: TickId) -> Option<Vec2> {
        self.is_active(tick).then_some(self.entity.position)
    }

    fn source_level(&self, _tick: TickId) -> f64 {
        self.impact
    }
}
