//! The [`Task`] trait and the [`Scheduler`] that runs tasks each tick.
//!
//! Tasks are stateless operators over the [`WorldState`]. Each declares a
//! [`Cadence`] (which ticks it runs on) and a priority (lower runs
//! first). The scheduler fixes the order once at construction, so every
//! tick executes the same sequence and the stream of random draws only
//! depends on the seed.

use std::error::Error;
use std::fmt;
use std::time::Instant;

use indexmap::IndexSet;
use pelagic_core::{RandomSource, StepError, TickId};

use crate::metrics::StepMetrics;
use crate::tasks;
use crate::world::WorldState;

// ── Cadence ────────────────────────────────────────────────────────

/// Which ticks a task runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    /// Every tick.
    EveryTick,
    /// First tick of each day.
    DayStart,
    /// First tick of each quarter (days 0, 90, 180 and 270).
    QuarterStart,
}

impl Cadence {
    /// Whether a task with this cadence runs at `tick`.
    pub fn is_due(self, tick: TickId) -> bool {
        match self {
            Self::EveryTick => true,
            Self::DayStart => tick.is_day_start(),
            Self::QuarterStart => tick.is_day_start() && tick.day_of_year() % 90 == 0,
        }
    }
}

// ── Task ───────────────────────────────────────────────────────────

/// A stateless operator in the per-tick schedule.
///
/// # Contract
///
/// - `run()` MUST be deterministic given the state and the random source.
/// - `&self`: tasks are stateless; mutable state lives in the world.
/// - `name()`, `cadence()` and `priority()` are read once, at scheduler
///   construction.
///
/// # Examples
///
/// ```
/// use pelagic_core::{RandomSource, StepError};
/// use pelagic_engine::{Cadence, StepMetrics, Task, WorldState};
///
/// struct CountAnimals;
///
/// impl Task for CountAnimals {
///     fn name(&self) -> &str { "count" }
///     fn cadence(&self) -> Cadence { Cadence::DayStart }
///     fn priority(&self) -> i32 { 100 }
///     fn run(
///         &self,
///         state: &mut WorldState,
///         _rng: &mut dyn RandomSource,
///         _metrics: &mut StepMetrics,
///     ) -> Result<(), StepError> {
///         let _ = state.population().len();
///         Ok(())
///     }
/// }
///
/// assert_eq!(CountAnimals.name(), "count");
/// ```
pub trait Task {
    /// Human-readable name for error reporting and timings.
    fn name(&self) -> &str;

    /// Which ticks this task runs on.
    fn cadence(&self) -> Cadence;

    /// Position in the schedule; lower runs first, ties keep insertion order.
    fn priority(&self) -> i32;

    /// Execute the task for the current tick.
    fn run(
        &self,
        state: &mut WorldState,
        rng: &mut dyn RandomSource,
        metrics: &mut StepMetrics,
    ) -> Result<(), StepError>;
}

// ── SchedulerError ─────────────────────────────────────────────────

/// Errors from scheduler construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    /// No tasks registered.
    EmptySchedule,
    /// Two tasks share a name.
    DuplicateTask {
        /// The repeated name.
        name: String,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySchedule => write!(f, "schedule has no tasks"),
            Self::DuplicateTask { name } => write!(f, "task '{name}' registered twice"),
        }
    }
}

impl Error for SchedulerError {}

// ── Scheduler ──────────────────────────────────────────────────────

/// Ordered list of tasks.
pub struct Scheduler {
    tasks: Vec<Box<dyn Task>>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl Scheduler {
    /// Validate and order a set of tasks.
    pub fn new(tasks: Vec<Box<dyn Task>>) -> Result<Self, SchedulerError> {
        if tasks.is_empty() {
            return Err(SchedulerError::EmptySchedule);
        }
        let mut seen = IndexSet::new();
        for t in &tasks {
            if !seen.insert(t.name().to_string()) {
                return Err(SchedulerError::DuplicateTask {
                    name: t.name().to_string(),
                });
            }
        }
        Ok(Self::ordered(tasks))
    }

    /// The standard schedule: quarter switch, food growth, daily life,
    /// deterrence, movement, reaper, report.
    pub fn standard() -> Self {
        Self::ordered(vec![
            Box::new(tasks::QuarterSwitch),
            Box::new(tasks::FoodGrowth),
            Box::new(tasks::DailyLife),
            Box::new(tasks::Deterrence),
            Box::new(tasks::Movement),
            Box::new(tasks::Reaper),
            Box::new(tasks::Report),
        ])
    }

    fn ordered(mut tasks: Vec<Box<dyn Task>>) -> Self {
        tasks.sort_by_key(|t| t.priority());
        Self { tasks }
    }

    /// Task names in run order.
    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the schedule is empty (never true for a built scheduler).
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task due at the state's current tick, timing each one.
    ///
    /// Stops at the first failing task; later tasks do not run.
    pub fn run_tick(
        &self,
        state: &mut WorldState,
        rng: &mut dyn RandomSource,
        metrics: &mut StepMetrics,
    ) -> Result<(), StepError> {
        let tick = state.tick();
        for task in self.tasks.iter().filter(|t| t.cadence().is_due(tick)) {
            let start = Instant::now();
            task.run(state, rng, metrics)?;
            metrics
                .task_us
                .push((task.name().to_string(), start.elapsed().as_micros() as u64));
        }
        Ok(())
    }
}
