//! Per-tick counters and timings for the simulation engine.
//!
//! [`StepMetrics`] captures what happened during a single tick: how long
//! each task took, population events, food growth, and the fallback
//! counters accumulated by behaviour code.

use pelagic_agent::{DeathCause, Diagnostics};

/// Timings and event counts collected during a single tick.
///
/// All durations are in microseconds. The world populates these fields
/// during each `step()` call and keeps the most recent set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
    /// Per-task execution times: `(name, microseconds)`, in run order.
    /// Tasks not due this tick are absent.
    pub task_us: Vec<(String, u64)>,
    /// Deaths by starvation.
    pub deaths_starvation: u32,
    /// Deaths by bycatch.
    pub deaths_bycatch: u32,
    /// Deaths by old age.
    pub deaths_old_age: u32,
    /// Calves born.
    pub births: u32,
    /// Calves weaned.
    pub weaned: u32,
    /// Calves abandoned by starving mothers.
    pub calves_abandoned: u32,
    /// Animals added to the population (weaned females).
    pub spawned: u32,
    /// Animals that started dispersing.
    pub dispersal_started: u32,
    /// Animals that stopped dispersing.
    pub dispersal_stopped: u32,
    /// Deterrences accepted from fixed sources and ships.
    pub deterrences: u32,
    /// Net food added by regrowth.
    pub food_grown: f64,
    /// Food patches that needed the finer-resolution regrowth.
    pub extra_growth_events: u64,
    /// Fallback and degradation counters.
    pub diagnostics: Diagnostics,
}

impl StepMetrics {
    /// Count one death.
    pub fn record_death(&mut self, cause: DeathCause) {
        match cause {
            DeathCause::Starvation => self.deaths_starvation += 1,
            DeathCause::Bycatch => self.deaths_bycatch += 1,
            DeathCause::OldAge => self.deaths_old_age += 1,
        }
    }

    /// Deaths of any cause.
    pub fn deaths(&self) -> u32 {
        self.deaths_starvation + self.deaths_bycatch + self.deaths_old_age
    }

    /// Time spent in the named task, if it ran.
    pub fn task_time_us(&self, name: &str) -> Option<u64> {
        self.task_us.iter().find(|(n, _)| n == name).map(|(_, us)| *us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert!(m.task_us.is_empty());
        assert_eq!(m.deaths(), 0);
        assert_eq!(m.food_grown, 0.0);
        assert_eq!(m.diagnostics, Diagnostics::default());
    }

    #[test]
    fn deaths_are_counted_by_cause() {
        let mut m = StepMetrics::default();
        m.record_death(DeathCause::Starvation);
        m.record_death(DeathCause::OldAge);
        m.record_death(DeathCause::OldAge);
        assert_eq!(m.deaths_starvation, 1);
        assert_eq!(m.deaths_old_age, 2);
        assert_eq!(m.deaths(), 3);
    }

    #[test]
    fn task_times_are_looked_up_by_name() {
        let m = StepMetrics {
            task_us: vec![("food_growth".into(), 50), ("movement".into(), 30)],
            ..Default::default()
        };
        assert_eq!(m.task_time_us("movement"), Some(30));
        assert_eq!(m.task_time_us("reaper"), None);
    }
}
