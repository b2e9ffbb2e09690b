//! Energy balance, survival and reproduction of one animal.
//!
//! Per tick the animal eats from the cell it just left, pays a basal and
//! distance cost, and survives with a probability that falls as energy
//! drops. Once a day the accumulators roll over, the animal ages, faces
//! bycatch and old age, and the pregnancy machine advances.

use pelagic_core::config::EnergeticsConfig;
use pelagic_core::{Cell, Landscape, RandomSource, RingBuffer, TickId, TICKS_PER_YEAR};
use std::fmt;

/// Days of energy kept in the daily history.
pub const ENERGY_HISTORY_DAYS: usize = 10;

/// Reproductive state of an animal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PregnancyStatus {
    /// Too young to conceive.
    Immature,
    /// Mature but past this year's mating day without conceiving.
    Resting,
    /// Carrying a foetus.
    Pregnant,
    /// Able to conceive on the next mating day.
    Receptive,
}

/// Why an animal died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeathCause {
    /// Energy-dependent mortality.
    Starvation,
    /// Caught in fishing gear.
    Bycatch,
    /// Exceeded the maximum age.
    OldAge,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starvation => write!(f, "starvation"),
            Self::Bycatch => write!(f, "bycatch"),
            Self::OldAge => write!(f, "old age"),
        }
    }
}

/// Result of the per-tick survival check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Survival {
    /// Nothing happened.
    Alive,
    /// A lactating animal lost its calf and lived.
    CalfAbandoned,
    /// The animal died.
    Died(DeathCause),
}

/// What the daily update decided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DailyOutcome {
    /// Death from bycatch or old age.
    pub death: Option<DeathCause>,
    /// A calf was born today.
    pub born: bool,
    /// A calf was weaned today; `Some(true)` when it is female.
    pub weaned: Option<bool>,
}

/// Physiological and reproductive state.
#[derive(Clone, Debug)]
pub struct Energetics {
    energy: f64,
    energy_history: RingBuffer<f64>,
    food_today: f64,
    food_yesterday: f64,
    consumed_today: f64,
    consumed_yesterday: f64,
    age: f64,
    status: PregnancyStatus,
    mating_day: u64,
    days_since_mating: u32,
    days_since_birth: u32,
    lactating: bool,
    calves_born: u32,
    calves_weaned: u32,
}

impl Energetics {
    /// Fresh state for an animal of `age` years with `energy`.
    ///
    /// `mating_day` is the day of year on which the animal mates.
    pub fn new(energy: f64, age: f64, mating_day: u64, cfg: &EnergeticsConfig) -> Self {
        let status = if age >= cfg.maturity_age {
            PregnancyStatus::Receptive
        } else {
            PregnancyStatus::Immature
        };
        Self {
            energy,
            energy_history: RingBuffer::new(ENERGY_HISTORY_DAYS),
            food_today: 0.0,
            food_yesterday: 0.0,
            consumed_today: 0.0,
            consumed_yesterday: 0.0,
            age,
            status,
            mating_day,
            days_since_mating: 0,
            days_since_birth: 0,
            lactating: false,
            calves_born: 0,
            calves_weaned: 0,
        }
    }

    /// Current energy level.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Energy at the end of each of the last days, most recent first.
    pub fn energy_history(&self) -> &RingBuffer<f64> {
        &self.energy_history
    }

    /// Food eaten so far today.
    pub fn food_today(&self) -> f64 {
        self.food_today
    }

    /// Food eaten yesterday.
    pub fn food_yesterday(&self) -> f64 {
        self.food_yesterday
    }

    /// Energy used so far today.
    pub fn consumed_today(&self) -> f64 {
        self.consumed_today
    }

    /// Energy used yesterday.
    pub fn consumed_yesterday(&self) -> f64 {
        self.consumed_yesterday
    }

    /// Age in years.
    pub fn age(&self) -> f64 {
        self.age
    }

    /// Reproductive state.
    pub fn status(&self) -> PregnancyStatus {
        self.status
    }

    /// Day of year on which the animal mates.
    pub fn mating_day(&self) -> u64 {
        self.mating_day
    }

    /// Days since conception.
    pub fn days_since_mating(&self) -> u32 {
        self.days_since_mating
    }

    /// Days since the current calf was born.
    pub fn days_since_birth(&self) -> u32 {
        self.days_since_birth
    }

    /// Whether a calf is being nursed.
    pub fn is_lactating(&self) -> bool {
        self.lactating
    }

    /// Calves born over the animal's life.
    pub fn calves_born(&self) -> u32 {
        self.calves_born
    }

    /// Calves weaned over the animal's life.
    pub fn calves_weaned(&self) -> u32 {
        self.calves_weaned
    }

    /// Eat from `cell` and return the amount eaten.
    ///
    /// The eaten fraction shrinks as energy approaches the maximum. A
    /// patch is never grazed below the artificial food floor.
    pub fn eat(&mut self, landscape: &mut dyn Landscape, cell: Cell, cfg: &EnergeticsConfig) -> f64 {
        let food = landscape.food_level(cell);
        if !(food > 0.0) {
            return 0.0;
        }
        let fraction = ((cfg.max_energy - self.energy) / cfg.food_fraction_divisor)
            .clamp(0.0, cfg.max_food_fraction);
        let eaten = food * fraction;
        let left = food - eaten;
        landscape.set_food_level(cell, if left < cfg.artificial_food { cfg.artificial_food } else { left });
        self.energy += eaten;
        self.food_today += eaten;
        eaten
    }

    /// Pay the basal cost of one tick plus `km` swum; returns the cost.
    pub fn consume(&mut self, km: f64, tick: TickId, cfg: &EnergeticsConfig) -> f64 {
        let mut scaling = 1.0;
        if tick.is_warm_season() {
            scaling *= cfg.e_warm;
        }
        if self.lactating {
            scaling *= cfg.e_lact;
        }
        let used = scaling * 0.001 * cfg.e_use_per_30_min + cfg.e_use_per_km * km;
        self.energy -= used;
        self.consumed_today += used;
        used
    }

    /// Probability of surviving one tick at the current energy.
    pub fn step_survival_probability(&self, cfg: &EnergeticsConfig) -> f64 {
        let yearly = (1.0 - cfg.m_mort_prob_const * (-self.energy * cfg.x_survival_prob_const).exp())
            .clamp(0.0, 1.0);
        yearly.powf(1.0 / TICKS_PER_YEAR as f64)
    }

    /// Per-tick survival check.
    ///
    /// A lactating animal that draws death abandons its calf instead and
    /// dies only once its energy is exhausted.
    pub fn survive(&mut self, rng: &mut dyn RandomSource, cfg: &EnergeticsConfig) -> Survival {
        if !cfg.mortality_enabled {
            return Survival::Alive;
        }
        let p = self.step_survival_probability(cfg);
        if rng.uniform() <= p {
            return Survival::Alive;
        }
        if self.lactating {
            self.lactating = false;
            self.days_since_birth = 0;
            if self.energy > 0.0 {
                return Survival::CalfAbandoned;
            }
        }
        Survival::Died(DeathCause::Starvation)
    }

    /// Whether energy fell on each of the last `days` days.
    pub fn energy_declining(&self, days: usize) -> bool {
        let h = &self.energy_history;
        if h.len() <= days {
            return false;
        }
        (0..days).all(|i| matches!((h.get(i), h.get(i + 1)), (Some(a), Some(b)) if a < b))
    }

    /// Whether today's energy is above the energy `days` days ago.
    pub fn energy_recovered(&self, days: usize) -> bool {
        match (self.energy_history.get(0), self.energy_history.get(days)) {
            (Some(now), Some(then)) => now > then,
            _ => false,
        }
    }

    /// Daily update, run at the first tick of each day.
    pub fn daily(&mut self, tick: TickId, rng: &mut dyn RandomSource, cfg: &EnergeticsConfig) -> DailyOutcome {
        let mut out = DailyOutcome::default();
        self.food_yesterday = self.food_today;
        self.consumed_yesterday = self.consumed_today;
        self.food_today = 0.0;
        self.consumed_today = 0.0;
        self.energy_history.push(self.energy);
        self.age += 1.0 / 360.0;

        if cfg.mortality_enabled {
            let daily_bycatch = 1.0 - (1.0 - cfg.bycatch_prob).powf(1.0 / 360.0);
            if daily_bycatch > 0.0 && rng.bernoulli(daily_bycatch) {
                out.death = Some(DeathCause::Bycatch);
                return out;
            }
            if self.age > cfg.max_age {
                out.death = Some(DeathCause::OldAge);
                return out;
            }
        }

        if !cfg.reproduction_enabled {
            return out;
        }

        if self.lactating {
            self.days_since_birth += 1;
            if self.days_since_birth >= cfg.nursing_days {
                self.lactating = false;
                self.days_since_birth = 0;
                self.calves_weaned += 1;
                out.weaned = Some(rng.bernoulli(cfg.female_prob));
            }
        }

        match self.status {
            PregnancyStatus::Immature => {
                if self.age >= cfg.maturity_age {
                    self.status = PregnancyStatus::Receptive;
                }
            }
            PregnancyStatus::Resting => {
                if tick.day_of_year() == 0 {
                    self.status = PregnancyStatus::Receptive;
                }
            }
            PregnancyStatus::Receptive => {
                if tick.day_of_year() == self.mating_day {
                    if rng.bernoulli(cfg.conceive_prob) {
                        self.status = PregnancyStatus::Pregnant;
                        self.days_since_mating = 0;
                    } else {
                        self.status = PregnancyStatus::Resting;
                    }
                }
            }
            PregnancyStatus::Pregnant => {
                self.days_since_mating += 1;
                if self.days_since_mating >= cfg.gestation_days {
                    self.status = PregnancyStatus::Receptive;
                    self.days_since_mating = 0;
                    self.lactating = true;
                    self.days_since_birth = 0;
                    self.calves_born += 1;
                    out.born = true;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pelagic_core::{SeededRandom, TICKS_PER_DAY};
    use pelagic_space::{GridLandscape, LandscapeLayers};

    fn food_landscape(food: f64) -> GridLandscape {
        let mut l = LandscapeLayers::filled(2, 2, 10.0);
        l.food_probability = vec![1.0; 4];
        l.initial_food = Some(vec![food; 4]);
        GridLandscape::from_layers(l).unwrap()
    }

    #[test]
    fn eating_takes_energy_dependent_fraction() {
        let cfg = EnergeticsConfig::default();
        let mut land = food_landscape(1.0);
        let mut e = Energetics::new(15.0, 5.0, 225, &cfg);
        let eaten = e.eat(&mut land, Cell::new(0, 0), &cfg);
        assert!((eaten - 0.5).abs() < 1e-12);
        assert!((land.food_level(Cell::new(0, 0)) - 0.5).abs() < 1e-12);
        assert!((e.energy() - 15.5).abs() < 1e-12);
        assert!((e.food_today() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn hungry_animal_leaves_the_food_floor() {
        let cfg = EnergeticsConfig::default();
        let mut land = food_landscape(0.5);
        let mut e = Energetics::new(0.0, 5.0, 225, &cfg);
        let eaten = e.eat(&mut land, Cell::new(1, 1), &cfg);
        assert!((eaten - 0.495).abs() < 1e-12);
        assert_eq!(land.food_level(Cell::new(1, 1)), cfg.artificial_food);
        let mut sated = Energetics::new(25.0, 5.0, 225, &cfg);
        assert_eq!(sated.eat(&mut land, Cell::new(0, 0), &cfg), 0.0);
    }

    #[test]
    fn consumption_scales_with_season_and_lactation() {
        let cfg = EnergeticsConfig::default();
        let mut e = Energetics::new(10.0, 5.0, 225, &cfg);
        assert!((e.consume(0.0, TickId(0), &cfg) - 0.0045).abs() < 1e-15);
        let april = TickId(TICKS_PER_DAY * 95);
        assert!((e.consume(0.0, april, &cfg) - 0.0045 * 1.3).abs() < 1e-15);
        e.lactating = true;
        assert!((e.consume(0.0, april, &cfg) - 0.0045 * 1.3 * 1.4).abs() < 1e-15);
        assert!((e.consumed_today() - 0.0045 * (1.0 + 1.3 + 1.3 * 1.4)).abs() < 1e-15);
    }

    #[test]
    fn survival_falls_with_energy() {
        let cfg = EnergeticsConfig::default();
        let fat = Energetics::new(15.0, 5.0, 225, &cfg);
        let thin = Energetics::new(1.0, 5.0, 225, &cfg);
        assert!(fat.step_survival_probability(&cfg) > thin.step_survival_probability(&cfg));
        let starved = Energetics::new(0.0, 5.0, 225, &cfg);
        assert_eq!(starved.step_survival_probability(&cfg), 0.0);
    }

    #[test]
    fn lactating_animal_abandons_calf_before_dying() {
        let cfg = EnergeticsConfig::default();
        let mut rng = SeededRandom::new(1);
        let mut e = Energetics::new(0.5, 5.0, 225, &cfg);
        e.lactating = true;
        // Survival at 0.5 energy is below any uniform draw short of certainty;
        // keep drawing until the check fires.
        let mut first = Survival::Alive;
        for _ in 0..100_000 {
            first = e.survive(&mut rng, &cfg);
            if first != Survival::Alive {
                break;
            }
        }
        assert_eq!(first, Survival::CalfAbandoned);
        assert!(!e.is_lactating());
        let mut dead = Energetics::new(0.0, 5.0, 225, &cfg);
        dead.lactating = true;
        assert_eq!(dead.survive(&mut rng, &cfg), Survival::Died(DeathCause::Starvation));
    }

    #[test]
    fn declining_energy_detection() {
        let cfg = EnergeticsConfig::default();
        let mut rng = SeededRandom::new(1);
        let mut e = Energetics::new(10.0, 1.0, 225, &cfg);
        for energy in [10.0, 9.0, 8.0, 7.0] {
            e.energy = energy;
            e.daily(TickId(0), &mut rng, &cfg);
        }
        assert!(e.energy_declining(3));
        assert!(!e.energy_declining(4));
        e.energy = 7.5;
        e.daily(TickId(0), &mut rng, &cfg);
        assert!(!e.energy_declining(3));
        assert!(e.energy_recovered(1));
        assert!(!e.energy_recovered(2));
    }

    #[test]
    fn full_reproductive_cycle() {
        let mut cfg = EnergeticsConfig::default();
        cfg.conceive_prob = 1.0;
        cfg.mortality_enabled = false;
        let mut rng = SeededRandom::new(9);
        let mut e = Energetics::new(10.0, 3.43, 10, &cfg);
        assert_eq!(e.status(), PregnancyStatus::Immature);

        let mut births = 0;
        let mut weanings = 0;
        for day in 1..=600 {
            let out = e.daily(TickId(day * TICKS_PER_DAY), &mut rng, &cfg);
            if day == 10 {
                assert_eq!(e.status(), PregnancyStatus::Pregnant);
            }
            if out.born {
                births += 1;
                assert_eq!(day, 10 + 300);
                assert!(e.is_lactating());
            }
            if out.weaned.is_some() {
                weanings += 1;
                assert_eq!(day, 10 + 300 + 240);
            }
        }
        assert_eq!((births, weanings), (1, 1));
        assert_eq!((e.calves_born(), e.calves_weaned()), (1, 1));
        // Conceived again on day 370 and still pregnant.
        assert_eq!(e.status(), PregnancyStatus::Pregnant);
    }

    #[test]
    fn failed_conception_rests_until_new_year() {
        let mut cfg = EnergeticsConfig::default();
        cfg.conceive_prob = 0.0;
        let mut rng = SeededRandom::new(9);
        let mut e = Energetics::new(10.0, 5.0, 10, &cfg);
        e.daily(TickId(10 * TICKS_PER_DAY), &mut rng, &cfg);
        assert_eq!(e.status(), PregnancyStatus::Resting);
        e.daily(TickId(360 * TICKS_PER_DAY), &mut rng, &cfg);
        assert_eq!(e.status(), PregnancyStatus::Receptive);
    }

    #[test]
    fn old_age_and_bycatch() {
        let mut cfg = EnergeticsConfig::default();
        let mut rng = SeededRandom::new(1);
        let mut old = Energetics::new(10.0, cfg.max_age, 225, &cfg);
        assert_eq!(old.daily(TickId(0), &mut rng, &cfg).death, Some(DeathCause::OldAge));
        cfg.bycatch_prob = 1.0;
        let mut young = Energetics::new(10.0, 1.0, 225, &cfg);
        assert_eq!(young.daily(TickId(0), &mut rng, &cfg).death, Some(DeathCause::Bycatch));
    }
}
