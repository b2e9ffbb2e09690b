//! Tick calendar.
//!
//! One tick is half an hour. Days have 48 ticks, months 30 days and years
//! 360 days, so a year is 17,280 ticks.

use crate::id::TickId;

/// Ticks per simulated day.
pub const TICKS_PER_DAY: u64 = 48;
/// Days per simulated month.
pub const DAYS_PER_MONTH: u64 = 30;
/// Days per simulated year.
pub const DAYS_PER_YEAR: u64 = 360;
/// Ticks per simulated year.
pub const TICKS_PER_YEAR: u64 = TICKS_PER_DAY * DAYS_PER_YEAR;

/// Source of the current simulation tick.
pub trait Clock {
    /// The tick currently being executed.
    fn current_tick(&self) -> TickId;
}

impl Clock for TickId {
    fn current_tick(&self) -> TickId {
        *self
    }
}

impl TickId {
    /// Whole days elapsed since tick 0.
    pub fn day(self) -> u64 {
        self.0 / TICKS_PER_DAY
    }

    /// Tick index within the current day, `0..48`.
    pub fn tick_of_day(self) -> u64 {
        self.0 % TICKS_PER_DAY
    }

    /// Day within the current year, `0..360`.
    pub fn day_of_year(self) -> u64 {
        self.day() % DAYS_PER_YEAR
    }

    /// Month within the current year, `0..12` (0 = January).
    pub fn month(self) -> u32 {
        (self.day_of_year() / DAYS_PER_MONTH) as u32
    }

    /// Quarter within the current year, `0..4`.
    pub fn quarter(self) -> u32 {
        self.month() / 3
    }

    /// Whole years elapsed since tick 0.
    pub fn year(self) -> u64 {
        self.0 / TICKS_PER_YEAR
    }

    /// First tick of a day.
    pub fn is_day_start(self) -> bool {
        self.tick_of_day() == 0
    }

    /// First tick of a month.
    pub fn is_month_start(self) -> bool {
        self.is_day_start() && self.day_of_year() % DAYS_PER_MONTH == 0
    }

    /// First tick of a year.
    pub fn is_year_start(self) -> bool {
        self.0 % TICKS_PER_YEAR == 0
    }

    /// Daylight between 06:00 and 18:00.
    pub fn is_daytime(self) -> bool {
        (12..36).contains(&self.tick_of_day())
    }

    /// Whether the month falls in the warm season (April to September).
    pub fn is_warm_season(self) -> bool {
        (3..=8).contains(&self.month())
    }

    /// The following tick.
    pub fn next(self) -> TickId {
        TickId(self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_boundaries() {
        assert_eq!(TICKS_PER_YEAR, 17_280);
        let t = TickId(TICKS_PER_DAY * 31 + 5);
        assert_eq!(t.day(), 31);
        assert_eq!(t.tick_of_day(), 5);
        assert_eq!(t.month(), 1);
        assert_eq!(t.quarter(), 0);
        assert!(!t.is_day_start());
        assert!(TickId(TICKS_PER_DAY * 30).is_month_start());
        assert!(TickId(TICKS_PER_YEAR * 2).is_year_start());
        assert_eq!(TickId(TICKS_PER_YEAR * 2 + 1).year(), 2);
    }

    #[test]
    fn seasons_and_daylight() {
        let april = TickId(TICKS_PER_DAY * DAYS_PER_MONTH * 3);
        assert!(april.is_warm_season());
        let october = TickId(TICKS_PER_DAY * DAYS_PER_MONTH * 9);
        assert!(!october.is_warm_season());
        assert!(TickId(24).is_daytime());
        assert!(!TickId(2).is_daytime());
        assert_eq!(TickId(3).current_tick(), TickId(3));
    }
}
