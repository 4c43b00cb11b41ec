//! Calendar system for time-of-day and seasonal tracking
//!
//! Provides time periods (Morning, Afternoon, Evening, Night), seasons with
//! per-activity productivity multipliers, and the once-per-season festival day.

use serde::{Deserialize, Serialize};

/// Time of day periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    Morning,   // 06:00-12:00
    Afternoon, // 12:00-18:00
    Evening,   // 18:00-22:00
    Night,     // 22:00-06:00
}

impl TimePeriod {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimePeriod::Morning,
            12..=17 => TimePeriod::Afternoon,
            18..=21 => TimePeriod::Evening,
            _ => TimePeriod::Night, // 22-23, 0-5
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    const ORDER: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    fn from_index(index: u64) -> Self {
        Self::ORDER[(index % 4) as usize]
    }

    /// How cold it is outdoors, 0.0 (warm) to 1.0 (winter)
    pub fn chill(&self) -> f32 {
        match self {
            Season::Spring => 0.3,
            Season::Summer => 0.0,
            Season::Autumn => 0.5,
            Season::Winter => 1.0,
        }
    }
}

/// Outdoor work categories whose yield depends on the season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonalActivity {
    Foraging,
    Herbalism,
    Hunting,
    Fishing,
    Logging,
    Quarrying,
    Mining,
}

/// Calendar tracks simulation time with day/hour/season granularity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    tick: u64,
    ticks_per_day: u64,
    days_per_season: u64,
}

impl Calendar {
    pub fn new(ticks_per_day: u64, days_per_season: u64) -> Self {
        Self {
            tick: 0,
            ticks_per_day: ticks_per_day.max(1),
            days_per_season: days_per_season.max(1),
        }
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    /// Jump to an absolute tick (scenario setup and tests)
    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn current_day(&self) -> u64 {
        self.tick / self.ticks_per_day
    }

    pub fn current_hour(&self) -> u32 {
        let tick_in_day = self.tick % self.ticks_per_day;
        ((tick_in_day * 24) / self.ticks_per_day) as u32
    }

    /// Fraction of the current day elapsed, in [0, 1)
    pub fn day_progress(&self) -> f32 {
        (self.tick % self.ticks_per_day) as f32 / self.ticks_per_day as f32
    }

    pub fn current_time_period(&self) -> TimePeriod {
        TimePeriod::from_hour(self.current_hour())
    }

    pub fn is_night(&self) -> bool {
        self.current_time_period() == TimePeriod::Night
    }

    pub fn is_daytime(&self) -> bool {
        !self.is_night()
    }

    pub fn is_evening(&self) -> bool {
        self.current_time_period() == TimePeriod::Evening
    }

    pub fn season(&self) -> Season {
        Season::from_index(self.current_day() / self.days_per_season)
    }

    /// Day index inside the current season
    pub fn day_of_season(&self) -> u64 {
        self.current_day() % self.days_per_season
    }

    /// Festival runs during the daytime of the middle day of each season
    pub fn is_festival(&self) -> bool {
        self.day_of_season() == self.days_per_season / 2
            && matches!(
                self.current_time_period(),
                TimePeriod::Afternoon | TimePeriod::Evening
            )
    }

    /// Productivity multiplier for an outdoor activity this season
    ///
    /// A value of 0.0 means the activity is impossible (nothing grows).
    pub fn seasonal_multiplier(&self, activity: SeasonalActivity) -> f32 {
        use SeasonalActivity::*;
        match (self.season(), activity) {
            (Season::Winter, Foraging | Herbalism) => 0.0,
            (Season::Winter, Hunting) => 0.5,
            (Season::Winter, Fishing) => 0.3,
            (Season::Winter, Logging) => 0.8,
            (Season::Autumn, Foraging) => 1.3,
            (Season::Autumn, Hunting) => 1.2,
            (Season::Spring, Herbalism) => 1.3,
            (Season::Summer, Fishing) => 1.2,
            _ => 1.0,
        }
    }

    pub fn ticks_per_day(&self) -> u64 {
        self.ticks_per_day
    }

    pub fn ticks_per_season(&self) -> u64 {
        self.ticks_per_day * self.days_per_season
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(2400, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_period_from_hour() {
        assert_eq!(TimePeriod::from_hour(6), TimePeriod::Morning);
        assert_eq!(TimePeriod::from_hour(12), TimePeriod::Afternoon);
        assert_eq!(TimePeriod::from_hour(21), TimePeriod::Evening);
        assert_eq!(TimePeriod::from_hour(22), TimePeriod::Night);
        assert_eq!(TimePeriod::from_hour(5), TimePeriod::Night);
    }

    #[test]
    fn test_calendar_day_and_hour() {
        let mut cal = Calendar::new(2400, 10);
        assert_eq!(cal.current_day(), 0);
        assert!(cal.is_night());

        cal.set_tick(1200); // noon
        assert_eq!(cal.current_hour(), 12);
        assert!(cal.is_daytime());
        assert!((cal.day_progress() - 0.5).abs() < 1e-6);

        cal.set_tick(2400 + 1900); // 19:00 on day 1
        assert_eq!(cal.current_day(), 1);
        assert!(cal.is_evening());
    }

    #[test]
    fn test_seasons_cycle() {
        let mut cal = Calendar::new(100, 2);
        assert_eq!(cal.season(), Season::Spring);
        cal.set_tick(200);
        assert_eq!(cal.season(), Season::Summer);
        cal.set_tick(600);
        assert_eq!(cal.season(), Season::Winter);
        cal.set_tick(800);
        assert_eq!(cal.season(), Season::Spring);
    }

    #[test]
    fn test_winter_stops_foraging() {
        let mut cal = Calendar::new(100, 2);
        cal.set_tick(cal.ticks_per_season() * 3);
        assert_eq!(cal.seasonal_multiplier(SeasonalActivity::Foraging), 0.0);
        assert_eq!(cal.seasonal_multiplier(SeasonalActivity::Herbalism), 0.0);
        assert_eq!(cal.seasonal_multiplier(SeasonalActivity::Hunting), 0.5);
        assert!((cal.seasonal_multiplier(SeasonalActivity::Fishing) - 0.3).abs() < 1e-6);
        assert_eq!(cal.seasonal_multiplier(SeasonalActivity::Quarrying), 1.0);
    }

    #[test]
    fn test_festival_window() {
        let mut cal = Calendar::new(2400, 10);
        cal.set_tick(5 * 2400 + 1300); // day 5, afternoon
        assert!(cal.is_festival());
        cal.set_tick(5 * 2400 + 300); // day 5, night
        assert!(!cal.is_festival());
        cal.set_tick(4 * 2400 + 1300);
        assert!(!cal.is_festival());
    }
}
