use chrono::{Duration, NaiveDateTime};

use crate::config::{MAX_N_DAYS, MINUTES_PER_DAY};
use crate::error::ConfigError;

/// An evenly spaced sequence of interval start timestamps.
///
/// The grid covers `n_days` whole days at `freq_minutes` resolution, so it
/// always holds `n_days * 1440 / freq_minutes` intervals.
///
/// # Examples
///
/// ```
/// use claro_sim::config::default_epoch;
/// use claro_sim::sim::grid::TimeGrid;
///
/// let grid = TimeGrid::new(default_epoch(), 2, 60).unwrap();
/// assert_eq!(grid.len(), 48);
/// assert_eq!(grid.steps_per_day(), 24);
/// ```
#[derive(Debug, Clone)]
pub struct TimeGrid {
    start: NaiveDateTime,
    freq_minutes: u32,
    steps_per_day: usize,
    len: usize,
}

impl TimeGrid {
    /// Builds a grid starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `n_days` is outside `1..=MAX_N_DAYS` or the
    /// grid would end past the representable date range, or if
    /// `freq_minutes` is zero or does not evenly divide a day.
    pub fn new(start: NaiveDateTime, n_days: i64, freq_minutes: u32) -> Result<Self, ConfigError> {
        if !(1..=MAX_N_DAYS).contains(&n_days) {
            return Err(ConfigError::new(
                "simulation.n_days",
                format!("must be in 1..={MAX_N_DAYS}, got {n_days}"),
            ));
        }
        if grid_end(start, n_days).is_none() {
            return Err(ConfigError::new(
                "simulation.n_days",
                "grid ends past the representable date range",
            ));
        }
        if freq_minutes == 0 || MINUTES_PER_DAY % freq_minutes != 0 {
            return Err(ConfigError::new(
                "simulation.freq_minutes",
                format!("must evenly divide 1440, got {freq_minutes}"),
            ));
        }
        let steps_per_day = (MINUTES_PER_DAY / freq_minutes) as usize;
        let len = usize::try_from(n_days)
            .ok()
            .and_then(|d| d.checked_mul(steps_per_day))
            .ok_or_else(|| ConfigError::new("simulation.n_days", "grid is too large"))?;
        Ok(Self {
            start,
            freq_minutes,
            steps_per_day,
            len,
        })
    }

    /// Number of intervals in the grid.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn steps_per_day(&self) -> usize {
        self.steps_per_day
    }

    pub fn freq_minutes(&self) -> u32 {
        self.freq_minutes
    }

    /// Timestamp of interval `index`, or `None` past the end of the grid.
    pub fn timestamp(&self, index: usize) -> Option<NaiveDateTime> {
        (index < self.len)
            .then(|| self.start + Duration::minutes(i64::from(self.freq_minutes) * index as i64))
    }

    /// Constant spacing between consecutive timestamps.
    pub fn spacing(&self) -> Duration {
        Duration::minutes(i64::from(self.freq_minutes))
    }

    /// Iterates over `(index, timestamp)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, NaiveDateTime)> + '_ {
        let step = self.spacing();
        (0..self.len).scan(self.start, move |ts, i| {
            let current = *ts;
            *ts += step;
            Some((i, current))
        })
    }
}

/// End of a grid of `n_days` days from `start`, if chrono can represent it.
pub(crate) fn grid_end(start: NaiveDateTime, n_days: i64) -> Option<NaiveDateTime> {
    Duration::try_days(n_days).and_then(|d| start.checked_add_signed(d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_epoch;

    #[test]
    fn hourly_grid_has_24_steps_per_day() {
        let grid = TimeGrid::new(default_epoch(), 3, 60).unwrap();
        assert_eq!(grid.len(), 72);
    }

    #[test]
    fn quarter_hour_spacing_is_constant() {
        let grid = TimeGrid::new(default_epoch(), 1, 15).unwrap();
        let stamps: Vec<_> = grid.iter().map(|(_, ts)| ts).collect();
        assert_eq!(stamps.len(), 96);
        for pair in stamps.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::minutes(15));
        }
        assert_eq!(stamps[0], default_epoch());
    }

    #[test]
    fn indexed_access_matches_iteration() {
        let grid = TimeGrid::new(default_epoch(), 2, 30).unwrap();
        for (i, ts) in grid.iter() {
            assert_eq!(grid.timestamp(i), Some(ts));
        }
        assert_eq!(grid.timestamp(grid.len()), None);
    }

    #[test]
    fn rejects_frequency_not_dividing_a_day() {
        let err = TimeGrid::new(default_epoch(), 1, 7).unwrap_err();
        assert_eq!(err.field, "simulation.freq_minutes");
        assert!(TimeGrid::new(default_epoch(), 1, 0).is_err());
    }

    #[test]
    fn rejects_oversized_grids() {
        let err = TimeGrid::new(default_epoch(), i64::MAX, 60).unwrap_err();
        assert_eq!(err.field, "simulation.n_days");
        assert!(TimeGrid::new(default_epoch(), MAX_N_DAYS + 1, 60).is_err());
        assert!(TimeGrid::new(default_epoch(), MAX_N_DAYS, 1440).is_ok());

        let late = NaiveDateTime::MAX - Duration::days(2);
        let err = TimeGrid::new(late, 5, 60).unwrap_err();
        assert_eq!(err.field, "simulation.n_days");
    }

    #[test]
    fn rejects_non_positive_days() {
        assert!(TimeGrid::new(default_epoch(), 0, 60).is_err());
        let err = TimeGrid::new(default_epoch(), -1, 60).unwrap_err();
        assert_eq!(err.field, "simulation.n_days");
    }
}
