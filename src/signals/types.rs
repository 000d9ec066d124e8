//! Common types and traits for the causal signal generators.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use super::calendar::CalendarState;
use super::regime::RegimeState;

/// Contextual information passed to generators for one interval.
///
/// Carries the interval timestamp plus the upstream constructs already
/// computed for it: the calendar state (C1) feeds the regime and occupancy
/// generators, the regime (X3) feeds occupancy.
#[derive(Debug, Clone)]
pub struct SignalContext {
    pub timestamp: NaiveDateTime,
    pub calendar: CalendarState,
    pub regime: RegimeState,
}

impl SignalContext {
    /// Creates a context for a regular, open interval.
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            calendar: CalendarState::default(),
            regime: RegimeState::default(),
        }
    }

    pub fn with_calendar(mut self, calendar: CalendarState) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_regime(mut self, regime: RegimeState) -> Self {
        self.regime = regime;
        self
    }

    /// Fractional hour of day, e.g. 13.5 for 13:30.
    pub fn hour(&self) -> f64 {
        hour_of_day(&self.timestamp)
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.timestamp.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// A construct generator evaluated once per interval.
///
/// All generators draw randomness only from the `rng` handle they are given,
/// so a whole run stays reproducible from one seeded stream. Deterministic
/// generators leave the stream untouched.
pub trait Signal {
    type Output;

    /// Returns the construct value for the interval described by `ctx`.
    fn sample(&self, ctx: &SignalContext, rng: &mut StdRng) -> Self::Output;

    /// Returns the construct label used in logs.
    fn signal_name(&self) -> &'static str;
}

/// Fractional hour of day for a timestamp.
pub fn hour_of_day(ts: &NaiveDateTime) -> f64 {
    f64::from(ts.hour()) + f64::from(ts.minute()) / 60.0
}

/// Draws zero-mean Gaussian noise with the given standard deviation.
///
/// Returns 0.0 without consuming randomness when `std_dev <= 0`. A
/// non-finite `std_dev` is rejected by config validation; if one gets here
/// the result is not finite so the bad value shows up in the output.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    match Normal::new(0.0, std_dev) {
        Ok(normal) => normal.sample(rng),
        Err(_) => f64::NAN,
    }
}
