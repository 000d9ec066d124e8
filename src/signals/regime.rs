//! Operational regime (X3): open/closed from the weekly schedule.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;

use super::calendar::AcademicPeriod;
use super::types::{Signal, SignalContext};
use crate::config::{ExtendedHoursConfig, ScheduleConfig, SpecialEventConfig};

/// X3 value for one interval, with the override flags that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegimeState {
    pub open: bool,
    /// Open only because extended hours widened the window.
    pub extended_hours: bool,
    /// The date carries a special event.
    pub special_event: bool,
}

impl Default for RegimeState {
    fn default() -> Self {
        Self {
            open: true,
            extended_hours: false,
            special_event: false,
        }
    }
}

impl RegimeState {
    pub const CLOSED: Self = Self {
        open: false,
        extended_hours: false,
        special_event: false,
    };

    /// X3 as 0/1.
    pub fn as_flag(&self) -> u8 {
        u8::from(self.open)
    }
}

/// Half-open window of fractional hours, `open <= hour < close`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    open: f64,
    close: f64,
}

impl Window {
    fn contains(&self, hour: f64) -> bool {
        self.open <= hour && hour < self.close
    }

    fn union(self, other: Window) -> Window {
        Window {
            open: self.open.min(other.open),
            close: self.close.max(other.close),
        }
    }
}

/// Weekly opening schedule with extended-hours and special-event overrides.
///
/// Holidays close the building regardless of any override.
#[derive(Debug, Clone)]
pub struct OpeningSchedule {
    weekday: Window,
    weekend: Window,
    extended: ExtendedHoursConfig,
    special_events: Vec<SpecialEventConfig>,
}

impl OpeningSchedule {
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            weekday: Window {
                open: config.weekday_open_hour,
                close: config.weekday_close_hour,
            },
            weekend: Window {
                open: config.weekend_open_hour,
                close: config.weekend_close_hour,
            },
            extended: config.extended_hours.clone(),
            special_events: config.special_events.clone(),
        }
    }

    fn base_window(&self, date: NaiveDate) -> Window {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => self.weekend,
            _ => self.weekday,
        }
    }

    fn extension_applies(&self, period: AcademicPeriod) -> bool {
        self.extended.enabled && (!self.extended.exam_periods_only || period == AcademicPeriod::Exam)
    }

    fn event_window(&self, date: NaiveDate) -> Option<Window> {
        self.special_events
            .iter()
            .filter(|e| e.date == date)
            .map(|e| Window {
                open: e.open_hour,
                close: e.close_hour,
            })
            .reduce(Window::union)
    }

    /// Evaluates the regime at fractional `hour` on `date` during `period`.
    pub fn regime_at(&self, date: NaiveDate, hour: f64, period: AcademicPeriod) -> RegimeState {
        if period == AcademicPeriod::Holiday {
            return RegimeState::CLOSED;
        }

        let base = self.base_window(date);
        let extended = self.extension_applies(period).then(|| Window {
            open: (base.open - self.extended.extra_hours_before).max(0.0),
            close: (base.close + self.extended.extra_hours_after).min(24.0),
        });
        let event = self.event_window(date);

        let in_base = base.contains(hour);
        let in_extended = extended.is_some_and(|w| w.contains(hour));
        let in_event = event.is_some_and(|w| w.contains(hour));

        RegimeState {
            open: in_base || in_extended || in_event,
            extended_hours: !in_base && in_extended,
            special_event: event.is_some(),
        }
    }
}

impl Signal for OpeningSchedule {
    type Output = RegimeState;

    fn sample(&self, ctx: &SignalContext, _rng: &mut StdRng) -> RegimeState {
        self.regime_at(ctx.timestamp.date(), ctx.hour(), ctx.calendar.period)
    }

    fn signal_name(&self) -> &'static str {
        "X3_regime"
    }
}
