//! Academic calendar confounder (C1).

use std::fmt;

use chrono::NaiveDate;
use rand::rngs::StdRng;

use super::types::{Signal, SignalContext};
use crate::config::{CalendarConfig, DateRange};

/// Institutional period a date belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcademicPeriod {
    #[default]
    Regular,
    Exam,
    Vacation,
    Holiday,
}

impl AcademicPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Exam => "exam",
            Self::Vacation => "vacation",
            Self::Holiday => "holiday",
        }
    }

    /// Parses the label written by [`AcademicPeriod::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "regular" => Some(Self::Regular),
            "exam" => Some(Self::Exam),
            "vacation" => Some(Self::Vacation),
            "holiday" => Some(Self::Holiday),
            _ => None,
        }
    }
}

impl fmt::Display for AcademicPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// C1 value for one interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarState {
    pub period: AcademicPeriod,
    /// Academic intensity multiplier applied to occupancy.
    pub intensity: f64,
}

impl Default for CalendarState {
    fn default() -> Self {
        Self {
            period: AcademicPeriod::Regular,
            intensity: 1.0,
        }
    }
}

/// Deterministic calendar built from configured date ranges.
///
/// Overlapping ranges resolve as holiday > exam > vacation > regular.
#[derive(Debug, Clone)]
pub struct AcademicCalendar {
    holidays: Vec<DateRange>,
    exam_periods: Vec<DateRange>,
    vacations: Vec<DateRange>,
    regular_intensity: f64,
    exam_intensity: f64,
    vacation_intensity: f64,
    holiday_intensity: f64,
}

impl AcademicCalendar {
    pub fn new(config: &CalendarConfig) -> Self {
        Self {
            holidays: config.holidays.clone(),
            exam_periods: config.exam_periods.clone(),
            vacations: config.vacations.clone(),
            regular_intensity: config.regular_intensity,
            exam_intensity: config.exam_intensity,
            vacation_intensity: config.vacation_intensity,
            holiday_intensity: config.holiday_intensity,
        }
    }

    pub fn period_on(&self, date: NaiveDate) -> AcademicPeriod {
        let within = |ranges: &[DateRange]| ranges.iter().any(|r| r.contains(date));
        if within(&self.holidays) {
            AcademicPeriod::Holiday
        } else if within(&self.exam_periods) {
            AcademicPeriod::Exam
        } else if within(&self.vacations) {
            AcademicPeriod::Vacation
        } else {
            AcademicPeriod::Regular
        }
    }

    pub fn intensity(&self, period: AcademicPeriod) -> f64 {
        match period {
            AcademicPeriod::Regular => self.regular_intensity,
            AcademicPeriod::Exam => self.exam_intensity,
            AcademicPeriod::Vacation => self.vacation_intensity,
            AcademicPeriod::Holiday => self.holiday_intensity,
        }
    }

    pub fn state_on(&self, date: NaiveDate) -> CalendarState {
        let period = self.period_on(date);
        CalendarState {
            period,
            intensity: self.intensity(period),
        }
    }
}

impl Signal for AcademicCalendar {
    type Output = CalendarState;

    fn sample(&self, ctx: &SignalContext, _rng: &mut StdRng) -> CalendarState {
        self.state_on(ctx.timestamp.date())
    }

    fn signal_name(&self) -> &'static str {
        "C1_calendar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn calendar() -> AcademicCalendar {
        AcademicCalendar::new(&CalendarConfig {
            holidays: vec![DateRange::new(d(1), d(6))],
            exam_periods: vec![DateRange::new(d(5), d(20))],
            vacations: vec![DateRange::new(d(18), d(25))],
            ..CalendarConfig::default()
        })
    }

    #[test]
    fn overlaps_resolve_by_precedence() {
        let cal = calendar();
        assert_eq!(cal.period_on(d(5)), AcademicPeriod::Holiday);
        assert_eq!(cal.period_on(d(7)), AcademicPeriod::Exam);
        assert_eq!(cal.period_on(d(19)), AcademicPeriod::Exam);
        assert_eq!(cal.period_on(d(22)), AcademicPeriod::Vacation);
        assert_eq!(cal.period_on(d(30)), AcademicPeriod::Regular);
    }

    #[test]
    fn intensity_follows_period() {
        let cal = calendar();
        assert_eq!(cal.state_on(d(2)).intensity, 0.0);
        assert_eq!(cal.state_on(d(10)).intensity, 1.2);
        assert_eq!(cal.state_on(d(23)).intensity, 0.6);
        assert_eq!(cal.state_on(d(28)).intensity, 1.0);
    }

    #[test]
    fn sampling_leaves_rng_untouched() {
        use rand::Rng;
        let cal = calendar();
        let mut rng = StdRng::seed_from_u64(7);
        let mut reference = StdRng::seed_from_u64(7);
        let ctx = SignalContext::new(d(10).and_hms_opt(12, 0, 0).unwrap());
        assert_eq!(cal.sample(&ctx, &mut rng).period, AcademicPeriod::Exam);
        assert_eq!(rng.random::<u64>(), reference.random::<u64>());
    }

    #[test]
    fn labels_parse_back() {
        for p in [
            AcademicPeriod::Regular,
            AcademicPeriod::Exam,
            AcademicPeriod::Vacation,
            AcademicPeriod::Holiday,
        ] {
            assert_eq!(AcademicPeriod::parse(p.as_str()), Some(p));
        }
        assert_eq!(AcademicPeriod::parse("term"), None);
    }
}
