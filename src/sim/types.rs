//! Core simulation types: the per-interval record of every construct.

use std::fmt;

use chrono::NaiveDateTime;

use crate::signals::{CalendarState, RegimeState};

/// Complete record of one simulated interval.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalRecord {
    /// Position on the time grid.
    pub index: usize,
    /// Interval start.
    pub timestamp: NaiveDateTime,
    /// C1 calendar state.
    pub calendar: CalendarState,
    /// X3 regime and override flags.
    pub regime: RegimeState,
    /// X1 occupancy proxy.
    pub occupancy: f64,
    /// X2 outdoor temperature (degrees Celsius).
    pub temp_out_c: f64,
    /// Distance of X2 from the comfort band.
    pub temp_pressure: f64,
    /// X4 structural baseline shifter.
    pub building_factor: f64,
    /// X5 system availability.
    pub availability: f64,
    /// M1 activation intensity.
    pub activation: f64,
    /// Y energy consumption for the interval (kWh).
    pub y_kwh: f64,
    /// At least one lag term used the warm-up baseline.
    pub warmup: bool,
    /// Y was clipped at zero.
    pub y_clipped: bool,
}

impl fmt::Display for IntervalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>4} {} | {:<8} open={} | occ={:>6.1} temp={:>5.1}C tp={:>4.1} | \
             M1={:.3} Y={:>6.2} kWh{}",
            self.index,
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.calendar.period.as_str(),
            self.regime.as_flag(),
            self.occupancy,
            self.temp_out_c,
            self.temp_pressure,
            self.activation,
            self.y_kwh,
            if self.warmup { " (warm-up)" } else { "" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_epoch;

    #[test]
    fn display_does_not_panic() {
        let r = IntervalRecord {
            index: 0,
            timestamp: default_epoch(),
            calendar: CalendarState::default(),
            regime: RegimeState::CLOSED,
            occupancy: 0.0,
            temp_out_c: 4.2,
            temp_pressure: 15.8,
            building_factor: 1.1,
            availability: 0.77,
            activation: 0.04,
            y_kwh: 9.1,
            warmup: true,
            y_clipped: false,
        };
        let s = format!("{r}");
        assert!(s.contains("warm-up"));
        assert!(s.contains("open=0"));
    }
}
