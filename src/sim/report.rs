//! Post-hoc diagnostics computed from a completed run.

use std::fmt;

use super::types::IntervalRecord;

/// Aggregate diagnostics derived from a complete simulation run.
///
/// Computed post-hoc from the record vector so that reported figures always
/// match the written table.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Number of intervals generated.
    pub rows: usize,
    /// Intervals with the building open.
    pub open_rows: usize,
    /// Leading intervals whose lags used the warm-up baseline.
    pub warmup_rows: usize,
    /// Intervals where Y was clipped at zero.
    pub clipped_rows: usize,
    /// Closed intervals whose occupancy exceeded the near-zero threshold.
    pub gating_violations: usize,
    /// Total consumption over the run (kWh).
    pub total_kwh: f64,
    /// Highest single-interval consumption (kWh).
    pub peak_kwh: f64,
    /// Mean consumption per open interval (kWh).
    pub mean_open_kwh: f64,
    /// Mean consumption per closed interval (kWh).
    pub mean_closed_kwh: f64,
    /// Mean M1 activation while open.
    pub mean_open_activation: f64,
    /// Largest temperature pressure seen.
    pub max_temp_pressure: f64,
}

impl RunReport {
    /// Computes all diagnostics from the complete record vector.
    ///
    /// # Arguments
    ///
    /// * `records` - Complete simulation records
    /// * `closed_threshold` - Occupancy at or below which a closed interval counts as empty
    pub fn from_records(records: &[IntervalRecord], closed_threshold: f64) -> Self {
        let mut report = Self {
            rows: records.len(),
            open_rows: 0,
            warmup_rows: 0,
            clipped_rows: 0,
            gating_violations: 0,
            total_kwh: 0.0,
            peak_kwh: 0.0,
            mean_open_kwh: 0.0,
            mean_closed_kwh: 0.0,
            mean_open_activation: 0.0,
            max_temp_pressure: 0.0,
        };

        let mut open_kwh = 0.0_f64;
        let mut closed_kwh = 0.0_f64;
        let mut open_activation = 0.0_f64;

        for r in records {
            report.total_kwh += r.y_kwh;
            report.peak_kwh = report.peak_kwh.max(r.y_kwh);
            report.max_temp_pressure = report.max_temp_pressure.max(r.temp_pressure);
            if r.warmup {
                report.warmup_rows += 1;
            }
            if r.y_clipped {
                report.clipped_rows += 1;
            }
            if r.regime.open {
                report.open_rows += 1;
                open_kwh += r.y_kwh;
                open_activation += r.activation;
            } else {
                closed_kwh += r.y_kwh;
                if r.occupancy > closed_threshold {
                    report.gating_violations += 1;
                }
            }
        }

        let closed_rows = report.rows - report.open_rows;
        if report.open_rows > 0 {
            report.mean_open_kwh = open_kwh / report.open_rows as f64;
            report.mean_open_activation = open_activation / report.open_rows as f64;
        }
        if closed_rows > 0 {
            report.mean_closed_kwh = closed_kwh / closed_rows as f64;
        }
        report
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Run Report ===")?;
        writeln!(
            f,
            "Rows:                  {} ({} open, {} warm-up)",
            self.rows, self.open_rows, self.warmup_rows
        )?;
        writeln!(f, "Total consumption:     {:.1} kWh", self.total_kwh)?;
        writeln!(f, "Peak interval:         {:.2} kWh", self.peak_kwh)?;
        writeln!(f, "Mean open interval:    {:.2} kWh", self.mean_open_kwh)?;
        writeln!(f, "Mean closed interval:  {:.2} kWh", self.mean_closed_kwh)?;
        writeln!(f, "Mean open activation:  {:.3}", self.mean_open_activation)?;
        writeln!(f, "Max temp pressure:     {:.2} C", self.max_temp_pressure)?;
        writeln!(f, "Clipped Y rows:        {}", self.clipped_rows)?;
        write!(f, "Gating violations:     {}", self.gating_violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_epoch;
    use crate::signals::{CalendarState, RegimeState};

    fn record(index: usize, open: bool, y: f64, occupancy: f64) -> IntervalRecord {
        IntervalRecord {
            index,
            timestamp: default_epoch(),
            calendar: CalendarState::default(),
            regime: if open {
                RegimeState::default()
            } else {
                RegimeState::CLOSED
            },
            occupancy,
            temp_out_c: 10.0,
            temp_pressure: 10.0,
            building_factor: 1.0,
            availability: 1.0,
            activation: if open { 1.0 } else { 0.0 },
            y_kwh: y,
            warmup: index == 0,
            y_clipped: y == 0.0,
        }
    }

    #[test]
    fn empty_results_produce_zero_report() {
        let report = RunReport::from_records(&[], 1e-6);
        assert_eq!(report.rows, 0);
        assert_eq!(report.total_kwh, 0.0);
        assert_eq!(report.mean_open_kwh, 0.0);
    }

    #[test]
    fn splits_open_and_closed() {
        let records = vec![
            record(0, false, 8.0, 0.0),
            record(1, true, 20.0, 50.0),
            record(2, true, 30.0, 60.0),
            record(3, false, 0.0, 0.0),
        ];
        let report = RunReport::from_records(&records, 1e-6);
        assert_eq!(report.rows, 4);
        assert_eq!(report.open_rows, 2);
        assert_eq!(report.warmup_rows, 1);
        assert_eq!(report.clipped_rows, 1);
        assert_eq!(report.total_kwh, 58.0);
        assert_eq!(report.peak_kwh, 30.0);
        assert_eq!(report.mean_open_kwh, 25.0);
        assert_eq!(report.mean_closed_kwh, 4.0);
        assert_eq!(report.mean_open_activation, 1.0);
        assert_eq!(report.gating_violations, 0);
    }

    #[test]
    fn counts_gating_violations() {
        let records = vec![record(0, false, 8.0, 5.0), record(1, false, 8.0, 0.0)];
        let report = RunReport::from_records(&records, 1e-6);
        assert_eq!(report.gating_violations, 1);
    }

    #[test]
    fn display_does_not_panic() {
        let report = RunReport::from_records(&[record(0, true, 12.0, 40.0)], 1e-6);
        let s = format!("{report}");
        assert!(s.contains("Run Report"));
    }
}
