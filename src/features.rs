//! Model-ready analytical table: comfort-band pressure, Y lags, resampling.
//!
//! The same assembly runs on simulated records and on ingested real-data
//! observations, so downstream models see one schema regardless of source.

use std::path::Path;

use chrono::{Duration, NaiveDateTime, Timelike};
use tracing::{info, warn};

use crate::config::{FeatureConfig, MINUTES_PER_DAY};
use crate::error::{ClaroError, ConfigError, ConfigErrors};
use crate::io::export::export_csv;
use crate::io::ingest::{InputSource, read_observations};
use crate::signals::AcademicPeriod;
use crate::sim::types::IntervalRecord;

/// Distance of `temp_out_c` from the comfort band `[low, high]`.
///
/// Zero inside the band, growing linearly outside it.
pub fn temp_pressure(temp_out_c: f64, low: f64, high: f64) -> f64 {
    (low - temp_out_c).max(temp_out_c - high).max(0.0)
}

/// Simulation-only constructs carried through to the table.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedExtras {
    pub period: AcademicPeriod,
    pub academic_intensity: f64,
    pub extended_hours: bool,
    pub special_event: bool,
    pub building_factor: f64,
    pub availability: f64,
    pub activation: f64,
}

/// One interval of input to the assembler, simulated or real.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub y_kwh: f64,
    pub occupancy: f64,
    pub temp_out_c: f64,
    pub open: bool,
    pub extras: Option<SimulatedExtras>,
}

impl From<&IntervalRecord> for Observation {
    fn from(r: &IntervalRecord) -> Self {
        Self {
            timestamp: r.timestamp,
            y_kwh: r.y_kwh,
            occupancy: r.occupancy,
            temp_out_c: r.temp_out_c,
            open: r.regime.open,
            extras: Some(SimulatedExtras {
                period: r.calendar.period,
                academic_intensity: r.calendar.intensity,
                extended_hours: r.regime.extended_hours,
                special_event: r.regime.special_event,
                building_factor: r.building_factor,
                availability: r.availability,
                activation: r.activation,
            }),
        }
    }
}

/// One row of the analytical table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub timestamp: NaiveDateTime,
    pub y_kwh: f64,
    pub occupancy: f64,
    pub temp_out_c: f64,
    pub temp_pressure: f64,
    pub open: bool,
    pub extras: Option<SimulatedExtras>,
    /// `Y_lag_k` per configured lag; `None` where the lag precedes the table.
    pub y_lags: Vec<Option<f64>>,
}

/// Interval-indexed analytical table with a stable column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    freq_minutes: u32,
    lags: Vec<usize>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Joins observations row-wise and derives `X2_temp_pressure` and lags.
    ///
    /// Observations must already be ordered and evenly spaced at
    /// `freq_minutes`; see [`crate::io::ingest`] for shape validation.
    pub fn assemble(observations: Vec<Observation>, freq_minutes: u32, config: &FeatureConfig) -> Self {
        let rows = observations
            .into_iter()
            .map(|o| FeatureRow {
                timestamp: o.timestamp,
                y_kwh: o.y_kwh,
                occupancy: o.occupancy,
                temp_pressure: temp_pressure(o.temp_out_c, config.comfort_low_c, config.comfort_high_c),
                temp_out_c: o.temp_out_c,
                open: o.open,
                extras: o.extras,
                y_lags: Vec::new(),
            })
            .collect();
        let mut table = Self {
            freq_minutes,
            lags: config.y_lags.clone(),
            rows,
        };
        table.fill_lags();
        table
    }

    /// Builds the table straight from simulated records.
    pub fn from_records(records: &[IntervalRecord], freq_minutes: u32, config: &FeatureConfig) -> Self {
        Self::assemble(records.iter().map(Observation::from).collect(), freq_minutes, config)
    }

    fn fill_lags(&mut self) {
        let y: Vec<f64> = self.rows.iter().map(|r| r.y_kwh).collect();
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.y_lags = self
                .lags
                .iter()
                .map(|&k| i.checked_sub(k).map(|j| y[j]))
                .collect();
        }
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn freq_minutes(&self) -> u32 {
        self.freq_minutes
    }

    /// Configured Y lags, in column order.
    pub fn lags(&self) -> &[usize] {
        &self.lags
    }

    /// Whether every row carries the simulation-only columns.
    pub fn has_extras(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|r| r.extras.is_some())
    }

    /// Rows with at least one undefined lag.
    pub fn incomplete_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.y_lags.iter().any(Option::is_none))
            .count()
    }

    /// Removes rows with undefined lags and returns how many were removed.
    pub fn drop_incomplete(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| r.y_lags.iter().all(Option::is_some));
        before - self.rows.len()
    }

    /// Downsamples to `target_freq` minutes by averaging each bucket.
    ///
    /// Buckets are aligned to midnight. Numeric columns are averaged, X3 is
    /// open when the building was open for at least half the bucket, and
    /// the simulation-only columns are dropped. Lags are recomputed on the
    /// resampled grid.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `target_freq` does not divide a day or is
    /// not a multiple of the current resolution.
    pub fn resample_mean(&self, target_freq: u32) -> Result<Self, ConfigError> {
        if target_freq == 0 || MINUTES_PER_DAY % target_freq != 0 {
            return Err(ConfigError::new(
                "target_freq_minutes",
                format!("must evenly divide 1440, got {target_freq}"),
            ));
        }
        if target_freq % self.freq_minutes != 0 {
            return Err(ConfigError::new(
                "target_freq_minutes",
                format!(
                    "must be a multiple of the input resolution ({} min), got {target_freq}",
                    self.freq_minutes
                ),
            ));
        }
        if target_freq == self.freq_minutes {
            return Ok(self.clone());
        }

        let mut rows: Vec<FeatureRow> = Vec::new();
        let mut bucket: Vec<&FeatureRow> = Vec::new();
        let mut current: Option<NaiveDateTime> = None;
        for row in &self.rows {
            let start = bucket_start(row.timestamp, target_freq);
            if current.is_some_and(|c| c != start) {
                rows.extend(average_bucket(current, &bucket));
                bucket.clear();
            }
            current = Some(start);
            bucket.push(row);
        }
        rows.extend(average_bucket(current, &bucket));

        let mut table = Self {
            freq_minutes: target_freq,
            lags: self.lags.clone(),
            rows,
        };
        table.fill_lags();
        Ok(table)
    }
}

fn bucket_start(ts: NaiveDateTime, freq: u32) -> NaiveDateTime {
    let minute_of_day = ts.hour() * 60 + ts.minute();
    let floor = minute_of_day - minute_of_day % freq;
    let midnight = ts.date().and_hms_opt(0, 0, 0).unwrap_or(ts);
    midnight + Duration::minutes(i64::from(floor))
}

fn average_bucket(start: Option<NaiveDateTime>, bucket: &[&FeatureRow]) -> Option<FeatureRow> {
    let timestamp = start?;
    if bucket.is_empty() {
        return None;
    }
    let n = bucket.len() as f64;
    let mean = |f: fn(&FeatureRow) -> f64| bucket.iter().map(|r| f(r)).sum::<f64>() / n;
    let open_share = bucket.iter().filter(|r| r.open).count() as f64 / n;
    Some(FeatureRow {
        timestamp,
        y_kwh: mean(|r| r.y_kwh),
        occupancy: mean(|r| r.occupancy),
        temp_out_c: mean(|r| r.temp_out_c),
        temp_pressure: mean(|r| r.temp_pressure),
        open: open_share >= 0.5,
        extras: None,
        y_lags: Vec::new(),
    })
}

/// Options for rebuilding the analytical table from a CSV file.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub source: InputSource,
    /// Declared input resolution; inferred from the first spacing when unset.
    pub input_freq_minutes: Option<u32>,
    /// Resample to this resolution before deriving lags.
    pub target_freq_minutes: Option<u32>,
    /// Remove rows whose lags are undefined.
    pub drop_incomplete: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            source: InputSource::Simulated,
            input_freq_minutes: None,
            target_freq_minutes: None,
            drop_incomplete: false,
        }
    }
}

/// Reads `input`, rebuilds the analytical table, and writes it to `output`.
///
/// # Errors
///
/// Returns an error if the input cannot be read or fails shape validation,
/// if the configuration or target resolution is invalid, or if the output
/// cannot be written.
pub fn build_from_path(
    input: &Path,
    output: &Path,
    config: &FeatureConfig,
    options: &BuildOptions,
) -> Result<FeatureTable, ClaroError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigErrors(errors).into());
    }
    let (observations, freq) = read_observations(input, options.source, options.input_freq_minutes)?;
    info!(rows = observations.len(), freq_minutes = freq, input = %input.display(), "read observations");

    let mut table = FeatureTable::assemble(observations, freq, config);
    if let Some(target) = options.target_freq_minutes {
        table = table.resample_mean(target)?;
        info!(rows = table.len(), freq_minutes = target, "resampled");
    }

    if options.drop_incomplete {
        let dropped = table.drop_incomplete();
        warn!(dropped, "removed rows with undefined lags");
    } else if table.incomplete_rows() > 0 {
        info!(rows = table.incomplete_rows(), "rows with undefined lags kept as NaN");
    }

    export_csv(&table, output)?;
    Ok(table)
}
