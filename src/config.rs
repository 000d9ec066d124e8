//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::sim::grid::grid_end;

/// Minutes in one day; the grid frequency must divide it.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Longest run accepted, roughly a century of days.
pub const MAX_N_DAYS: i64 = 36_600;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Time grid and seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Academic calendar (C1).
    #[serde(default)]
    pub calendar: CalendarConfig,
    /// Opening schedule and overrides (X3).
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Outdoor temperature generator (X2).
    #[serde(default)]
    pub temperature: TemperatureConfig,
    /// Occupancy generator (X1).
    #[serde(default)]
    pub occupancy: OccupancyConfig,
    /// Mediator and outcome composer (M1, Y).
    #[serde(default)]
    pub outcome: OutcomeConfig,
    /// Derived feature columns.
    #[serde(default)]
    pub features: FeatureConfig,
}

/// Time grid and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of days to simulate (must be > 0).
    pub n_days: i64,
    /// Interval length in minutes (must divide 1440).
    pub freq_minutes: u32,
    /// Master random seed.
    pub seed: u64,
    /// Start of the first interval.
    pub start: NaiveDateTime,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_days: 60,
            freq_minutes: 60,
            seed: 123,
            start: default_epoch(),
        }
    }
}

/// Fixed simulation epoch, 2025-01-01T00:00:00.
pub fn default_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns `true` when `date` falls within `[start, end]`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Academic calendar: institutional periods and their intensity multipliers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    /// Closed days (building shut regardless of schedule).
    pub holidays: Vec<DateRange>,
    /// Exam periods (higher occupancy, optionally extended hours).
    pub exam_periods: Vec<DateRange>,
    /// Teaching breaks with the building open but quieter.
    pub vacations: Vec<DateRange>,
    pub regular_intensity: f64,
    pub exam_intensity: f64,
    pub vacation_intensity: f64,
    pub holiday_intensity: f64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            holidays: Vec::new(),
            exam_periods: Vec::new(),
            vacations: Vec::new(),
            regular_intensity: 1.0,
            exam_intensity: 1.2,
            vacation_intensity: 0.6,
            holiday_intensity: 0.0,
        }
    }
}

/// Weekly opening schedule with override flags.
///
/// Hours are fractional hours of day; the building is open when
/// `open_hour <= hour < close_hour`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    pub weekday_open_hour: f64,
    pub weekday_close_hour: f64,
    pub weekend_open_hour: f64,
    pub weekend_close_hour: f64,
    pub extended_hours: ExtendedHoursConfig,
    pub special_events: Vec<SpecialEventConfig>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            weekday_open_hour: 8.0,
            weekday_close_hour: 22.0,
            weekend_open_hour: 10.0,
            weekend_close_hour: 18.0,
            extended_hours: ExtendedHoursConfig::default(),
            special_events: Vec::new(),
        }
    }
}

/// Extended opening hours, typically during exams.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtendedHoursConfig {
    pub enabled: bool,
    /// Only extend on days inside an exam period.
    pub exam_periods_only: bool,
    pub extra_hours_before: f64,
    pub extra_hours_after: f64,
}

impl Default for ExtendedHoursConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            exam_periods_only: true,
            extra_hours_before: 0.0,
            extra_hours_after: 2.0,
        }
    }
}

/// One-off event widening the open window on a single date.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecialEventConfig {
    pub date: NaiveDate,
    pub open_hour: f64,
    pub close_hour: f64,
}

/// Outdoor temperature generator parameters (degrees Celsius).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemperatureConfig {
    /// Annual mean temperature.
    pub mean_c: f64,
    /// Seasonal sinusoid amplitude (365-day period).
    pub seasonal_amp_c: f64,
    /// Daily sinusoid amplitude (24 h period).
    pub daily_amp_c: f64,
    /// Hour at which the daily sinusoid crosses zero on the way up.
    pub coldest_hour: f64,
    /// Gaussian noise standard deviation.
    pub noise_sigma_c: f64,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            mean_c: 8.0,
            seasonal_amp_c: 9.0,
            daily_amp_c: 3.5,
            coldest_hour: 5.0,
            noise_sigma_c: 0.8,
        }
    }
}

/// Occupancy proxy generator parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OccupancyConfig {
    /// Peak occupancy at unit academic intensity.
    pub capacity: f64,
    pub midday_peak_hour: f64,
    pub midday_peak_width: f64,
    pub midday_peak_weight: f64,
    pub evening_peak_hour: f64,
    pub evening_peak_width: f64,
    pub evening_peak_weight: f64,
    /// Saturday/Sunday multiplier.
    pub weekend_multiplier: f64,
    pub noise_sigma: f64,
    /// Noise is bounded to `+/- noise_bound_sigmas * noise_sigma`.
    pub noise_bound_sigmas: f64,
    /// Upper clip for the occupancy proxy.
    pub max_occupancy: f64,
    /// Occupancy at or below this value counts as an empty building.
    pub closed_threshold: f64,
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        Self {
            capacity: 180.0,
            midday_peak_hour: 13.0,
            midday_peak_width: 3.5,
            midday_peak_weight: 0.6,
            evening_peak_hour: 18.0,
            evening_peak_width: 2.8,
            evening_peak_weight: 0.4,
            weekend_multiplier: 0.65,
            noise_sigma: 8.0,
            noise_bound_sigmas: 3.0,
            max_occupancy: 220.0,
            closed_threshold: 1e-6,
        }
    }
}

/// Mediator (M1) and outcome (Y) coefficients.
///
/// None of these are calibrated; they only preserve the qualitative causal
/// story (regime gating, comfort-band nonlinearity, temporal memory).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutcomeConfig {
    /// X4 structural baseline shifter (>1 = more demanding building).
    pub building_factor: f64,
    /// X5 availability fraction while closed.
    pub closed_availability: f64,
    /// Baseline consumption per interval while closed (kWh).
    pub base_kwh_when_closed: f64,
    /// Baseline consumption per interval while open (kWh).
    pub base_kwh_when_open: f64,
    pub occ_to_activation: f64,
    pub temp_to_activation: f64,
    pub regime_to_activation: f64,
    /// Upper clip for M1.
    pub max_activation: f64,
    /// Multiplier applied to M1 while closed.
    pub closed_activation_gate: f64,
    pub activation_to_kwh: f64,
    pub direct_temp_to_kwh: f64,
    /// Inertia weight on `Y[t-1]`.
    pub short_lag_weight: f64,
    /// Inertia weight on `Y[t-long_lag_steps]`.
    pub long_lag_weight: f64,
    /// Long inertia lag in intervals; one day of intervals when unset.
    pub long_lag_steps: Option<usize>,
    /// Substitute for lagged Y during the warm-up rows.
    pub warmup_baseline_kwh: f64,
    pub noise_sigma: f64,
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            building_factor: 1.10,
            closed_availability: 0.7,
            base_kwh_when_closed: 8.0,
            base_kwh_when_open: 18.0,
            occ_to_activation: 0.020,
            temp_to_activation: 0.060,
            regime_to_activation: 0.35,
            max_activation: 2.0,
            closed_activation_gate: 0.05,
            activation_to_kwh: 35.0,
            direct_temp_to_kwh: 0.50,
            short_lag_weight: 0.65,
            long_lag_weight: 0.10,
            long_lag_steps: None,
            warmup_baseline_kwh: 8.0,
            noise_sigma: 2.5,
        }
    }
}

/// Derived feature parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureConfig {
    /// Lower comfort-band bound (degrees Celsius).
    pub comfort_low_c: f64,
    /// Upper comfort-band bound (degrees Celsius).
    pub comfort_high_c: f64,
    /// Lags of Y emitted as `Y_lag_k` columns, in output order.
    pub y_lags: Vec<usize>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            comfort_low_c: 20.0,
            comfort_high_c: 23.0,
            y_lags: vec![1, 24],
        }
    }
}

impl FeatureConfig {
    /// Checks the comfort band and lag list.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("features.comfort_low_c", self.comfort_low_c),
            ("features.comfort_high_c", self.comfort_high_c),
        ] {
            if !value.is_finite() {
                errors.push(ConfigError::new(field, "must be finite"));
            }
        }
        if self.comfort_low_c > self.comfort_high_c {
            errors.push(ConfigError::new(
                "features.comfort_low_c",
                "must be <= features.comfort_high_c",
            ));
        }
        if self.y_lags.contains(&0) {
            errors.push(ConfigError::new("features.y_lags", "lags must be > 0"));
        }
        let duplicated = self
            .y_lags
            .iter()
            .enumerate()
            .any(|(i, k)| self.y_lags[..i].contains(k));
        if duplicated {
            errors.push(ConfigError::new("features.y_lags", "lags must be unique"));
        }
        errors
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: regular term, no calendar periods.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the exam-season preset: every simulated day is an exam day
    /// with two extra evening hours.
    pub fn exam_season() -> Self {
        let start = default_epoch().date();
        let end = start + chrono::Days::new(365);
        Self {
            calendar: CalendarConfig {
                exam_periods: vec![DateRange::new(start, end)],
                ..CalendarConfig::default()
            },
            schedule: ScheduleConfig {
                extended_hours: ExtendedHoursConfig {
                    enabled: true,
                    extra_hours_after: 2.0,
                    ..ExtendedHoursConfig::default()
                },
                ..ScheduleConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the winter-break preset: closed until Epiphany, then a
    /// quiet vacation week before the January exams.
    pub fn winter_break() -> Self {
        let d = |m: u32, day: u32| NaiveDate::from_ymd_opt(2025, m, day).unwrap_or_default();
        Self {
            calendar: CalendarConfig {
                holidays: vec![DateRange::new(d(1, 1), d(1, 6))],
                vacations: vec![DateRange::new(d(1, 7), d(1, 12))],
                exam_periods: vec![DateRange::new(d(1, 13), d(1, 31))],
                ..CalendarConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "exam_season", "winter_break"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "exam_season" => Ok(Self::exam_season()),
            "winter_break" => Ok(Self::winter_break()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Number of grid intervals per day. Only meaningful on a validated config.
    pub fn steps_per_day(&self) -> usize {
        match self.simulation.freq_minutes {
            0 => 0,
            f => (MINUTES_PER_DAY / f) as usize,
        }
    }

    /// Long inertia lag in intervals, resolving the one-day default.
    pub fn long_lag_steps(&self) -> usize {
        self.outcome
            .long_lag_steps
            .unwrap_or_else(|| self.steps_per_day())
    }

    fn float_fields(&self) -> Vec<(&'static str, f64)> {
        let c = &self.calendar;
        let sch = &self.schedule;
        let t = &self.temperature;
        let o = &self.occupancy;
        let y = &self.outcome;
        vec![
            ("calendar.regular_intensity", c.regular_intensity),
            ("calendar.exam_intensity", c.exam_intensity),
            ("calendar.vacation_intensity", c.vacation_intensity),
            ("calendar.holiday_intensity", c.holiday_intensity),
            ("schedule.extended_hours.extra_hours_before", sch.extended_hours.extra_hours_before),
            ("schedule.extended_hours.extra_hours_after", sch.extended_hours.extra_hours_after),
            ("temperature.mean_c", t.mean_c),
            ("temperature.seasonal_amp_c", t.seasonal_amp_c),
            ("temperature.daily_amp_c", t.daily_amp_c),
            ("temperature.coldest_hour", t.coldest_hour),
            ("temperature.noise_sigma_c", t.noise_sigma_c),
            ("occupancy.capacity", o.capacity),
            ("occupancy.midday_peak_hour", o.midday_peak_hour),
            ("occupancy.midday_peak_width", o.midday_peak_width),
            ("occupancy.midday_peak_weight", o.midday_peak_weight),
            ("occupancy.evening_peak_hour", o.evening_peak_hour),
            ("occupancy.evening_peak_width", o.evening_peak_width),
            ("occupancy.evening_peak_weight", o.evening_peak_weight),
            ("occupancy.weekend_multiplier", o.weekend_multiplier),
            ("occupancy.noise_sigma", o.noise_sigma),
            ("occupancy.noise_bound_sigmas", o.noise_bound_sigmas),
            ("occupancy.max_occupancy", o.max_occupancy),
            ("occupancy.closed_threshold", o.closed_threshold),
            ("outcome.building_factor", y.building_factor),
            ("outcome.closed_availability", y.closed_availability),
            ("outcome.base_kwh_when_closed", y.base_kwh_when_closed),
            ("outcome.base_kwh_when_open", y.base_kwh_when_open),
            ("outcome.occ_to_activation", y.occ_to_activation),
            ("outcome.temp_to_activation", y.temp_to_activation),
            ("outcome.regime_to_activation", y.regime_to_activation),
            ("outcome.max_activation", y.max_activation),
            ("outcome.closed_activation_gate", y.closed_activation_gate),
            ("outcome.activation_to_kwh", y.activation_to_kwh),
            ("outcome.direct_temp_to_kwh", y.direct_temp_to_kwh),
            ("outcome.short_lag_weight", y.short_lag_weight),
            ("outcome.long_lag_weight", y.long_lag_weight),
            ("outcome.warmup_baseline_kwh", y.warmup_baseline_kwh),
            ("outcome.noise_sigma", y.noise_sigma),
        ]
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigError::new(field, message));
            }
        };

        for (field, value) in self.float_fields() {
            check(value.is_finite(), field, "must be finite");
        }

        let s = &self.simulation;
        check(s.n_days > 0, "simulation.n_days", "must be > 0");
        check(
            s.n_days <= MAX_N_DAYS,
            "simulation.n_days",
            "must be <= 36600",
        );
        check(
            s.n_days <= 0 || s.n_days > MAX_N_DAYS || grid_end(s.start, s.n_days).is_some(),
            "simulation.n_days",
            "grid ends past the representable date range",
        );
        check(s.freq_minutes > 0, "simulation.freq_minutes", "must be > 0");
        check(
            s.freq_minutes == 0 || MINUTES_PER_DAY % s.freq_minutes == 0,
            "simulation.freq_minutes",
            "must evenly divide 1440",
        );

        let c = &self.calendar;
        for (name, ranges) in [
            ("calendar.holidays", &c.holidays),
            ("calendar.exam_periods", &c.exam_periods),
            ("calendar.vacations", &c.vacations),
        ] {
            check(
                ranges.iter().all(|r| r.start <= r.end),
                name,
                "every range needs start <= end",
            );
        }
        for (name, v) in [
            ("calendar.regular_intensity", c.regular_intensity),
            ("calendar.exam_intensity", c.exam_intensity),
            ("calendar.vacation_intensity", c.vacation_intensity),
            ("calendar.holiday_intensity", c.holiday_intensity),
        ] {
            check(v >= 0.0, name, "must be >= 0");
        }

        let sch = &self.schedule;
        check(
            valid_window(sch.weekday_open_hour, sch.weekday_close_hour),
            "schedule.weekday_open_hour",
            "need 0 <= open < close <= 24",
        );
        check(
            valid_window(sch.weekend_open_hour, sch.weekend_close_hour),
            "schedule.weekend_open_hour",
            "need 0 <= open < close <= 24",
        );
        let ext = &sch.extended_hours;
        check(
            ext.extra_hours_before >= 0.0 && ext.extra_hours_after >= 0.0,
            "schedule.extended_hours",
            "extra hours must be >= 0",
        );
        check(
            sch.special_events
                .iter()
                .all(|e| valid_window(e.open_hour, e.close_hour)),
            "schedule.special_events",
            "every event needs 0 <= open_hour < close_hour <= 24",
        );

        let t = &self.temperature;
        check(t.noise_sigma_c >= 0.0, "temperature.noise_sigma_c", "must be >= 0");

        let o = &self.occupancy;
        check(o.capacity >= 0.0, "occupancy.capacity", "must be >= 0");
        check(
            o.midday_peak_width > 0.0 && o.evening_peak_width > 0.0,
            "occupancy.peak_width",
            "peak widths must be > 0",
        );
        check(
            o.midday_peak_weight >= 0.0 && o.evening_peak_weight >= 0.0,
            "occupancy.peak_weight",
            "peak weights must be >= 0",
        );
        check(o.weekend_multiplier >= 0.0, "occupancy.weekend_multiplier", "must be >= 0");
        check(o.noise_sigma >= 0.0, "occupancy.noise_sigma", "must be >= 0");
        check(o.noise_bound_sigmas >= 0.0, "occupancy.noise_bound_sigmas", "must be >= 0");
        check(o.max_occupancy > 0.0, "occupancy.max_occupancy", "must be > 0");
        check(o.closed_threshold >= 0.0, "occupancy.closed_threshold", "must be >= 0");

        let y = &self.outcome;
        check(y.building_factor > 0.0, "outcome.building_factor", "must be > 0");
        check(
            (0.0..=1.0).contains(&y.closed_availability),
            "outcome.closed_availability",
            "must be in [0.0, 1.0]",
        );
        check(
            y.base_kwh_when_closed >= 0.0 && y.base_kwh_when_open >= 0.0,
            "outcome.base_kwh",
            "baselines must be >= 0",
        );
        check(y.max_activation > 0.0, "outcome.max_activation", "must be > 0");
        check(
            (0.0..=1.0).contains(&y.closed_activation_gate),
            "outcome.closed_activation_gate",
            "must be in [0.0, 1.0]",
        );
        check(
            (0.0..=1.0).contains(&y.short_lag_weight),
            "outcome.short_lag_weight",
            "must be in [0.0, 1.0]",
        );
        check(
            (0.0..=1.0).contains(&y.long_lag_weight),
            "outcome.long_lag_weight",
            "must be in [0.0, 1.0]",
        );
        check(
            y.short_lag_weight + y.long_lag_weight <= 1.0,
            "outcome.long_lag_weight",
            "short_lag_weight + long_lag_weight must be <= 1",
        );
        check(
            y.long_lag_steps != Some(0),
            "outcome.long_lag_steps",
            "must be > 0",
        );
        check(
            y.warmup_baseline_kwh >= 0.0,
            "outcome.warmup_baseline_kwh",
            "must be >= 0",
        );
        check(y.noise_sigma >= 0.0, "outcome.noise_sigma", "must be >= 0");

        errors.extend(self.features.validate());
        errors
    }
}

fn valid_window(open: f64, close: f64) -> bool {
    (0.0..=24.0).contains(&open) && (0.0..=24.0).contains(&close) && open < close
}
