//! CSV ingestion of simulated or real observations, with shape validation.
//!
//! Two layouts are accepted. `Simulated` reads the simulator's own output;
//! `Raw` reads the upstream data contract, where each raw proxy maps onto
//! one construct:
//!
//! | raw column              | construct            |
//! |-------------------------|----------------------|
//! | `energy_kwh`            | `Y_kwh`              |
//! | `occupancy_proxy_value` | `X1_occupancy_proxy` |
//! | `temp_outdoor_c`        | `X2_temp_out`        |
//! | `open`                  | `X3_open`            |

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::debug;

use crate::config::MINUTES_PER_DAY;
use crate::error::{ClaroError, DataShapeError};
use crate::features::{Observation, SimulatedExtras};
use crate::signals::AcademicPeriod;

/// Which column layout the input uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputSource {
    #[default]
    Simulated,
    Raw,
}

impl FromStr for InputSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simulated" => Ok(Self::Simulated),
            "raw" => Ok(Self::Raw),
            other => Err(format!("unknown input source \"{other}\", expected simulated or raw")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SimulatedRow {
    timestamp: String,
    #[serde(rename = "Y_kwh")]
    y_kwh: f64,
    #[serde(rename = "X1_occupancy_proxy")]
    occupancy: f64,
    #[serde(rename = "X2_temp_out")]
    temp_out_c: f64,
    #[serde(rename = "X3_open")]
    open: String,
    #[serde(rename = "C1_period", default)]
    period: Option<String>,
    #[serde(rename = "C1_academic_intensity", default)]
    academic_intensity: Option<f64>,
    #[serde(rename = "X3_extended_hours", default)]
    extended_hours: Option<String>,
    #[serde(rename = "X3_special_event", default)]
    special_event: Option<String>,
    #[serde(rename = "X4_building_factor", default)]
    building_factor: Option<f64>,
    #[serde(rename = "X5_availability", default)]
    availability: Option<f64>,
    #[serde(rename = "M1_activation", default)]
    activation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    timestamp: String,
    energy_kwh: f64,
    occupancy_proxy_value: f64,
    temp_outdoor_c: f64,
    open: String,
}

/// Timestamp layouts accepted on input.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a timestamp in any accepted layout.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Parses a 0/1 flag, also accepting `true`/`false` and `1.0`/`0.0`.
fn parse_flag(value: &str, row: usize, column: &'static str) -> Result<bool, DataShapeError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" => Ok(true),
        "0" | "0.0" | "false" => Ok(false),
        _ => Err(DataShapeError::OutOfRange {
            row,
            column,
            value: value.to_string(),
            allowed: "{0, 1}",
        }),
    }
}

fn finite(value: f64, row: usize, column: &'static str) -> Result<f64, DataShapeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DataShapeError::OutOfRange {
            row,
            column,
            value: value.to_string(),
            allowed: "finite values",
        })
    }
}

fn non_negative(value: f64, row: usize, column: &'static str) -> Result<f64, DataShapeError> {
    if finite(value, row, column)? < 0.0 {
        return Err(DataShapeError::OutOfRange {
            row,
            column,
            value: value.to_string(),
            allowed: "[0, inf)",
        });
    }
    Ok(value)
}

fn timestamp_at(value: &str, row: usize) -> Result<NaiveDateTime, DataShapeError> {
    parse_timestamp(value).ok_or_else(|| DataShapeError::UnparseableTimestamp {
        row,
        value: value.to_string(),
    })
}

impl SimulatedRow {
    fn into_observation(self, row: usize) -> Result<Observation, DataShapeError> {
        let extras = match (
            self.period.as_deref(),
            self.academic_intensity,
            self.extended_hours.as_deref(),
            self.special_event.as_deref(),
            self.building_factor,
            self.availability,
            self.activation,
        ) {
            (Some(p), Some(i), Some(e), Some(s), Some(b), Some(a), Some(m)) => Some(SimulatedExtras {
                period: AcademicPeriod::parse(p).ok_or_else(|| DataShapeError::OutOfRange {
                    row,
                    column: "C1_period",
                    value: p.to_string(),
                    allowed: "{regular, exam, vacation, holiday}",
                })?,
                academic_intensity: finite(i, row, "C1_academic_intensity")?,
                extended_hours: parse_flag(e, row, "X3_extended_hours")?,
                special_event: parse_flag(s, row, "X3_special_event")?,
                building_factor: finite(b, row, "X4_building_factor")?,
                availability: finite(a, row, "X5_availability")?,
                activation: finite(m, row, "M1_activation")?,
            }),
            _ => None,
        };
        Ok(Observation {
            timestamp: timestamp_at(&self.timestamp, row)?,
            y_kwh: non_negative(self.y_kwh, row, "Y_kwh")?,
            occupancy: non_negative(self.occupancy, row, "X1_occupancy_proxy")?,
            temp_out_c: finite(self.temp_out_c, row, "X2_temp_out")?,
            open: parse_flag(&self.open, row, "X3_open")?,
            extras,
        })
    }
}

impl RawRow {
    fn into_observation(self, row: usize) -> Result<Observation, DataShapeError> {
        Ok(Observation {
            timestamp: timestamp_at(&self.timestamp, row)?,
            y_kwh: non_negative(self.energy_kwh, row, "energy_kwh")?,
            occupancy: non_negative(self.occupancy_proxy_value, row, "occupancy_proxy_value")?,
            temp_out_c: finite(self.temp_outdoor_c, row, "temp_outdoor_c")?,
            open: parse_flag(&self.open, row, "open")?,
            extras: None,
        })
    }
}

/// Parses observations from any reader and validates their shape.
///
/// Returns the observations and the resolution in minutes, either the
/// declared `freq_minutes` or the spacing of the first two rows.
///
/// # Errors
///
/// Returns `ClaroError::Csv` for malformed CSV or missing columns and
/// `ClaroError::DataShape` for structural problems.
pub fn parse_observations(
    reader: impl Read,
    source: InputSource,
    freq_minutes: Option<u32>,
) -> Result<(Vec<Observation>, u32), ClaroError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut observations = Vec::new();
    match source {
        InputSource::Simulated => {
            for (i, rec) in rdr.deserialize::<SimulatedRow>().enumerate() {
                observations.push(rec?.into_observation(i + 1)?);
            }
        }
        InputSource::Raw => {
            for (i, rec) in rdr.deserialize::<RawRow>().enumerate() {
                observations.push(rec?.into_observation(i + 1)?);
            }
        }
    }

    let timestamps: Vec<NaiveDateTime> = observations.iter().map(|o| o.timestamp).collect();
    let freq = validate_shape(&timestamps, freq_minutes)?;
    debug!(rows = observations.len(), freq_minutes = freq, ?source, "validated input shape");
    Ok((observations, freq))
}

/// Reads observations from a CSV file; see [`parse_observations`].
///
/// # Errors
///
/// Returns `ClaroError::Io` if the file cannot be opened.
pub fn read_observations(
    path: &Path,
    source: InputSource,
    freq_minutes: Option<u32>,
) -> Result<(Vec<Observation>, u32), ClaroError> {
    let file = File::open(path).map_err(|e| ClaroError::io(path, e))?;
    parse_observations(std::io::BufReader::new(file), source, freq_minutes)
}

/// Checks that timestamps are unique, increasing, gap-free, and evenly
/// spaced at a resolution that divides a day.
///
/// Row numbers in errors are 1-based data rows (the header is row 0).
///
/// # Errors
///
/// Returns the first `DataShapeError` found.
pub fn validate_shape(
    timestamps: &[NaiveDateTime],
    freq_minutes: Option<u32>,
) -> Result<u32, DataShapeError> {
    if timestamps.is_empty() {
        return Err(DataShapeError::Empty);
    }

    let freq = match freq_minutes {
        Some(f) => i64::from(f),
        None => match timestamps {
            [first, second, ..] => (*second - *first).num_minutes(),
            _ => return Err(DataShapeError::UnknownResolution),
        },
    };
    if freq <= 0 || i64::from(MINUTES_PER_DAY) % freq != 0 {
        if let [first, second, ..] = timestamps {
            check_pair(*first, *second, 2, None)?;
        }
        return Err(DataShapeError::ResolutionDoesNotDivideDay { minutes: freq });
    }

    for (i, pair) in timestamps.windows(2).enumerate() {
        check_pair(pair[0], pair[1], i + 2, Some(freq))?;
    }
    Ok(freq as u32)
}

fn check_pair(
    prev: NaiveDateTime,
    next: NaiveDateTime,
    row: usize,
    freq: Option<i64>,
) -> Result<(), DataShapeError> {
    let delta = next - prev;
    if delta.is_zero() {
        return Err(DataShapeError::DuplicateTimestamp { row, timestamp: next });
    }
    if delta < chrono::Duration::zero() {
        return Err(DataShapeError::NotIncreasing { row, timestamp: next });
    }
    let Some(freq) = freq else {
        return Ok(());
    };
    let spacing = chrono::Duration::minutes(freq);
    if delta == spacing {
        return Ok(());
    }
    let seconds = delta.num_seconds();
    if seconds % (freq * 60) == 0 {
        Err(DataShapeError::Gap {
            row,
            expected: prev + spacing,
            timestamp: next,
        })
    } else {
        Err(DataShapeError::Misaligned {
            row,
            expected_minutes: freq,
            found_minutes: delta.num_minutes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "\
timestamp,energy_kwh,occupancy_proxy_value,temp_outdoor_c,open
2025-01-01 08:00:00,12.5,40,3.5,1
2025-01-01 09:00:00,14.0,75,4.0,1
2025-01-01 10:00:00,15.5,90,5.5,true
";

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).expect("valid timestamp")
    }

    #[test]
    fn raw_contract_maps_onto_constructs() {
        let (obs, freq) = parse_observations(RAW.as_bytes(), InputSource::Raw, None).unwrap();
        assert_eq!(freq, 60);
        assert_eq!(obs.len(), 3);
        assert_eq!(obs[1].y_kwh, 14.0);
        assert_eq!(obs[1].occupancy, 75.0);
        assert_eq!(obs[1].temp_out_c, 4.0);
        assert!(obs[2].open);
        assert!(obs[0].extras.is_none());
    }

    #[test]
    fn simulated_layout_with_extras() {
        let csv = "\
timestamp,Y_kwh,X1_occupancy_proxy,X2_temp_out,X2_temp_pressure,X3_open,C1_period,C1_academic_intensity,X3_extended_hours,X3_special_event,X4_building_factor,X5_availability,M1_activation,Y_lag_1
2025-01-01T00:00:00,8.8,0,2.1,17.9,0,holiday,0,0,0,1.1,0.77,0.05,NaN
2025-01-01T01:00:00,8.9,0,2.0,18,0,holiday,0,0,0,1.1,0.77,0.05,8.8
";
        let (obs, freq) = parse_observations(csv.as_bytes(), InputSource::Simulated, Some(60)).unwrap();
        assert_eq!(freq, 60);
        let extras = obs[0].extras.as_ref().expect("extras present");
        assert_eq!(extras.period, AcademicPeriod::Holiday);
        assert_eq!(extras.building_factor, 1.1);
    }

    #[test]
    fn simulated_layout_without_extras() {
        let csv = "timestamp,Y_kwh,X1_occupancy_proxy,X2_temp_out,X3_open\n\
                   2025-01-01T00:00:00,8.8,0,2.1,0\n";
        let (obs, _) = parse_observations(csv.as_bytes(), InputSource::Simulated, Some(60)).unwrap();
        assert!(obs[0].extras.is_none());
    }

    #[test]
    fn missing_column_is_csv_error() {
        let csv = "timestamp,energy_kwh\n2025-01-01 08:00:00,1\n";
        let err = parse_observations(csv.as_bytes(), InputSource::Raw, Some(60)).unwrap_err();
        assert!(matches!(err, ClaroError::Csv(_)));
    }

    #[test]
    fn bad_timestamp_is_reported_with_row() {
        let csv = RAW.replace("2025-01-01 09:00:00", "yesterday");
        let err = parse_observations(csv.as_bytes(), InputSource::Raw, None).unwrap_err();
        assert!(matches!(
            err,
            ClaroError::DataShape(DataShapeError::UnparseableTimestamp { row: 2, .. })
        ));
    }

    #[test]
    fn bad_flag_is_out_of_range() {
        let csv = RAW.replace(",true", ",maybe");
        let err = parse_observations(csv.as_bytes(), InputSource::Raw, None).unwrap_err();
        assert!(matches!(
            err,
            ClaroError::DataShape(DataShapeError::OutOfRange { column: "open", .. })
        ));
    }

    fn raw_error(second_row: &str) -> DataShapeError {
        let csv = format!(
            "timestamp,energy_kwh,occupancy_proxy_value,temp_outdoor_c,open\n\
             2025-01-01 08:00:00,12.5,40,3.5,1\n\
             2025-01-01 09:00:00,{second_row}\n"
        );
        match parse_observations(csv.as_bytes(), InputSource::Raw, None) {
            Err(ClaroError::DataShape(e)) => e,
            other => panic!("expected data shape error, got {other:?}"),
        }
    }

    #[test]
    fn negative_energy_is_out_of_range() {
        let err = raw_error("-5.0,40,4.0,1");
        assert!(
            matches!(err, DataShapeError::OutOfRange { row: 2, column: "energy_kwh", .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn negative_occupancy_is_out_of_range() {
        let err = raw_error("5.0,-3,4.0,1");
        assert!(
            matches!(err, DataShapeError::OutOfRange { row: 2, column: "occupancy_proxy_value", .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn nan_temperature_is_out_of_range() {
        let err = raw_error("5.0,40,NaN,1");
        assert!(
            matches!(err, DataShapeError::OutOfRange { row: 2, column: "temp_outdoor_c", .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn nan_energy_is_out_of_range() {
        let err = raw_error("NaN,40,4.0,1");
        assert!(
            matches!(err, DataShapeError::OutOfRange { row: 2, column: "energy_kwh", .. }),
            "got {err:?}"
        );
        let err = raw_error("inf,40,4.0,1");
        assert!(matches!(err, DataShapeError::OutOfRange { column: "energy_kwh", .. }));
    }

    #[test]
    fn simulated_values_are_checked_too() {
        let csv = "timestamp,Y_kwh,X1_occupancy_proxy,X2_temp_out,X3_open\n\
                   2025-01-01T00:00:00,-1,0,2.1,0\n";
        let err = parse_observations(csv.as_bytes(), InputSource::Simulated, Some(60)).unwrap_err();
        assert!(matches!(
            err,
            ClaroError::DataShape(DataShapeError::OutOfRange { row: 1, column: "Y_kwh", .. })
        ));

        let csv = "timestamp,Y_kwh,X1_occupancy_proxy,X2_temp_out,X3_open\n\
                   2025-01-01T00:00:00,8.8,0,NaN,0\n";
        let err = parse_observations(csv.as_bytes(), InputSource::Simulated, Some(60)).unwrap_err();
        assert!(matches!(
            err,
            ClaroError::DataShape(DataShapeError::OutOfRange { column: "X2_temp_out", .. })
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(validate_shape(&[], Some(60)), Err(DataShapeError::Empty));
    }

    #[test]
    fn single_row_needs_declared_frequency() {
        let one = [ts("2025-01-01 00:00")];
        assert_eq!(validate_shape(&one, None), Err(DataShapeError::UnknownResolution));
        assert_eq!(validate_shape(&one, Some(15)), Ok(15));
    }

    #[test]
    fn detects_duplicates() {
        let stamps = [ts("2025-01-01 00:00"), ts("2025-01-01 01:00"), ts("2025-01-01 01:00")];
        assert!(matches!(
            validate_shape(&stamps, Some(60)),
            Err(DataShapeError::DuplicateTimestamp { row: 3, .. })
        ));
    }

    #[test]
    fn detects_decreasing_order() {
        let stamps = [ts("2025-01-01 02:00"), ts("2025-01-01 01:00")];
        assert!(matches!(
            validate_shape(&stamps, Some(60)),
            Err(DataShapeError::NotIncreasing { row: 2, .. })
        ));
    }

    #[test]
    fn detects_gaps() {
        let stamps = [ts("2025-01-01 00:00"), ts("2025-01-01 01:00"), ts("2025-01-01 03:00")];
        assert_eq!(
            validate_shape(&stamps, None),
            Err(DataShapeError::Gap {
                row: 3,
                expected: ts("2025-01-01 02:00"),
                timestamp: ts("2025-01-01 03:00"),
            })
        );
    }

    #[test]
    fn detects_misaligned_resolution() {
        let stamps = [ts("2025-01-01 00:00"), ts("2025-01-01 00:30"), ts("2025-01-01 01:15")];
        assert!(matches!(
            validate_shape(&stamps, None),
            Err(DataShapeError::Misaligned { row: 3, expected_minutes: 30, found_minutes: 45 })
        ));
        let hourly = [ts("2025-01-01 00:00"), ts("2025-01-01 00:30")];
        assert!(matches!(
            validate_shape(&hourly, Some(60)),
            Err(DataShapeError::Misaligned { row: 2, .. })
        ));
    }

    #[test]
    fn rejects_resolution_not_dividing_a_day() {
        let stamps = [ts("2025-01-01 00:00"), ts("2025-01-01 00:07")];
        assert_eq!(
            validate_shape(&stamps, None),
            Err(DataShapeError::ResolutionDoesNotDivideDay { minutes: 7 })
        );
    }

    #[test]
    fn source_parses_from_str() {
        assert_eq!("raw".parse::<InputSource>(), Ok(InputSource::Raw));
        assert!("excel".parse::<InputSource>().is_err());
    }
}
