//! CSV export for the analytical table.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::error::ClaroError;
use crate::features::{FeatureRow, FeatureTable};

/// Required columns, always first and in this order.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "timestamp",
    "Y_kwh",
    "X1_occupancy_proxy",
    "X2_temp_out",
    "X2_temp_pressure",
    "X3_open",
];

/// Simulation-only columns, written when every row carries them.
pub const SIMULATED_COLUMNS: [&str; 7] = [
    "C1_period",
    "C1_academic_intensity",
    "X3_extended_hours",
    "X3_special_event",
    "X4_building_factor",
    "X5_availability",
    "M1_activation",
];

/// Written in place of a lag that precedes the first row.
pub const LAG_SENTINEL: &str = "NaN";

/// Timestamp layout of the `timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Column header for `Y[t - lag]`.
pub fn lag_column(lag: usize) -> String {
    format!("Y_lag_{lag}")
}

/// Returns the header row of `table` in stable column order.
pub fn header(table: &FeatureTable) -> Vec<String> {
    let mut cols: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
    if table.has_extras() {
        cols.extend(SIMULATED_COLUMNS.iter().map(|c| c.to_string()));
    }
    cols.extend(table.lags().iter().map(|&k| lag_column(k)));
    cols
}

/// Exports the table to a CSV file, creating parent directories.
///
/// # Errors
///
/// Returns `ClaroError::Io` if the directory or file cannot be created, or
/// `ClaroError::Csv` if writing fails.
pub fn export_csv(table: &FeatureTable, path: &Path) -> Result<(), ClaroError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ClaroError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| ClaroError::io(path, e))?;
    write_csv(table, io::BufWriter::new(file))
}

/// Writes the table as CSV to any writer.
///
/// Values are written at full precision, so rereading reproduces them
/// exactly. Identical tables produce byte-identical output.
///
/// # Errors
///
/// Returns `ClaroError::Csv` if writing fails.
pub fn write_csv(table: &FeatureTable, writer: impl Write) -> Result<(), ClaroError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(header(table))?;

    let with_extras = table.has_extras();
    for row in table.rows() {
        wtr.write_record(row_fields(row, with_extras))?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn row_fields(r: &FeatureRow, with_extras: bool) -> Vec<String> {
    let mut fields = vec![
        r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        r.y_kwh.to_string(),
        r.occupancy.to_string(),
        r.temp_out_c.to_string(),
        r.temp_pressure.to_string(),
        flag(r.open),
    ];
    if let Some(x) = r.extras.as_ref().filter(|_| with_extras) {
        fields.extend([
            x.period.as_str().to_string(),
            x.academic_intensity.to_string(),
            flag(x.extended_hours),
            flag(x.special_event),
            x.building_factor.to_string(),
            x.availability.to_string(),
            x.activation.to_string(),
        ]);
    }
    fields.extend(r.y_lags.iter().map(|lag| match lag {
        Some(v) => v.to_string(),
        None => LAG_SENTINEL.to_string(),
    }));
    fields
}

fn flag(b: bool) -> String {
    u8::from(b).to_string()
}
