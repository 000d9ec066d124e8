//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::path::Path;

use claro_sim::config::ScenarioConfig;

/// Baseline scenario shortened to `n_days` at `freq` minutes.
pub fn short_config(n_days: i64, freq: u32, seed: u64) -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.n_days = n_days;
    cfg.simulation.freq_minutes = freq;
    cfg.simulation.seed = seed;
    cfg
}

/// Two hourly days with seed 42, the standard small run.
pub fn two_day_config() -> ScenarioConfig {
    short_config(2, 60, 42)
}

/// Parsed CSV: header plus rows of raw string fields.
pub struct Csv {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Csv {
    /// Index of column `name`; panics when absent.
    pub fn col(&self, name: &str) -> usize {
        self.header
            .iter()
            .position(|h| h == name)
            .unwrap_or_else(|| panic!("missing column {name} in {:?}", self.header))
    }

    /// Column `name` parsed as f64 (the lag sentinel parses to NaN).
    pub fn floats(&self, name: &str) -> Vec<f64> {
        let i = self.col(name);
        self.rows
            .iter()
            .map(|r| r[i].parse::<f64>().expect("numeric field"))
            .collect()
    }

    pub fn strings(&self, name: &str) -> Vec<String> {
        let i = self.col(name);
        self.rows.iter().map(|r| r[i].clone()).collect()
    }
}

/// Reads a CSV file written by the exporter.
pub fn read_csv(path: &Path) -> Csv {
    let mut rdr = csv::Reader::from_path(path).expect("open csv");
    let header = rdr
        .headers()
        .expect("header row")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = rdr
        .records()
        .map(|r| r.expect("record").iter().map(str::to_string).collect())
        .collect();
    Csv { header, rows }
}

/// Writes `contents` to `name` inside `dir` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}
