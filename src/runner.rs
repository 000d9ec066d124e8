//! Simulation entry points: generate, assemble, and optionally write a run.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::ScenarioConfig;
use crate::error::ClaroError;
use crate::features::FeatureTable;
use crate::io::export::export_csv;
use crate::sim::engine::Simulator;
use crate::sim::report::RunReport;
use crate::sim::types::IntervalRecord;

/// Everything a simulation run produces.
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    /// One record per interval, every construct included.
    pub records: Vec<IntervalRecord>,
    /// Model-ready analytical table derived from the records.
    pub table: FeatureTable,
    pub report: RunReport,
}

/// Validates `config`, runs the simulation, and assembles the table.
///
/// # Errors
///
/// Returns `ClaroError::Config` with every invalid field before anything is
/// generated.
pub fn run_simulation(config: &ScenarioConfig) -> Result<SimulationOutput, ClaroError> {
    let mut sim = Simulator::new(config)?;
    let s = &config.simulation;
    info!(
        n_days = s.n_days,
        freq_minutes = s.freq_minutes,
        seed = s.seed,
        intervals = sim.grid().len(),
        warmup_rows = sim.max_lag(),
        "starting simulation"
    );

    let records = sim.run();
    for record in &records {
        debug!("{record}");
    }
    let table = FeatureTable::from_records(&records, s.freq_minutes, &config.features);
    let report = RunReport::from_records(&records, config.occupancy.closed_threshold);

    if report.warmup_rows > 0 {
        warn!(
            rows = report.warmup_rows,
            baseline_kwh = config.outcome.warmup_baseline_kwh,
            "leading rows use the warm-up baseline for lagged Y"
        );
    }
    if report.gating_violations > 0 {
        warn!(rows = report.gating_violations, "closed intervals with non-zero occupancy");
    }
    Ok(SimulationOutput {
        records,
        table,
        report,
    })
}

/// Runs the simulation and writes the table to `out` as CSV.
///
/// # Errors
///
/// Returns `ClaroError::Config` for an invalid scenario (nothing is written)
/// and `ClaroError::Io` or `ClaroError::Csv` if `out` cannot be written.
pub fn simulate_to_path(config: &ScenarioConfig, out: &Path) -> Result<SimulationOutput, ClaroError> {
    let output = run_simulation(config)?;
    export_csv(&output.table, out)?;
    info!(rows = output.table.len(), out = %out.display(), "table written");
    Ok(output)
}
