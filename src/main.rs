//! CLARO simulator entry point: CLI wiring and config-driven runs.

mod cli;

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::Level;

use claro_sim::config::ScenarioConfig;
use claro_sim::error::ClaroError;
use claro_sim::features::{BuildOptions, build_from_path};
use claro_sim::simulate_to_path;

use cli::{Cli, Commands};

/// Loads the scenario: `--scenario` first, then `--preset`, then baseline.
fn load_scenario(
    scenario: Option<&Path>,
    preset: Option<&str>,
) -> Result<ScenarioConfig, ClaroError> {
    let cfg = match (scenario, preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path)?,
        (None, Some(name)) => ScenarioConfig::from_preset(name)?,
        (None, None) => ScenarioConfig::baseline(),
    };
    Ok(cfg)
}

fn simulate(
    out: &Path,
    n_days: Option<i64>,
    freq: Option<u32>,
    seed: Option<u64>,
    scenario: Option<PathBuf>,
    preset: Option<String>,
) -> Result<(), ClaroError> {
    let mut cfg = load_scenario(scenario.as_deref(), preset.as_deref())?;
    if let Some(n) = n_days {
        cfg.simulation.n_days = n;
    }
    if let Some(f) = freq {
        cfg.simulation.freq_minutes = f;
    }
    if let Some(s) = seed {
        cfg.simulation.seed = s;
    }

    let output = simulate_to_path(&cfg, out)?;
    println!("wrote {} rows to {}", output.table.len(), out.display());
    println!("\n{}", output.report);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Simulate {
            out,
            n_days,
            freq,
            seed,
            scenario,
            preset,
        } => simulate(&out, n_days, freq, seed, scenario, preset),
        Commands::Features {
            input,
            out,
            source,
            input_freq,
            freq,
            drop_incomplete,
            scenario,
            preset,
        } => load_scenario(scenario.as_deref(), preset.as_deref()).and_then(|cfg| {
            let options = BuildOptions {
                source,
                input_freq_minutes: input_freq,
                target_freq_minutes: freq,
                drop_incomplete,
            };
            let table = build_from_path(&input, &out, &cfg.features, &options)?;
            println!("wrote {} rows to {}", table.len(), out.display());
            Ok(())
        }),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
