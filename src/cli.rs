use std::path::PathBuf;

use clap::{Parser, Subcommand};

use claro_sim::io::ingest::InputSource;

#[derive(Debug, Parser)]
#[command(name = "claro-sim")]
#[command(about = "Library electricity simulator and feature builder")]
#[command(version)]
pub struct Cli {
    /// Log debug detail, including every interval, to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a synthetic series and write the analytical table
    Simulate {
        /// Output CSV path
        #[arg(short, long)]
        out: PathBuf,

        /// Number of simulated days
        #[arg(long, allow_negative_numbers = true)]
        n_days: Option<i64>,

        /// Interval length in minutes (must divide 1440)
        #[arg(long)]
        freq: Option<u32>,

        #[arg(long)]
        seed: Option<u64>,

        /// Load the scenario from a TOML file
        #[arg(long, conflicts_with = "preset")]
        scenario: Option<PathBuf>,

        /// Use a built-in preset (baseline, exam_season, winter_break)
        #[arg(long)]
        preset: Option<String>,
    },

    /// Rebuild the analytical table from a simulated or raw CSV
    Features {
        /// Input CSV path
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV path
        #[arg(short, long)]
        out: PathBuf,

        /// Input column layout: simulated or raw
        #[arg(long, default_value = "simulated")]
        source: InputSource,

        /// Declared input resolution in minutes; inferred when omitted
        #[arg(long)]
        input_freq: Option<u32>,

        /// Resample to this resolution (minutes) by mean aggregation
        #[arg(long)]
        freq: Option<u32>,

        /// Drop rows whose lag values are undefined
        #[arg(long)]
        drop_incomplete: bool,

        /// Take comfort band and lags from a TOML scenario
        #[arg(long, conflicts_with = "preset")]
        scenario: Option<PathBuf>,

        #[arg(long)]
        preset: Option<String>,
    },
}
