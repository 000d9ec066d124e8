//! Reproducible simulation of a university library's electricity consumption.
//!
//! A seeded generator produces an interval-indexed time series in which
//! consumption (Y) emerges from occupancy (X1), outdoor temperature (X2),
//! the open/closed regime (X3), building structure (X4, X5), and inertia,
//! with the academic calendar (C1) as a confounder and system activation
//! (M1) as a mediator. The feature builder maps simulated or real proxy
//! signals onto one model-ready table.

pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod runner;
/// Causal signal generators.
pub mod signals;
/// Time grid, engine, outcome composer, and run diagnostics.
pub mod sim;

pub use error::{ClaroError, ConfigError, DataShapeError};
pub use runner::{SimulationOutput, run_simulation, simulate_to_path};
