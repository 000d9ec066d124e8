/// Mediator and outcome composition with inertia.
pub mod composer;
pub mod engine;
/// Evenly spaced interval timestamps.
pub mod grid;
pub mod report;
pub mod types;
