//! Causal signal generators for the CLARO constructs.

/// Academic calendar confounder (C1).
pub mod calendar;
/// Occupancy proxy (X1).
pub mod occupancy;
/// Open/closed operational regime (X3).
pub mod regime;
/// Outdoor temperature (X2).
pub mod temperature;
pub mod types;

pub use calendar::{AcademicCalendar, AcademicPeriod, CalendarState};
pub use occupancy::Occupancy;
pub use regime::{OpeningSchedule, RegimeState};
pub use temperature::OutdoorTemperature;
pub use types::{Signal, SignalContext};
