//! Occupancy proxy generator (X1).

use rand::rngs::StdRng;

use super::types::{Signal, SignalContext, gaussian_noise};
use crate::config::OccupancyConfig;

/// Occupancy proxy driven by the diurnal profile, the weekly pattern, and
/// the academic intensity from C1.
///
/// While the building is closed the proxy is exactly zero and no noise is
/// drawn. While open:
///
/// ```text
/// X1 = clip(capacity * intensity * diurnal(hour) * weekly(day) + eps, 0, max)
/// ```
///
/// where `diurnal` is a midday plus late-afternoon Gaussian mix and `eps` is
/// Gaussian noise bounded to a fixed number of standard deviations.
#[derive(Debug, Clone)]
pub struct Occupancy {
    config: OccupancyConfig,
}

impl Occupancy {
    pub fn new(config: &OccupancyConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Two-peak diurnal profile in `[0, midday_weight + evening_weight]`.
    pub fn diurnal_profile(&self, hour: f64) -> f64 {
        let c = &self.config;
        bump(hour, c.midday_peak_hour, c.midday_peak_width) * c.midday_peak_weight
            + bump(hour, c.evening_peak_hour, c.evening_peak_width) * c.evening_peak_weight
    }

    fn bounded_noise(&self, rng: &mut StdRng) -> f64 {
        let c = &self.config;
        let bound = c.noise_bound_sigmas * c.noise_sigma;
        gaussian_noise(rng, c.noise_sigma).clamp(-bound, bound)
    }
}

fn bump(x: f64, center: f64, width: f64) -> f64 {
    (-(x - center).powi(2) / (2.0 * width * width)).exp()
}

impl Signal for Occupancy {
    type Output = f64;

    fn sample(&self, ctx: &SignalContext, rng: &mut StdRng) -> f64 {
        if !ctx.regime.open {
            return 0.0;
        }
        let c = &self.config;
        let weekly = if ctx.is_weekend() {
            c.weekend_multiplier
        } else {
            1.0
        };
        let mean = c.capacity * ctx.calendar.intensity * self.diurnal_profile(ctx.hour()) * weekly;
        (mean + self.bounded_noise(rng)).clamp(0.0, c.max_occupancy)
    }

    fn signal_name(&self) -> &'static str {
        "X1_occupancy"
    }
}
