//! Outdoor temperature generator (X2).

use std::f64::consts::PI;

use chrono::Datelike;
use rand::rngs::StdRng;

use super::types::{Signal, SignalContext, gaussian_noise};
use crate::config::TemperatureConfig;

/// Outdoor temperature: annual sinusoid plus daily sinusoid plus noise.
///
/// ```text
/// T(t) = mean + A_s * sin(2*pi*doy/365) + A_d * sin(2*pi*(hour - coldest)/24) + eps
/// ```
///
/// Values are not clipped and may be negative.
#[derive(Debug, Clone)]
pub struct OutdoorTemperature {
    pub mean_c: f64,
    pub seasonal_amp_c: f64,
    pub daily_amp_c: f64,
    pub coldest_hour: f64,
    pub noise_sigma_c: f64,
}

impl OutdoorTemperature {
    pub fn new(config: &TemperatureConfig) -> Self {
        Self {
            mean_c: config.mean_c,
            seasonal_amp_c: config.seasonal_amp_c,
            daily_amp_c: config.daily_amp_c,
            coldest_hour: config.coldest_hour,
            noise_sigma_c: config.noise_sigma_c,
        }
    }

    /// Noise-free temperature for day-of-year `doy` (1-based) at `hour`.
    pub fn expected_c(&self, doy: u32, hour: f64) -> f64 {
        let seasonal = self.seasonal_amp_c * (2.0 * PI * f64::from(doy) / 365.0).sin();
        let daily = self.daily_amp_c * (2.0 * PI * (hour - self.coldest_hour) / 24.0).sin();
        self.mean_c + seasonal + daily
    }
}

impl Signal for OutdoorTemperature {
    type Output = f64;

    fn sample(&self, ctx: &SignalContext, rng: &mut StdRng) -> f64 {
        self.expected_c(ctx.timestamp.ordinal(), ctx.hour()) + gaussian_noise(rng, self.noise_sigma_c)
    }

    fn signal_name(&self) -> &'static str {
        "X2_temperature"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;

    fn quiet() -> OutdoorTemperature {
        OutdoorTemperature::new(&TemperatureConfig {
            noise_sigma_c: 0.0,
            ..TemperatureConfig::default()
        })
    }

    #[test]
    fn daily_cycle_peaks_in_the_afternoon() {
        let t = quiet();
        let at_5 = t.expected_c(100, 5.0);
        let at_11 = t.expected_c(100, 11.0);
        let at_23 = t.expected_c(100, 23.0);
        assert!(at_11 > at_5);
        assert!(at_11 > at_23);
        assert!((at_11 - at_5 - 3.5).abs() < 1e-9);
    }

    #[test]
    fn seasonal_cycle_has_annual_period() {
        let t = quiet();
        let spring = t.expected_c(91, 12.0);
        let autumn = t.expected_c(274, 12.0);
        assert!(spring > autumn);
    }

    #[test]
    fn can_go_below_zero() {
        let t = OutdoorTemperature::new(&TemperatureConfig {
            mean_c: -5.0,
            noise_sigma_c: 0.0,
            ..TemperatureConfig::default()
        });
        assert!(t.expected_c(300, 5.0) < 0.0);
    }

    #[test]
    fn noise_is_reproducible() {
        let t = OutdoorTemperature::new(&TemperatureConfig::default());
        let ts = NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(14, 0, 0))
            .unwrap();
        let ctx = SignalContext::new(ts);
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(t.sample(&ctx, &mut a), t.sample(&ctx, &mut b));
    }
}
