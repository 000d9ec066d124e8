//! Mediator and outcome composition with lagged inertia.

use rand::rngs::StdRng;

use crate::config::OutcomeConfig;
use crate::signals::types::gaussian_noise;

/// M1, X5, and Y for one interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composition {
    pub availability: f64,
    pub activation: f64,
    pub y_kwh: f64,
    /// A lag term fell before the first interval and used the warm-up baseline.
    pub warmup: bool,
    /// The raw outcome was negative and clipped to zero.
    pub clipped: bool,
}

/// Ordered scan that turns drivers into activation (M1) and consumption (Y).
///
/// Y carries thermal/system memory through two lag terms:
///
/// ```text
/// Y[t] = w_s * Y[t-1] + w_l * Y[t-L] + (1 - w_s - w_l) * g(M1, tp) + eps
/// g    = baseline(X3) * X4 + activation_to_kwh * M1 + direct_temp_to_kwh * tp
/// ```
///
/// Lags that fall before the first interval use `warmup_baseline_kwh`.
#[derive(Debug, Clone)]
pub struct OutcomeComposer {
    config: OutcomeConfig,
    long_lag: usize,
    history: Vec<f64>,
}

impl OutcomeComposer {
    /// Creates a composer with an empty history.
    ///
    /// # Arguments
    ///
    /// * `config` - Outcome coefficients
    /// * `long_lag` - Long inertia lag in intervals (clamped to at least 1)
    pub fn new(config: &OutcomeConfig, long_lag: usize) -> Self {
        Self {
            config: config.clone(),
            long_lag: long_lag.max(1),
            history: Vec::new(),
        }
    }

    /// Number of leading intervals that fall back to the warm-up baseline.
    pub fn max_lag(&self) -> usize {
        self.long_lag
    }

    /// X4 structural baseline shifter.
    pub fn building_factor(&self) -> f64 {
        self.config.building_factor
    }

    /// X5 availability: reduced while closed, shifted by X4.
    pub fn availability(&self, open: bool) -> f64 {
        let c = &self.config;
        let open_share = if open { 1.0 } else { 0.0 };
        (c.closed_availability + (1.0 - c.closed_availability) * open_share) * c.building_factor
    }

    /// M1 activation intensity, gated toward zero while closed.
    pub fn activation(&self, occupancy: f64, temp_pressure: f64, open: bool) -> f64 {
        let c = &self.config;
        let regime = if open { 1.0 } else { 0.0 };
        let raw = (c.regime_to_activation * regime
            + c.occ_to_activation * occupancy
            + c.temp_to_activation * temp_pressure)
            * self.availability(open);
        let gated = if open {
            raw
        } else {
            raw * c.closed_activation_gate
        };
        gated.clamp(0.0, c.max_activation)
    }

    /// Structural demand `g(M1, tp)` before inertia and noise.
    pub fn structural_demand(&self, activation: f64, temp_pressure: f64, open: bool) -> f64 {
        let c = &self.config;
        let baseline = if open {
            c.base_kwh_when_open
        } else {
            c.base_kwh_when_closed
        };
        baseline * c.building_factor
            + c.activation_to_kwh * activation
            + c.direct_temp_to_kwh * temp_pressure
    }

    /// Returns `Y[t - lag]`, or `None` when it falls before the first interval.
    fn lagged(&self, lag: usize) -> Option<f64> {
        self.history
            .len()
            .checked_sub(lag)
            .map(|i| self.history[i])
    }

    /// Composes the next interval and appends its Y to the history.
    pub fn step(
        &mut self,
        occupancy: f64,
        temp_pressure: f64,
        open: bool,
        rng: &mut StdRng,
    ) -> Composition {
        let availability = self.availability(open);
        let activation = self.activation(occupancy, temp_pressure, open);
        let structural = self.structural_demand(activation, temp_pressure, open);

        let c = &self.config;
        let short = self.lagged(1);
        let long = self.lagged(self.long_lag);
        let warmup = short.is_none() || long.is_none();
        let baseline = c.warmup_baseline_kwh;

        let inertia = c.short_lag_weight * short.unwrap_or(baseline)
            + c.long_lag_weight * long.unwrap_or(baseline);
        let own_weight = 1.0 - c.short_lag_weight - c.long_lag_weight;
        let raw = inertia + own_weight * structural + gaussian_noise(rng, c.noise_sigma);
        let y_kwh = raw.max(0.0);

        self.history.push(y_kwh);
        Composition {
            availability,
            activation,
            y_kwh,
            warmup,
            clipped: raw < 0.0,
        }
    }
}
