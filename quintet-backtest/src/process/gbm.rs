//! Geometric Brownian motion price process.
//!
//! S(t+1) = S(t) * exp((mu - sigma^2 / 2) * dt + sigma * sqrt(dt) * z)

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MarketConfig;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessError {
    #[error("Degenerate price {price} at tick {tick} (previous {previous}, shock {shock})")]
    NonFinitePrice {
        tick: usize,
        price: f64,
        previous: f64,
        shock: f64,
    },
}

/// GBM step parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbmProcess {
    /// Drift per unit time.
    pub mu: f64,
    /// Volatility per unit time.
    pub sigma: f64,
    /// Time step.
    pub dt: f64,
}

impl GbmProcess {
    pub fn new(mu: f64, sigma: f64, dt: f64) -> Self {
        Self { mu, sigma, dt }
    }

    /// Price one step after `previous` given a standard-normal shock `z`.
    pub fn step(&self, previous: f64, z: f64) -> f64 {
        let drift = (self.mu - 0.5 * self.sigma * self.sigma) * self.dt;
        let diffusion = self.sigma * self.dt.sqrt() * z;
        previous * (drift + diffusion).exp()
    }
}

impl From<&MarketConfig> for GbmProcess {
    fn from(market: &MarketConfig) -> Self {
        Self::new(market.mu, market.sigma, market.dt)
    }
}

/// Append-only price history. Index 0 holds the initial price and the
/// last index is always the current tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Start a series at `s0`, reserving room for `capacity` prices.
    pub fn new(s0: f64, capacity: usize) -> Self {
        let mut prices = Vec::with_capacity(capacity.max(1));
        prices.push(s0);
        Self { prices }
    }

    /// Advance one tick and append the new price.
    ///
    /// A non-finite or non-positive price aborts instead of entering the
    /// history, so indicators never see a corrupted value.
    pub fn advance(&mut self, process: &GbmProcess, z: f64) -> Result<f64, ProcessError> {
        let previous = self.last();
        let price = process.step(previous, z);

        if !price.is_finite() || price <= 0.0 {
            return Err(ProcessError::NonFinitePrice {
                tick: self.prices.len(),
                price,
                previous,
                shock: z,
            });
        }

        self.prices.push(price);
        Ok(price)
    }

    /// Most recent price.
    pub fn last(&self) -> f64 {
        // The series is created with s0 and never shrinks.
        self.prices[self.prices.len() - 1]
    }

    /// Index of the most recent price.
    pub fn current_tick(&self) -> usize {
        self.prices.len() - 1
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.prices
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.prices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_shock_zero_vol_is_flat() {
        let gbm = GbmProcess::new(0.0, 0.0, 1.0);
        assert_eq!(gbm.step(100.0, 0.0), 100.0);
        assert_eq!(gbm.step(100.0, 2.5), 100.0);
    }

    #[test]
    fn test_step_matches_closed_form() {
        let gbm = GbmProcess::new(0.0001, 0.01, 1.0);
        let expected = 100.0 * ((0.0001 - 0.5 * 0.0001) + 0.01 * 0.5_f64).exp();
        assert_relative_eq!(gbm.step(100.0, 0.5), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_dt_scales_diffusion_by_sqrt() {
        let gbm = GbmProcess::new(0.0, 0.2, 0.25);
        // drift = -0.5 * 0.04 * 0.25 = -0.005, diffusion = 0.2 * 0.5 * 1.0 = 0.1
        assert_relative_eq!(gbm.step(50.0, 1.0), 50.0 * (0.095_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_series_appends() {
        let gbm = GbmProcess::new(0.0, 0.01, 1.0);
        let mut series = PriceSeries::new(100.0, 4);
        assert_eq!(series.current_tick(), 0);

        let p1 = series.advance(&gbm, 1.0).unwrap();
        let p2 = series.advance(&gbm, -1.0).unwrap();

        assert_eq!(series.current_tick(), 2);
        assert_eq!(series.as_slice(), &[100.0, p1, p2]);
        assert_eq!(series.last(), p2);
    }

    #[test]
    fn test_overflow_is_fatal() {
        let gbm = GbmProcess::new(1.0e3, 0.0, 1.0);
        let mut series = PriceSeries::new(100.0, 2);

        let err = series.advance(&gbm, 0.0).unwrap_err();
        assert!(matches!(err, ProcessError::NonFinitePrice { tick: 1, .. }));
        // The bad price never lands in the history.
        assert_eq!(series.as_slice(), &[100.0]);
    }

    #[test]
    fn test_underflow_to_zero_is_fatal() {
        let gbm = GbmProcess::new(0.0, 1.0e3, 1.0);
        let mut series = PriceSeries::new(100.0, 2);
        assert!(series.advance(&gbm, -10.0).is_err());
    }
}
