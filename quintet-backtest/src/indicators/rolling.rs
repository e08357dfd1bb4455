//! Moving averages and realized volatility over a trailing window.
//!
//! Both functions look only at `series[..=tick]`, so a snapshot taken at a
//! tick never depends on later prices.

use serde::{Deserialize, Serialize};

use crate::config::IndicatorConfig;

/// Simple moving average of the `window` prices ending at `tick`.
///
/// Before a full window is available (`tick < window - 1`) this returns the
/// price at `tick` itself rather than a partial average.
pub fn moving_average(series: &[f64], tick: usize, window: usize) -> f64 {
    debug_assert!(window > 0);
    debug_assert!(tick < series.len());

    if tick + 1 < window {
        return series[tick];
    }

    let start = tick + 1 - window;
    series[start..=tick].iter().sum::<f64>() / window as f64
}

/// Standard deviation of log returns over the `window` prices ending at
/// `tick`, averaged over the returns actually collected.
///
/// Returns 0 until `tick >= window`. A return is skipped when its lower
/// index would be 0.
pub fn volatility(series: &[f64], tick: usize, window: usize) -> f64 {
    debug_assert!(window > 0);
    debug_assert!(tick < series.len());

    if tick < window {
        return 0.0;
    }

    let start = tick + 1 - window;
    let returns: Vec<f64> = (start..=tick)
        .filter(|&i| i != 0)
        .map(|i| (series[i] / series[i - 1]).ln())
        .collect();

    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Indicator values for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub short_ma: f64,
    pub long_ma: f64,
    pub volatility: f64,
}

/// Window lengths for the three indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorEngine {
    pub short_window: usize,
    pub long_window: usize,
    pub vol_window: usize,
}

impl IndicatorEngine {
    pub fn new(short_window: usize, long_window: usize, vol_window: usize) -> Self {
        Self {
            short_window,
            long_window,
            vol_window,
        }
    }

    /// Compute the snapshot at `tick` from the history.
    pub fn snapshot(&self, series: &[f64], tick: usize) -> IndicatorSnapshot {
        IndicatorSnapshot {
            short_ma: moving_average(series, tick, self.short_window),
            long_ma: moving_average(series, tick, self.long_window),
            volatility: volatility(series, tick, self.vol_window),
        }
    }
}

impl From<&IndicatorConfig> for IndicatorEngine {
    fn from(config: &IndicatorConfig) -> Self {
        Self::new(config.short_window, config.long_window, config.vol_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp() -> Vec<f64> {
        vec![100.0, 101.0, 103.0, 102.0, 105.0, 104.0, 108.0, 107.0]
    }

    #[test]
    fn test_ma_warmup_returns_spot() {
        let series = ramp();
        assert_eq!(moving_average(&series, 2, 5), series[2]);
        assert_eq!(moving_average(&series, 0, 5), series[0]);
        assert_eq!(moving_average(&series, 3, 5), series[3]);
    }

    #[test]
    fn test_ma_full_window() {
        let series = ramp();
        // First full window of 5 ends at tick 4.
        assert_relative_eq!(moving_average(&series, 4, 5), 511.0 / 5.0);
        assert_relative_eq!(moving_average(&series, 7, 5), 526.0 / 5.0);
        assert_relative_eq!(moving_average(&series, 7, 1), 107.0);
    }

    #[test]
    fn test_ma_ignores_future_prices() {
        let series = ramp();
        let mut altered = series.clone();
        altered[6] = 1_000.0;
        altered[7] = 2_000.0;
        assert_eq!(moving_average(&series, 5, 3), moving_average(&altered, 5, 3));
        assert_eq!(volatility(&series, 5, 3), volatility(&altered, 5, 3));
    }

    #[test]
    fn test_volatility_warmup_is_zero() {
        let series = ramp();
        for tick in 0..5 {
            assert_eq!(volatility(&series, tick, 5), 0.0);
        }
        assert!(volatility(&series, 5, 5) > 0.0);
    }

    #[test]
    fn test_volatility_matches_population_std() {
        let series = ramp();
        let returns: Vec<f64> = (4..=6).map(|i| (series[i] / series[i - 1]).ln()).collect();
        let mean = returns.iter().sum::<f64>() / 3.0;
        let expected =
            (returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 3.0).sqrt();

        assert_relative_eq!(volatility(&series, 6, 3), expected, epsilon = 1e-15);
    }

    #[test]
    fn test_volatility_constant_growth_is_zero() {
        let series: Vec<f64> = (0..10).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        assert_relative_eq!(volatility(&series, 9, 5), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_series_snapshot() {
        let series = vec![100.0; 30];
        let engine = IndicatorEngine::new(5, 20, 5);
        for tick in 0..30 {
            let snap = engine.snapshot(&series, tick);
            assert_eq!(snap.short_ma, 100.0);
            assert_eq!(snap.long_ma, 100.0);
            assert_eq!(snap.volatility, 0.0);
        }
    }
}
