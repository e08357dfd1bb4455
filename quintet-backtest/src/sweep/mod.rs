//! Multi-seed sweeps.
//!
//! Runs one configuration across many Gaussian seeds in parallel and
//! summarizes the distribution of final P&L per strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::info;

use crate::backtest::{BacktestEngine, SimulationError};
use crate::config::SimulationConfig;
use crate::strategy::StrategyKind;

/// Final P&L of one seeded run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedOutcome {
    pub seed: u64,
    /// Per strategy, in `StrategyKind::ALL` order.
    pub pnl: [f64; StrategyKind::COUNT],
    pub total: f64,
    pub trades: usize,
}

/// Distribution of one P&L figure across seeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlDistribution {
    pub mean: f64,
    /// Sample standard deviation; 0 with fewer than two runs.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl PnlDistribution {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }
        let std_dev = if values.len() > 1 {
            values.iter().std_dev()
        } else {
            0.0
        };
        Self {
            mean: values.iter().mean(),
            std_dev,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Aggregated sweep result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSummary {
    pub runs: usize,
    pub per_strategy: Vec<(StrategyKind, PnlDistribution)>,
    pub total: PnlDistribution,
    pub outcomes: Vec<SeedOutcome>,
}

impl SweepSummary {
    pub fn from_outcomes(outcomes: Vec<SeedOutcome>) -> Self {
        let per_strategy = StrategyKind::ALL
            .iter()
            .map(|&kind| {
                let values: Vec<f64> = outcomes.iter().map(|o| o.pnl[kind.index()]).collect();
                (kind, PnlDistribution::from_values(&values))
            })
            .collect();
        let totals: Vec<f64> = outcomes.iter().map(|o| o.total).collect();

        Self {
            runs: outcomes.len(),
            per_strategy,
            total: PnlDistribution::from_values(&totals),
            outcomes,
        }
    }

    /// Generate summary string.
    pub fn summary(&self) -> String {
        let mut out = format!("Seed sweep over {} runs\n", self.runs);
        out.push_str(&format!(
            "  {:<18} {:>12} {:>12} {:>12} {:>12}\n",
            "Strategy", "Mean", "Std Dev", "Min", "Max"
        ));
        let rows = self
            .per_strategy
            .iter()
            .map(|(kind, d)| (kind.name(), d))
            .chain(std::iter::once(("Total", &self.total)));
        for (label, d) in rows {
            out.push_str(&format!(
                "  {:<18} {:>12.4} {:>12.4} {:>12.4} {:>12.4}\n",
                label, d.mean, d.std_dev, d.min, d.max
            ));
        }
        out
    }
}

/// Runs a configuration over a list of seeds.
pub struct SeedSweep {
    config: SimulationConfig,
    seeds: Vec<u64>,
}

impl SeedSweep {
    pub fn new(config: SimulationConfig, seeds: Vec<u64>) -> Self {
        Self { config, seeds }
    }

    /// `runs` consecutive seeds starting at `base_seed`.
    pub fn consecutive(config: SimulationConfig, base_seed: u64, runs: usize) -> Self {
        let seeds = (0..runs as u64).map(|i| base_seed.wrapping_add(i)).collect();
        Self::new(config, seeds)
    }

    pub fn seeds(&self) -> &[u64] {
        &self.seeds
    }

    pub fn run(&self) -> Result<SweepSummary, SimulationError> {
        self.run_with_progress(|_| {})
    }

    /// Run all seeds in parallel. `on_done` receives the number of
    /// completed runs after each one finishes.
    pub fn run_with_progress<F>(&self, on_done: F) -> Result<SweepSummary, SimulationError>
    where
        F: Fn(usize) + Sync + Send,
    {
        self.config.validate()?;
        info!(runs = self.seeds.len(), ticks = self.config.total_ticks, "starting seed sweep");

        let done = AtomicUsize::new(0);
        let outcomes = self
            .seeds
            .par_iter()
            .map(|&seed| {
                let config = SimulationConfig {
                    seed: Some(seed),
                    record_ticks: false,
                    ..self.config.clone()
                };
                let result = BacktestEngine::from_config(config)?.run()?;

                on_done(done.fetch_add(1, Ordering::Relaxed) + 1);

                let mut pnl = [0.0; StrategyKind::COUNT];
                for (kind, value) in result.pnl.iter() {
                    pnl[kind.index()] = value;
                }
                Ok(SeedOutcome {
                    seed,
                    pnl,
                    total: result.total_pnl(),
                    trades: result.trades.len(),
                })
            })
            .collect::<Result<Vec<_>, SimulationError>>()?;

        let summary = SweepSummary::from_outcomes(outcomes);
        info!(
            runs = summary.runs,
            mean_total = summary.total.mean,
            "seed sweep complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            total_ticks: 400,
            ..Default::default()
        }
    }

    #[test]
    fn test_distribution() {
        let d = PnlDistribution::from_values(&[1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(d.mean, 2.5);
        assert_relative_eq!(d.std_dev, (5.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!(d.min, 1.0);
        assert_eq!(d.max, 4.0);

        let single = PnlDistribution::from_values(&[7.0]);
        assert_eq!(single.std_dev, 0.0);
        assert_eq!(single.mean, 7.0);
    }

    #[test]
    fn test_sweep_is_reproducible_and_ordered() {
        let sweep = SeedSweep::consecutive(small_config(), 100, 8);
        let a = sweep.run().unwrap();
        let b = sweep.run().unwrap();

        assert_eq!(a.runs, 8);
        let seeds: Vec<u64> = a.outcomes.iter().map(|o| o.seed).collect();
        assert_eq!(seeds, (100..108).collect::<Vec<_>>());
        assert_eq!(a.outcomes, b.outcomes);
    }

    #[test]
    fn test_outcome_totals_match_strategies() {
        let summary = SeedSweep::consecutive(small_config(), 1, 4).run().unwrap();
        for outcome in &summary.outcomes {
            assert_eq!(outcome.total, outcome.pnl.iter().sum::<f64>());
        }
    }

    #[test]
    fn test_progress_reaches_run_count() {
        let calls = AtomicUsize::new(0);
        let sweep = SeedSweep::consecutive(small_config(), 5, 6);
        sweep
            .run_with_progress(|_| {
                calls.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = SimulationConfig {
            total_ticks: 0,
            ..Default::default()
        };
        assert!(SeedSweep::consecutive(config, 0, 3).run().is_err());
    }
}
