//! Core backtesting engine.
//!
//! Runs the simulation loop, one tick at a time:
//! 1. Draw a shock and advance the price
//! 2. Recompute indicators from the history
//! 3. Generate a signal per strategy
//! 4. Advance each strategy's trade lifecycle (fixed order)
//! 5. Fold realized P&L into the table

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, SimulationConfig};
use crate::indicators::{IndicatorEngine, IndicatorSnapshot};
use crate::process::{GaussianShocks, GbmProcess, PriceSeries, ProcessError, ShockSource};
use crate::strategy::{generate_all, AlphaSignal, StrategyKind};

use super::trade::{ClosedTrade, OpenTrade, TradeLifecycle};

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Price process error: {0}")]
    Process(#[from] ProcessError),
}

/// Cumulative realized P&L per strategy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PnlTable {
    values: [f64; StrategyKind::COUNT],
}

impl PnlTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: StrategyKind) -> f64 {
        self.values[kind.index()]
    }

    pub fn add(&mut self, kind: StrategyKind, pnl: f64) {
        self.values[kind.index()] += pnl;
    }

    /// Sum across strategies, in `StrategyKind::ALL` order.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StrategyKind, f64)> + '_ {
        StrategyKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

impl Serialize for PnlTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(StrategyKind::COUNT))?;
        for (kind, pnl) in self.iter() {
            map.serialize_entry(&kind, &pnl)?;
        }
        map.end()
    }
}

/// Everything observed at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: usize,
    pub price: f64,
    pub snapshot: IndicatorSnapshot,
    pub signals: [AlphaSignal; StrategyKind::COUNT],
}

/// Result of a completed simulation.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    /// Configuration used.
    pub config: SimulationConfig,

    /// Generated prices, index 0 = initial price.
    pub prices: Vec<f64>,

    /// Realized P&L per strategy.
    pub pnl: PnlTable,

    /// All closed trades, in close order.
    pub trades: Vec<ClosedTrade>,

    /// Trades still open at the horizon. Unrealized, not in `pnl`.
    pub open_trades: Vec<OpenTrade>,

    /// Per-tick record, empty unless `record_ticks` was set.
    pub ticks: Vec<TickRecord>,
}

impl BacktestResult {
    pub fn total_pnl(&self) -> f64 {
        self.pnl.total()
    }

    pub fn final_price(&self) -> f64 {
        self.prices.last().copied().unwrap_or(self.config.market.s0)
    }

    pub fn trades_for(&self, kind: StrategyKind) -> impl Iterator<Item = &ClosedTrade> + '_ {
        self.trades.iter().filter(move |t| t.kind == kind)
    }

    /// Intrinsic value of the abandoned open trades at the final price.
    pub fn unrealized_pnl(&self) -> f64 {
        let spot = self.final_price();
        self.open_trades.iter().map(|t| t.unrealized_pnl(spot)).sum()
    }

    /// Generate summary string.
    pub fn summary(&self) -> String {
        let mut out = String::from("Cumulative PnL per Strategy:\n");
        for (kind, pnl) in self.pnl.iter() {
            out.push_str(&format!(
                "  Strategy {} ({}): {:.4}\n",
                kind.id(),
                kind,
                pnl
            ));
        }
        out.push_str(&format!("Total PnL: {:.4}", self.total_pnl()));
        out
    }
}

impl fmt::Display for BacktestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// The main backtesting engine.
pub struct BacktestEngine<S: ShockSource> {
    config: SimulationConfig,
    shocks: S,
    process: GbmProcess,
    indicators: IndicatorEngine,
    series: PriceSeries,
    lifecycles: [TradeLifecycle; StrategyKind::COUNT],
    pnl: PnlTable,
    trades: Vec<ClosedTrade>,
    ticks: Vec<TickRecord>,
}

impl BacktestEngine<GaussianShocks> {
    /// Engine drawing Gaussian shocks seeded from `config.seed`.
    pub fn from_config(config: SimulationConfig) -> Result<Self, SimulationError> {
        let shocks = GaussianShocks::new(config.seed);
        Self::new(config, shocks)
    }
}

impl<S: ShockSource> BacktestEngine<S> {
    /// Create an engine with an injected shock source. The configuration is
    /// validated here, before any tick runs.
    pub fn new(config: SimulationConfig, shocks: S) -> Result<Self, SimulationError> {
        config.validate()?;

        let lifecycles =
            StrategyKind::ALL.map(|kind| TradeLifecycle::new(kind, &config.trading));
        let ticks = if config.record_ticks {
            Vec::with_capacity(config.total_ticks)
        } else {
            Vec::new()
        };

        Ok(Self {
            process: GbmProcess::from(&config.market),
            indicators: IndicatorEngine::from(&config.indicators),
            series: PriceSeries::new(config.market.s0, config.total_ticks),
            lifecycles,
            pnl: PnlTable::new(),
            trades: Vec::new(),
            ticks,
            shocks,
            config,
        })
    }

    /// Run every remaining tick and build the result.
    pub fn run(mut self) -> Result<BacktestResult, SimulationError> {
        info!(
            ticks = self.config.total_ticks,
            seed = ?self.config.seed,
            "starting simulation"
        );

        while !self.is_finished() {
            self.step()?;
        }

        let result = self.into_result();
        if !result.open_trades.is_empty() {
            warn!(
                open = result.open_trades.len(),
                "positions left open at horizon are not realized"
            );
        }
        info!(
            trades = result.trades.len(),
            total_pnl = result.total_pnl(),
            "simulation finished"
        );
        Ok(result)
    }

    /// Whether the horizon has been reached.
    pub fn is_finished(&self) -> bool {
        self.series.current_tick() + 1 >= self.config.total_ticks
    }

    /// Advance one tick. Returns the trades closed during it.
    ///
    /// Once the horizon is reached this is a no-op and returns no trades.
    pub fn step(&mut self) -> Result<Vec<ClosedTrade>, SimulationError> {
        if self.is_finished() {
            return Ok(Vec::new());
        }

        let z = self.shocks.next_shock();
        let spot = self.series.advance(&self.process, z)?;
        let tick = self.series.current_tick();

        let snapshot = self.indicators.snapshot(self.series.as_slice(), tick);
        let signals = generate_all(&snapshot, &self.config.signals);

        let mut closed = Vec::new();
        for (lifecycle, &signal) in self.lifecycles.iter_mut().zip(signals.iter()) {
            if let Some(trade) = lifecycle.on_tick(tick, spot, signal) {
                self.pnl.add(trade.kind, trade.realized_pnl);
                closed.push(trade);
            }
        }
        self.trades.extend(closed.iter().cloned());

        if self.config.record_ticks {
            self.ticks.push(TickRecord {
                tick,
                price: spot,
                snapshot,
                signals,
            });
        }

        Ok(closed)
    }

    pub fn current_tick(&self) -> usize {
        self.series.current_tick()
    }

    pub fn prices(&self) -> &[f64] {
        self.series.as_slice()
    }

    pub fn pnl(&self) -> &PnlTable {
        &self.pnl
    }

    pub fn lifecycle(&self, kind: StrategyKind) -> &TradeLifecycle {
        &self.lifecycles[kind.index()]
    }

    fn into_result(self) -> BacktestResult {
        let open_trades = self
            .lifecycles
            .iter()
            .filter_map(|lc| lc.open_trade().cloned())
            .collect();

        BacktestResult {
            config: self.config,
            prices: self.series.into_vec(),
            pnl: self.pnl,
            trades: self.trades,
            open_trades,
            ticks: self.ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ConstantShock, ScriptedShocks};
    use approx::assert_relative_eq;

    fn flat_config(total_ticks: usize) -> SimulationConfig {
        let mut config = SimulationConfig {
            total_ticks,
            record_ticks: true,
            ..Default::default()
        };
        config.market.mu = 0.0;
        config.market.sigma = 0.0;
        config
    }

    #[test]
    fn test_pnl_table_total() {
        let mut table = PnlTable::new();
        table.add(StrategyKind::Straddle, 1.5);
        table.add(StrategyKind::BearSpread, -0.5);
        table.add(StrategyKind::Straddle, 2.0);
        assert_eq!(table.get(StrategyKind::Straddle), 3.5);
        assert_eq!(table.get(StrategyKind::Strangle), 0.0);
        assert_eq!(table.total(), 3.0);
    }

    #[test]
    fn test_invalid_config_rejected_before_run() {
        let mut config = SimulationConfig::default();
        config.indicators.short_window = 0;
        let err = BacktestEngine::new(config, ConstantShock(0.0)).err().unwrap();
        assert!(matches!(err, SimulationError::Config(_)));
    }

    #[test]
    fn test_series_length_matches_horizon() {
        let config = SimulationConfig {
            total_ticks: 250,
            seed: Some(1),
            ..Default::default()
        };
        let result = BacktestEngine::from_config(config).unwrap().run().unwrap();
        assert_eq!(result.prices.len(), 250);
        assert_eq!(result.prices[0], 100.0);
        assert!(result.prices.iter().all(|p| p.is_finite() && *p > 0.0));
    }

    #[test]
    fn test_flat_market_only_butterfly_trades() {
        let result = BacktestEngine::new(flat_config(50), ConstantShock(0.0))
            .unwrap()
            .run()
            .unwrap();

        assert!(result.prices.iter().all(|&p| p == 100.0));
        assert!(result.ticks.iter().all(|r| r.snapshot.volatility == 0.0));

        for kind in [
            StrategyKind::Straddle,
            StrategyKind::Strangle,
            StrategyKind::BullSpread,
            StrategyKind::BearSpread,
        ] {
            assert_eq!(result.trades_for(kind).count(), 0, "{kind} traded");
            assert_eq!(result.pnl.get(kind), 0.0);
        }

        // Opens at 1, 12, 23, 34, 45; the last is still open at tick 49.
        let fly: Vec<_> = result.trades_for(StrategyKind::ButterflySpread).collect();
        let entries: Vec<usize> = fly.iter().map(|t| t.entry_tick).collect();
        assert_eq!(entries, vec![1, 12, 23, 34]);
        assert!(fly.iter().all(|t| t.holding_ticks() == 10));
        assert_eq!(result.open_trades.len(), 1);
        assert_eq!(result.open_trades[0].entry_tick, 45);

        // Long-short-long calls pay the lower wing width at the middle strike.
        assert_relative_eq!(
            result.pnl.get(StrategyKind::ButterflySpread),
            4.0 * 50.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_deterministic_under_fixed_shocks() {
        let script: Vec<f64> = (0..97).map(|i| ((i * 37 % 11) as f64 - 5.0) / 2.5).collect();
        let run = || {
            let config = SimulationConfig {
                total_ticks: 2_000,
                record_ticks: true,
                ..Default::default()
            };
            BacktestEngine::new(config, ScriptedShocks::new(script.clone()))
                .unwrap()
                .run()
                .unwrap()
        };

        let a = run();
        let b = run();
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a.prices), bits(&b.prices));
        assert_eq!(a.ticks, b.ticks);
        assert_eq!(a.trades, b.trades);
        for kind in StrategyKind::ALL {
            assert_eq!(a.pnl.get(kind).to_bits(), b.pnl.get(kind).to_bits());
        }
    }

    #[test]
    fn test_step_by_step_invariants() {
        let config = SimulationConfig {
            total_ticks: 3_000,
            seed: Some(99),
            ..Default::default()
        };
        let hold = config.trading.hold_period;
        let mut engine = BacktestEngine::from_config(config).unwrap();

        while !engine.is_finished() {
            let closed = engine.step().unwrap();
            let tick = engine.current_tick();

            for trade in &closed {
                assert_eq!(trade.exit_tick, tick);
                assert!(trade.entry_tick < trade.exit_tick);
                assert!(trade.holding_ticks() <= hold);
            }
            for kind in StrategyKind::ALL {
                let lc = engine.lifecycle(kind);
                let open = usize::from(lc.is_open());
                assert_eq!(lc.trades_opened(), lc.trades_closed() + open);
                if let Some(trade) = lc.open_trade() {
                    assert!(trade.entry_tick <= tick);
                    assert!(trade.held(tick) < hold || trade.entry_tick == tick);
                }
            }

            let expected: f64 = StrategyKind::ALL.iter().map(|k| engine.pnl().get(*k)).sum();
            assert_eq!(engine.pnl().total(), expected);
        }
    }

    #[test]
    fn test_step_past_horizon_is_noop() {
        let mut engine = BacktestEngine::new(flat_config(5), ConstantShock(0.0)).unwrap();
        while !engine.is_finished() {
            engine.step().unwrap();
        }
        assert_eq!(engine.current_tick(), 4);

        assert!(engine.step().unwrap().is_empty());
        assert!(engine.step().unwrap().is_empty());
        assert_eq!(engine.current_tick(), 4);
        assert_eq!(engine.prices().len(), 5);
    }

    #[test]
    fn test_degenerate_price_aborts_run() {
        let mut config = flat_config(50);
        config.market.mu = 1.0e3;
        let err = BacktestEngine::new(config, ConstantShock(0.0))
            .unwrap()
            .run()
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Process(ProcessError::NonFinitePrice { tick: 1, .. })
        ));
    }

    #[test]
    fn test_summary_lists_every_strategy() {
        let result = BacktestEngine::new(flat_config(20), ConstantShock(0.0))
            .unwrap()
            .run()
            .unwrap();
        let summary = result.summary();
        for kind in StrategyKind::ALL {
            assert!(summary.contains(kind.name()));
        }
        assert!(summary.contains("Total PnL"));
    }

    #[test]
    fn test_pnl_serializes_as_map() {
        let mut table = PnlTable::new();
        table.add(StrategyKind::BullSpread, 12.5);
        let json = serde_json::to_value(table).unwrap();
        assert_eq!(json["BullSpread"], 12.5);
        assert_eq!(json["Straddle"], 0.0);
    }
}
