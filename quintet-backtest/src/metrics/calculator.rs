//! Performance metrics calculator.
//!
//! Summarizes closed trades per strategy and across the whole run.

use serde::{Deserialize, Serialize};

use crate::backtest::{BacktestResult, ClosedTrade, ExitReason};
use crate::strategy::StrategyKind;

/// Trade statistics for one strategy, or for all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// `None` for the aggregate over all strategies.
    pub strategy: Option<StrategyKind>,

    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,

    pub total_pnl: f64,
    pub gross_profit: f64,
    /// Sum of non-winning trades, zero or negative.
    pub gross_loss: f64,
    pub profit_factor: f64,
    pub avg_trade_pnl: f64,
    /// Average over winning trades only.
    pub avg_winner: f64,
    pub avg_loser: f64,
    pub largest_winner: f64,
    /// Most negative realized P&L among non-winners.
    pub largest_loser: f64,

    pub avg_holding_ticks: f64,
    pub holding_period_exits: usize,
    pub signal_exits: usize,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self {
            strategy: None,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate: 0.0,
            total_pnl: 0.0,
            gross_profit: 0.0,
            gross_loss: 0.0,
            profit_factor: 0.0,
            avg_trade_pnl: 0.0,
            avg_winner: 0.0,
            avg_loser: 0.0,
            largest_winner: 0.0,
            largest_loser: 0.0,
            avg_holding_ticks: 0.0,
            holding_period_exits: 0,
            signal_exits: 0,
        }
    }
}

impl PerformanceMetrics {
    /// Generate a summary line.
    pub fn summary(&self) -> String {
        let label = self
            .strategy
            .map(|k| k.name())
            .unwrap_or("All strategies");
        format!(
            "{:<18} trades {:>5} (W: {}, L: {})  win {:>5.1}%  pf {:>6.2}  pnl {:>12.4}  avg {:>9.4}  best {:>9.4}  worst {:>9.4}  hold {:>5.2}",
            label,
            self.total_trades,
            self.winning_trades,
            self.losing_trades,
            self.win_rate * 100.0,
            self.profit_factor,
            self.total_pnl,
            self.avg_trade_pnl,
            self.largest_winner,
            self.largest_loser,
            self.avg_holding_ticks,
        )
    }
}

/// Metrics calculator.
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Per-strategy metrics in `StrategyKind::ALL` order.
    pub fn per_strategy(result: &BacktestResult) -> Vec<PerformanceMetrics> {
        StrategyKind::ALL
            .iter()
            .map(|&kind| {
                let trades: Vec<&ClosedTrade> = result.trades_for(kind).collect();
                PerformanceMetrics {
                    strategy: Some(kind),
                    ..Self::from_trades(&trades)
                }
            })
            .collect()
    }

    /// Metrics over every closed trade of the run.
    pub fn overall(result: &BacktestResult) -> PerformanceMetrics {
        let trades: Vec<&ClosedTrade> = result.trades.iter().collect();
        Self::from_trades(&trades)
    }

    /// Calculate metrics from trades in close order.
    pub fn from_trades(trades: &[&ClosedTrade]) -> PerformanceMetrics {
        if trades.is_empty() {
            return PerformanceMetrics::default();
        }

        let total_trades = trades.len();
        let winning_trades = trades.iter().filter(|t| t.is_winner()).count();
        let losing_trades = total_trades - winning_trades;

        let total_pnl: f64 = trades.iter().map(|t| t.realized_pnl).sum();
        let gross_profit: f64 = trades
            .iter()
            .filter(|t| t.is_winner())
            .map(|t| t.realized_pnl)
            .sum();
        let gross_loss: f64 = trades
            .iter()
            .filter(|t| !t.is_winner())
            .map(|t| t.realized_pnl)
            .sum();

        let avg_winner = if winning_trades > 0 {
            gross_profit / winning_trades as f64
        } else {
            0.0
        };
        let avg_loser = if losing_trades > 0 {
            gross_loss / losing_trades as f64
        } else {
            0.0
        };

        let largest_winner = trades
            .iter()
            .map(|t| t.realized_pnl)
            .fold(0.0, f64::max);
        let largest_loser = trades
            .iter()
            .map(|t| t.realized_pnl)
            .fold(0.0, f64::min);

        let avg_holding_ticks =
            trades.iter().map(|t| t.holding_ticks() as f64).sum::<f64>() / total_trades as f64;

        PerformanceMetrics {
            strategy: None,
            total_trades,
            winning_trades,
            losing_trades,
            win_rate: winning_trades as f64 / total_trades as f64,
            total_pnl,
            gross_profit,
            gross_loss,
            profit_factor: Self::calculate_profit_factor(gross_profit, gross_loss),
            avg_trade_pnl: total_pnl / total_trades as f64,
            avg_winner,
            avg_loser,
            largest_winner,
            largest_loser,
            avg_holding_ticks,
            holding_period_exits: Self::count_exits(trades, ExitReason::HoldingPeriod),
            signal_exits: Self::count_exits(trades, ExitReason::Signal),
        }
    }

    /// Gross profit over absolute gross loss; infinite with no losses.
    fn calculate_profit_factor(gross_profit: f64, gross_loss: f64) -> f64 {
        let loss = gross_loss.abs();
        if loss == 0.0 {
            return f64::INFINITY;
        }
        gross_profit / loss
    }

    fn count_exits(trades: &[&ClosedTrade], reason: ExitReason) -> usize {
        trades.iter().filter(|t| t.exit_reason == reason).count()
    }
}
