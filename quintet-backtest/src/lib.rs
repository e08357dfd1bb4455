pub mod backtest;
pub mod config;
pub mod indicators;
pub mod metrics;
pub mod process;
pub mod strategy;
pub mod sweep;

// Re-export commonly used types
pub use backtest::{BacktestEngine, BacktestResult, ClosedTrade, ExitReason, PnlTable, SimulationError};
pub use config::{ConfigError, SimulationConfig};
pub use indicators::{IndicatorEngine, IndicatorSnapshot};
pub use metrics::{MetricsCalculator, PerformanceMetrics};
pub use process::{ConstantShock, GaussianShocks, GbmProcess, ScriptedShocks, ShockSource};
pub use strategy::{AlphaSignal, StrategyKind, Strikes};
pub use sweep::{SeedSweep, SweepSummary};
