//! Backtesting engine for the five options strategies.
//!
//! This module provides the simulation framework:
//! - Trade lifecycle management (entry, holding, exits)
//! - Intrinsic payoff realization on close
//! - Per-strategy P&L accumulation

pub mod engine;
pub mod trade;

pub use engine::{BacktestEngine, BacktestResult, PnlTable, SimulationError, TickRecord};
pub use trade::{ClosedTrade, ExitReason, OpenTrade, TradeLifecycle, TradeState};
