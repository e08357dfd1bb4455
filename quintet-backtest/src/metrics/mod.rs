//! Performance metrics module.
//!
//! Per-strategy trade statistics over the closed-trade log:
//! - Win rate, average and best trade
//! - Holding time and exit reason breakdown

pub mod calculator;

pub use calculator::{MetricsCalculator, PerformanceMetrics};
