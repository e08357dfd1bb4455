//! Synthetic price generation.
//!
//! - Geometric Brownian motion step and the append-only price series
//! - Injectable standard-normal shock sources

pub mod gbm;
pub mod shocks;

pub use gbm::{GbmProcess, PriceSeries, ProcessError};
pub use shocks::{ConstantShock, GaussianShocks, ScriptedShocks, ShockSource};
