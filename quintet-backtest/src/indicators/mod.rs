//! Trailing-window indicators recomputed from the price history each tick.

pub mod rolling;

pub use rolling::{moving_average, volatility, IndicatorEngine, IndicatorSnapshot};
