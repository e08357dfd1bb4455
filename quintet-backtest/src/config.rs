//! Simulation configuration.
//!
//! Every parameter has a default matching the reference run, so a TOML file
//! only needs to list the values it overrides:
//!
//! ```toml
//! total_ticks = 5000
//! seed = 42
//!
//! [market]
//! sigma = 0.02
//!
//! [trading]
//! hold_period = 20
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid parameter `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// Parameters of the simulated underlying.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Initial price (index 0 of the series).
    pub s0: f64,
    /// Drift per tick.
    pub mu: f64,
    /// Volatility per tick.
    pub sigma: f64,
    /// Time step.
    pub dt: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            s0: 100.0,
            mu: 0.0001,
            sigma: 0.01,
            dt: 1.0,
        }
    }
}

/// Trailing window lengths, in ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub vol_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            short_window: 5,
            long_window: 20,
            vol_window: 5,
        }
    }
}

/// Volatility thresholds driving the signal rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Straddle entry: volatility above this.
    pub straddle_high: f64,
    /// Straddle exit, and butterfly entry: volatility below this.
    pub straddle_low: f64,
    /// Strangle entry.
    pub strangle_high: f64,
    /// Strangle exit.
    pub strangle_low: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            straddle_high: 0.01,
            straddle_low: 0.005,
            strangle_high: 0.012,
            strangle_low: 0.007,
        }
    }
}

/// Position sizing and holding rules shared by all strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    /// Maximum ticks a trade may stay open.
    pub hold_period: usize,
    /// Strike offset around the entry spot (0.05 = 5%).
    pub strike_offset: f64,
    /// Contracts per trade.
    pub volume: u32,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            hold_period: 10,
            strike_offset: 0.05,
            volume: 10,
        }
    }
}

/// Upper bound on `total_ticks`; the price history is reserved up front.
pub const MAX_TOTAL_TICKS: usize = 100_000_000;

/// Full configuration for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of prices in the generated series, including `s0`.
    pub total_ticks: usize,

    /// Seed for the Gaussian shock source. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Keep a per-tick record of snapshots and signals in the result.
    pub record_ticks: bool,

    pub market: MarketConfig,
    pub indicators: IndicatorConfig,
    pub signals: SignalConfig,
    pub trading: TradingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_ticks: 10_000,
            seed: None,
            record_ticks: false,
            market: MarketConfig::default(),
            indicators: IndicatorConfig::default(),
            signals: SignalConfig::default(),
            trading: TradingConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject parameter sets the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_ticks < 2 {
            return Err(ConfigError::invalid(
                "total_ticks",
                format!("must be greater than 1, got {}", self.total_ticks),
            ));
        }
        if self.total_ticks > MAX_TOTAL_TICKS {
            return Err(ConfigError::invalid(
                "total_ticks",
                format!(
                    "must not exceed {MAX_TOTAL_TICKS}, got {}",
                    self.total_ticks
                ),
            ));
        }

        let m = &self.market;
        require_finite("market.s0", m.s0)?;
        require_finite("market.mu", m.mu)?;
        require_finite("market.sigma", m.sigma)?;
        require_finite("market.dt", m.dt)?;
        if m.s0 <= 0.0 {
            return Err(ConfigError::invalid("market.s0", "must be positive"));
        }
        if m.sigma < 0.0 {
            return Err(ConfigError::invalid("market.sigma", "must not be negative"));
        }
        if m.dt <= 0.0 {
            return Err(ConfigError::invalid("market.dt", "must be positive"));
        }

        let w = &self.indicators;
        for (name, value) in [
            ("indicators.short_window", w.short_window),
            ("indicators.long_window", w.long_window),
            ("indicators.vol_window", w.vol_window),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(name, "window must be at least 1"));
            }
        }

        let s = &self.signals;
        require_finite("signals.straddle_high", s.straddle_high)?;
        require_finite("signals.straddle_low", s.straddle_low)?;
        require_finite("signals.strangle_high", s.strangle_high)?;
        require_finite("signals.strangle_low", s.strangle_low)?;
        if s.straddle_low > s.straddle_high {
            return Err(ConfigError::invalid(
                "signals.straddle_low",
                "must not exceed straddle_high",
            ));
        }
        if s.strangle_low > s.strangle_high {
            return Err(ConfigError::invalid(
                "signals.strangle_low",
                "must not exceed strangle_high",
            ));
        }

        let t = &self.trading;
        require_finite("trading.strike_offset", t.strike_offset)?;
        if t.strike_offset < 0.0 {
            return Err(ConfigError::invalid(
                "trading.strike_offset",
                "must not be negative",
            ));
        }
        if t.volume == 0 {
            return Err(ConfigError::invalid("trading.volume", "must be at least 1"));
        }

        Ok(())
    }
}

fn require_finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, format!("must be finite, got {value}")))
    }
}
