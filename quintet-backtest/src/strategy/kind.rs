//! Strategy identities and their strike layouts.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::payoff;

/// The five simulated strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyKind {
    Straddle,
    Strangle,
    BullSpread,
    BearSpread,
    ButterflySpread,
}

impl StrategyKind {
    pub const COUNT: usize = 5;

    /// Evaluation order within a tick.
    pub const ALL: [StrategyKind; Self::COUNT] = [
        Self::Straddle,
        Self::Strangle,
        Self::BullSpread,
        Self::BearSpread,
        Self::ButterflySpread,
    ];

    /// Position in `ALL`, usable as an array index.
    pub fn index(self) -> usize {
        match self {
            Self::Straddle => 0,
            Self::Strangle => 1,
            Self::BullSpread => 2,
            Self::BearSpread => 3,
            Self::ButterflySpread => 4,
        }
    }

    /// Report identifier, 1 through 5.
    pub fn id(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1..=5 => Some(Self::ALL[id as usize - 1]),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Straddle => "Straddle",
            Self::Strangle => "Strangle",
            Self::BullSpread => "Bull Spread",
            Self::BearSpread => "Bear Spread",
            Self::ButterflySpread => "Butterfly Spread",
        }
    }

    /// Strikes struck around the entry spot with fractional offset `delta`.
    pub fn strikes(self, spot: f64, delta: f64) -> Strikes {
        let below = spot * (1.0 - delta);
        let above = spot * (1.0 + delta);
        match self {
            Self::Straddle => Strikes::Straddle { strike: spot },
            Self::Strangle => Strikes::Strangle {
                put: below,
                call: above,
            },
            Self::BullSpread => Strikes::BullSpread {
                long_call: below,
                short_call: above,
            },
            Self::BearSpread => Strikes::BearSpread {
                long_put: above,
                short_put: below,
            },
            Self::ButterflySpread => Strikes::ButterflySpread {
                lower: below,
                middle: spot,
                upper: above,
            },
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strikes fixed at entry, one variant per strategy shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Strikes {
    Straddle { strike: f64 },
    Strangle { put: f64, call: f64 },
    BullSpread { long_call: f64, short_call: f64 },
    BearSpread { long_put: f64, short_put: f64 },
    ButterflySpread { lower: f64, middle: f64, upper: f64 },
}

impl Strikes {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Straddle { .. } => StrategyKind::Straddle,
            Self::Strangle { .. } => StrategyKind::Strangle,
            Self::BullSpread { .. } => StrategyKind::BullSpread,
            Self::BearSpread { .. } => StrategyKind::BearSpread,
            Self::ButterflySpread { .. } => StrategyKind::ButterflySpread,
        }
    }

    /// Intrinsic payoff per unit at `spot`.
    pub fn payoff(&self, spot: f64) -> f64 {
        match *self {
            Self::Straddle { strike } => payoff::straddle(spot, strike),
            Self::Strangle { put, call } => payoff::strangle(spot, put, call),
            Self::BullSpread {
                long_call,
                short_call,
            } => payoff::bull_spread(spot, long_call, short_call),
            Self::BearSpread {
                long_put,
                short_put,
            } => payoff::bear_spread(spot, long_put, short_put),
            Self::ButterflySpread {
                lower,
                middle,
                upper,
            } => payoff::butterfly_spread(spot, lower, middle, upper),
        }
    }

    /// Strike levels in leg order (1 to 3 values).
    pub fn levels(&self) -> Vec<f64> {
        match *self {
            Self::Straddle { strike } => vec![strike],
            Self::Strangle { put, call } => vec![put, call],
            Self::BullSpread {
                long_call,
                short_call,
            } => vec![long_call, short_call],
            Self::BearSpread {
                long_put,
                short_put,
            } => vec![long_put, short_put],
            Self::ButterflySpread {
                lower,
                middle,
                upper,
            } => vec![lower, middle, upper],
        }
    }
}
