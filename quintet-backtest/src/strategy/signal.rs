//! Alpha signals derived from the current indicator snapshot.

use serde::{Deserialize, Serialize};

use crate::config::SignalConfig;
use crate::indicators::IndicatorSnapshot;

use super::kind::StrategyKind;

/// Discrete trading opinion for one strategy at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlphaSignal {
    /// Open a position if flat.
    Enter,
    /// Close the position if open.
    Exit,
    /// No opinion.
    Neutral,
}

/// Enter above `high`, exit below `low`, neutral in between.
fn band(volatility: f64, high: f64, low: f64) -> AlphaSignal {
    if volatility > high {
        AlphaSignal::Enter
    } else if volatility < low {
        AlphaSignal::Exit
    } else {
        AlphaSignal::Neutral
    }
}

fn binary(enter: bool) -> AlphaSignal {
    if enter {
        AlphaSignal::Enter
    } else {
        AlphaSignal::Exit
    }
}

/// Evaluate one strategy's rule. Stateless: only the snapshot and the
/// thresholds matter.
pub fn generate(
    kind: StrategyKind,
    snapshot: &IndicatorSnapshot,
    thresholds: &SignalConfig,
) -> AlphaSignal {
    let vol = snapshot.volatility;
    match kind {
        StrategyKind::Straddle => band(vol, thresholds.straddle_high, thresholds.straddle_low),
        StrategyKind::Strangle => band(vol, thresholds.strangle_high, thresholds.strangle_low),
        StrategyKind::BullSpread => binary(snapshot.short_ma > snapshot.long_ma),
        StrategyKind::BearSpread => binary(snapshot.short_ma < snapshot.long_ma),
        // Low-volatility regime.
        StrategyKind::ButterflySpread => binary(vol < thresholds.straddle_low),
    }
}

/// Signals for all strategies, in `StrategyKind::ALL` order.
pub fn generate_all(
    snapshot: &IndicatorSnapshot,
    thresholds: &SignalConfig,
) -> [AlphaSignal; StrategyKind::COUNT] {
    StrategyKind::ALL.map(|kind| generate(kind, snapshot, thresholds))
}
