//! Trade lifecycle for a single strategy.
//!
//! Each strategy owns one `TradeLifecycle`, a two-state machine:
//! - Flat -> Open on an `Enter` signal (strikes fixed at the entry spot)
//! - Open -> Flat once the holding period elapses or on an `Exit` signal
//!
//! Closing values the strikes at the current spot and reports the realized
//! P&L to the caller.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TradingConfig;
use crate::strategy::{AlphaSignal, StrategyKind, Strikes};

/// Reason a trade was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// Held for the maximum number of ticks.
    HoldingPeriod,
    /// Strategy emitted `Exit` before the holding period elapsed.
    Signal,
}

/// An open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenTrade {
    pub kind: StrategyKind,
    pub entry_tick: usize,
    pub entry_price: f64,
    pub strikes: Strikes,
    pub volume: u32,
}

impl OpenTrade {
    /// Ticks held as of `tick`.
    pub fn held(&self, tick: usize) -> usize {
        tick - self.entry_tick
    }

    /// Mark-to-intrinsic value at `spot`, not realized.
    pub fn unrealized_pnl(&self, spot: f64) -> f64 {
        self.strikes.payoff(spot) * f64::from(self.volume)
    }
}

/// A completed trade for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub kind: StrategyKind,
    pub entry_tick: usize,
    pub exit_tick: usize,
    pub entry_price: f64,
    pub exit_price: f64,
    pub strikes: Strikes,
    pub volume: u32,
    /// Payoff per unit at the exit spot.
    pub payoff: f64,
    /// `payoff * volume`.
    pub realized_pnl: f64,
    pub exit_reason: ExitReason,
}

impl ClosedTrade {
    pub fn holding_ticks(&self) -> usize {
        self.exit_tick - self.entry_tick
    }

    pub fn is_winner(&self) -> bool {
        self.realized_pnl > 0.0
    }
}

/// Position state for one strategy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum TradeState {
    #[default]
    Flat,
    Open(OpenTrade),
}

/// Per-strategy state machine.
#[derive(Debug, Clone)]
pub struct TradeLifecycle {
    kind: StrategyKind,
    max_hold: usize,
    strike_offset: f64,
    volume: u32,
    state: TradeState,
    trades_opened: usize,
    trades_closed: usize,
}

impl TradeLifecycle {
    pub fn new(kind: StrategyKind, trading: &TradingConfig) -> Self {
        Self {
            kind,
            max_hold: trading.hold_period,
            strike_offset: trading.strike_offset,
            volume: trading.volume,
            state: TradeState::Flat,
            trades_opened: 0,
            trades_closed: 0,
        }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn state(&self) -> &TradeState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, TradeState::Open(_))
    }

    pub fn open_trade(&self) -> Option<&OpenTrade> {
        match &self.state {
            TradeState::Open(trade) => Some(trade),
            TradeState::Flat => None,
        }
    }

    pub fn trades_opened(&self) -> usize {
        self.trades_opened
    }

    pub fn trades_closed(&self) -> usize {
        self.trades_closed
    }

    /// Apply this tick's signal at `spot`.
    ///
    /// At most one transition happens per tick, so a trade opened here
    /// cannot also close here. Returns the trade if it was closed.
    pub fn on_tick(&mut self, tick: usize, spot: f64, signal: AlphaSignal) -> Option<ClosedTrade> {
        match &self.state {
            TradeState::Flat => {
                if signal == AlphaSignal::Enter {
                    self.open(tick, spot);
                }
                None
            }
            TradeState::Open(trade) => {
                debug_assert!(trade.entry_tick < tick, "trade must be entered before it can close");

                let reason = if trade.held(tick) >= self.max_hold {
                    ExitReason::HoldingPeriod
                } else if signal == AlphaSignal::Exit {
                    ExitReason::Signal
                } else {
                    return None;
                };
                Some(self.close(tick, spot, reason))
            }
        }
    }

    fn open(&mut self, tick: usize, spot: f64) {
        debug_assert!(!self.is_open(), "{} already has an open trade", self.kind);

        let trade = OpenTrade {
            kind: self.kind,
            entry_tick: tick,
            entry_price: spot,
            strikes: self.kind.strikes(spot, self.strike_offset),
            volume: self.volume,
        };
        debug!(strategy = %self.kind, tick, spot, strikes = ?trade.strikes, "open");

        self.state = TradeState::Open(trade);
        self.trades_opened += 1;
    }

    fn close(&mut self, tick: usize, spot: f64, exit_reason: ExitReason) -> ClosedTrade {
        let trade = match std::mem::take(&mut self.state) {
            TradeState::Open(trade) => trade,
            TradeState::Flat => unreachable!("close called while flat"),
        };

        let payoff = trade.strikes.payoff(spot);
        let realized_pnl = payoff * f64::from(trade.volume);
        self.trades_closed += 1;

        debug!(
            strategy = %self.kind,
            tick,
            spot,
            held = tick - trade.entry_tick,
            ?exit_reason,
            realized_pnl,
            "close"
        );

        ClosedTrade {
            kind: trade.kind,
            entry_tick: trade.entry_tick,
            exit_tick: tick,
            entry_price: trade.entry_price,
            exit_price: spot,
            strikes: trade.strikes,
            volume: trade.volume,
            payoff,
            realized_pnl,
            exit_reason,
        }
    }
}
