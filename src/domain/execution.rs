//! Signal evaluation and trade execution.
//!
//! Implements the entry condition, the exit priority (stop-loss, then
//! take-profit, then trend reversal) and the open/close operations on a
//! [`SimulationState`].

use chrono::NaiveDateTime;
use tracing::debug;

use super::candle::Candle;
use super::indicator::IndicatorSet;
use super::position::{ExitReason, Position, Trade};
use super::state::SimulationState;

/// Fixed risk rules applied to every position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskParams {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub risk_per_trade_usd: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        RiskParams {
            stop_loss_pct: 0.03,
            take_profit_pct: 0.05,
            risk_per_trade_usd: 250.0,
        }
    }
}

/// Entry condition for a flat state:
/// 1. sma_fast > sma_mid > sma_slow
/// 2. close > sma_fast
/// 3. volatility < volatility_ceiling
///
/// Always false while the indicator set is still warming up.
pub fn entry_signal(candle: &Candle, set: &IndicatorSet, volatility_ceiling: f64) -> bool {
    let Some(values) = set.ready() else {
        return false;
    };
    values.trend_ascending()
        && candle.close > values.sma_fast
        && values.volatility < volatility_ceiling
}

/// Exit decision for an open position, first match wins:
/// 1. low <= stop_loss_price → close at the stop price
/// 2. high >= take_profit_price → close at the take-profit price
/// 3. sma_fast < sma_mid → close at the candle close
pub fn exit_signal(
    position: &Position,
    candle: &Candle,
    set: &IndicatorSet,
) -> Option<(f64, ExitReason)> {
    if position.should_stop_loss(candle.low) {
        return Some((position.stop_loss_price, ExitReason::StopLoss));
    }
    if position.should_take_profit(candle.high) {
        return Some((position.take_profit_price, ExitReason::TakeProfit));
    }
    match (set.sma_fast, set.sma_mid) {
        (Some(fast), Some(mid)) if fast < mid => Some((candle.close, ExitReason::SignalExit)),
        _ => None,
    }
}

/// Open a long position at the candle close.
///
/// Returns `None` and leaves the state untouched when a position is already open.
pub fn enter_long<'a>(
    state: &'a mut SimulationState,
    candle: &Candle,
    params: &RiskParams,
) -> Option<&'a Position> {
    let position = Position::open(candle.timestamp, candle.close, params);
    if !state.open(position) {
        return None;
    }
    let position = state.open_position()?;
    debug!(
        entry_time = %position.entry_time,
        entry_price = position.entry_price,
        size = position.size,
        stop_loss = position.stop_loss_price,
        take_profit = position.take_profit_price,
        "opened position"
    );
    Some(position)
}

/// Close the open position, append the trade and credit its P&L to capital.
///
/// Returns `None` when the state is flat.
pub fn close_position(
    state: &mut SimulationState,
    exit_price: f64,
    exit_time: NaiveDateTime,
    reason: ExitReason,
) -> Option<Trade> {
    let sequence_number = state.next_sequence_number();
    let position = state.take_position()?;
    let trade = position.close(sequence_number, exit_time, exit_price, reason);
    debug!(
        sequence_number,
        exit_time = %trade.exit_time,
        exit_price = trade.exit_price,
        pnl_usd = trade.pnl_usd,
        reason = %trade.exit_reason,
        "closed position"
    );
    state.record_trade(trade.clone());
    Some(trade)
}
