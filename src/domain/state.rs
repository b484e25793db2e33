//! Per-run simulation state and equity tracking.

use chrono::NaiveDateTime;

use super::position::{Position, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

/// Caller-owned state for one simulation run.
///
/// Capital only moves when a trade is recorded, and by exactly its `pnl_usd`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    capital: f64,
    initial_capital: f64,
    open_position: Option<Position>,
    trades: Vec<Trade>,
    candle_index: usize,
    equity_curve: Vec<EquityPoint>,
}

impl SimulationState {
    pub fn new(initial_capital: f64) -> Self {
        SimulationState {
            capital: initial_capital,
            initial_capital,
            open_position: None,
            trades: Vec::new(),
            candle_index: 0,
            equity_curve: Vec::new(),
        }
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn open_position(&self) -> Option<&Position> {
        self.open_position.as_ref()
    }

    pub fn is_flat(&self) -> bool {
        self.open_position.is_none()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn candle_index(&self) -> usize {
        self.candle_index
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    /// Mark-to-market equity at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.capital
            + self
                .open_position
                .as_ref()
                .map_or(0.0, |pos| pos.unrealized_pnl(price))
    }

    pub(crate) fn next_sequence_number(&self) -> usize {
        self.trades.len() + 1
    }

    /// Returns false without touching the state when a position is already open.
    pub(crate) fn open(&mut self, position: Position) -> bool {
        if self.open_position.is_some() {
            return false;
        }
        self.open_position = Some(position);
        true
    }

    pub(crate) fn take_position(&mut self) -> Option<Position> {
        self.open_position.take()
    }

    pub(crate) fn record_trade(&mut self, trade: Trade) {
        self.capital += trade.pnl_usd;
        self.trades.push(trade);
    }

    pub(crate) fn record_equity(&mut self, timestamp: NaiveDateTime, price: f64) {
        let equity = self.equity(price);
        self.equity_curve.push(EquityPoint { timestamp, equity });
    }

    pub(crate) fn advance(&mut self) {
        self.candle_index += 1;
    }

    pub(crate) fn into_parts(self) -> (Vec<Trade>, Vec<EquityPoint>, f64) {
        (self.trades, self.equity_curve, self.capital)
    }
}
