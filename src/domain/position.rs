//! Open position and closed-trade records.

use chrono::{Duration, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

use super::execution::RiskParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub size: f64,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
    pub status: PositionStatus,
}

impl Position {
    /// Open a long position with fixed-fractional sizing: a stop-loss hit
    /// loses exactly `risk_per_trade_usd`.
    pub fn open(entry_time: NaiveDateTime, entry_price: f64, params: &RiskParams) -> Self {
        Position {
            entry_time,
            entry_price,
            size: params.risk_per_trade_usd / (entry_price * params.stop_loss_pct),
            stop_loss_price: entry_price * (1.0 - params.stop_loss_pct),
            take_profit_price: entry_price * (1.0 + params.take_profit_pct),
            status: PositionStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.size
    }

    pub fn should_stop_loss(&self, low: f64) -> bool {
        low <= self.stop_loss_price
    }

    pub fn should_take_profit(&self, high: f64) -> bool {
        high >= self.take_profit_price
    }

    /// Consume the position and produce its ledger entry.
    pub fn close(
        mut self,
        sequence_number: usize,
        exit_time: NaiveDateTime,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> Trade {
        self.status = PositionStatus::Closed;
        Trade {
            sequence_number,
            entry_time: self.entry_time,
            entry_price: self.entry_price,
            exit_time,
            exit_price,
            size: self.size,
            pnl_usd: (exit_price - self.entry_price) * self.size,
            pnl_pct: (exit_price - self.entry_price) / self.entry_price,
            exit_reason,
            duration: exit_time - self.entry_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    SignalExit,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TakeProfit => "TAKE_PROFIT",
            ExitReason::SignalExit => "SIGNAL_EXIT",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExitReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STOP_LOSS" => Ok(ExitReason::StopLoss),
            "TAKE_PROFIT" => Ok(ExitReason::TakeProfit),
            "SIGNAL_EXIT" => Ok(ExitReason::SignalExit),
            other => Err(format!("unknown exit reason: {other}")),
        }
    }
}

/// Ledger entry for a closed position. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub sequence_number: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub size: f64,
    pub pnl_usd: f64,
    pub pnl_pct: f64,
    pub exit_reason: ExitReason,
    pub duration: Duration,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl_usd > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl_usd < 0.0
    }
}
