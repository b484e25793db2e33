//! Performance statistics derived from the trade ledger and the equity curve.
//!
//! Everything here is a pure function of its inputs, so statistics can be
//! recomputed at any point of a run.

use chrono::Duration;

use super::position::{ExitReason, Trade};
use super::state::EquityPoint;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExitReasonCounts {
    pub stop_loss: usize,
    pub take_profit: usize,
    pub signal_exit: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub total_pnl_usd: f64,
    pub roi_pct: f64,
    /// Gross wins over gross losses; `None` when no trade lost money.
    pub profit_factor: Option<f64>,
    pub average_trade_pnl: f64,
    pub final_capital: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub avg_trade_duration: Duration,
    pub exit_reason_counts: ExitReasonCounts,
}

impl Statistics {
    pub fn compute(trades: &[Trade], initial_capital: f64) -> Self {
        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_duration_secs = 0i64;
        let mut exit_reason_counts = ExitReasonCounts::default();

        for trade in trades {
            let pnl = trade.pnl_usd;
            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }

            total_duration_secs += trade.duration.num_seconds();

            match trade.exit_reason {
                ExitReason::StopLoss => exit_reason_counts.stop_loss += 1,
                ExitReason::TakeProfit => exit_reason_counts.take_profit += 1,
                ExitReason::SignalExit => exit_reason_counts.signal_exit += 1,
            }
        }

        let total_trades = trades.len();
        let final_capital = trades
            .iter()
            .fold(initial_capital, |capital, t| capital + t.pnl_usd);
        let total_pnl_usd: f64 = trades.iter().map(|t| t.pnl_usd).sum();

        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let roi_pct = if initial_capital > 0.0 {
            total_pnl_usd / initial_capital * 100.0
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            Some(total_wins / total_losses)
        } else {
            None
        };

        let average_trade_pnl = if total_trades > 0 {
            total_pnl_usd / total_trades as f64
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };

        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        let avg_trade_duration = if total_trades > 0 {
            Duration::seconds(total_duration_secs / total_trades as i64)
        } else {
            Duration::zero()
        };

        Statistics {
            total_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            total_pnl_usd,
            roi_pct,
            profit_factor,
            average_trade_pnl,
            final_capital,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            max_drawdown_pct: compute_drawdown(trades, initial_capital),
            sharpe_ratio: compute_sharpe(trades),
            sortino_ratio: compute_sortino(trades),
            avg_trade_duration,
            exit_reason_counts,
        }
    }
}

/// Largest peak-to-trough decline of the realized capital curve, in percent.
fn compute_drawdown(trades: &[Trade], initial_capital: f64) -> f64 {
    let mut capital = initial_capital;
    let mut peak = initial_capital;
    let mut max_dd = 0.0_f64;

    for trade in trades {
        capital += trade.pnl_usd;
        if capital > peak {
            peak = capital;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - capital) / peak);
        }
    }

    max_dd * 100.0
}

/// Mean over population stddev of per-trade returns, 0 when undefined.
fn compute_sharpe(trades: &[Trade]) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }

    let n = trades.len() as f64;
    let mean = trades.iter().map(|t| t.pnl_pct).sum::<f64>() / n;
    let variance = trades
        .iter()
        .map(|t| (t.pnl_pct - mean).powi(2))
        .sum::<f64>()
        / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 { mean / stddev } else { 0.0 }
}

/// Mean per-trade return over the downside deviation, 0 when undefined.
///
/// Downside deviation averages the squared losing returns over all trades.
fn compute_sortino(trades: &[Trade]) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }

    let n = trades.len() as f64;
    let mean = trades.iter().map(|t| t.pnl_pct).sum::<f64>() / n;
    let downside_variance = trades
        .iter()
        .filter(|t| t.pnl_pct < 0.0)
        .map(|t| t.pnl_pct.powi(2))
        .sum::<f64>()
        / n;
    let downside = downside_variance.sqrt();

    if downside > 0.0 { mean / downside } else { 0.0 }
}

/// Mark-to-market figures over the per-candle equity curve.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityStatistics {
    pub peak_equity: f64,
    pub lowest_equity: f64,
    /// Largest peak-to-trough decline, in percent.
    pub max_drawdown_pct: f64,
}

impl EquityStatistics {
    /// Peak and trough both start at `initial_capital`.
    pub fn compute(curve: &[EquityPoint], initial_capital: f64) -> Self {
        let mut peak = initial_capital;
        let mut lowest = initial_capital;
        let mut max_dd = 0.0_f64;

        for point in curve {
            peak = peak.max(point.equity);
            lowest = lowest.min(point.equity);
            if peak > 0.0 {
                max_dd = max_dd.max((peak - point.equity) / peak);
            }
        }

        EquityStatistics {
            peak_equity: peak,
            lowest_equity: lowest,
            max_drawdown_pct: max_dd * 100.0,
        }
    }
}
