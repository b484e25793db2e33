//! Parameter sweeps: many independent simulations over one candle series.

use rayon::prelude::*;
use tracing::info;

use super::candle::{Candle, validate_candles};
use super::error::Result;
use super::metrics::Statistics;
use super::simulation::{SimulationConfig, SimulationResult, Simulator};

/// Values to try per parameter. An empty dimension keeps the base value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepGrid {
    pub fast_windows: Vec<usize>,
    pub mid_windows: Vec<usize>,
    pub slow_windows: Vec<usize>,
    pub stop_loss_pcts: Vec<f64>,
    pub take_profit_pcts: Vec<f64>,
}

fn or_base<T: Copy>(values: &[T], base: T) -> Vec<T> {
    if values.is_empty() {
        vec![base]
    } else {
        values.to_vec()
    }
}

impl SweepGrid {
    /// Cartesian product over `base`, keeping only `fast < mid < slow`.
    pub fn combinations(&self, base: &SimulationConfig) -> Vec<SimulationConfig> {
        let fasts = or_base(&self.fast_windows, base.fast_window);
        let mids = or_base(&self.mid_windows, base.mid_window);
        let slows = or_base(&self.slow_windows, base.slow_window);
        let stops = or_base(&self.stop_loss_pcts, base.stop_loss_pct);
        let targets = or_base(&self.take_profit_pcts, base.take_profit_pct);

        let mut configs = Vec::new();
        for &fast_window in &fasts {
            for &mid_window in &mids {
                for &slow_window in &slows {
                    if !(fast_window < mid_window && mid_window < slow_window) {
                        continue;
                    }
                    for &stop_loss_pct in &stops {
                        for &take_profit_pct in &targets {
                            configs.push(SimulationConfig {
                                fast_window,
                                mid_window,
                                slow_window,
                                stop_loss_pct,
                                take_profit_pct,
                                ..base.clone()
                            });
                        }
                    }
                }
            }
        }
        configs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    pub config: SimulationConfig,
    pub statistics: Statistics,
}

/// Run every configuration against `candles` in parallel.
///
/// Outcomes come back in the order of `configs`. A configuration that needs
/// more candles than available yields empty statistics; any other error
/// aborts the sweep.
pub fn run_sweep(candles: &[Candle], configs: &[SimulationConfig]) -> Result<Vec<SweepOutcome>> {
    validate_candles(candles)?;

    let outcomes = configs
        .par_iter()
        .map(|config| -> Result<SweepOutcome> {
            let simulator = Simulator::new(config.clone())?;
            let statistics = match simulator.run(candles) {
                Ok(result) => result.statistics,
                Err(e) if e.is_recoverable() => SimulationResult::empty(config.clone()).statistics,
                Err(e) => return Err(e),
            };
            Ok(SweepOutcome {
                config: config.clone(),
                statistics,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        candles = candles.len(),
        configurations = outcomes.len(),
        "sweep finished"
    );
    Ok(outcomes)
}

/// Sort outcomes by total P&L, best first.
pub fn rank_by_pnl(outcomes: &mut [SweepOutcome]) {
    outcomes.sort_by(|a, b| {
        b.statistics
            .total_pnl_usd
            .total_cmp(&a.statistics.total_pnl_usd)
    });
}
