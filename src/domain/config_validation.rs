//! Building validated run parameters from a [`ConfigPort`].
//!
//! Missing keys take the defaults of [`SimulationConfig::default`]; present
//! values are checked before any simulation starts.

use std::str::FromStr;

use crate::domain::error::TrendtraderError;
use crate::domain::simulation::SimulationConfig;
use crate::domain::sweep::SweepGrid;
use crate::ports::config_port::ConfigPort;

pub fn build_simulation_config(
    config: &dyn ConfigPort,
) -> Result<SimulationConfig, TrendtraderError> {
    let defaults = SimulationConfig::default();

    let built = SimulationConfig {
        fast_window: get_window(config, "fast_window", defaults.fast_window)?,
        mid_window: get_window(config, "mid_window", defaults.mid_window)?,
        slow_window: get_window(config, "slow_window", defaults.slow_window)?,
        volatility_window: get_window(config, "volatility_window", defaults.volatility_window)?,
        volatility_ceiling: config.get_double(
            "indicators",
            "volatility_ceiling",
            defaults.volatility_ceiling,
        )?,
        stop_loss_pct: config.get_double("risk", "stop_loss_pct", defaults.stop_loss_pct)?,
        take_profit_pct: config.get_double("risk", "take_profit_pct", defaults.take_profit_pct)?,
        risk_per_trade_usd: config.get_double(
            "risk",
            "risk_per_trade_usd",
            defaults.risk_per_trade_usd,
        )?,
        initial_capital: config.get_double(
            "simulation",
            "initial_capital",
            defaults.initial_capital,
        )?,
    };

    built.validate()?;
    Ok(built)
}

fn get_window(
    config: &dyn ConfigPort,
    key: &str,
    default: usize,
) -> Result<usize, TrendtraderError> {
    let value = config.get_int("indicators", key, default as i64)?;
    if value < 1 {
        return Err(TrendtraderError::invalid_config(
            key,
            format!("window must be positive, got {}", value),
        ));
    }
    usize::try_from(value).map_err(|_| TrendtraderError::invalid_config(key, "window too large"))
}

/// Parse the `[sweep]` lists. Absent keys leave that dimension empty.
pub fn build_sweep_grid(config: &dyn ConfigPort) -> Result<SweepGrid, TrendtraderError> {
    Ok(SweepGrid {
        fast_windows: parse_list(config, "fast_windows")?,
        mid_windows: parse_list(config, "mid_windows")?,
        slow_windows: parse_list(config, "slow_windows")?,
        stop_loss_pcts: parse_list(config, "stop_loss_pcts")?,
        take_profit_pcts: parse_list(config, "take_profit_pcts")?,
    })
}

fn parse_list<T>(config: &dyn ConfigPort, key: &str) -> Result<Vec<T>, TrendtraderError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = config.get_string("sweep", key) else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|e| TrendtraderError::ConfigInvalid {
                section: "sweep".to_string(),
                key: key.to_string(),
                reason: format!("invalid list entry '{}': {}", s, e),
            })
        })
        .collect()
}
