#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use trendtrader::domain::candle::Candle;
use trendtrader::domain::error::TrendtraderError;
use trendtrader::domain::simulation::SimulationConfig;
use trendtrader::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, TrendtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TrendtraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, TrendtraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Four-hour candles starting 2024-01-01 00:00.
pub fn ts(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(4 * i as i64)
}

pub fn make_candle(i: usize, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        timestamp: ts(i),
        open: close,
        high,
        low,
        close,
        volume: 1000.0,
    }
}

/// Flat candles: open = high = low = close.
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_candle(i, close, close, close))
        .collect()
}

/// Windows 2/3/4, volatility window 4, ceiling 0.5, SL 3%, TP 5%, risk $100.
pub fn small_config() -> SimulationConfig {
    SimulationConfig {
        fast_window: 2,
        mid_window: 3,
        slow_window: 4,
        volatility_window: 4,
        volatility_ceiling: 0.5,
        stop_loss_pct: 0.03,
        take_profit_pct: 0.05,
        risk_per_trade_usd: 100.0,
        initial_capital: 5000.0,
    }
}

pub const SCENARIO_CLOSES: [f64; 7] = [100.0, 101.0, 103.0, 106.0, 110.0, 108.0, 107.0];

/// `ExitCode` has no `PartialEq`; compare through its `Debug` form.
pub fn assert_exit_code(actual: std::process::ExitCode, expected: u8) {
    assert_eq!(
        format!("{:?}", actual),
        format!("{:?}", std::process::ExitCode::from(expected))
    );
}
