//! Trend indicators computed from a candle sequence.
//!
//! This module provides:
//! - `IndicatorSeries`: a single indicator over the whole sequence, with a
//!   validity flag per point during warmup
//! - `IndicatorSet`: the per-candle feature set consumed by the simulator
//! - `Indicators`: all sets for a run, built without look-ahead

pub mod sma;
pub mod volatility;

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::candle::Candle;
use crate::domain::error::{Result, TrendtraderError};

use sma::calculate_sma;
use volatility::calculate_volatility;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn value(&self) -> Option<f64> {
        self.valid.then_some(self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Volatility(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Volatility(period) => write!(f, "VOLATILITY({})", period),
        }
    }
}

/// Lookback windows for the three moving averages and the volatility series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorWindows {
    pub fast: usize,
    pub mid: usize,
    pub slow: usize,
    pub volatility: usize,
}

impl IndicatorWindows {
    /// Number of candles needed before every indicator is defined.
    pub fn warmup(&self) -> usize {
        self.fast.max(self.mid).max(self.slow).max(self.volatility)
    }

    pub fn indicator_types(&self) -> [IndicatorType; 4] {
        [
            IndicatorType::Sma(self.fast),
            IndicatorType::Sma(self.mid),
            IndicatorType::Sma(self.slow),
            IndicatorType::Volatility(self.volatility),
        ]
    }
}

impl Default for IndicatorWindows {
    fn default() -> Self {
        IndicatorWindows {
            fast: 5,
            mid: 10,
            slow: 20,
            volatility: 20,
        }
    }
}

/// Indicator values at one candle index, undefined until warmed up.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub timestamp: NaiveDateTime,
    pub sma_fast: Option<f64>,
    pub sma_mid: Option<f64>,
    pub sma_slow: Option<f64>,
    pub volatility: Option<f64>,
}

/// A fully defined [`IndicatorSet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorValues {
    pub sma_fast: f64,
    pub sma_mid: f64,
    pub sma_slow: f64,
    pub volatility: f64,
}

impl IndicatorSet {
    pub fn ready(&self) -> Option<IndicatorValues> {
        Some(IndicatorValues {
            sma_fast: self.sma_fast?,
            sma_mid: self.sma_mid?,
            sma_slow: self.sma_slow?,
            volatility: self.volatility?,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.ready().is_some()
    }
}

impl IndicatorValues {
    /// sma_fast > sma_mid > sma_slow
    pub fn trend_ascending(&self) -> bool {
        self.sma_fast > self.sma_mid && self.sma_mid > self.sma_slow
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Indicators {
    windows: IndicatorWindows,
    sets: Vec<IndicatorSet>,
}

impl Indicators {
    /// Compute one [`IndicatorSet`] per candle. Each set only depends on the
    /// candles at or before its index.
    pub fn compute(candles: &[Candle], windows: IndicatorWindows) -> Self {
        let fast = calculate_sma(candles, windows.fast);
        let mid = calculate_sma(candles, windows.mid);
        let slow = calculate_sma(candles, windows.slow);
        let volatility = calculate_volatility(candles, windows.volatility);

        let sets = candles
            .iter()
            .enumerate()
            .map(|(i, candle)| IndicatorSet {
                timestamp: candle.timestamp,
                sma_fast: fast.values[i].value(),
                sma_mid: mid.values[i].value(),
                sma_slow: slow.values[i].value(),
                volatility: volatility.values[i].value(),
            })
            .collect();

        Indicators { windows, sets }
    }

    pub fn windows(&self) -> IndicatorWindows {
        self.windows
    }

    pub fn warmup(&self) -> usize {
        self.windows.warmup()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&IndicatorSet> {
        self.sets.get(index)
    }

    pub fn sets(&self) -> &[IndicatorSet] {
        &self.sets
    }

    /// Strict accessor: fails with `InsufficientData` when `index` lies in
    /// the warmup span or past the end of the sequence.
    pub fn value_at(&self, index: usize) -> Result<IndicatorValues> {
        let warmup = self.warmup();
        if index >= self.sets.len() {
            return Err(TrendtraderError::InsufficientData {
                bars: self.sets.len(),
                minimum: (index + 1).max(warmup),
            });
        }
        self.sets[index]
            .ready()
            .ok_or(TrendtraderError::InsufficientData {
                bars: index + 1,
                minimum: warmup,
            })
    }
}
