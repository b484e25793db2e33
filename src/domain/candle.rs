//! OHLCV candle representation and sequence validation.

use chrono::NaiveDateTime;

use super::error::{Result, TrendtraderError};

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self> {
        let candle = Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        };
        candle.validate()?;
        Ok(candle)
    }

    /// Prices must be finite and positive, volume finite and non-negative,
    /// `low <= high`, and open and close must lie within `[low, high]`.
    pub fn validate(&self) -> Result<()> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, price) in prices {
            if !price.is_finite() || price <= 0.0 {
                return Err(self.invalid(format!("{name} must be positive, got {price}")));
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(self.invalid(format!(
                "volume must be non-negative, got {}",
                self.volume
            )));
        }
        if self.low > self.high {
            return Err(self.invalid(format!(
                "low {} is above high {}",
                self.low, self.high
            )));
        }
        for (name, price) in [("open", self.open), ("close", self.close)] {
            if price < self.low || price > self.high {
                return Err(self.invalid(format!(
                    "{name} {price} is outside [{}, {}]",
                    self.low, self.high
                )));
            }
        }
        Ok(())
    }

    /// close[self] / prev_close - 1
    pub fn return_from(&self, prev_close: f64) -> f64 {
        self.close / prev_close - 1.0
    }

    fn invalid(&self, reason: String) -> TrendtraderError {
        TrendtraderError::InvalidCandle {
            timestamp: self.timestamp,
            reason,
        }
    }
}

/// Check every candle and require strictly increasing timestamps.
///
/// Out-of-order or duplicate timestamps are rejected as they are found; the
/// sequence is never reordered.
pub fn validate_candles(candles: &[Candle]) -> Result<()> {
    for (index, candle) in candles.iter().enumerate() {
        candle.validate()?;
        if index > 0 {
            let previous = candles[index - 1].timestamp;
            if candle.timestamp <= previous {
                return Err(TrendtraderError::InvalidCandleOrdering {
                    index,
                    previous,
                    current: candle.timestamp,
                });
            }
        }
    }
    Ok(())
}
