//! Return volatility.
//!
//! Sample standard deviation of the fractional returns formed from the
//! n closing prices ending at i:
//! r[k] = C[k] / C[k-1] - 1, for k in i-n+2..=i (m = n-1 returns)
//! VOLATILITY(n)[i] = sqrt(sum((r[k] - mean(r))^2) / (m-1))
//! Warmup: first (n-1) bars are invalid. Periods below 2 are never valid.
//! With n = 2 there is a single return and no spread to measure: the point is
//! valid with value 0.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

pub fn calculate_volatility(candles: &[Candle], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(candles.len());
    let warmup = period.saturating_sub(1);

    for (i, candle) in candles.iter().enumerate() {
        let valid = period >= 2 && i >= warmup;

        let value = if valid {
            let window = &candles[i + 1 - period..=i];
            let returns: Vec<f64> = window
                .windows(2)
                .map(|pair| pair[1].return_from(pair[0].close))
                .collect();

            sample_stddev(&returns)
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            timestamp: candle.timestamp,
            valid,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Volatility(period),
        values,
    }
}

fn sample_stddev(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
