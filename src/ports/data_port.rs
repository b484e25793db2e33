//! Data access port trait.

use crate::domain::candle::Candle;
use crate::domain::error::TrendtraderError;

pub trait DataPort {
    /// Candles for `symbol` in source order. Ordering is checked by the engine.
    fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, TrendtraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, TrendtraderError>;
}
