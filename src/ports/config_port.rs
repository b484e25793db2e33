//! Configuration access port trait.

use crate::domain::error::TrendtraderError;

/// Sectioned key/value configuration source.
///
/// Missing keys fall back to `default`; present but malformed values are errors.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, TrendtraderError>;
    fn get_double(&self, section: &str, key: &str, default: f64)
    -> Result<f64, TrendtraderError>;
}
