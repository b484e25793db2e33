//! Domain error types.

use chrono::NaiveDateTime;

/// Top-level error type for trendtrader.
#[derive(Debug, thiserror::Error)]
pub enum TrendtraderError {
    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("candle {index} at {current} is not after the previous candle at {previous}")]
    InvalidCandleOrdering {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("invalid candle at {timestamp}: {reason}")]
    InvalidCandle {
        timestamp: NaiveDateTime,
        reason: String,
    },

    #[error("invalid configuration {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrendtraderError {
    /// Whether a run failing with this error may be treated as a zero-trade run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TrendtraderError::InsufficientData { .. })
    }

    pub(crate) fn invalid_config(field: &str, reason: impl Into<String>) -> Self {
        TrendtraderError::InvalidConfiguration {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TrendtraderError> for std::process::ExitCode {
    fn from(err: &TrendtraderError) -> Self {
        let code: u8 = match err {
            TrendtraderError::Io(_) => 1,
            TrendtraderError::InvalidConfiguration { .. }
            | TrendtraderError::ConfigParse { .. }
            | TrendtraderError::ConfigMissing { .. }
            | TrendtraderError::ConfigInvalid { .. } => 2,
            TrendtraderError::Data { .. } => 3,
            TrendtraderError::InvalidCandleOrdering { .. }
            | TrendtraderError::InvalidCandle { .. } => 4,
            TrendtraderError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

pub type Result<T> = std::result::Result<T, TrendtraderError>;
