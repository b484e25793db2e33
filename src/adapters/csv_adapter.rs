//! CSV file candle adapter.

use crate::domain::candle::Candle;
use crate::domain::error::TrendtraderError;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Reads `<base>/<SYMBOL>.csv` files with the header
/// `timestamp,open,high,low,close,volume`.
pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TrendtraderError> {
    let value = value.trim();
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TrendtraderError::Data {
            reason: format!("invalid timestamp: {}", value),
        })
}

fn parse_column(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, TrendtraderError> {
    record
        .get(index)
        .ok_or_else(|| TrendtraderError::Data {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| TrendtraderError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, TrendtraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| TrendtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TrendtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let ts_str = record.get(0).ok_or_else(|| TrendtraderError::Data {
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = parse_timestamp(ts_str)?;

            candles.push(Candle::new(
                timestamp,
                parse_column(&record, 1, "open")?,
                parse_column(&record, 2, "high")?,
                parse_column(&record, 3, "low")?,
                parse_column(&record, 4, "close")?,
                parse_column(&record, 5, "volume")?,
            )?);
        }

        Ok(candles)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TrendtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TrendtraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| TrendtraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
