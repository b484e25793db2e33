//! CSV trade ledger adapter implementing ReportPort.

use std::fs::File;
use std::path::Path;

use crate::domain::error::TrendtraderError;
use crate::domain::simulation::SimulationResult;
use crate::ports::report_port::ReportPort;

pub const LEDGER_HEADER: [&str; 10] = [
    "sequence_number",
    "entry_time",
    "entry_price",
    "exit_time",
    "exit_price",
    "size",
    "pnl_usd",
    "pnl_pct",
    "exit_reason",
    "duration_secs",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes one row per closed trade, in ledger order.
#[derive(Debug, Default)]
pub struct CsvLedgerWriter;

impl CsvLedgerWriter {
    pub fn new() -> Self {
        Self
    }

    fn write_to<W: std::io::Write>(
        &self,
        result: &SimulationResult,
        writer: W,
    ) -> Result<(), TrendtraderError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(LEDGER_HEADER).map_err(csv_error)?;

        for trade in &result.trades {
            wtr.write_record([
                trade.sequence_number.to_string(),
                trade.entry_time.format(TIMESTAMP_FORMAT).to_string(),
                trade.entry_price.to_string(),
                trade.exit_time.format(TIMESTAMP_FORMAT).to_string(),
                trade.exit_price.to_string(),
                trade.size.to_string(),
                trade.pnl_usd.to_string(),
                trade.pnl_pct.to_string(),
                trade.exit_reason.to_string(),
                trade.duration.num_seconds().to_string(),
            ])
            .map_err(csv_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> TrendtraderError {
    TrendtraderError::Io(e.into())
}

impl ReportPort for CsvLedgerWriter {
    fn write(&self, result: &SimulationResult, output_path: &str) -> Result<(), TrendtraderError> {
        let path = Path::new(output_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        self.write_to(result, file)
    }
}
