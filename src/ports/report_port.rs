//! Report generation port trait.

use crate::domain::error::TrendtraderError;
use crate::domain::simulation::SimulationResult;

/// Port for writing simulation results.
pub trait ReportPort {
    fn write(&self, result: &SimulationResult, output_path: &str) -> Result<(), TrendtraderError>;
}
