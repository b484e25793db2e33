//! Core domain types and logic.

pub mod candle;
pub mod indicator;
pub mod position;
pub mod state;
pub mod execution;
pub mod simulation;
pub mod metrics;
pub mod sweep;
pub mod config_validation;
pub mod error;
