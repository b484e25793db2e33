//! CLI integration tests for configuration handling and the backtest flow.
//!
//! Tests cover:
//! - INI parsing into `SimulationConfig` and `SweepGrid`
//! - Symbol and data directory resolution
//! - `backtest_symbol` with a mock data port, including too-short series
//! - The full `backtest` command against INI and CSV files on disk

mod common;

use approx::assert_relative_eq;
use clap::Parser;
use common::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use trendtrader::adapters::file_config_adapter::FileConfigAdapter;
use trendtrader::cli::{self, Cli};
use trendtrader::domain::config_validation::{build_simulation_config, build_sweep_grid};
use trendtrader::domain::error::TrendtraderError;
use trendtrader::domain::simulation::SimulationConfig;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[data]
dir = ./data
symbol = btcusdt

[indicators]
fast_window = 2
mid_window = 3
slow_window = 4
volatility_window = 4
volatility_ceiling = 0.5

[risk]
stop_loss_pct = 0.03
take_profit_pct = 0.05
risk_per_trade_usd = 100

[simulation]
initial_capital = 5000

[sweep]
fast_windows = 2,3
mid_windows = 3,4
slow_windows = 4,5
take_profit_pcts = 0.03,0.05
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_simulation_config_valid_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = build_simulation_config(&adapter).unwrap();
        assert_eq!(config, small_config());
    }

    #[test]
    fn build_sweep_grid_from_ini() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let grid = build_sweep_grid(&adapter).unwrap();
        let configs = grid.combinations(&small_config());
        // (2,3,4) (2,3,5) (2,4,5) (3,4,5) x two targets
        assert_eq!(configs.len(), 8);
        assert!(
            configs
                .iter()
                .all(|c| c.fast_window < c.mid_window && c.mid_window < c.slow_window)
        );
    }

    #[test]
    fn mid_not_above_fast_passes_config_validation() {
        let adapter =
            FileConfigAdapter::from_string("[indicators]\nfast_window = 10\nmid_window = 5\n")
                .unwrap();
        let config = build_simulation_config(&adapter).unwrap();
        assert_eq!(config.fast_window, 10);
        assert_eq!(config.mid_window, 5);
    }

    #[test]
    fn zero_window_rejected() {
        let adapter = FileConfigAdapter::from_string("[indicators]\nfast_window = 0\n").unwrap();
        let err = build_simulation_config(&adapter).unwrap_err();
        assert!(matches!(err, TrendtraderError::InvalidConfiguration { .. }));
        assert_exit_code(ExitCode::from(&err), 2);
    }
}

mod resolution {
    use super::*;

    #[test]
    fn symbol_from_config_is_uppercased() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        assert_eq!(cli::resolve_symbol(None, &adapter).unwrap(), "BTCUSDT");
    }

    #[test]
    fn symbol_override_wins() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        assert_eq!(
            cli::resolve_symbol(Some("ethusdt"), &adapter).unwrap(),
            "ETHUSDT"
        );
    }

    #[test]
    fn missing_symbol_is_config_missing() {
        let adapter = FileConfigAdapter::from_string("[data]\ndir = x\n").unwrap();
        assert!(matches!(
            cli::resolve_symbol(None, &adapter),
            Err(TrendtraderError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn data_dir_resolution_order() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        assert_eq!(
            cli::resolve_data_dir(Some(PathBuf::from("/tmp/x")), &adapter),
            PathBuf::from("/tmp/x")
        );
        assert_eq!(
            cli::resolve_data_dir(None, &adapter),
            PathBuf::from("./data")
        );

        let empty = FileConfigAdapter::from_string("[data]\n").unwrap();
        assert_eq!(cli::resolve_data_dir(None, &empty), PathBuf::from("data"));
    }
}

mod backtest_flow {
    use super::*;

    #[test]
    fn backtest_symbol_runs_simulation() {
        let port = MockDataPort::new().with_candles("BTCUSDT", make_candles(&SCENARIO_CLOSES));
        let result = cli::backtest_symbol(&port, "BTCUSDT", &small_config()).unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_relative_eq!(
            result.final_capital,
            5000.0 + 100.0 / (106.0 * 0.03),
            max_relative = 1e-12
        );
    }

    #[test]
    fn backtest_symbol_short_series_is_zero_trades() {
        let port = MockDataPort::new().with_candles("BTCUSDT", make_candles(&SCENARIO_CLOSES));
        let config = SimulationConfig::default();
        let result = cli::backtest_symbol(&port, "BTCUSDT", &config).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.final_capital, config.initial_capital);
        assert_eq!(result.statistics.total_trades, 0);
    }

    #[test]
    fn backtest_symbol_propagates_data_error() {
        let port = MockDataPort::new().with_error("BTCUSDT", "connection refused");
        let err = cli::backtest_symbol(&port, "BTCUSDT", &small_config()).unwrap_err();
        assert!(matches!(err, TrendtraderError::Data { .. }));
        assert_exit_code(ExitCode::from(&err), 3);
    }

    #[test]
    fn backtest_symbol_propagates_ordering_error() {
        let mut candles = make_candles(&SCENARIO_CLOSES);
        candles.swap(2, 3);
        let port = MockDataPort::new().with_candles("BTCUSDT", candles);
        let err = cli::backtest_symbol(&port, "BTCUSDT", &small_config()).unwrap_err();
        assert_exit_code(ExitCode::from(&err), 4);
    }
}

mod commands {
    use super::*;
    use tempfile::TempDir;

    fn setup(dir: &TempDir) -> tempfile::NamedTempFile {
        let mut csv = String::from("timestamp,open,high,low,close,volume\n");
        for (i, close) in SCENARIO_CLOSES.iter().enumerate() {
            csv.push_str(&format!(
                "{},{close},{close},{close},{close},1000\n",
                ts(i).format("%Y-%m-%dT%H:%M:%S")
            ));
        }
        fs::write(dir.path().join("BTCUSDT.csv"), csv).unwrap();

        let ini = VALID_INI.replace("./data", &dir.path().display().to_string());
        write_temp_ini(&ini)
    }

    #[test]
    fn backtest_command_writes_ledger() {
        let dir = TempDir::new().unwrap();
        let ini = setup(&dir);
        let ledger = dir.path().join("ledger.csv");

        let cli = Cli::parse_from([
            "trendtrader",
            "backtest",
            "--config",
            ini.path().to_str().unwrap(),
            "--output",
            ledger.to_str().unwrap(),
        ]);
        assert_exit_code(cli::run(cli), 0);

        let content = fs::read_to_string(&ledger).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().nth(1).unwrap().contains("SIGNAL_EXIT"));
    }

    #[test]
    fn validate_command_accepts_valid_file() {
        let dir = TempDir::new().unwrap();
        let ini = setup(&dir);
        let cli = Cli::parse_from(["trendtrader", "validate", "-c", ini.path().to_str().unwrap()]);
        assert_exit_code(cli::run(cli), 0);
    }

    #[test]
    fn validate_command_rejects_bad_value() {
        let ini = write_temp_ini("[risk]\nstop_loss_pct = 1.5\n");
        let cli = Cli::parse_from(["trendtrader", "validate", "-c", ini.path().to_str().unwrap()]);
        assert_exit_code(cli::run(cli), 2);
    }

    #[test]
    fn sweep_command_runs() {
        let dir = TempDir::new().unwrap();
        let ini = setup(&dir);
        let cli = Cli::parse_from([
            "trendtrader",
            "sweep",
            "--config",
            ini.path().to_str().unwrap(),
            "--top",
            "3",
        ]);
        assert_exit_code(cli::run(cli), 0);
    }

    #[test]
    fn list_symbols_command_reads_directory() {
        let dir = TempDir::new().unwrap();
        let _ini = setup(&dir);
        let cli = Cli::parse_from([
            "trendtrader",
            "list-symbols",
            "--data-dir",
            dir.path().to_str().unwrap(),
        ]);
        assert_exit_code(cli::run(cli), 0);
    }

    #[test]
    fn backtest_command_missing_data_file() {
        let dir = TempDir::new().unwrap();
        let ini = setup(&dir);
        let cli = Cli::parse_from([
            "trendtrader",
            "backtest",
            "--config",
            ini.path().to_str().unwrap(),
            "--symbol",
            "DOGEUSDT",
        ]);
        assert_exit_code(cli::run(cli), 3);
    }
}
