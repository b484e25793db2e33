//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_ledger_adapter::CsvLedgerWriter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{build_simulation_config, build_sweep_grid};
use crate::domain::error::TrendtraderError;
use crate::domain::simulation::{SimulationConfig, SimulationResult, Simulator};
use crate::domain::sweep::{SweepGrid, SweepOutcome, rank_by_pnl, run_sweep};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "trendtrader", about = "Trend-following single-position backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over one symbol
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run every parameter combination of the [sweep] section
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            data_dir,
            output,
        } => run_backtest(&config, symbol.as_deref(), data_dir, output),
        Command::Sweep {
            config,
            symbol,
            data_dir,
            top,
        } => run_sweep_command(&config, symbol.as_deref(), data_dir, top),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config, data_dir } => run_list_symbols(config.as_ref(), data_dir),
    }
}

fn fail(err: &TrendtraderError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

pub fn resolve_data_dir(data_dir_override: Option<PathBuf>, config: &dyn ConfigPort) -> PathBuf {
    data_dir_override
        .or_else(|| config.get_string("data", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn resolve_symbol(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<String, TrendtraderError> {
    let symbol = match symbol_override {
        Some(s) => s.to_string(),
        None => config.get_string("data", "symbol").unwrap_or_default(),
    };
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(TrendtraderError::ConfigMissing {
            section: "data".into(),
            key: "symbol".into(),
        });
    }
    Ok(symbol)
}

/// Fetch and simulate one symbol. Too few candles yields a zero-trade result.
pub fn backtest_symbol(
    data_port: &dyn DataPort,
    symbol: &str,
    config: &SimulationConfig,
) -> Result<SimulationResult, TrendtraderError> {
    let simulator = Simulator::new(config.clone())?;
    let candles = data_port.fetch_candles(symbol)?;
    eprintln!("Loaded {} candles for {}", candles.len(), symbol);

    match simulator.run(&candles) {
        Ok(result) => Ok(result),
        Err(e) if e.is_recoverable() => {
            warn!(symbol, error = %e, "no simulation possible, reporting zero trades");
            eprintln!("warning: {e}");
            Ok(SimulationResult::empty(config.clone()))
        }
        Err(e) => Err(e),
    }
}

pub fn print_summary(symbol: &str, result: &SimulationResult) {
    let stats = &result.statistics;
    let equity = &result.equity_statistics;
    eprintln!("\n=== {} Results ===", symbol);
    eprintln!("Total Trades:     {}", stats.total_trades);
    eprintln!(
        "Won / Lost:       {} / {} ({} breakeven)",
        stats.trades_won, stats.trades_lost, stats.trades_breakeven
    );
    eprintln!("Win Rate:         {:.1}%", stats.win_rate * 100.0);
    eprintln!("Total P&L:        ${:.2}", stats.total_pnl_usd);
    eprintln!("ROI:              {:.2}%", stats.roi_pct);
    match stats.profit_factor {
        Some(pf) => eprintln!("Profit Factor:    {:.2}", pf),
        None => eprintln!("Profit Factor:    n/a"),
    }
    eprintln!("Avg Trade P&L:    ${:.2}", stats.average_trade_pnl);
    eprintln!("Final Capital:    ${:.2}", stats.final_capital);
    eprintln!(
        "Max Drawdown:     -{:.1}% realized, -{:.1}% marked",
        stats.max_drawdown_pct, equity.max_drawdown_pct
    );
    eprintln!("Sharpe Ratio:     {:.2}", stats.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", stats.sortino_ratio);
    eprintln!("Peak Equity:      ${:.2}", equity.peak_equity);
    eprintln!("Lowest Equity:    ${:.2}", equity.lowest_equity);
    eprintln!(
        "Exits:            {} stop-loss, {} take-profit, {} signal",
        stats.exit_reason_counts.stop_loss,
        stats.exit_reason_counts.take_profit,
        stats.exit_reason_counts.signal_exit,
    );
}

fn run_backtest(
    config_path: &Path,
    symbol_override: Option<&str>,
    data_dir_override: Option<PathBuf>,
    output_override: Option<PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let sim_config = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let data_port = CsvAdapter::new(resolve_data_dir(data_dir_override, &adapter));
    let result = match backtest_symbol(&data_port, &symbol, &sim_config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    print_summary(&symbol, &result);

    let output = output_override
        .or_else(|| adapter.get_string("report", "ledger_path").map(PathBuf::from));
    if let Some(output) = output {
        let path = output.to_string_lossy();
        if let Err(e) = CsvLedgerWriter::new().write(&result, &path) {
            return fail(&e);
        }
        eprintln!("\nLedger written to: {}", output.display());
    }

    ExitCode::SUCCESS
}

pub fn print_outcomes(outcomes: &[SweepOutcome], top: usize) {
    println!("fast,mid,slow,stop_loss_pct,take_profit_pct,trades,win_rate,total_pnl_usd,roi_pct");
    for outcome in outcomes.iter().take(top) {
        let c = &outcome.config;
        let s = &outcome.statistics;
        println!(
            "{},{},{},{},{},{},{:.4},{:.2},{:.4}",
            c.fast_window,
            c.mid_window,
            c.slow_window,
            c.stop_loss_pct,
            c.take_profit_pct,
            s.total_trades,
            s.win_rate,
            s.total_pnl_usd,
            s.roi_pct,
        );
    }
}

fn run_sweep_command(
    config_path: &Path,
    symbol_override: Option<&str>,
    data_dir_override: Option<PathBuf>,
    top: usize,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let base = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let grid = match build_sweep_grid(&adapter) {
        Ok(g) => g,
        Err(e) => return fail(&e),
    };
    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let configs = grid.combinations(&base);
    if configs.is_empty() {
        eprintln!("error: sweep grid has no combination with fast < mid < slow");
        return ExitCode::from(2);
    }

    let data_port = CsvAdapter::new(resolve_data_dir(data_dir_override, &adapter));
    let candles = match data_port.fetch_candles(&symbol) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "Sweeping {} configurations over {} candles of {}",
        configs.len(),
        candles.len(),
        symbol
    );

    let mut outcomes = match run_sweep(&candles, &configs) {
        Ok(o) => o,
        Err(e) => return fail(&e),
    };
    rank_by_pnl(&mut outcomes);
    print_outcomes(&outcomes, top);

    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let config = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let grid = match build_sweep_grid(&adapter) {
        Ok(g) => g,
        Err(e) => return fail(&e),
    };

    eprintln!("\nIndicators:");
    for indicator in config.windows().indicator_types() {
        eprintln!("  {}", indicator);
    }
    eprintln!("  warmup: {} candles", config.windows().warmup());

    eprintln!("\nEntry / exit:");
    eprintln!("  volatility_ceiling: {}", config.volatility_ceiling);
    eprintln!("  stop_loss_pct:      {}", config.stop_loss_pct);
    eprintln!("  take_profit_pct:    {}", config.take_profit_pct);
    eprintln!("  risk_per_trade_usd: {}", config.risk_per_trade_usd);
    eprintln!("  initial_capital:    {}", config.initial_capital);

    if grid != SweepGrid::default() {
        eprintln!(
            "\nSweep: {} combinations",
            grid.combinations(&config).len()
        );
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: Option<&PathBuf>, data_dir_override: Option<PathBuf>) -> ExitCode {
    let data_dir = match (data_dir_override, config_path) {
        (Some(dir), _) => dir,
        (None, Some(path)) => match load_config(path) {
            Ok(adapter) => resolve_data_dir(None, &adapter),
            Err(code) => return code,
        },
        (None, None) => PathBuf::from(DEFAULT_DATA_DIR),
    };

    let adapter = CsvAdapter::new(data_dir.clone());
    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found in {}", data_dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}
