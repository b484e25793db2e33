//! Single-position simulator (FLAT / IN_POSITION state machine).
//!
//! `SimulationConfig` defines the run parameters; `Simulator` validates them
//! once and hands out `Simulation`s that step through a candle slice.

use tracing::info;

use super::candle::{Candle, validate_candles};
use super::error::{Result, TrendtraderError};
use super::execution::{RiskParams, close_position, enter_long, entry_signal, exit_signal};
use super::indicator::{IndicatorWindows, Indicators};
use super::metrics::{EquityStatistics, Statistics};
use super::position::{ExitReason, Position, Trade};
use super::state::{EquityPoint, SimulationState};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub fast_window: usize,
    pub mid_window: usize,
    pub slow_window: usize,
    pub volatility_window: usize,
    pub volatility_ceiling: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub risk_per_trade_usd: f64,
    pub initial_capital: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            fast_window: 5,
            mid_window: 10,
            slow_window: 20,
            volatility_window: 20,
            volatility_ceiling: 0.02,
            stop_loss_pct: 0.03,
            take_profit_pct: 0.05,
            risk_per_trade_usd: 250.0,
            initial_capital: 5000.0,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("fast_window", self.fast_window),
            ("mid_window", self.mid_window),
            ("slow_window", self.slow_window),
            ("volatility_window", self.volatility_window),
        ];
        for (field, window) in windows {
            if window == 0 {
                return Err(TrendtraderError::invalid_config(field, "window must be positive"));
            }
        }
        if self.volatility_window < 2 {
            return Err(TrendtraderError::invalid_config(
                "volatility_window",
                "at least two candles are needed to form a return",
            ));
        }

        let amounts = [
            ("volatility_ceiling", self.volatility_ceiling),
            ("stop_loss_pct", self.stop_loss_pct),
            ("take_profit_pct", self.take_profit_pct),
            ("risk_per_trade_usd", self.risk_per_trade_usd),
            ("initial_capital", self.initial_capital),
        ];
        for (field, value) in amounts {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrendtraderError::invalid_config(
                    field,
                    format!("must be a positive number, got {value}"),
                ));
            }
        }
        if self.stop_loss_pct >= 1.0 {
            return Err(TrendtraderError::invalid_config(
                "stop_loss_pct",
                "must be below 1 so the stop price stays positive",
            ));
        }
        Ok(())
    }

    pub fn windows(&self) -> IndicatorWindows {
        IndicatorWindows {
            fast: self.fast_window,
            mid: self.mid_window,
            slow: self.slow_window,
            volatility: self.volatility_window,
        }
    }

    pub fn risk_params(&self) -> RiskParams {
        RiskParams {
            stop_loss_pct: self.stop_loss_pct,
            take_profit_pct: self.take_profit_pct,
            risk_per_trade_usd: self.risk_per_trade_usd,
        }
    }
}

/// What happened while processing one candle.
#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    /// Indicators not yet defined; no signal possible.
    Warmup,
    /// Flat and the entry condition did not hold.
    Flat,
    Entered(Position),
    Held,
    Exited(Trade),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub config: SimulationConfig,
    pub trades: Vec<Trade>,
    pub final_capital: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub statistics: Statistics,
    pub equity_statistics: EquityStatistics,
}

impl SimulationResult {
    /// Zero-trade result, used when a run could not start for lack of data.
    pub fn empty(config: SimulationConfig) -> Self {
        let final_capital = config.initial_capital;
        let statistics = Statistics::compute(&[], final_capital);
        let equity_statistics = EquityStatistics::compute(&[], final_capital);
        SimulationResult {
            config,
            trades: Vec::new(),
            final_capital,
            equity_curve: Vec::new(),
            statistics,
            equity_statistics,
        }
    }
}

/// Validated configuration; every run gets its own [`SimulationState`].
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Simulator { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Validate the candles and compute indicators, ready to step.
    pub fn start<'a>(&'a self, candles: &'a [Candle]) -> Result<Simulation<'a>> {
        validate_candles(candles)?;
        let indicators = Indicators::compute(candles, self.config.windows());
        if candles.len() < indicators.warmup() {
            return Err(TrendtraderError::InsufficientData {
                bars: candles.len(),
                minimum: indicators.warmup(),
            });
        }
        Ok(Simulation {
            config: &self.config,
            risk: self.config.risk_params(),
            candles,
            indicators,
            state: SimulationState::new(self.config.initial_capital),
        })
    }

    pub fn run(&self, candles: &[Candle]) -> Result<SimulationResult> {
        Ok(self.start(candles)?.finish())
    }

    /// Run over a finite candle producer. The sequence is collected first.
    pub fn run_stream<I>(&self, candles: I) -> Result<SimulationResult>
    where
        I: IntoIterator<Item = Candle>,
    {
        let candles: Vec<Candle> = candles.into_iter().collect();
        self.run(&candles)
    }
}

/// One run in progress over a validated candle slice.
#[derive(Debug)]
pub struct Simulation<'a> {
    config: &'a SimulationConfig,
    risk: RiskParams,
    candles: &'a [Candle],
    indicators: Indicators,
    state: SimulationState,
}

impl<'a> Simulation<'a> {
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn indicators(&self) -> &Indicators {
        &self.indicators
    }

    pub fn is_finished(&self) -> bool {
        self.state.candle_index() >= self.candles.len()
    }

    /// Process the next candle. Returns `None` once every candle is consumed.
    pub fn step(&mut self) -> Option<StepEvent> {
        let index = self.state.candle_index();
        let candles = self.candles;
        let candle = candles.get(index)?;
        let set = self.indicators.get(index)?;

        let pending_exit = self
            .state
            .open_position()
            .map(|position| exit_signal(position, candle, set));

        let event = match pending_exit {
            None if entry_signal(candle, set, self.config.volatility_ceiling) => {
                match enter_long(&mut self.state, candle, &self.risk) {
                    Some(position) => StepEvent::Entered(position.clone()),
                    None => StepEvent::Flat,
                }
            }
            None if set.is_ready() => StepEvent::Flat,
            None => StepEvent::Warmup,
            Some(None) => StepEvent::Held,
            Some(Some((exit_price, reason))) => {
                match close_position(&mut self.state, exit_price, candle.timestamp, reason) {
                    Some(trade) => StepEvent::Exited(trade),
                    None => StepEvent::Flat,
                }
            }
        };

        self.state.record_equity(candle.timestamp, candle.close);
        self.state.advance();
        Some(event)
    }

    /// Drain the remaining candles, force-close any open position at the final
    /// close and assemble the result.
    pub fn finish(mut self) -> SimulationResult {
        while self.step().is_some() {}

        if let Some(last) = self.candles.last() {
            if let Some(trade) =
                close_position(&mut self.state, last.close, last.timestamp, ExitReason::SignalExit)
            {
                info!(
                    sequence_number = trade.sequence_number,
                    exit_price = trade.exit_price,
                    "force-closed open position at end of data"
                );
            }
        }

        let initial_capital = self.state.initial_capital();
        let (trades, equity_curve, final_capital) = self.state.into_parts();
        let statistics = Statistics::compute(&trades, initial_capital);
        let equity_statistics = EquityStatistics::compute(&equity_curve, initial_capital);

        info!(
            candles = self.candles.len(),
            trades = trades.len(),
            final_capital,
            total_pnl_usd = statistics.total_pnl_usd,
            "simulation finished"
        );

        SimulationResult {
            config: self.config.clone(),
            trades,
            final_capital,
            equity_curve,
            statistics,
            equity_statistics,
        }
    }

    /// Stop early and keep the state built so far. Any open position stays open.
    pub fn into_state(self) -> SimulationState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn ts(i: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(4 * i as i64)
    }

    fn make_candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: ts(i),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            fast_window: 2,
            mid_window: 3,
            slow_window: 4,
            volatility_window: 4,
            volatility_ceiling: 0.5,
            stop_loss_pct: 0.03,
            take_profit_pct: 0.05,
            risk_per_trade_usd: 100.0,
            initial_capital: 5000.0,
        }
    }

    #[test]
    fn default_config_values() {
        let c = SimulationConfig::default();
        assert_eq!(c.fast_window, 5);
        assert_eq!(c.mid_window, 10);
        assert_eq!(c.slow_window, 20);
        assert_eq!(c.volatility_window, 20);
        assert!((c.volatility_ceiling - 0.02).abs() < f64::EPSILON);
        assert!((c.stop_loss_pct - 0.03).abs() < f64::EPSILON);
        assert!((c.take_profit_pct - 0.05).abs() < f64::EPSILON);
        assert!((c.risk_per_trade_usd - 250.0).abs() < f64::EPSILON);
        assert!((c.initial_capital - 5000.0).abs() < f64::EPSILON);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_window() {
        let c = SimulationConfig {
            mid_window: 0,
            ..SimulationConfig::default()
        };
        match c.validate() {
            Err(TrendtraderError::InvalidConfiguration { field, .. }) => {
                assert_eq!(field, "mid_window")
            }
            other => panic!("expected InvalidConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn validate_rejects_single_candle_volatility_window() {
        let c = SimulationConfig {
            volatility_window: 1,
            ..SimulationConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_positive_risk_and_stop() {
        for c in [
            SimulationConfig {
                risk_per_trade_usd: 0.0,
                ..SimulationConfig::default()
            },
            SimulationConfig {
                stop_loss_pct: 0.0,
                ..SimulationConfig::default()
            },
            SimulationConfig {
                stop_loss_pct: -0.01,
                ..SimulationConfig::default()
            },
            SimulationConfig {
                stop_loss_pct: 1.0,
                ..SimulationConfig::default()
            },
            SimulationConfig {
                take_profit_pct: f64::NAN,
                ..SimulationConfig::default()
            },
            SimulationConfig {
                initial_capital: -1.0,
                ..SimulationConfig::default()
            },
        ] {
            assert!(
                matches!(
                    c.validate(),
                    Err(TrendtraderError::InvalidConfiguration { .. })
                ),
                "{:?}",
                c
            );
        }
    }

    #[test]
    fn simulator_new_fails_on_invalid_config() {
        let c = SimulationConfig {
            fast_window: 0,
            ..SimulationConfig::default()
        };
        assert!(Simulator::new(c).is_err());
    }

    #[test]
    fn start_rejects_short_sequence() {
        let sim = Simulator::new(small_config()).unwrap();
        let candles = make_candles(&[100.0, 101.0, 102.0]);
        match sim.start(&candles) {
            Err(TrendtraderError::InsufficientData { bars, minimum }) => {
                assert_eq!(bars, 3);
                assert_eq!(minimum, 4);
            }
            other => panic!("expected InsufficientData, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn start_rejects_unordered_sequence() {
        let sim = Simulator::new(small_config()).unwrap();
        let mut candles = make_candles(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        candles.swap(1, 2);
        assert!(matches!(
            sim.start(&candles),
            Err(TrendtraderError::InvalidCandleOrdering { index: 2, .. })
        ));
    }

    #[test]
    fn step_events_follow_state_machine() {
        let sim = Simulator::new(small_config()).unwrap();
        let candles = make_candles(&[100.0, 101.0, 103.0, 106.0, 110.0, 108.0, 107.0]);
        let mut run = sim.start(&candles).unwrap();

        let mut events = Vec::new();
        while let Some(event) = run.step() {
            events.push(event);
        }

        assert_eq!(events.len(), 7);
        assert_eq!(events[0], StepEvent::Warmup);
        assert_eq!(events[2], StepEvent::Warmup);
        assert!(matches!(events[3], StepEvent::Entered(_)));
        assert_eq!(events[4], StepEvent::Held);
        assert_eq!(events[5], StepEvent::Held);
        match &events[6] {
            StepEvent::Exited(trade) => assert_eq!(trade.exit_reason, ExitReason::SignalExit),
            other => panic!("expected exit, got {:?}", other),
        }
        assert!(run.is_finished());
        assert!(run.step().is_none());
    }

    #[test]
    fn finish_force_closes_open_position() {
        let sim = Simulator::new(small_config()).unwrap();
        let candles = make_candles(&[100.0, 101.0, 103.0, 106.0, 108.0]);
        let result = sim.run(&candles).unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::SignalExit);
        assert_eq!(trade.exit_time, ts(4));
        assert!((trade.exit_price - 108.0).abs() < f64::EPSILON);
    }

    #[test]
    fn into_state_keeps_partial_ledger() {
        let sim = Simulator::new(small_config()).unwrap();
        let candles = make_candles(&[100.0, 101.0, 103.0, 106.0, 110.0, 108.0, 107.0]);
        let mut run = sim.start(&candles).unwrap();
        for _ in 0..5 {
            run.step();
        }
        let state = run.into_state();
        assert_eq!(state.candle_index(), 5);
        assert!(state.trades().is_empty());
        assert!(state.open_position().is_some());
        assert_eq!(state.equity_curve().len(), 5);
    }

    #[test]
    fn equity_curve_has_one_point_per_candle() {
        let sim = Simulator::new(small_config()).unwrap();
        let candles = make_candles(&[100.0, 101.0, 103.0, 106.0, 110.0, 108.0, 107.0]);
        let result = sim.run(&candles).unwrap();
        assert_eq!(result.equity_curve.len(), candles.len());
        let last = result.equity_curve.last().unwrap();
        assert!((last.equity - result.final_capital).abs() < 1e-9);
    }

    #[test]
    fn equity_statistics_follow_marked_curve() {
        let sim = Simulator::new(small_config()).unwrap();
        let candles = make_candles(&[100.0, 101.0, 103.0, 106.0, 110.0, 108.0, 107.0]);
        let result = sim.run(&candles).unwrap();

        let expected = EquityStatistics::compute(&result.equity_curve, 5000.0);
        assert_eq!(result.equity_statistics, expected);
        // marked at 110 while open: 5000 + 4 * size
        let size = 100.0 / (106.0 * 0.03);
        assert!((result.equity_statistics.peak_equity - (5000.0 + 4.0 * size)).abs() < 1e-9);
        assert_eq!(result.equity_statistics.lowest_equity, 5000.0);
        // realized capital never falls, the marked curve does
        assert_eq!(result.statistics.max_drawdown_pct, 0.0);
        assert!(result.equity_statistics.max_drawdown_pct > 0.0);
    }

    #[test]
    fn run_stream_matches_run() {
        let sim = Simulator::new(small_config()).unwrap();
        let candles = make_candles(&[100.0, 101.0, 103.0, 106.0, 110.0, 108.0, 107.0]);
        let a = sim.run(&candles).unwrap();
        let b = sim.run_stream(candles.into_iter()).unwrap();
        assert_eq!(a, b);
    }
}
