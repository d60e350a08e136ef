//! The orchestrating engine and its output types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{PriceSeries, Signal};
use crate::indicators::{Indicator, Rsi};
use crate::metrics::MetricsSnapshot;
use crate::signals::{RsiThresholdSignal, TrendFilter};
use crate::simulation::{
    cumulative_returns, lag_signals, market_returns, strategy_returns, CostModel,
};

use super::config::{ConfigError, EngineConfig};

/// Every per-timestamp series the pipeline produces, aligned by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSeries {
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub oscillator: Vec<Option<f64>>,
    /// Present only when the trend filter is enabled.
    pub trend_reference: Option<Vec<Option<f64>>>,
    pub signals: Vec<Signal>,
    pub positions: Vec<Option<Signal>>,
    pub market_returns: Vec<Option<f64>>,
    pub strategy_returns: Vec<Option<f64>>,
    pub trades: Vec<u8>,
    pub net_returns: Vec<Option<f64>>,
    pub cumulative_market: Vec<f64>,
    pub cumulative_strategy: Vec<f64>,
    pub cumulative_net: Vec<f64>,
}

impl SimulationSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Counts describing what the signal series did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    pub long_days: usize,
    pub short_days: usize,
    pub flat_days: usize,
    /// Timestamps with a nonzero trade indicator.
    pub trade_count: usize,
    /// Sum of the trade indicator.
    pub turnover: u64,
    /// Turnover times cost rate.
    pub total_cost: f64,
    /// Fraction of timestamps holding a non-flat position.
    pub exposure: f64,
    /// First index at which every enabled indicator can be defined.
    pub warmup_bars: usize,
}

impl SignalStats {
    fn compute(
        signals: &[Signal],
        positions: &[Option<Signal>],
        trades: &[u8],
        cost: &CostModel,
        warmup_bars: usize,
    ) -> Self {
        let count = |s: Signal| signals.iter().filter(|&&x| x == s).count();
        let turnover: u64 = trades.iter().map(|&t| u64::from(t)).sum();
        let exposed = positions
            .iter()
            .filter(|p| matches!(p, Some(s) if !s.is_flat()))
            .count();
        let exposure = if positions.is_empty() {
            0.0
        } else {
            exposed as f64 / positions.len() as f64
        };
        Self {
            long_days: count(Signal::Long),
            short_days: count(Signal::Short),
            flat_days: count(Signal::Flat),
            trade_count: trades.iter().filter(|&&t| t != 0).count(),
            turnover,
            total_cost: turnover as f64 * cost.cost_rate,
            exposure,
            warmup_bars,
        }
    }
}

/// Series plus metrics for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOutput {
    pub series: SimulationSeries,
    /// Net-of-cost strategy metrics.
    pub metrics: MetricsSnapshot,
    /// Strategy metrics before costs.
    pub gross_metrics: MetricsSnapshot,
    /// Buy-and-hold metrics.
    pub benchmark_metrics: MetricsSnapshot,
    pub stats: SignalStats,
}

impl EngineOutput {
    /// Net strategy total return beats buy-and-hold.
    pub fn outperforms_benchmark(&self) -> bool {
        self.metrics.total_return > self.benchmark_metrics.total_return
    }
}

/// Validated, ready-to-run composition of the pipeline stages.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    oscillator: Rsi,
    trend: Option<TrendFilter>,
    rule: RsiThresholdSignal,
    cost: CostModel,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            oscillator: Rsi::new(config.period),
            trend: config
                .enable_trend_filter
                .then(|| TrendFilter::new(config.trend_window)),
            rule: RsiThresholdSignal::new(config.thresholds(), config.signal_mode),
            cost: CostModel::new(config.cost_rate),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Leading timestamps on which no signal can fire.
    pub fn warmup_bars(&self) -> usize {
        let trend = self.trend.as_ref().map_or(0, TrendFilter::lookback);
        self.oscillator.lookback().max(trend)
    }

    /// Run the full pipeline. Infallible: inputs were validated at construction.
    pub fn run(&self, prices: &PriceSeries) -> EngineOutput {
        let closes = prices.closes();

        let oscillator = self.oscillator.compute(&closes);
        let trend_reference = self.trend.as_ref().map(|t| t.reference(&closes));
        let signals = self
            .rule
            .generate(&closes, &oscillator, trend_reference.as_deref());

        let positions = lag_signals(&signals);
        let market = market_returns(&closes);
        let gross = strategy_returns(&market, &positions);
        let trades = CostModel::trade_indicator(&signals);
        let net = self.cost.net_returns(&gross, &trades);

        let cumulative_market = cumulative_returns(&market);
        let cumulative_strategy = cumulative_returns(&gross);
        let cumulative_net = cumulative_returns(&net);

        let year = self.config.trading_days_per_year;
        let metrics = MetricsSnapshot::compute_with_year(&net, &cumulative_net, year);
        let gross_metrics = MetricsSnapshot::compute_with_year(&gross, &cumulative_strategy, year);
        let benchmark_metrics =
            MetricsSnapshot::compute_with_year(&market, &cumulative_market, year);
        let stats = SignalStats::compute(
            &signals,
            &positions,
            &trades,
            &self.cost,
            self.warmup_bars(),
        );

        tracing::debug!(
            symbol = prices.symbol(),
            bars = closes.len(),
            trades = stats.trade_count,
            long_days = stats.long_days,
            short_days = stats.short_days,
            net_total_return = metrics.total_return,
            "pipeline complete"
        );

        EngineOutput {
            series: SimulationSeries {
                dates: prices.dates(),
                closes,
                oscillator,
                trend_reference,
                signals,
                positions,
                market_returns: market,
                strategy_returns: gross,
                trades,
                net_returns: net,
                cumulative_market,
                cumulative_strategy,
                cumulative_net,
            },
            metrics,
            gross_metrics,
            benchmark_metrics,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StrategyPreset;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes("TEST", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), closes)
            .unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let config = EngineConfig {
            period: 0,
            ..Default::default()
        };
        assert!(matches!(Engine::new(config), Err(ConfigError::InvalidPeriod(0))));
    }

    #[test]
    fn output_series_are_aligned() {
        let engine = Engine::new(EngineConfig {
            period: 3,
            enable_trend_filter: true,
            trend_window: 4,
            ..Default::default()
        })
        .unwrap();
        let out = engine.run(&series(&[10.0, 11.0, 10.5, 10.0, 9.5, 9.0, 9.5, 10.5]));
        let n = 8;
        let s = &out.series;
        assert_eq!(s.len(), n);
        assert_eq!(s.oscillator.len(), n);
        assert_eq!(s.trend_reference.as_ref().unwrap().len(), n);
        assert_eq!(s.signals.len(), n);
        assert_eq!(s.positions.len(), n);
        assert_eq!(s.market_returns.len(), n);
        assert_eq!(s.strategy_returns.len(), n);
        assert_eq!(s.trades.len(), n);
        assert_eq!(s.net_returns.len(), n);
        assert_eq!(s.cumulative_market.len(), n);
        assert_eq!(s.cumulative_strategy.len(), n);
        assert_eq!(s.cumulative_net.len(), n);
    }

    #[test]
    fn trend_reference_absent_when_disabled() {
        let engine = Engine::new(StrategyPreset::Classic.to_config()).unwrap();
        let out = engine.run(&series(&[1.0, 2.0, 3.0]));
        assert!(out.series.trend_reference.is_none());
    }

    #[test]
    fn warmup_is_max_lookback() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        assert_eq!(engine.warmup_bars(), 14);
        let engine = Engine::new(StrategyPreset::TrendFiltered.to_config()).unwrap();
        assert_eq!(engine.warmup_bars(), 199);
    }

    #[test]
    fn single_long_round_trip() {
        // period 2: two drops, then two rises.
        // osc: [-, -, 0, 44.4, 100] → [flat, flat, long, flat, short]
        let engine = Engine::new(EngineConfig {
            period: 2,
            cost_rate: 0.01,
            ..Default::default()
        })
        .unwrap();
        let out = engine.run(&series(&[100.0, 90.0, 80.0, 88.0, 96.8]));
        let s = &out.series;
        assert_eq!(s.oscillator[1], None);
        assert_eq!(s.oscillator[2], Some(0.0));
        assert_eq!(
            s.signals,
            vec![Signal::Flat, Signal::Flat, Signal::Long, Signal::Flat, Signal::Short]
        );
        // Long decided on day 2 earns day 3's return
        assert_eq!(s.positions[3], Some(Signal::Long));
        assert!((s.strategy_returns[3].unwrap() - 0.10).abs() < 1e-12);
        // Entry cost charged on day 2, where the gross return is 0
        assert_eq!(s.trades[2], 1);
        assert!((s.net_returns[2].unwrap() - (-0.01)).abs() < 1e-12);
        assert_eq!(out.stats.long_days, 1);
        assert_eq!(out.stats.short_days, 1);
    }

    #[test]
    fn first_signal_waits_for_full_window_of_changes() {
        let engine = Engine::new(EngineConfig {
            period: 3,
            ..Default::default()
        })
        .unwrap();
        let out = engine.run(&series(&[10.0, 9.0, 8.0, 7.0, 6.0]));
        assert_eq!(out.series.oscillator[2], None);
        assert_eq!(
            out.series.signals,
            vec![Signal::Flat, Signal::Flat, Signal::Flat, Signal::Long, Signal::Long]
        );
    }

    #[test]
    fn benchmark_comparison() {
        let engine = Engine::new(StrategyPreset::Classic.to_config()).unwrap();
        // Steady rise: RSI pegged at 100 → short signals lose against buy-and-hold
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let out = engine.run(&series(&closes));
        assert!(out.benchmark_metrics.total_return > 0.0);
        assert!(out.metrics.total_return < 0.0);
        assert!(!out.outperforms_benchmark());
    }

    #[test]
    fn stats_count_trades_and_exposure() {
        let engine = Engine::new(StrategyPreset::Classic.to_config()).unwrap();
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = engine.run(&series(&closes));
        // RSI undefined for 14 days, then 100 → short from index 14 onward
        assert_eq!(out.stats.short_days, 6);
        assert_eq!(out.stats.flat_days, 14);
        assert_eq!(out.stats.trade_count, 1);
        assert_eq!(out.stats.turnover, 1);
        assert_eq!(out.stats.total_cost, 0.0);
        assert!((out.stats.exposure - 5.0 / 20.0).abs() < 1e-12);
    }
}
