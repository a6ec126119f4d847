//! Bar-by-bar event loop — the heart of the backtesting engine.
//!
//! Per bar, in delivery order:
//! 1. Record the close as the last known price for the bar's instrument
//! 2. Ask the strategy for intents; execute, apply, and report each fill in order
//! 3. Mark the ledger to market with every last known price
//!
//! After the stream: finalize the strategy and snapshot the result.

use super::error::EngineError;
use super::lifecycle::{Lifecycle, Phase};
use super::result::BacktestResult;
use crate::data::BarSource;
use crate::domain::{Bar, Fill, InstrumentId};
use crate::execution::ExecutionSimulator;
use crate::ledger::Ledger;
use crate::metrics::MetricsConfig;
use crate::strategy::{Strategy, StrategyError};

use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Run a backtest over every bar in `source`.
///
/// The ledger must be fresh (never marked). Any strategy or execution failure
/// aborts the run and returns `Err`; no partial result is produced. An empty
/// source yields an empty result.
///
/// Intents are priced against the last known close of their own instrument;
/// an intent for an instrument that has not printed yet is rejected.
pub fn run_backtest<S: Strategy + ?Sized>(
    source: &dyn BarSource,
    strategy: &mut S,
    ledger: &mut Ledger,
    simulator: &ExecutionSimulator,
    metrics: &MetricsConfig,
) -> Result<BacktestResult, EngineError> {
    if !ledger.is_fresh() {
        return Err(EngineError::LedgerNotFresh {
            marks: ledger.equity_curve().len(),
        });
    }

    let name = strategy.name().to_string();
    let wrap = |source: StrategyError| EngineError::Strategy {
        strategy: name.clone(),
        source,
    };

    info!(
        strategy = %name,
        bars = source.len(),
        slippage_bps = simulator.config().slippage_bps(),
        commission = simulator.config().commission_per_order(),
        "backtest starting"
    );

    let mut lifecycle = Lifecycle::new();
    strategy.prepare(source).map_err(&wrap)?;
    lifecycle.advance(Phase::Ready)?;

    let mut last_prices: HashMap<InstrumentId, f64> = HashMap::new();
    let mut delivered: Vec<Bar> = Vec::with_capacity(source.len());
    let mut timestamps: Vec<NaiveDateTime> = Vec::with_capacity(source.len());
    let mut fills: Vec<Fill> = Vec::new();
    let mut fill_count = 0usize;

    for bar in source.bars() {
        lifecycle.ensure_ready()?;

        if let Some(prev) = timestamps.last() {
            if bar.timestamp < *prev {
                warn!(
                    instrument = %bar.instrument,
                    timestamp = %bar.timestamp,
                    previous = %prev,
                    "bar stream went backwards in time"
                );
            }
        }

        last_prices.insert(bar.instrument.clone(), bar.close);
        delivered.push(bar.clone());

        let intents = strategy.on_bar(bar, &delivered, ledger).map_err(&wrap)?;
        for intent in &intents {
            let reference = last_prices
                .get(&intent.instrument)
                .copied()
                .unwrap_or(f64::NAN);
            let fill = simulator.execute(intent, reference, bar.timestamp)?;
            ledger.apply(&fill);
            fill_count += 1;
            debug!(
                instrument = %fill.instrument,
                side = ?fill.side,
                quantity = fill.quantity,
                price = fill.price,
                fee = fill.fee,
                cash = ledger.cash(),
                "fill applied"
            );
            strategy.on_fill(&fill, ledger).map_err(&wrap)?;
            fills.push(fill);
        }

        ledger.mark_to_market(&last_prices);
        timestamps.push(bar.timestamp);
    }

    let report = strategy.finalize(ledger, metrics).map_err(&wrap)?;
    lifecycle.advance(Phase::Finalized)?;

    info!(
        strategy = %name,
        bars = timestamps.len(),
        fills = fill_count,
        final_equity = ledger.last_equity().unwrap_or(ledger.cash()),
        "backtest complete"
    );

    Ok(BacktestResult {
        equity_curve: ledger.equity_curve().to_vec(),
        return_curve: ledger.return_curve().to_vec(),
        timestamps,
        fills,
        fill_count,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemoryBarSource;
    use crate::domain::OrderIntent;
    use crate::strategy::BuyAndHold;
    use chrono::NaiveDate;

    fn bar(sym: &str, day: u32, close: f64) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            instrument: InstrumentId::from(sym),
            open: close,
            high: close,
            low: close,
            close,
        }
    }

    /// Records how much history it was shown on each bar.
    struct HistoryRecorder {
        seen: Vec<usize>,
    }

    impl Strategy for HistoryRecorder {
        fn name(&self) -> &str {
            "history_recorder"
        }

        fn on_bar(
            &mut self,
            bar: &Bar,
            history: &[Bar],
            _ledger: &Ledger,
        ) -> Result<Vec<OrderIntent>, StrategyError> {
            assert!(history.iter().all(|b| b.timestamp <= bar.timestamp));
            self.seen.push(history.len());
            Ok(Vec::new())
        }
    }

    #[test]
    fn history_is_the_delivered_prefix() {
        let source = InMemoryBarSource::new(vec![
            bar("SPY", 1, 100.0),
            bar("SPY", 2, 101.0),
            bar("SPY", 3, 102.0),
        ]);
        let mut recorder = HistoryRecorder { seen: Vec::new() };
        let mut ledger = Ledger::new(1_000.0);
        let result = run_backtest(
            &source,
            &mut recorder,
            &mut ledger,
            &ExecutionSimulator::default(),
            &MetricsConfig::default(),
        )
        .unwrap();
        assert_eq!(recorder.seen, vec![1, 2, 3]);
        assert_eq!(result.equity_curve, vec![1_000.0; 3]);
        let report = result.report.unwrap();
        assert_eq!(report.summary.trade_count, 0);
        assert_eq!(report.metrics.max_drawdown, 0.0);
    }

    #[test]
    fn reused_ledger_is_rejected() {
        let source = InMemoryBarSource::new(vec![bar("SPY", 1, 100.0)]);
        let mut ledger = Ledger::new(1_000.0);
        let sim = ExecutionSimulator::default();
        let cfg = MetricsConfig::default();
        run_backtest(&source, &mut BuyAndHold::new("SPY"), &mut ledger, &sim, &cfg).unwrap();

        let err = run_backtest(&source, &mut BuyAndHold::new("SPY"), &mut ledger, &sim, &cfg)
            .unwrap_err();
        assert_eq!(err, EngineError::LedgerNotFresh { marks: 1 });
    }

    #[test]
    fn intent_for_unpriced_instrument_is_rejected() {
        struct Eager;
        impl Strategy for Eager {
            fn name(&self) -> &str {
                "eager"
            }
            fn on_bar(
                &mut self,
                _bar: &Bar,
                _history: &[Bar],
                _ledger: &Ledger,
            ) -> Result<Vec<OrderIntent>, StrategyError> {
                Ok(vec![OrderIntent::buy("QQQ", 1.0)])
            }
        }

        let source = InMemoryBarSource::new(vec![bar("SPY", 1, 100.0)]);
        let err = run_backtest(
            &source,
            &mut Eager,
            &mut Ledger::new(1_000.0),
            &ExecutionSimulator::default(),
            &MetricsConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Execution(_)));
    }
}
