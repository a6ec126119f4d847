//! Integration tests for the runner: config → load → strategy → engine.
//!
//! Synthetic data is seeded per symbol, so every run here is reproducible.

use replaylab_core::BarSource;
use replaylab_runner::benchmark::{buy_and_hold_equity, compare_to_buy_and_hold, BenchmarkError};
use replaylab_runner::data_loader::write_csv;
use replaylab_runner::sweep::sweep_execution_costs_sequential;
use replaylab_runner::{
    load_bars, run_from_config, sweep_execution_costs, BacktestConfig, CostGrid, DataConfig,
    RunError,
};

fn config(strategy: &str, execution: &str) -> BacktestConfig {
    BacktestConfig::from_toml_str(&format!(
        r#"
initial_cash = 100000.0

[data]
type = "synthetic"
symbols = ["SPY", "QQQ"]
start = "2021-01-04"
end = "2022-12-30"

{execution}

[strategy]
{strategy}
"#
    ))
    .unwrap()
}

const BUY_AND_HOLD: &str = r#"type = "buy_and_hold"
symbol = "SPY""#;

const SMA_TREND: &str = r#"type = "sma_trend"
symbol = "SPY"
sma_window = 50
vol_window = 20
vol_target_ann = 0.15"#;

const RSI_REVERSION: &str = r#"type = "rsi_reversion"
symbol = "QQQ"
rsi_window = 14
vol_window = 20
vol_target_ann = 0.10"#;

#[test]
fn buy_and_hold_fills_once_and_marks_every_bar() {
    let cfg = config(BUY_AND_HOLD, "");
    let loaded = load_bars(&cfg.data).unwrap();
    let outcome = run_from_config(&cfg).unwrap();

    assert!(outcome.has_synthetic);
    assert_eq!(outcome.strategy, "buy_and_hold");
    assert_eq!(outcome.result.fill_count, 1);
    assert_eq!(outcome.result.equity_curve.len(), loaded.source.len());
    assert_eq!(outcome.result.timestamps.len(), loaded.source.len());
    assert!(outcome.trades.is_empty());
    assert!(outcome.result.report.is_some());
}

#[test]
fn identical_configs_reproduce_identical_outcomes() {
    let cfg = config(SMA_TREND, r#"[execution]
preset = "retail""#);
    let a = run_from_config(&cfg).unwrap();
    let b = run_from_config(&cfg).unwrap();
    assert_eq!(a.run_id, b.run_id);
    assert_eq!(a.dataset_hash, b.dataset_hash);
    assert_eq!(a.result.equity_curve, b.result.equity_curve);
    assert_eq!(a.result.fills, b.result.fills);
}

#[test]
fn reference_strategies_complete_on_synthetic_data() {
    for strategy in [SMA_TREND, RSI_REVERSION] {
        let outcome = run_from_config(&config(strategy, "")).unwrap();
        assert!(!outcome.result.is_empty());
        assert!(outcome
            .result
            .fills
            .iter()
            .all(|f| f.instrument.as_str() == outcome.config.strategy.symbol()));
    }
}

#[test]
fn missing_symbol_is_reported() {
    let cfg = config(
        r#"type = "buy_and_hold"
symbol = "IWM""#,
        "",
    );
    let err = run_from_config(&cfg).unwrap_err();
    assert!(matches!(err, RunError::SymbolNotFound(s) if s == "IWM"));
}

#[test]
fn runs_from_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spy.csv");
    let bars = replaylab_runner::data_loader::generate_synthetic_bars(
        "SPY",
        chrono::NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
        chrono::NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
    );
    write_csv(&path, &bars).unwrap();

    let mut cfg = config(BUY_AND_HOLD, "");
    cfg.data = DataConfig::Csv { path };
    let outcome = run_from_config(&cfg).unwrap();
    assert!(!outcome.has_synthetic);
    assert_eq!(outcome.result.equity_curve.len(), bars.len());
}

#[test]
fn parallel_sweep_matches_sequential_and_keeps_grid_order() {
    let cfg = config(BUY_AND_HOLD, "");
    let data = load_bars(&cfg.data).unwrap();
    let grid = CostGrid::new(vec![0.0, 5.0, 15.0], vec![0.0, 1.0]);

    let parallel = sweep_execution_costs(&cfg, &data, &grid).unwrap();
    let sequential = sweep_execution_costs_sequential(&cfg, &data, &grid).unwrap();
    assert_eq!(parallel.len(), sequential.len());
    for (p, s) in parallel.iter().zip(&sequential) {
        assert_eq!(p.outcome.run_id, s.outcome.run_id);
        assert_eq!(p.outcome.result.equity_curve, s.outcome.result.equity_curve);
        assert_eq!(p.outcome.result.fills, s.outcome.result.fills);
    }

    let cells: Vec<(f64, f64)> = parallel
        .iter()
        .map(|p| (p.slippage_bps, p.commission_per_order))
        .collect();
    assert_eq!(cells, grid.cells());
}

#[test]
fn higher_costs_lower_buy_and_hold_equity() {
    let cfg = config(BUY_AND_HOLD, "");
    let data = load_bars(&cfg.data).unwrap();
    let grid = CostGrid::new(vec![0.0, 5.0, 15.0], vec![0.0]);
    let points = sweep_execution_costs(&cfg, &data, &grid).unwrap();

    let equities: Vec<f64> = points.iter().map(|p| p.final_equity()).collect();
    assert!(equities[0] > equities[1]);
    assert!(equities[1] > equities[2]);
}

#[test]
fn bad_sweep_cell_fails_before_running() {
    let cfg = config(BUY_AND_HOLD, "");
    let data = load_bars(&cfg.data).unwrap();
    let grid = CostGrid::new(vec![0.0], vec![-1.0]);
    assert!(matches!(
        sweep_execution_costs(&cfg, &data, &grid),
        Err(RunError::Execution(_))
    ));
}

#[test]
fn benchmark_starts_at_strategy_equity() {
    let cfg = config(SMA_TREND, "");
    let data = load_bars(&cfg.data).unwrap();
    let outcome =
        replaylab_runner::run_with_source(&cfg, &data.source, &data.dataset_hash, true).unwrap();

    let cmp = compare_to_buy_and_hold(
        &outcome.result,
        &data.source,
        "SPY",
        0.0,
        0.0,
        &cfg.metrics,
    )
    .unwrap();
    assert_eq!(cmp.benchmark_equity[0], outcome.result.equity_curve[0]);
    assert_eq!(cmp.benchmark_equity.len(), cmp.timestamps.len());
    assert!(cmp.strategy_equity.len() <= cmp.benchmark_equity.len());
    assert!(cmp.benchmark_metrics.max_drawdown <= 0.0);
}

#[test]
fn benchmark_errors() {
    let cfg = config(BUY_AND_HOLD, "");
    let data = load_bars(&cfg.data).unwrap();
    let outcome =
        replaylab_runner::run_with_source(&cfg, &data.source, &data.dataset_hash, true).unwrap();

    let err = compare_to_buy_and_hold(&outcome.result, &data.source, "DIA", 0.0, 0.0, &cfg.metrics)
        .unwrap_err();
    assert_eq!(err, BenchmarkError::UnknownSymbol("DIA".into()));

    let mut empty = outcome.result.clone();
    empty.equity_curve.clear();
    let err = compare_to_buy_and_hold(&empty, &data.source, "SPY", 0.0, 0.0, &cfg.metrics)
        .unwrap_err();
    assert_eq!(err, BenchmarkError::EmptyResult);
}

#[test]
fn benchmark_with_costs_holds_whole_units() {
    let eq = buy_and_hold_equity(&[50.0, 55.0, 45.0], 10_000.0, 1.0, 20.0);
    // entry 50.1, 9999 cash -> 199 units, leftover 29.1
    let leftover = 9_999.0 - 199.0 * 50.1;
    assert!((eq[1] - (199.0 * 55.0 + leftover)).abs() < 1e-6);
    assert!((eq[2] - (199.0 * 45.0 + leftover)).abs() < 1e-6);
}
