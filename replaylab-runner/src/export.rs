//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for run outcomes:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: equity curve, trade tape, and fill tape for external analysis tools
//! - **Markdown**: human-readable run report and benchmark comparison
//!
//! All persisted artifacts include a `schema_version` field. Newer versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use replaylab_core::{BacktestResult, Fill, PerformanceMetrics, TradeRecord};

use crate::benchmark::Comparison;
use crate::runner::{RunOutcome, SCHEMA_VERSION};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `RunOutcome` to pretty JSON.
pub fn export_json(outcome: &RunOutcome) -> Result<String> {
    serde_json::to_string_pretty(outcome).context("failed to serialize RunOutcome to JSON")
}

/// Deserialize a `RunOutcome` from JSON, rejecting newer schema versions.
pub fn import_json(json: &str) -> Result<RunOutcome> {
    let outcome: RunOutcome =
        serde_json::from_str(json).context("failed to deserialize RunOutcome from JSON")?;
    if outcome.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            outcome.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(outcome)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Equity curve as CSV: `timestamp,equity,log_return`.
pub fn export_equity_csv(result: &BacktestResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "equity", "log_return"])?;
    for ((ts, eq), r) in result
        .timestamps
        .iter()
        .zip(&result.equity_curve)
        .zip(&result.return_curve)
    {
        wtr.write_record([
            ts.format(TIMESTAMP_FORMAT).to_string(),
            format!("{eq:.6}"),
            format!("{r:.10}"),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Closed trades as CSV, one row per matched lot.
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "instrument",
        "side",
        "entry_ts",
        "exit_ts",
        "entry_price",
        "exit_price",
        "qty",
        "realized_pnl",
        "return_pct",
        "holding_periods",
    ])?;
    for t in trades {
        wtr.write_record([
            t.instrument.to_string(),
            format!("{:?}", t.side),
            t.entry_ts.format(TIMESTAMP_FORMAT).to_string(),
            t.exit_ts.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.6}", t.entry_price),
            format!("{:.6}", t.exit_price),
            t.qty.to_string(),
            format!("{:.2}", t.realized_pnl),
            format!("{:.6}", t.return_pct),
            t.holding_periods.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Fills as CSV in execution order.
pub fn export_fills_csv(fills: &[Fill]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "instrument", "side", "quantity", "price", "fee"])?;
    for f in fills {
        wtr.write_record([
            f.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            f.instrument.to_string(),
            format!("{:?}", f.side),
            f.quantity.to_string(),
            format!("{:.6}", f.price),
            format!("{:.2}", f.fee),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single run.
///
/// Creates `{strategy}_{run_id prefix}/` under `output_dir` containing:
/// - `manifest.json` — the full `RunOutcome`
/// - `equity.csv` — bar-by-bar equity and log return
/// - `trades.csv` — closed trades
/// - `fills.csv` — every fill
/// - `report.md` — Markdown summary
///
/// Returns the path to the created directory. Re-saving the same run
/// overwrites it.
pub fn save_artifacts(outcome: &RunOutcome, output_dir: &Path) -> Result<PathBuf> {
    let prefix: String = outcome.run_id.chars().take(12).collect();
    let run_dir = output_dir.join(format!("{}_{}", outcome.strategy, prefix));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let write = |name: &str, contents: String| -> Result<()> {
        let path = run_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))
    };

    write("manifest.json", export_json(outcome)?)?;
    write("equity.csv", export_equity_csv(&outcome.result)?)?;
    write("trades.csv", export_trades_csv(&outcome.trades)?)?;
    write("fills.csv", export_fills_csv(&outcome.result.fills)?)?;
    write("report.md", generate_report(outcome))?;

    Ok(run_dir)
}

/// Load a `RunOutcome` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<RunOutcome> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Markdown report for a single run.
pub fn generate_report(outcome: &RunOutcome) -> String {
    let result = &outcome.result;
    let mut md = String::with_capacity(1024);

    md.push_str("# Backtest Report\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Strategy | {} |\n", outcome.strategy));
    md.push_str(&format!("| Symbol | {} |\n", outcome.config.strategy.symbol()));
    if let (Some(first), Some(last)) = (result.timestamps.first(), result.timestamps.last()) {
        md.push_str(&format!("| Period | {first} to {last} |\n"));
    }
    md.push_str(&format!("| Bars | {} |\n", result.equity_curve.len()));
    md.push_str(&format!("| Fills | {} |\n", result.fill_count));
    md.push_str(&format!(
        "| Initial Cash | {:.2} |\n",
        outcome.config.initial_cash
    ));
    if let Some(eq) = result.final_equity() {
        md.push_str(&format!("| Final Equity | {eq:.2} |\n"));
    }
    md.push_str(&format!("| Fees | {:.2} |\n", result.total_fees()));
    md.push_str(&format!("| Run Id | {} |\n", outcome.run_id));
    md.push_str(&format!("| Dataset Hash | {} |\n", outcome.dataset_hash));
    if outcome.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    if let Some(report) = &result.report {
        let s = &report.summary;
        md.push_str("## Trades\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("| --- | --- |\n");
        md.push_str(&format!("| Trades | {} |\n", s.trade_count));
        md.push_str(&format!("| Win Rate | {:.1}% |\n", s.win_rate * 100.0));
        md.push_str(&format!("| Avg Win | {:.2} |\n", s.average_win));
        md.push_str(&format!("| Avg Loss | {:.2} |\n", s.average_loss));
        md.push_str(&format!(
            "| Avg Holding (days) | {:.1} |\n",
            s.average_holding_period
        ));
        md.push('\n');

        md.push_str("## Performance\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("| --- | --- |\n");
        push_metric_rows(&mut md, &[&report.metrics]);
        md.push('\n');
    }

    md
}

/// Markdown table of strategy vs buy-and-hold metrics.
pub fn generate_comparison(comparison: &Comparison) -> String {
    let mut md = String::with_capacity(512);
    md.push_str(&format!(
        "# Strategy vs Buy & Hold ({})\n\n",
        comparison.symbol
    ));
    md.push_str("| Metric | Strategy | Buy & Hold |\n");
    md.push_str("| --- | --- | --- |\n");
    push_metric_rows(
        &mut md,
        &[&comparison.strategy_metrics, &comparison.benchmark_metrics],
    );
    md
}

fn push_metric_rows(md: &mut String, columns: &[&PerformanceMetrics]) {
    let rows: [(&str, fn(&PerformanceMetrics) -> f64, bool); 6] = [
        ("CAGR", |m| m.cagr, true),
        ("Sharpe", |m| m.sharpe, false),
        ("Sortino", |m| m.sortino, false),
        ("Omega", |m| m.omega, false),
        ("Calmar", |m| m.calmar, false),
        ("Max Drawdown", |m| m.max_drawdown, true),
    ];
    for (label, get, pct) in rows {
        md.push_str(&format!("| {label} |"));
        for m in columns {
            let v = get(m);
            if pct && v.is_finite() {
                md.push_str(&format!(" {:.2}% |", v * 100.0));
            } else {
                md.push_str(&format!(" {v:.3} |"));
            }
        }
        md.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use replaylab_core::{InstrumentId, LotSide, Side};

    fn ts(day: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn equity_csv_has_one_row_per_mark() {
        let result = BacktestResult {
            equity_curve: vec![1_000.0, 1_100.0],
            return_curve: vec![0.0, (1.1f64).ln()],
            timestamps: vec![ts(1), ts(2)],
            fills: vec![],
            fill_count: 0,
            report: None,
        };
        let csv = export_equity_csv(&result).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "timestamp,equity,log_return");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2024-01-01 00:00:00,1000.000000,0.0000000000"));
    }

    #[test]
    fn trades_csv_columns() {
        let trade = TradeRecord {
            instrument: InstrumentId::from("SPY"),
            side: LotSide::Short,
            entry_ts: ts(1),
            exit_ts: ts(4),
            entry_price: 100.0,
            exit_price: 90.0,
            qty: 5,
            realized_pnl: 50.0,
            return_pct: 100.0 / 90.0 - 1.0,
            holding_periods: 3,
        };
        let csv = export_trades_csv(&[trade]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("SPY,Short,2024-01-01 00:00:00,2024-01-04 00:00:00,"));
        assert!(row.ends_with(",5,50.00,0.111111,3"));
    }

    #[test]
    fn fills_csv_columns() {
        let fill = Fill {
            instrument: InstrumentId::from("SPY"),
            side: Side::Buy,
            quantity: 10,
            price: 100.1,
            timestamp: ts(2),
            fee: 1.0,
        };
        let csv = export_fills_csv(&[fill]).unwrap();
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "2024-01-02 00:00:00,SPY,Buy,10,100.100000,1.00"
        );
    }

    #[test]
    fn comparison_table_has_both_columns() {
        let m = PerformanceMetrics {
            sharpe: 1.0,
            sortino: f64::NAN,
            omega: f64::INFINITY,
            cagr: 0.1,
            calmar: 0.5,
            max_drawdown: -0.2,
        };
        let cmp = Comparison {
            symbol: "SPY".into(),
            timestamps: vec![],
            strategy_equity: vec![],
            benchmark_equity: vec![],
            strategy_metrics: m,
            benchmark_metrics: m,
        };
        let md = generate_comparison(&cmp);
        assert!(md.contains("| CAGR | 10.00% | 10.00% |"));
        assert!(md.contains("| Omega | inf | inf |"));
        assert!(md.contains("| Max Drawdown | -20.00% | -20.00% |"));
    }
}
