//! ReplayLab CLI — run, sweep, and compare commands.
//!
//! Commands:
//! - `run` — execute a backtest from a TOML config and save artifacts
//! - `sweep` — rerun the same config across a slippage × commission grid
//! - `compare` — strategy vs buy-and-hold on one symbol
//!
//! Logging goes through `tracing`; set `RUST_LOG` to adjust (default `info`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use replaylab_runner::export::{generate_comparison, save_artifacts};
use replaylab_runner::{
    compare_to_buy_and_hold, load_bars, run_with_source, sweep_execution_costs, BacktestConfig,
    CostGrid, RunOutcome,
};

#[derive(Parser)]
#[command(name = "replaylab", about = "ReplayLab CLI — bar-replay backtesting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Run one config across a grid of execution costs, in parallel.
    Sweep {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Slippage values in bps, comma separated.
        #[arg(long, value_delimiter = ',', default_value = "0,5,15")]
        slippage_bps: Vec<f64>,

        /// Commission per order values, comma separated.
        #[arg(long, value_delimiter = ',', default_value = "0")]
        commission: Vec<f64>,
    },
    /// Compare a strategy run against buy-and-hold.
    Compare {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Benchmark symbol. Defaults to the strategy's symbol.
        #[arg(long)]
        symbol: Option<String>,

        /// One-time commission paid by the benchmark on entry.
        #[arg(long, default_value_t = 0.0)]
        benchmark_commission: f64,

        /// Slippage applied to the benchmark's entry price, in bps.
        #[arg(long, default_value_t = 0.0)]
        benchmark_slippage_bps: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output_dir } => run_cmd(&config, &output_dir),
        Commands::Sweep {
            config,
            slippage_bps,
            commission,
        } => sweep_cmd(&config, slippage_bps, commission),
        Commands::Compare {
            config,
            symbol,
            benchmark_commission,
            benchmark_slippage_bps,
        } => compare_cmd(
            &config,
            symbol,
            benchmark_commission,
            benchmark_slippage_bps,
        ),
    }
}

fn load_config(path: &Path) -> Result<BacktestConfig> {
    BacktestConfig::from_file(path)
        .with_context(|| format!("failed to load config {}", path.display()))
}

fn run_cmd(config_path: &Path, output_dir: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let data = load_bars(&config.data)?;
    let outcome = run_with_source(&config, &data.source, &data.dataset_hash, data.has_synthetic)?;

    print_summary(&outcome);

    let run_dir = save_artifacts(&outcome, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn sweep_cmd(config_path: &Path, slippage_bps: Vec<f64>, commission: Vec<f64>) -> Result<()> {
    let config = load_config(config_path)?;
    let data = load_bars(&config.data)?;
    let grid = CostGrid::new(slippage_bps, commission);
    info!(cells = grid.size(), "starting execution-cost sweep");

    let points = sweep_execution_costs(&config, &data, &grid)?;

    println!(
        "{:>10} {:>12} {:>16} {:>12} {:>10} {:>10}",
        "Slip(bps)", "Commission", "Final Equity", "Fees", "Sharpe", "MaxDD"
    );
    println!("{}", "-".repeat(75));
    for p in &points {
        let (sharpe, max_dd) = p
            .outcome
            .result
            .report
            .as_ref()
            .map(|r| (r.metrics.sharpe, r.metrics.max_drawdown))
            .unwrap_or((f64::NAN, f64::NAN));
        println!(
            "{:>10.2} {:>12.2} {:>16.2} {:>12.2} {:>10.3} {:>9.2}%",
            p.slippage_bps,
            p.commission_per_order,
            p.final_equity(),
            p.total_fees(),
            sharpe,
            max_dd * 100.0
        );
    }
    Ok(())
}

fn compare_cmd(
    config_path: &Path,
    symbol: Option<String>,
    benchmark_commission: f64,
    benchmark_slippage_bps: f64,
) -> Result<()> {
    let config = load_config(config_path)?;
    let data = load_bars(&config.data)?;
    let outcome = run_with_source(&config, &data.source, &data.dataset_hash, data.has_synthetic)?;

    let symbol = symbol.unwrap_or_else(|| config.strategy.symbol().to_string());
    let comparison = compare_to_buy_and_hold(
        &outcome.result,
        &data.source,
        &symbol,
        benchmark_commission,
        benchmark_slippage_bps,
        &config.metrics,
    )?;

    print!("{}", generate_comparison(&comparison));
    if let (Some(s), Some(b)) = (
        comparison.strategy_equity.last(),
        comparison.benchmark_equity.last(),
    ) {
        println!();
        println!("Final equity: strategy {s:.2}, buy & hold {b:.2}");
    }
    Ok(())
}

fn print_summary(outcome: &RunOutcome) {
    let result = &outcome.result;
    println!();
    println!("=== Backtest Result ===");
    println!("Strategy:       {}", outcome.strategy);
    println!("Symbol:         {}", outcome.config.strategy.symbol());
    if let (Some(first), Some(last)) = (result.timestamps.first(), result.timestamps.last()) {
        println!("Period:         {first} to {last}");
    }
    println!("Bars:           {}", result.equity_curve.len());
    println!("Fills:          {}", result.fill_count);
    println!("Initial Cash:   {:.2}", outcome.config.initial_cash);
    if let Some(eq) = result.final_equity() {
        println!("Final Equity:   {eq:.2}");
    }
    println!("Fees:           {:.2}", result.total_fees());
    if outcome.has_synthetic {
        println!("Data:           SYNTHETIC");
    }

    if let Some(report) = &result.report {
        let s = &report.summary;
        let m = &report.metrics;
        println!();
        println!("--- Trades ---");
        println!("Trades:         {}", s.trade_count);
        println!("Win Rate:       {:.1}%", s.win_rate * 100.0);
        println!("Avg Win:        {:.2}", s.average_win);
        println!("Avg Loss:       {:.2}", s.average_loss);
        println!("Avg Hold (d):   {:.1}", s.average_holding_period);
        println!();
        println!("--- Performance ---");
        println!("CAGR:           {:.2}%", m.cagr * 100.0);
        println!("Sharpe:         {:.3}", m.sharpe);
        println!("Sortino:        {:.3}", m.sortino);
        println!("Omega:          {:.3}", m.omega);
        println!("Calmar:         {:.3}", m.calmar);
        println!("Max Drawdown:   {:.2}%", m.max_drawdown * 100.0);
    }
}
