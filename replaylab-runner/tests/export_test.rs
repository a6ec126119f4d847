//! Artifact export: manifest round trip, CSV layouts, schema gating.

use replaylab_runner::export::{export_json, import_json, load_artifacts, save_artifacts};
use replaylab_runner::{run_from_config, BacktestConfig, RunOutcome, SCHEMA_VERSION};

fn outcome() -> RunOutcome {
    let cfg = BacktestConfig::from_toml_str(
        r#"
[data]
type = "synthetic"
symbols = ["SPY"]
start = "2022-01-03"
end = "2023-06-30"

[execution]
slippage_bps = 5.0
commission_per_order = 1.0

[strategy]
type = "sma_trend"
symbol = "SPY"
sma_window = 20
vol_window = 10
vol_target_ann = 0.2
"#,
    )
    .unwrap();
    run_from_config(&cfg).unwrap()
}

#[test]
fn json_round_trip_preserves_curves_and_trades() {
    let original = outcome();
    let json = export_json(&original).unwrap();
    let restored = import_json(&json).unwrap();

    assert_eq!(restored.schema_version, SCHEMA_VERSION);
    assert_eq!(restored.run_id, original.run_id);
    assert_eq!(restored.config, original.config);
    assert_eq!(restored.result.equity_curve, original.result.equity_curve);
    assert_eq!(restored.result.timestamps, original.result.timestamps);
    assert_eq!(restored.result.fills, original.result.fills);
    assert_eq!(restored.trades, original.trades);
}

#[test]
fn newer_schema_is_rejected() {
    let mut value: serde_json::Value =
        serde_json::from_str(&export_json(&outcome()).unwrap()).unwrap();
    value["schema_version"] = serde_json::json!(SCHEMA_VERSION + 1);
    let err = import_json(&value.to_string()).unwrap_err();
    assert!(err.to_string().contains("unsupported schema version"));
}

#[test]
fn missing_schema_version_defaults_to_current() {
    let mut value: serde_json::Value =
        serde_json::from_str(&export_json(&outcome()).unwrap()).unwrap();
    value.as_object_mut().unwrap().remove("schema_version");
    let restored = import_json(&value.to_string()).unwrap();
    assert_eq!(restored.schema_version, SCHEMA_VERSION);
}

#[test]
fn save_artifacts_writes_full_bundle() {
    let original = outcome();
    let dir = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&original, dir.path()).unwrap();

    for name in ["manifest.json", "equity.csv", "trades.csv", "fills.csv", "report.md"] {
        assert!(run_dir.join(name).exists(), "{name} missing");
    }

    let equity = std::fs::read_to_string(run_dir.join("equity.csv")).unwrap();
    assert_eq!(equity.lines().count(), original.result.equity_curve.len() + 1);
    assert_eq!(equity.lines().next().unwrap(), "timestamp,equity,log_return");

    let fills = std::fs::read_to_string(run_dir.join("fills.csv")).unwrap();
    assert_eq!(fills.lines().count(), original.result.fills.len() + 1);

    let trades = std::fs::read_to_string(run_dir.join("trades.csv")).unwrap();
    assert_eq!(trades.lines().count(), original.trades.len() + 1);

    let report = std::fs::read_to_string(run_dir.join("report.md")).unwrap();
    assert!(report.contains("**SYNTHETIC**"));
    assert!(report.contains("| Strategy | sma_trend |"));

    let loaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded.run_id, original.run_id);
}

#[test]
fn load_artifacts_from_empty_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_artifacts(dir.path()).is_err());
}
