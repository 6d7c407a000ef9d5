use chrono::{Duration, NaiveDate};
use navsim_core::data::{DailyBar, InMemoryMarketData, TradingDayRow, TradingSchedule};
use navsim_core::fees::FeeConfig;
use navsim_runner::reporting::{ArtifactManager, RunManifest};
use navsim_runner::{run_with_providers, BacktestReport, RunConfig};

const CONFIG: &str = r#"
[backtest]
initial_cash = 500000.0
name = "artifacts"

[data]
schedule_path = "schedule.csv"
market_data_dir = "bars"

[fees]
path = "fees.json"

[output]
dir = "results"
"#;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
}

fn row(date: NaiveDate, symbol: &str, first: u8, last: u8, lower: f64) -> TradingDayRow {
    TradingDayRow {
        daily_date: date,
        symbol: symbol.to_string(),
        first_trading_day: first,
        last_trading_day: last,
        upper_limit_price: Some(1_000.0),
        lower_limit_price: Some(lower),
        suspension_start: None,
        suspension_end: None,
        suspension_end_last_tradeable_date: None,
    }
}

/// One Monday-to-Friday cycle where 000002.SZ closes at its lower limit on Friday.
fn make_report(as_of: NaiveDate) -> BacktestReport {
    let mut market = InMemoryMarketData::new();
    let mut rows = Vec::new();
    for i in 0..5u32 {
        let date = d(5) + Duration::days(i as i64);
        let (first, last) = match i {
            0 => (1, 0),
            4 => (0, 1),
            _ => (0, 0),
        };
        for (symbol, base) in [("600000.SH", 10.0), ("000002.SZ", 8.0)] {
            let close = base + 0.05 * i as f64;
            market.insert_bar(
                symbol,
                DailyBar {
                    date,
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1e6,
                    amount: close * 1e6,
                },
            );
            let lower = if symbol == "000002.SZ" && last == 1 { close } else { 0.01 };
            rows.push(row(date, symbol, first, last, lower));
        }
    }
    let schedule = TradingSchedule::from_rows(rows).unwrap();
    let config = RunConfig::from_toml_str(CONFIG).unwrap();
    run_with_providers(&config, schedule, FeeConfig::reference(), &market, None, as_of).unwrap()
}

#[test]
fn test_artifact_manager_exports() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = ArtifactManager::new(temp_dir.path()).unwrap();
    let report = make_report(d(30));

    let paths = manager.save_run(&report).unwrap();
    assert_eq!(paths.run_dir, temp_dir.path().join(&report.run_id));
    assert!(paths.manifest.exists());
    assert!(paths.equity_csv.exists());
    assert!(paths.equity_parquet.exists());
    assert!(paths.daily_records_csv.exists());
    assert!(paths.stuck_events_csv.exists());
    assert!(paths.diagnostics_txt.exists());
    assert!(paths.performance_txt.as_ref().unwrap().exists());
}

#[test]
fn test_equity_csv_uses_compact_dates() {
    let temp_dir = tempfile::tempdir().unwrap();
    let report = make_report(d(30));
    let paths = ArtifactManager::new(temp_dir.path())
        .unwrap()
        .save_run(&report)
        .unwrap();

    let csv = std::fs::read_to_string(&paths.equity_csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "date,nav");
    assert_eq!(lines[1], "20260102,500000.0000");
    assert!(lines[6].starts_with("20260109,"));
    assert_eq!(lines.len(), 7);
}

#[test]
fn test_stuck_events_and_daily_records() {
    let temp_dir = tempfile::tempdir().unwrap();
    let report = make_report(d(30));
    let paths = ArtifactManager::new(temp_dir.path())
        .unwrap()
        .save_run(&report)
        .unwrap();

    let stuck = std::fs::read_to_string(&paths.stuck_events_csv).unwrap();
    assert_eq!(stuck.lines().collect::<Vec<_>>(), vec![
        "date,symbol,cause",
        "20260109,000002.SZ,limit_down",
    ]);

    let daily = std::fs::read_to_string(&paths.daily_records_csv).unwrap();
    let mut lines = daily.lines();
    assert!(lines.next().unwrap().starts_with("date,day_type,cash_start"));
    assert!(lines.next().unwrap().starts_with("2026-01-05,buy,"));
    assert_eq!(daily.lines().count(), 6);

    let text = std::fs::read_to_string(&paths.diagnostics_txt).unwrap();
    assert!(text.contains("Limit down:   1 occurrences"));
    assert!(text.contains("  20260109 000002.SZ"));
    assert!(text.contains("Positions:     1"));
}

#[test]
fn test_manifest_round_trips() {
    let temp_dir = tempfile::tempdir().unwrap();
    let report = make_report(d(30));
    let paths = ArtifactManager::new(temp_dir.path())
        .unwrap()
        .save_run(&report)
        .unwrap();

    let json = std::fs::read_to_string(&paths.manifest).unwrap();
    let manifest: RunManifest = serde_json::from_str(&json).unwrap();
    assert_eq!(manifest.run_id, report.run_id);
    assert_eq!(manifest.name.as_deref(), Some("artifacts"));
    assert_eq!(manifest.as_of, d(30));
    assert_eq!(manifest.start_date, Some(d(2)));
    assert_eq!(manifest.end_date, Some(d(9)));
    assert_eq!(manifest.days_simulated, 5);
    assert_eq!(manifest.initial_cash, 500_000.0);
    assert_eq!(manifest.fees, FeeConfig::reference());
}

#[test]
fn test_buy_day_only_run_still_reports_performance() {
    let temp_dir = tempfile::tempdir().unwrap();
    // The seed point plus the Monday NAV is enough for metrics.
    let report = make_report(d(5));
    assert_eq!(report.result.equity_history.len(), 2);

    let paths = ArtifactManager::new(temp_dir.path())
        .unwrap()
        .save_run(&report)
        .unwrap();
    let text = std::fs::read_to_string(paths.performance_txt.unwrap()).unwrap();
    assert!(text.contains("Observations"));
    assert!(text.contains("    End Date      2026-01-05"));
}
